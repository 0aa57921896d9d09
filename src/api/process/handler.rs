// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process endpoint handlers

use axum::{
    extract::{rejection::QueryRejection, Query, Request, State},
    Json,
};
use tracing::{debug, info};

use super::request::{read_image_request, ProcessParams};
use crate::api::errors::ApiError;
use crate::api::http_server::SurfaceState;
use crate::api::request_context::RequestContext;
use crate::pipeline::{EyeInfo, FaceInfo, PhotoInfo, ScreeningPipeline};
use crate::vision::{decode_image_bytes, DecodedImage, ImageError};

/// POST /{version}/process_eye - Report on an image of one eye
pub async fn process_eye_handler(
    State(surface): State<SurfaceState>,
    query: Result<Query<ProcessParams>, QueryRejection>,
    request: Request,
) -> Result<Json<EyeInfo>, ApiError> {
    run_pipeline(surface, query, request, "process_eye", |pipeline, image, annotate| {
        pipeline.process_eye(image, annotate)
    })
    .await
    .map(Json)
}

/// POST /{version}/process_face - Report on an image of one face
///
/// The image is assumed to be a pre-cropped face; no face search is done.
pub async fn process_face_handler(
    State(surface): State<SurfaceState>,
    query: Result<Query<ProcessParams>, QueryRejection>,
    request: Request,
) -> Result<Json<FaceInfo>, ApiError> {
    run_pipeline(surface, query, request, "process_face", |pipeline, image, annotate| {
        pipeline.process_face(image, annotate)
    })
    .await
    .map(Json)
}

/// POST /{version}/process_photo - Find and report on every face in a photo
///
/// # Request
/// - `image_url`: URL to fetch, or `body` to read the raw request body
/// - `image_buf`: multipart file field, used when `image_url` is absent
/// - `annotate_image`: attach annotated JPEG data URIs (default: false)
///
/// # Errors
/// - 400: no usable image source, unreachable URL, undecodable image
/// - 413: image larger than the configured limit
/// - 500: the pipeline task failed
pub async fn process_photo_handler(
    State(surface): State<SurfaceState>,
    query: Result<Query<ProcessParams>, QueryRejection>,
    request: Request,
) -> Result<Json<PhotoInfo>, ApiError> {
    run_pipeline(surface, query, request, "process_photo", |pipeline, image, annotate| {
        pipeline.process_photo(image, annotate)
    })
    .await
    .map(Json)
}

async fn run_pipeline<T, F>(
    surface: SurfaceState,
    query: Result<Query<ProcessParams>, QueryRejection>,
    request: Request,
    operation: &'static str,
    op: F,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn ScreeningPipeline, &DecodedImage, bool) -> Result<T, ImageError>
        + Send
        + 'static,
{
    let Query(params) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.id.to_string())
        .unwrap_or_default();

    debug!(
        "[{}] {} on {} (image_url: {:?}, annotate: {})",
        request_id, operation, surface.version, params.image_url, params.annotate_image
    );

    let max_bytes = surface.app.config.max_image_bytes;
    let image_request = read_image_request(params.image_url, request, max_bytes).await?;
    let bytes = surface.app.resolver.resolve(image_request).await?;

    let pipeline = surface.pipeline.clone();
    let annotate = params.annotate_image;
    let output = tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
        let image = decode_image_bytes(&bytes, max_bytes)?;
        debug!(
            "Decoded {:?} image {}x{}",
            image.format,
            image.width(),
            image.height()
        );
        Ok(op(pipeline.as_ref(), &image, annotate)?)
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("{} task failed: {}", operation, e)))??;

    info!(
        "[{}] {} on {} complete ({} pipeline)",
        request_id,
        operation,
        surface.version,
        surface.pipeline.name()
    );

    Ok(output)
}
