// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Version and status endpoints

use axum::{extract::State, Json};
use axum_extra::extract::{Query, QueryRejection};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::api::errors::ApiError;
use crate::api::http_server::SurfaceState;
use crate::version::BUILD_VERSION;

/// `include_keys` and `exclude_keys` may each be repeated
#[derive(Debug, Default, Deserialize)]
pub struct StatusParams {
    #[serde(default)]
    pub include_keys: Vec<String>,
    #[serde(default)]
    pub exclude_keys: Vec<String>,
}

/// GET /{version}/ - The surface's version string
pub async fn version_handler(State(surface): State<SurfaceState>) -> &'static str {
    surface.version
}

/// GET /{version}/status - Service status, optionally filtered by key
pub async fn status_handler(
    State(surface): State<SurfaceState>,
    query: Result<Query<StatusParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::InvalidQuery(e.to_string()))?;
    let status = filter_keys(
        build_status(&surface),
        &params.include_keys,
        &params.exclude_keys,
    )?;
    Ok(Json(Value::Object(status)))
}

fn build_status(surface: &SurfaceState) -> Map<String, Value> {
    let app = &surface.app;
    let (face_detector, eye_detector) = app.detector_names;

    let status = json!({
        "version": surface.version,
        "build": BUILD_VERSION,
        "pipeline": surface.pipeline.name(),
        "face_detector": face_detector,
        "eye_detector": eye_detector,
        "uptime_secs": app.uptime().as_secs(),
        "max_image_bytes": app.config.max_image_bytes,
        "fetch_timeout_secs": app.config.fetch_timeout_secs,
        "surfaces": app.surfaces(),
    });

    match status {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Keep only `include` keys (all when empty), then drop `exclude` keys.
/// Naming a key the status does not have is an error.
pub fn filter_keys(
    mut status: Map<String, Value>,
    include: &[String],
    exclude: &[String],
) -> Result<Map<String, Value>, ApiError> {
    if let Some(unknown) = include
        .iter()
        .chain(exclude)
        .find(|key| !status.contains_key(key.as_str()))
    {
        return Err(ApiError::InvalidQuery(format!(
            "unknown status key '{}'",
            unknown
        )));
    }

    if !include.is_empty() {
        status.retain(|key, _| include.iter().any(|k| k == key));
    }
    status.retain(|key, _| !exclude.iter().any(|k| k == key));

    Ok(status)
}
