// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware,
    routing::get,
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration, time::Instant};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::docs::docs_handler;
use super::errors::ApiError;
use super::process::{process_eye_handler, process_face_handler, process_photo_handler};
use super::request_context::request_context;
use super::status::{status_handler, version_handler};
use crate::config::ServiceConfig;
use crate::image_source::{ImageResolver, SourceError};
use crate::pipeline::{DetectionPipeline, MockPipeline, ScreeningPipeline};
use crate::version::{MOCK_VERSION, VERSION};
use crate::vision::DetectorSet;

/// Room for multipart framing on top of the largest accepted image
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared state for all surfaces
pub struct AppState {
    pub config: ServiceConfig,
    pub resolver: ImageResolver,
    pub detection: Arc<dyn ScreeningPipeline>,
    pub mock: Option<Arc<dyn ScreeningPipeline>>,
    /// (face, eye) detector backend names
    pub detector_names: (&'static str, &'static str),
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServiceConfig, detectors: DetectorSet) -> Result<Self, SourceError> {
        let resolver = ImageResolver::new(
            Duration::from_secs(config.fetch_timeout_secs),
            config.max_image_bytes,
        )?;
        let detector_names = detectors.backend_names();
        let mock: Option<Arc<dyn ScreeningPipeline>> = config
            .mock
            .enabled
            .then(|| Arc::new(MockPipeline::new(config.mock.seed)) as Arc<dyn ScreeningPipeline>);

        Ok(Self {
            resolver,
            detection: Arc::new(DetectionPipeline::new(detectors)),
            mock,
            detector_names,
            started_at: Instant::now(),
            config,
        })
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Version prefixes currently mounted
    pub fn surfaces(&self) -> Vec<&'static str> {
        let mut surfaces = vec![VERSION];
        if self.mock.is_some() {
            surfaces.push(MOCK_VERSION);
        }
        surfaces
    }
}

/// State of one versioned surface: the shared state plus the pipeline it serves
#[derive(Clone)]
pub struct SurfaceState {
    pub app: Arc<AppState>,
    pub version: &'static str,
    pub pipeline: Arc<dyn ScreeningPipeline>,
}

fn surface_routes(surface: SurfaceState) -> Router<Arc<AppState>> {
    let prefix = format!("/{}", surface.version);

    Router::new()
        .route(&prefix, get(version_handler))
        .route(&format!("{}/", prefix), get(version_handler))
        .route(&format!("{}/status", prefix), get(status_handler))
        .route(
            &format!("{}/process_eye", prefix),
            get(process_eye_handler).post(process_eye_handler),
        )
        .route(
            &format!("{}/process_face", prefix),
            get(process_face_handler).post(process_face_handler),
        )
        .route(
            &format!("{}/process_photo", prefix),
            get(process_photo_handler).post(process_photo_handler),
        )
        .with_state(surface)
}

/// Build the full router: root, docs, the real surface and, when enabled, the mock.
pub fn create_app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_image_bytes + BODY_OVERHEAD_BYTES;

    let mut router = Router::new()
        .route("/", get(root_handler))
        .route("/docs", get(docs_handler))
        .merge(surface_routes(SurfaceState {
            app: state.clone(),
            version: VERSION,
            pipeline: state.detection.clone(),
        }));

    if let Some(mock) = &state.mock {
        router = router.merge(surface_routes(SurfaceState {
            app: state.clone(),
            version: MOCK_VERSION,
            pipeline: mock.clone(),
        }));
    }

    router
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_context))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "hello world!"
}

async fn not_found_handler(request: Request) -> ApiError {
    ApiError::NotFound(request.uri().path().to_string())
}

/// Serve until ctrl-c
pub async fn start_server(state: Arc<AppState>) -> Result<()> {
    let addr: SocketAddr = state.config.listen_addr.parse()?;
    let app = create_app(state.clone());
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "API server listening on {} (surfaces: {})",
        listener.local_addr()?,
        state.surfaces().join(", ")
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
