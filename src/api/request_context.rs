// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-request id and timing

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Stored in the request extensions for handlers that want it
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    pub id: Uuid,
    pub started: Instant,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware: attach a [`RequestContext`], log the outcome, echo the id header.
pub async fn request_context(mut request: Request, next: Next) -> Response {
    let context = RequestContext::new();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    info!(
        "[{}] {} {} -> {} in {:.1}ms",
        context.id,
        method,
        path,
        response.status().as_u16(),
        context.elapsed().as_secs_f64() * 1000.0
    );

    if let Ok(value) = HeaderValue::from_str(&context.id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
