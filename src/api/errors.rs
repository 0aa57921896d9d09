// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

use crate::image_source::SourceError;
use crate::vision::ImageError;

/// Body of every failed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    MissingImageSource,
    InvalidImageUrl(String),
    EmptyImageSource,
    DecodeError(String),
    ImageTooLarge { size: usize, max: usize },
    MalformedUpload(String),
    InvalidQuery(String),
    NotFound(String),
    InternalError(String),
}

impl ApiError {
    /// Application error code carried in the body
    pub fn code(&self) -> u16 {
        match self {
            ApiError::MissingImageSource => 1001,
            ApiError::InvalidImageUrl(_) => 1002,
            ApiError::EmptyImageSource => 1003,
            ApiError::DecodeError(_) => 1004,
            ApiError::ImageTooLarge { .. } => 1005,
            ApiError::MalformedUpload(_) => 1006,
            ApiError::InvalidQuery(_) => 1007,
            ApiError::NotFound(_) => 404,
            ApiError::InternalError(_) => 500,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::MissingImageSource
            | ApiError::InvalidImageUrl(_)
            | ApiError::EmptyImageSource
            | ApiError::DecodeError(_)
            | ApiError::MalformedUpload(_)
            | ApiError::InvalidQuery(_) => 400,
            ApiError::ImageTooLarge { .. } => 413,
            ApiError::NotFound(_) => 404,
            ApiError::InternalError(_) => 500,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingImageSource => {
                write!(f, "No image given: pass image_url or upload image_buf")
            }
            ApiError::InvalidImageUrl(msg) => write!(f, "Invalid image URL: {}", msg),
            ApiError::EmptyImageSource => write!(f, "The image source is empty"),
            ApiError::DecodeError(msg) => write!(f, "Could not decode image: {}", msg),
            ApiError::ImageTooLarge { size, max } => write!(
                f,
                "Image is too large: {} bytes (max: {} bytes)",
                size, max
            ),
            ApiError::MalformedUpload(msg) => write!(f, "Malformed upload: {}", msg),
            ApiError::InvalidQuery(msg) => write!(f, "Invalid query: {}", msg),
            ApiError::NotFound(path) => write!(f, "Not found: {}", path),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", self.code(), self);
        }

        (status, Json(self.to_response())).into_response()
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::MissingImageSource => ApiError::MissingImageSource,
            SourceError::InvalidImageUrl { url, reason } => {
                ApiError::InvalidImageUrl(format!("{} ({})", url, reason))
            }
            SourceError::EmptyImageSource => ApiError::EmptyImageSource,
            SourceError::TooLarge { size, max } => ApiError::ImageTooLarge { size, max },
            SourceError::Client(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::TooLarge(size, max) => ApiError::ImageTooLarge { size, max },
            ImageError::EmptyData => ApiError::EmptyImageSource,
            ImageError::UnsupportedFormat | ImageError::DecodeFailed(_) => {
                ApiError::DecodeError(err.to_string())
            }
            ImageError::EncodeFailed(_) => ApiError::InternalError(err.to_string()),
        }
    }
}
