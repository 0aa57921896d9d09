// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process request parsing

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        StatusCode,
    },
};
use axum_extra::extract::Multipart;
use serde::{de, Deserialize, Deserializer};
use tracing::debug;

use crate::api::errors::ApiError;
use crate::config::parse_flag;
use crate::image_source::{ImageRequest, BODY_SENTINEL};

/// Multipart field carrying an uploaded image
pub const UPLOAD_FIELD: &str = "image_buf";

/// Query parameters shared by the process endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessParams {
    /// Image URL, or `body` when the request body is the image
    #[serde(default)]
    pub image_url: Option<String>,

    /// Attach annotated JPEG data URIs (default: false)
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub annotate_image: bool,
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw)
        .ok_or_else(|| de::Error::custom(format!("expected a boolean, got '{}'", raw)))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

fn declared_length(request: &Request) -> Option<usize> {
    request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

/// Collect the image-bearing parts of a request.
///
/// The body is only consumed when it can be the image: as raw bytes under the
/// body sentinel, or as a multipart form when no URL was given. Raw bodies are
/// capped by the router's body limit; `body_limit` is the maximum reported
/// when that cap is hit.
pub async fn read_image_request(
    image_url: Option<String>,
    request: Request,
    body_limit: usize,
) -> Result<ImageRequest, ApiError> {
    match image_url.as_deref() {
        Some(BODY_SENTINEL) => {
            let declared = declared_length(&request);
            let body = Bytes::from_request(request, &()).await.map_err(|rejection| {
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    ApiError::ImageTooLarge {
                        size: declared.unwrap_or(body_limit + 1),
                        max: body_limit,
                    }
                } else {
                    ApiError::MalformedUpload(rejection.body_text())
                }
            })?;
            Ok(ImageRequest {
                image_url,
                image_buf: None,
                body: Some(body),
            })
        }
        Some(_) => Ok(ImageRequest {
            image_url,
            ..Default::default()
        }),
        None if is_multipart(&request) => {
            let image_buf = read_upload(request, body_limit).await?;
            Ok(ImageRequest {
                image_url: None,
                image_buf,
                body: None,
            })
        }
        None => Ok(ImageRequest::default()),
    }
}

async fn read_upload(request: Request, body_limit: usize) -> Result<Option<Bytes>, ApiError> {
    let declared = declared_length(&request);
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| ApiError::MalformedUpload(e.to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MalformedUpload(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let bytes = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::ImageTooLarge {
                    size: declared.unwrap_or(body_limit + 1),
                    max: body_limit,
                }
            } else {
                ApiError::MalformedUpload(e.body_text())
            }
        })?;
        return Ok(Some(bytes));
    }

    Ok(None)
}
