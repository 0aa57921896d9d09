// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image source resolution
//!
//! A request names its image in one of three ways: an `image_url` to fetch,
//! an uploaded `image_buf` file, or `image_url=body` meaning the request body
//! is the image. The URL parameter wins when more than one is given.

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// `image_url` value meaning "the request body is the image"
pub const BODY_SENTINEL: &str = "body";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("No image given: pass image_url or upload image_buf")]
    MissingImageSource,

    #[error("Could not fetch image from {url}: {reason}")]
    InvalidImageUrl { url: String, reason: String },

    #[error("The image source is empty")]
    EmptyImageSource,

    #[error("Image is too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// The image-bearing parts of one request
#[derive(Debug, Clone, Default)]
pub struct ImageRequest {
    /// `image_url` query parameter, possibly the body sentinel
    pub image_url: Option<String>,
    /// Contents of the `image_buf` upload field
    pub image_buf: Option<Bytes>,
    /// Raw request body, read only when `image_url` is the body sentinel
    pub body: Option<Bytes>,
}

/// The single source a request resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Url(String),
    Upload(Bytes),
    Body(Bytes),
}

impl ImageRequest {
    /// Pick the winning source, URL parameter first
    pub fn select(self) -> Result<ImageSource, SourceError> {
        match self.image_url {
            Some(url) if url == BODY_SENTINEL => Ok(ImageSource::Body(self.body.unwrap_or_default())),
            Some(url) => Ok(ImageSource::Url(url)),
            None => self
                .image_buf
                .map(ImageSource::Upload)
                .ok_or(SourceError::MissingImageSource),
        }
    }
}

/// Turns an [`ImageRequest`] into raw image bytes
pub struct ImageResolver {
    client: Client,
    max_bytes: usize,
}

impl ImageResolver {
    /// Create a resolver whose fetches give up after `timeout` or once the
    /// remote body passes `max_bytes`
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("leukocoria-api/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;

        Ok(Self { client, max_bytes })
    }

    pub async fn resolve(&self, request: ImageRequest) -> Result<Bytes, SourceError> {
        let bytes = match request.select()? {
            ImageSource::Url(url) => self.fetch(&url).await?,
            ImageSource::Upload(bytes) => {
                debug!("Using uploaded image_buf ({} bytes)", bytes.len());
                bytes
            }
            ImageSource::Body(bytes) => {
                debug!("Using request body as image ({} bytes)", bytes.len());
                bytes
            }
        };

        if bytes.is_empty() {
            return Err(SourceError::EmptyImageSource);
        }

        Ok(bytes)
    }

    /// Fetch an image over HTTP(S); every failure, including non-2xx, is an invalid URL
    async fn fetch(&self, url: &str) -> Result<Bytes, SourceError> {
        let invalid = |reason: String| SourceError::InvalidImageUrl {
            url: url.to_string(),
            reason,
        };

        let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }

        debug!("Fetching image from: {}", url);

        let failed = |e: reqwest::Error| {
            warn!("Image fetch failed for {}: {}", url, e);
            if e.is_timeout() {
                invalid("request timed out".to_string())
            } else {
                invalid(e.to_string())
            }
        };

        let response = self.client.get(parsed).send().await.map_err(failed)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Image fetch for {} returned HTTP {}", url, status.as_u16());
            return Err(invalid(format!("HTTP {}", status.as_u16())));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes as u64 {
                warn!("Image at {} declares {} bytes, over the limit", url, length);
                return Err(SourceError::TooLarge {
                    size: usize::try_from(length).unwrap_or(usize::MAX),
                    max: self.max_bytes,
                });
            }
        }

        // Content-Length may be absent or wrong
        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(failed)?;
            let size = body.len() + chunk.len();
            if size > self.max_bytes {
                warn!("Image at {} passed {} bytes, aborting fetch", url, self.max_bytes);
                return Err(SourceError::TooLarge {
                    size,
                    max: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }
}
