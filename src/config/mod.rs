// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Defaults, then an optional TOML file, then environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::vision::MAX_IMAGE_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Detector model locations, SeetaFace funnel-structured cascade `.bin` files.
/// A role without a model finds nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub face_model_path: Option<PathBuf>,
    pub eye_model_path: Option<PathBuf>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            face_model_path: Some(PathBuf::from("./models/seeta_fd_frontal_v1.0.bin")),
            eye_model_path: None,
        }
    }
}

/// Random-result surface mounted next to the real one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Mount the mock surface (default: true)
    pub enabled: bool,
    /// Fixed RNG seed; random when unset
    pub seed: Option<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the HTTP server binds (default: 127.0.0.1:8080)
    pub listen_addr: String,
    /// Timeout for fetching `image_url` in seconds (default: 10)
    pub fetch_timeout_secs: u64,
    /// Largest accepted image in bytes (default: 10MB)
    pub max_image_bytes: usize,
    pub detector: DetectorConfig,
    pub mock: MockConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            fetch_timeout_secs: 10,
            max_image_bytes: MAX_IMAGE_SIZE,
            detector: DetectorConfig::default(),
            mock: MockConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: ServiceConfig =
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|name| env::var(name).ok())
    }

    /// Apply overrides from `lookup`; a set but unparseable value is an error
    fn apply_vars(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(addr) = lookup("API_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Some(secs) = parse_var(&lookup, "IMAGE_FETCH_TIMEOUT_SECS")? {
            self.fetch_timeout_secs = secs;
        }
        if let Some(bytes) = parse_var(&lookup, "MAX_IMAGE_BYTES")? {
            self.max_image_bytes = bytes;
        }
        if let Some(path) = lookup("FACE_MODEL_PATH") {
            self.detector.face_model_path = (!path.is_empty()).then(|| PathBuf::from(path));
        }
        if let Some(path) = lookup("EYE_MODEL_PATH") {
            self.detector.eye_model_path = (!path.is_empty()).then(|| PathBuf::from(path));
        }
        if let Some(raw) = lookup("MOCK_SURFACE_ENABLED") {
            self.mock.enabled = parse_flag(&raw).ok_or_else(|| {
                ConfigError::Invalid(format!("MOCK_SURFACE_ENABLED '{}' is not a boolean", raw))
            })?;
        }
        if let Some(seed) = parse_var(&lookup, "MOCK_SEED")? {
            self.mock.seed = Some(seed);
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "listen_addr '{}' is not a socket address",
                self.listen_addr
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.max_image_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_image_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a boolean flag as written in env vars and query strings
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn parse_var<T>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("{} '{}': {}", name, raw, e)))
        })
        .transpose()
}
