// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cascade detector capability and the face/eye detector pair
//!
//! Detectors are loaded once at startup and shared read-only between requests.
//! A detection call is a single synchronous pass that returns candidate boxes
//! in the backend's emission order, or an empty list when nothing is found.

use image::GrayImage;
use std::path::Path;
use std::sync::Arc;

use super::geometry::Rect;
use super::rustface_backend::RustfaceDetector;
use crate::config::DetectorConfig;

/// Multi-scale scan tuning for a cascade classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeParams {
    /// Image pyramid step between scan scales
    pub scale_factor: f64,
    /// Smallest box considered, in pixels (square)
    pub min_size: u32,
    /// Overlapping candidates needed to keep a box
    pub min_neighbors: u32,
}

/// Face search over a whole photo
pub const FACE_PARAMS: CascadeParams = CascadeParams {
    scale_factor: 1.1,
    min_size: 45,
    min_neighbors: 3,
};

/// Eye search inside one eye region of a face
pub const EYE_PARAMS: CascadeParams = CascadeParams {
    scale_factor: 1.05,
    min_size: 15,
    min_neighbors: 3,
};

/// Pluggable object detection backend.
///
/// Implementations must be safe to call concurrently from several requests.
pub trait ObjectDetector: Send + Sync {
    /// Detect objects in a grayscale image, boxes in that image's coordinates
    fn detect(&self, gray: &GrayImage) -> Vec<Rect>;

    /// Short backend name for status output
    fn name(&self) -> &'static str;
}

/// Detector for a role that has no model configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDetector;

impl ObjectDetector for NullDetector {
    fn detect(&self, _gray: &GrayImage) -> Vec<Rect> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Error raised while loading a detector model at startup
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("Failed to load {role} model from {path}: {reason}")]
    ModelLoad {
        role: &'static str,
        path: String,
        reason: String,
    },
}

/// The face and eye detectors used by the pipeline
#[derive(Clone)]
pub struct DetectorSet {
    faces: Arc<dyn ObjectDetector>,
    eyes: Arc<dyn ObjectDetector>,
}

impl DetectorSet {
    pub fn new(faces: Arc<dyn ObjectDetector>, eyes: Arc<dyn ObjectDetector>) -> Self {
        Self { faces, eyes }
    }

    /// Detectors that never find anything
    pub fn none() -> Self {
        Self::new(Arc::new(NullDetector), Arc::new(NullDetector))
    }

    /// Load both detectors from their model files
    pub fn load(config: &DetectorConfig) -> Result<Self, DetectorError> {
        let faces = load_role("face", config.face_model_path.as_deref(), FACE_PARAMS)?;
        let eyes = load_role("eye", config.eye_model_path.as_deref(), EYE_PARAMS)?;
        Ok(Self { faces, eyes })
    }

    pub fn detect_faces(&self, gray: &GrayImage) -> Vec<Rect> {
        self.faces.detect(gray)
    }

    pub fn detect_eyes(&self, gray_region: &GrayImage) -> Vec<Rect> {
        self.eyes.detect(gray_region)
    }

    /// Backend names, face detector first
    pub fn backend_names(&self) -> (&'static str, &'static str) {
        (self.faces.name(), self.eyes.name())
    }
}

fn load_role(
    role: &'static str,
    path: Option<&Path>,
    params: CascadeParams,
) -> Result<Arc<dyn ObjectDetector>, DetectorError> {
    let Some(path) = path else {
        tracing::warn!("⚠️ No {} model configured, {} detection disabled", role, role);
        return Ok(Arc::new(NullDetector));
    };

    let detector = RustfaceDetector::from_file(path, params).map_err(|reason| {
        DetectorError::ModelLoad {
            role,
            path: path.display().to_string(),
            reason,
        }
    })?;

    tracing::info!("✅ {} detector loaded from {}", role, path.display());
    Ok(Arc::new(detector))
}
