// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Screening pipelines
//!
//! [`ScreeningPipeline`] is the capability the HTTP surfaces serve. The real
//! [`DetectionPipeline`] runs the cascade detectors; [`MockPipeline`] returns
//! random reports of the same shape for exercising clients.

pub mod detection;
pub mod mock;
pub mod types;

pub use detection::DetectionPipeline;
pub use mock::MockPipeline;
pub use types::{EyeInfo, EyeResult, FaceInfo, PhotoInfo, LEUKO_PROB_STUB, PROCESS_TIME_STUB};

use crate::vision::{DecodedImage, ImageError};

/// Builds screening reports from decoded images.
///
/// Calls are synchronous and CPU-bound; callers on an async runtime should
/// run them on a blocking thread. The only failure is encoding annotated
/// output.
pub trait ScreeningPipeline: Send + Sync {
    /// Surface name, used in logs and status output
    fn name(&self) -> &'static str;

    /// Report for an image that already is one eye
    fn process_eye(&self, image: &DecodedImage, annotate: bool) -> Result<EyeInfo, ImageError>;

    /// Report for an image that already is one face
    fn process_face(&self, image: &DecodedImage, annotate: bool) -> Result<FaceInfo, ImageError>;

    /// Find every face in a photo and report on each
    fn process_photo(&self, image: &DecodedImage, annotate: bool)
        -> Result<PhotoInfo, ImageError>;
}
