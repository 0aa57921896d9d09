// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision building blocks for face and eye screening
//!
//! This module provides:
//! - Box geometry and eye search regions
//! - Cascade detectors for faces and eyes (rustface)
//! - Rectangle annotation and JPEG data-URI encoding

pub mod annotator;
pub mod detector;
pub mod geometry;
pub mod image_utils;
pub mod rustface_backend;

pub use annotator::{Canvas, BOX_THICKNESS, EYE_COLOR, FACE_COLOR};
pub use detector::{
    CascadeParams, DetectorError, DetectorSet, NullDetector, ObjectDetector, EYE_PARAMS,
    FACE_PARAMS,
};
pub use geometry::{eye_regions, Rect};
pub use image_utils::{
    decode_image_bytes, detect_format, encode_for_embedding, DecodedImage, ImageError,
    DATA_URI_PREFIX, MAX_IMAGE_SIZE,
};
