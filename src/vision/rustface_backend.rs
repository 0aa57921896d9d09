// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::io::Cursor;
use std::path::Path;

use image::GrayImage;
use tracing::warn;

use super::detector::{CascadeParams, ObjectDetector};
use super::geometry::Rect;

/// Smallest window the SeetaFace funnel cascade accepts
const MIN_WINDOW: u32 = 20;

/// Detector backed by the `rustface` crate (SeetaFace funnel-structured cascade).
///
/// The model is parsed once; each call builds a short-lived detector from a
/// clone of it, so the struct itself is shared read-only across requests.
pub struct RustfaceDetector {
    model: rustface::Model,
    params: CascadeParams,
}

impl RustfaceDetector {
    pub fn from_bytes(model_data: &[u8], params: CascadeParams) -> Result<Self, String> {
        let model = rustface::read_model(Cursor::new(model_data)).map_err(|e| e.to_string())?;
        for gap in unsupported_params(&params) {
            warn!("⚠️ rustface cannot honour {}", gap);
        }
        Ok(Self { model, params })
    }

    pub fn from_file(path: &Path, params: CascadeParams) -> Result<Self, String> {
        let data = std::fs::read(path).map_err(|e| e.to_string())?;
        Self::from_bytes(&data, params)
    }
}

impl ObjectDetector for RustfaceDetector {
    fn detect(&self, gray: &GrayImage) -> Vec<Rect> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.params.min_size.max(MIN_WINDOW));
        detector.set_score_thresh(2.0);
        // rustface shrinks by this factor per pyramid level
        detector.set_pyramid_scale_factor((1.0 / self.params.scale_factor) as f32);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));

        faces
            .iter()
            .filter_map(|face| {
                let bbox = face.bbox();
                clip_box(bbox.x(), bbox.y(), bbox.width(), bbox.height(), width, height)
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "rustface"
    }
}

/// Tuning values this backend applies differently from a classic cascade
fn unsupported_params(params: &CascadeParams) -> Vec<String> {
    let mut gaps = Vec::new();
    if params.min_size < MIN_WINDOW {
        gaps.push(format!(
            "min_size {}, raised to {}",
            params.min_size, MIN_WINDOW
        ));
    }
    if params.min_neighbors > 0 {
        gaps.push(format!(
            "min_neighbors {}, no neighbour grouping (score threshold and NMS apply)",
            params.min_neighbors
        ));
    }
    gaps
}

/// Clip a signed detector box to the image, dropping boxes with no overlap
fn clip_box(x: i32, y: i32, w: u32, h: u32, image_w: u32, image_h: u32) -> Option<Rect> {
    let left = x.max(0) as i64;
    let top = y.max(0) as i64;
    let right = (x as i64 + w as i64).min(image_w as i64);
    let bottom = (y as i64 + h as i64).min(image_h as i64);

    if right <= left || bottom <= top {
        return None;
    }

    Some(Rect::new(
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}
