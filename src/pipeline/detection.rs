// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Face and eye detection pipeline

use image::{imageops, GrayImage};
use tracing::debug;

use super::types::{EyeInfo, EyeResult, FaceInfo, PhotoInfo, LEUKO_PROB_STUB, PROCESS_TIME_STUB};
use super::ScreeningPipeline;
use crate::vision::{
    encode_for_embedding, eye_regions, Canvas, DecodedImage, DetectorSet, ImageError, Rect,
    BOX_THICKNESS, EYE_COLOR, FACE_COLOR,
};

/// Runs face detection over a photo, then eye detection inside each face.
///
/// Faces are processed one at a time in detector order, left eye before right.
/// Annotation works on a single copy of the input, made only when requested.
pub struct DetectionPipeline {
    detectors: DetectorSet,
}

impl DetectionPipeline {
    pub fn new(detectors: DetectorSet) -> Self {
        Self { detectors }
    }

    pub fn detectors(&self) -> &DetectorSet {
        &self.detectors
    }

    fn eye_info(rect: Rect, canvas: Option<&Canvas<'_>>) -> Result<EyeInfo, ImageError> {
        Ok(EyeInfo {
            rect,
            leuko_prob: LEUKO_PROB_STUB,
            process_time: PROCESS_TIME_STUB,
            annotated_image: encode_canvas(canvas)?,
        })
    }

    /// Search one eye region of a face; only the first hit counts.
    fn find_eye(
        &self,
        gray_face: &GrayImage,
        region: Rect,
        canvas: Option<&mut Canvas<'_>>,
    ) -> Result<EyeResult, ImageError> {
        let Some(region) = region.clamp_to(gray_face.width(), gray_face.height()) else {
            return Ok(EyeResult::NotFound);
        };

        let gray_region =
            imageops::crop_imm(gray_face, region.x, region.y, region.width, region.height)
                .to_image();
        let hit = self
            .detectors
            .detect_eyes(&gray_region)
            .into_iter()
            .find_map(|r| r.clamp_to(region.width, region.height));

        let Some(hit) = hit else {
            return Ok(EyeResult::NotFound);
        };

        // region-local -> face-local
        let rect = hit.translate(region.x, region.y);
        let eye = match canvas {
            Some(canvas) => {
                let eye_canvas = canvas.annotate(rect, EYE_COLOR, BOX_THICKNESS);
                Self::eye_info(rect, Some(&eye_canvas))?
            }
            None => Self::eye_info(rect, None)?,
        };

        Ok(EyeResult::Found(eye))
    }

    fn face_info(
        &self,
        gray_face: &GrayImage,
        mut canvas: Option<Canvas<'_>>,
    ) -> Result<FaceInfo, ImageError> {
        let face = Rect::at_origin(gray_face.width(), gray_face.height());
        let (left_region, right_region) = eye_regions(&face);

        let left_eye = self.find_eye(gray_face, left_region, canvas.as_mut())?;
        let right_eye = self.find_eye(gray_face, right_region, canvas.as_mut())?;

        debug!(
            "Face {}x{}: left eye {}, right eye {}",
            face.width,
            face.height,
            if left_eye.is_found() { "found" } else { "not found" },
            if right_eye.is_found() { "found" } else { "not found" },
        );

        Ok(FaceInfo {
            rect: face,
            left_eye,
            right_eye,
            process_time: PROCESS_TIME_STUB,
            annotated_image: encode_canvas(canvas.as_ref())?,
        })
    }
}

fn encode_canvas(canvas: Option<&Canvas<'_>>) -> Result<Option<String>, ImageError> {
    canvas
        .map(|c| encode_for_embedding(&c.to_image()))
        .transpose()
}

impl ScreeningPipeline for DetectionPipeline {
    fn name(&self) -> &'static str {
        "detection"
    }

    fn process_eye(&self, image: &DecodedImage, annotate: bool) -> Result<EyeInfo, ImageError> {
        let rect = Rect::at_origin(image.width(), image.height());
        let annotated_image = if annotate {
            Some(encode_for_embedding(&image.rgb)?)
        } else {
            None
        };

        Ok(EyeInfo {
            rect,
            leuko_prob: LEUKO_PROB_STUB,
            process_time: PROCESS_TIME_STUB,
            annotated_image,
        })
    }

    fn process_face(&self, image: &DecodedImage, annotate: bool) -> Result<FaceInfo, ImageError> {
        let mut working = annotate.then(|| image.rgb.clone());
        let canvas = working.as_mut().map(Canvas::new);
        self.face_info(&image.gray, canvas)
    }

    fn process_photo(
        &self,
        image: &DecodedImage,
        annotate: bool,
    ) -> Result<PhotoInfo, ImageError> {
        let detections = self.detectors.detect_faces(&image.gray);
        debug!(
            "Detected {} face(s) in {}x{} photo",
            detections.len(),
            image.width(),
            image.height()
        );

        let mut working = annotate.then(|| image.rgb.clone());
        let mut canvas = working.as_mut().map(Canvas::new);

        let mut faces = Vec::with_capacity(detections.len());
        for detected in detections {
            let Some(rect) = detected.clamp_to(image.width(), image.height()) else {
                continue;
            };

            let gray_face =
                imageops::crop_imm(&image.gray, rect.x, rect.y, rect.width, rect.height)
                    .to_image();
            let face_canvas = canvas
                .as_mut()
                .map(|c| c.annotate(rect, FACE_COLOR, BOX_THICKNESS));

            let mut face = self.face_info(&gray_face, face_canvas)?;
            face.rect = rect;
            faces.push(face);
        }

        Ok(PhotoInfo {
            faces,
            annotated_image: encode_canvas(canvas.as_ref())?,
        })
    }
}
