// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Random-result pipeline for the mock surface

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use super::types::{EyeInfo, EyeResult, FaceInfo, PhotoInfo};
use super::ScreeningPipeline;
use crate::vision::{encode_for_embedding, DecodedImage, ImageError, Rect};

const MAX_COORD: u32 = 1000;
const MAX_SIDE: u32 = 500;
const MAX_FACES: usize = 5;
const MAX_PROCESS_TIME_MS: f64 = 1000.0;
const EYE_FOUND_PROB: f64 = 0.8;

/// Produces well-formed reports with random contents and no image analysis.
///
/// When annotation is requested the submitted image is re-encoded and
/// attached at the top level only.
pub struct MockPipeline {
    rng: Mutex<StdRng>,
}

impl MockPipeline {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }
}

fn random_rect(rng: &mut StdRng) -> Rect {
    Rect::new(
        rng.gen_range(0..=MAX_COORD),
        rng.gen_range(0..=MAX_COORD),
        rng.gen_range(1..=MAX_SIDE),
        rng.gen_range(1..=MAX_SIDE),
    )
}

fn random_eye(rng: &mut StdRng) -> EyeInfo {
    EyeInfo {
        rect: random_rect(rng),
        leuko_prob: rng.gen::<f64>(),
        process_time: rng.gen_range(0.0..MAX_PROCESS_TIME_MS),
        annotated_image: None,
    }
}

fn random_eye_result(rng: &mut StdRng) -> EyeResult {
    if rng.gen_bool(EYE_FOUND_PROB) {
        EyeResult::Found(random_eye(rng))
    } else {
        EyeResult::NotFound
    }
}

fn random_face(rng: &mut StdRng) -> FaceInfo {
    FaceInfo {
        rect: random_rect(rng),
        left_eye: random_eye_result(rng),
        right_eye: random_eye_result(rng),
        process_time: rng.gen_range(0.0..MAX_PROCESS_TIME_MS),
        annotated_image: None,
    }
}

fn annotation(image: &DecodedImage, annotate: bool) -> Result<Option<String>, ImageError> {
    annotate
        .then(|| encode_for_embedding(&image.rgb))
        .transpose()
}

impl ScreeningPipeline for MockPipeline {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn process_eye(&self, image: &DecodedImage, annotate: bool) -> Result<EyeInfo, ImageError> {
        let mut eye = self.with_rng(random_eye);
        eye.annotated_image = annotation(image, annotate)?;
        Ok(eye)
    }

    fn process_face(&self, image: &DecodedImage, annotate: bool) -> Result<FaceInfo, ImageError> {
        let mut face = self.with_rng(random_face);
        face.annotated_image = annotation(image, annotate)?;
        Ok(face)
    }

    fn process_photo(
        &self,
        image: &DecodedImage,
        annotate: bool,
    ) -> Result<PhotoInfo, ImageError> {
        let faces: Vec<FaceInfo> = self.with_rng(|rng| {
            let count = rng.gen_range(0..=MAX_FACES);
            (0..count).map(|_| random_face(rng)).collect()
        });

        Ok(PhotoInfo {
            faces,
            annotated_image: annotation(image, annotate)?,
        })
    }
}
