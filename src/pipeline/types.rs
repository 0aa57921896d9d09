// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Screening report types: photo → faces → eyes

use serde::{Deserialize, Serialize};

use crate::vision::Rect;

/// Leukocoria probability reported until a real model exists
pub const LEUKO_PROB_STUB: f64 = 0.0;

/// Processing time reported until timing is measured per object
pub const PROCESS_TIME_STUB: f64 = -1.0;

/// Report for one eye
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeInfo {
    /// Eye box in its parent's coordinate frame
    pub rect: Rect,
    /// Probability of leukocoria in this eye (in [0, 1])
    pub leuko_prob: f64,
    /// Time in milliseconds taken to build this object
    pub process_time: f64,
    /// JPEG data URI of the annotated eye, only when annotation was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated_image: Option<String>,
}

/// Outcome of searching one eye region.
///
/// `NotFound` goes over the wire as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EyeResult {
    Found(EyeInfo),
    NotFound,
}

impl EyeResult {
    pub fn is_found(&self) -> bool {
        matches!(self, EyeResult::Found(_))
    }

    pub fn as_found(&self) -> Option<&EyeInfo> {
        match self {
            EyeResult::Found(eye) => Some(eye),
            EyeResult::NotFound => None,
        }
    }
}

impl From<Option<EyeInfo>> for EyeResult {
    fn from(eye: Option<EyeInfo>) -> Self {
        eye.map(EyeResult::Found).unwrap_or(EyeResult::NotFound)
    }
}

/// Report for one face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceInfo {
    /// Face box in its parent's coordinate frame
    pub rect: Rect,
    pub left_eye: EyeResult,
    pub right_eye: EyeResult,
    /// Time in milliseconds taken to build this object
    pub process_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated_image: Option<String>,
}

/// Report for a whole photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoInfo {
    /// Faces in detector order
    pub faces: Vec<FaceInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated_image: Option<String>,
}
