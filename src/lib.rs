// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod image_source;
pub mod pipeline;
pub mod version;
pub mod vision;

pub use api::{create_app, AppState};
pub use config::ServiceConfig;
pub use image_source::{ImageRequest, ImageResolver};
pub use pipeline::{
    DetectionPipeline, EyeInfo, EyeResult, FaceInfo, MockPipeline, PhotoInfo, ScreeningPipeline,
};
pub use vision::{DetectorSet, ObjectDetector, Rect};
