// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process endpoints (eye, face, photo)

pub mod handler;
pub mod request;

pub use handler::{process_eye_handler, process_face_handler, process_photo_handler};
pub use request::{read_image_request, ProcessParams, UPLOAD_FIELD};
