// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod docs;
pub mod errors;
pub mod http_server;
pub mod process;
pub mod request_context;
pub mod status;

pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState, SurfaceState};
pub use process::{process_eye_handler, process_face_handler, process_photo_handler, ProcessParams};
pub use request_context::{RequestContext, REQUEST_ID_HEADER};
pub use status::{status_handler, version_handler, StatusParams};
