// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Machine-readable API description

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::http_server::AppState;
use crate::version::VERSION;

/// GET /docs - Endpoints and object schemas
pub async fn docs_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(api_description(&state.surfaces()))
}

pub fn api_description(surfaces: &[&str]) -> Value {
    let mut paths = serde_json::Map::new();
    for version in surfaces {
        for (name, summary, schema) in [
            (
                "process_eye",
                "Process a cropped image of one eye and return info about the eye",
                "EyeInfo",
            ),
            (
                "process_face",
                "Process a cropped image of one face and return info about the face. \
                 Does not search for faces: the image must be exactly one pre-cropped face",
                "FaceInfo",
            ),
            (
                "process_photo",
                "Find faces in a photo and return info about each of them",
                "PhotoInfo",
            ),
        ] {
            paths.insert(
                format!("/{}/{}", version, name),
                json!({
                    "post": {
                        "summary": summary,
                        "tags": [version],
                        "parameters": process_parameters(),
                        "responses": {
                            "200": {"schema": {"$ref": format!("#/definitions/{}", schema)}},
                            "default": {"description": "Unexpected error",
                                        "schema": {"$ref": "#/definitions/Error"}}
                        }
                    }
                }),
            );
        }
        paths.insert(
            format!("/{}/status", version),
            json!({
                "get": {
                    "summary": "Service status",
                    "tags": [version],
                    "parameters": [
                        {"name": "include_keys", "in": "query", "type": "array",
                         "items": {"type": "string"}, "collectionFormat": "multi"},
                        {"name": "exclude_keys", "in": "query", "type": "array",
                         "items": {"type": "string"}, "collectionFormat": "multi"}
                    ]
                }
            }),
        );
    }

    json!({
        "swagger": "2.0",
        "info": {"title": "Leukocoria screening API", "version": VERSION},
        "paths": paths,
        "definitions": definitions(),
    })
}

fn process_parameters() -> Value {
    json!([
        {"name": "image_url", "in": "query", "type": "string", "required": false,
         "description": "The URL to the image that should be processed, or 'body' to read the request body"},
        {"name": "image_buf", "in": "formData", "type": "file", "required": false,
         "description": "The image file, used when image_url is not given"},
        {"name": "annotate_image", "in": "query", "type": "boolean", "default": false,
         "description": "Attach annotated JPEG images as data URIs"}
    ])
}

fn definitions() -> Value {
    json!({
        "Rect": {
            "type": "object",
            "required": ["x", "y", "width", "height"],
            "properties": {
                "x": {"type": "integer"},
                "y": {"type": "integer"},
                "width": {"type": "integer"},
                "height": {"type": "integer"}
            }
        },
        "EyeInfo": {
            "type": "object",
            "required": ["rect", "leuko_prob", "process_time"],
            "properties": {
                "rect": {"$ref": "#/definitions/Rect",
                         "description": "This eye's rectangle within its parent"},
                "leuko_prob": {"type": "number",
                               "description": "The probability of leukocoria in this eye (in [0, 1])"},
                "process_time": {"type": "number",
                                 "description": "The processing time in milliseconds taken to build this object"},
                "annotated_image": {"type": "string",
                                    "description": "JPEG data URI, present only when annotation was requested"}
            }
        },
        "FaceInfo": {
            "type": "object",
            "required": ["rect", "left_eye", "right_eye", "process_time"],
            "properties": {
                "rect": {"$ref": "#/definitions/Rect",
                         "description": "This face's rectangle within the image"},
                "left_eye": {"$ref": "#/definitions/EyeInfo",
                             "description": "Info about the left eye, null when not found"},
                "right_eye": {"$ref": "#/definitions/EyeInfo",
                              "description": "Info about the right eye, null when not found"},
                "process_time": {"type": "number"},
                "annotated_image": {"type": "string"}
            }
        },
        "PhotoInfo": {
            "type": "object",
            "required": ["faces"],
            "properties": {
                "faces": {"type": "array", "items": {"$ref": "#/definitions/FaceInfo"}},
                "annotated_image": {"type": "string"}
            }
        },
        "Error": {
            "type": "object",
            "required": ["code", "message"],
            "properties": {
                "code": {"type": "integer"},
                "message": {"type": "string"}
            }
        }
    })
}
