// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Process endpoint tests against the real surface with scripted detectors

use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::body::Body;
use leukocoria_api::vision::{DetectorSet, Rect};
use tower::util::ServiceExt; // for `oneshot`

use super::common::{
    app, app_with_config, body_json, body_request, detectors, multipart_request, png_bytes,
    test_config,
};

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

fn three_faces() -> Vec<Rect> {
    vec![
        Rect::new(10, 10, 100, 100),
        Rect::new(150, 10, 100, 100),
        Rect::new(80, 130, 100, 100),
    ]
}

#[tokio::test]
async fn test_process_photo_annotated_three_faces() {
    let app = app(detectors(three_faces(), vec![Rect::new(2, 2, 10, 10)]));
    let request = multipart_request(
        "/v1.0.0/process_photo?annotate_image=true",
        "image_buf",
        &png_bytes(300, 260),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let faces = json["faces"].as_array().unwrap();
    assert_eq!(faces.len(), 3);
    assert!(json["annotated_image"]
        .as_str()
        .unwrap()
        .starts_with(DATA_URI_PREFIX));

    for (face, expected) in faces.iter().zip(three_faces()) {
        for key in ["rect", "left_eye", "right_eye", "process_time", "annotated_image"] {
            assert!(face.get(key).is_some(), "face missing {}", key);
        }
        assert_eq!(face["rect"]["x"], expected.x);
        assert_eq!(face["rect"]["width"], expected.width);
        assert_eq!(face["process_time"], -1.0);
        assert!(face["annotated_image"]
            .as_str()
            .unwrap()
            .starts_with(DATA_URI_PREFIX));
        assert_eq!(face["left_eye"]["leuko_prob"], 0.0);
    }
}

#[tokio::test]
async fn test_process_photo_without_faces() {
    let app = app(DetectorSet::none());
    let request = body_request("/v1.0.0/process_photo?image_url=body", png_bytes(64, 48));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({"faces": []}));
}

#[tokio::test]
async fn test_process_face_body_sentinel() {
    let app = app(detectors(vec![], vec![Rect::new(1, 1, 8, 8)]));
    let request = body_request("/v1.0.0/process_face?image_url=body", png_bytes(100, 100));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["rect"], serde_json::json!({"x": 0, "y": 0, "width": 100, "height": 100}));
    // Left region starts at (10, 20), right at (50, 20)
    assert_eq!(json["left_eye"]["rect"]["x"], 11);
    assert_eq!(json["right_eye"]["rect"]["x"], 51);
    assert_eq!(json["left_eye"]["rect"]["y"], 21);
    assert!(json.get("annotated_image").is_none());
    assert!(json["left_eye"].get("annotated_image").is_none());
}

#[tokio::test]
async fn test_process_face_no_eyes_is_null() {
    let app = app(DetectorSet::none());
    let request = body_request("/v1.0.0/process_face?image_url=body", png_bytes(80, 80));

    let response = app.oneshot(request).await.unwrap();
    let json = body_json(response).await;

    assert!(json["left_eye"].is_null());
    assert!(json["right_eye"].is_null());
}

#[tokio::test]
async fn test_process_eye_upload() {
    let app = app(DetectorSet::none());
    let request = multipart_request("/v1.0.0/process_eye", "image_buf", &png_bytes(30, 20));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["rect"], serde_json::json!({"x": 0, "y": 0, "width": 30, "height": 20}));
    assert_eq!(json["leuko_prob"], 0.0);
    assert_eq!(json["process_time"], -1.0);
}

#[tokio::test]
async fn test_missing_image_source() {
    let app = app(DetectorSet::none());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1.0.0/process_photo")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 1001);
}

#[tokio::test]
async fn test_upload_under_wrong_field_is_missing() {
    let app = app(DetectorSet::none());
    let request = multipart_request("/v1.0.0/process_photo", "photo", &png_bytes(8, 8));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await["code"], 1001);
}

#[tokio::test]
async fn test_empty_upload() {
    let app = app(DetectorSet::none());
    let request = multipart_request("/v1.0.0/process_photo", "image_buf", &[]);

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 1003);
}

#[tokio::test]
async fn test_empty_body_sentinel() {
    let app = app(DetectorSet::none());
    let request = body_request("/v1.0.0/process_photo?image_url=body", Vec::new());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await["code"], 1003);
}

#[tokio::test]
async fn test_undecodable_image() {
    let app = app(DetectorSet::none());
    let request = body_request(
        "/v1.0.0/process_photo?image_url=body",
        b"definitely not an image".to_vec(),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], 1004);
    assert!(json["message"].as_str().unwrap().len() > 0);
}

#[tokio::test]
async fn test_image_too_large() {
    let mut config = test_config();
    config.max_image_bytes = 16;
    let app = app_with_config(config, DetectorSet::none());
    let request = body_request("/v1.0.0/process_photo?image_url=body", png_bytes(32, 32));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], 1005);
}

#[tokio::test]
async fn test_uploaded_image_too_large() {
    let mut config = test_config();
    config.max_image_bytes = 16;
    let app = app_with_config(config, DetectorSet::none());
    let request = multipart_request("/v1.0.0/process_face", "image_buf", &png_bytes(32, 32));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], 1005);
}

#[tokio::test]
async fn test_multipart_without_boundary() {
    let app = app(DetectorSet::none());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1.0.0/process_photo")
        .header(CONTENT_TYPE, "multipart/form-data")
        .body(Body::from("junk"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 1006);
}

#[tokio::test]
async fn test_invalid_annotate_flag() {
    let app = app(DetectorSet::none());
    let request = body_request(
        "/v1.0.0/process_photo?image_url=body&annotate_image=perhaps",
        png_bytes(8, 8),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 1007);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = app(DetectorSet::none());
    let request = body_request("/v2.0.0/process_photo", Vec::new());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], 404);
    assert!(json["message"].as_str().unwrap().contains("/v2.0.0/process_photo"));
}
