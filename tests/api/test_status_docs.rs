// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Root, version, status and docs endpoints

use axum::http::StatusCode;
use leukocoria_api::{api::REQUEST_ID_HEADER, vision::DetectorSet};
use tower::util::ServiceExt;

use super::common::{app, body_bytes, body_json, get_request};

#[tokio::test]
async fn test_root_hello_world() {
    let response = app(DetectorSet::none())
        .oneshot(get_request("/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], b"hello world!");
}

#[tokio::test]
async fn test_version_root() {
    for uri in ["/v1.0.0", "/v1.0.0/"] {
        let response = app(DetectorSet::none())
            .oneshot(get_request(uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert_eq!(&body_bytes(response).await[..], b"v1.0.0");
    }
}

#[tokio::test]
async fn test_status_full() {
    let response = app(DetectorSet::none())
        .oneshot(get_request("/v1.0.0/status"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["version"], "v1.0.0");
    assert_eq!(json["pipeline"], "detection");
    assert_eq!(json["face_detector"], "none");
    assert_eq!(json["surfaces"], serde_json::json!(["v1.0.0", "vmock"]));
    assert!(json["uptime_secs"].is_u64());
}

#[tokio::test]
async fn test_status_include_repeated_keys() {
    let response = app(DetectorSet::none())
        .oneshot(get_request(
            "/vmock/status?include_keys=version&include_keys=pipeline",
        ))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(
        json,
        serde_json::json!({"version": "vmock", "pipeline": "mock"})
    );
}

#[tokio::test]
async fn test_status_exclude_keys() {
    let response = app(DetectorSet::none())
        .oneshot(get_request(
            "/v1.0.0/status?exclude_keys=uptime_secs&exclude_keys=build",
        ))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert!(json.get("uptime_secs").is_none());
    assert!(json.get("build").is_none());
    assert!(json.get("version").is_some());
}

#[tokio::test]
async fn test_status_unknown_key() {
    let response = app(DetectorSet::none())
        .oneshot(get_request("/v1.0.0/status?include_keys=colour"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 1007);
}

#[tokio::test]
async fn test_docs_describes_schemas() {
    let response = app(DetectorSet::none())
        .oneshot(get_request("/docs"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    for schema in ["Rect", "EyeInfo", "FaceInfo", "PhotoInfo", "Error"] {
        assert!(json["definitions"][schema].is_object(), "{}", schema);
    }
    assert!(json["paths"]["/vmock/process_photo"].is_object());
}

#[tokio::test]
async fn test_request_id_header() {
    let response = app(DetectorSet::none())
        .oneshot(get_request("/"))
        .await
        .unwrap();

    let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
    assert_eq!(id.to_str().unwrap().len(), 36);
}
