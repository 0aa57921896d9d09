// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Image source tests: URL fetch, precedence and fetch failures

use axum::{
    body::{Body, Bytes},
    http::StatusCode,
    routing::get,
    Router,
};
use leukocoria_api::vision::{DetectorSet, Rect};
use std::time::{Duration, Instant};
use tower::util::ServiceExt;

use super::common::{
    app, app_with_config, body_json, body_request, detectors, multipart_request, png_bytes,
    serve, serve_image, test_config,
};

#[tokio::test]
async fn test_process_photo_from_url() {
    let addr = serve_image(png_bytes(200, 150)).await;
    let app = app(detectors(vec![Rect::new(20, 20, 80, 80)], vec![]));
    let uri = format!("/v1.0.0/process_photo?image_url=http://{}/face.png", addr);

    let response = app.oneshot(body_request(&uri, Vec::new())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["faces"].as_array().unwrap().len(), 1);
    assert_eq!(json["faces"][0]["rect"]["width"], 80);
}

#[tokio::test]
async fn test_url_wins_over_upload() {
    let addr = serve_image(png_bytes(50, 40)).await;
    let app = app(DetectorSet::none());
    let uri = format!("/v1.0.0/process_face?image_url=http://{}/face.png", addr);

    // The upload is not an image; only the URL can make this succeed
    let request = multipart_request(&uri, "image_buf", b"not an image");
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["rect"]["width"], 50);
    assert_eq!(json["rect"]["height"], 40);
}

#[tokio::test]
async fn test_url_not_found() {
    let addr = serve_image(png_bytes(10, 10)).await;
    let app = app(DetectorSet::none());
    let uri = format!("/v1.0.0/process_photo?image_url=http://{}/missing.png", addr);

    let response = app.oneshot(body_request(&uri, Vec::new())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 1002);
}

#[tokio::test]
async fn test_url_unparseable() {
    let app = app(DetectorSet::none());
    let response = app
        .oneshot(body_request("/v1.0.0/process_photo?image_url=nowhere", Vec::new()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 1002);
}

#[tokio::test]
async fn test_url_unreachable() {
    let app = app(DetectorSet::none());
    let response = app
        .oneshot(body_request(
            "/v1.0.0/process_photo?image_url=http://127.0.0.1:9/face.png",
            Vec::new(),
        ))
        .await
        .unwrap();

    assert_eq!(body_json(response).await["code"], 1002);
}

#[tokio::test]
async fn test_mock_surface_fetches_url_too() {
    let addr = serve_image(png_bytes(10, 10)).await;
    let app = app(DetectorSet::none());
    let uri = format!("/vmock/process_eye?image_url=http://{}/face.png", addr);

    let response = app.oneshot(body_request(&uri, Vec::new())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["leuko_prob"].as_f64().unwrap() < 1.0);
}

#[tokio::test]
async fn test_url_body_over_limit() {
    let addr = serve_image(vec![0u8; 4096]).await;
    let mut config = test_config();
    config.max_image_bytes = 1024;
    let app = app_with_config(config, DetectorSet::none());
    let uri = format!("/v1.0.0/process_photo?image_url=http://{}/face.png", addr);

    let response = app.oneshot(body_request(&uri, Vec::new())).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], 1005);
}

#[tokio::test]
async fn test_url_streamed_body_over_limit() {
    // Chunked response with no Content-Length
    let addr = serve(Router::new().route(
        "/stream.png",
        get(|| async {
            let chunks = (0..64).map(|_| Ok::<_, std::io::Error>(Bytes::from(vec![0u8; 1024])));
            Body::from_stream(futures_util::stream::iter(chunks))
        }),
    ))
    .await;
    let mut config = test_config();
    config.max_image_bytes = 4096;
    let app = app_with_config(config, DetectorSet::none());
    let uri = format!("/v1.0.0/process_face?image_url=http://{}/stream.png", addr);

    let response = app.oneshot(body_request(&uri, Vec::new())).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], 1005);
}

#[tokio::test]
async fn test_url_fetch_times_out() {
    let addr = serve(Router::new().route(
        "/slow.png",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            "too late"
        }),
    ))
    .await;
    let mut config = test_config();
    config.fetch_timeout_secs = 1;
    let app = app_with_config(config, DetectorSet::none());
    let uri = format!("/v1.0.0/process_photo?image_url=http://{}/slow.png", addr);

    let started = Instant::now();
    let response = app.oneshot(body_request(&uri, Vec::new())).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], 1002);
    assert!(json["message"].as_str().unwrap().contains("timed out"));
    assert!(elapsed < Duration::from_secs(10), "took {:?}", elapsed);
}
