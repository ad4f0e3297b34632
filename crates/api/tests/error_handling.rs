//! Integration tests for the error surface and middleware stack.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_form};

#[tokio::test]
async fn health_check_reports_ok() {
    let app = build_test_app();

    let response = get(app.router.clone(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = build_test_app();

    let response = get(app.router.clone(), "/").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn unknown_token_queries_return_404_with_token() {
    let app = build_test_app();

    for uri in [
        "/check-status/deadbeef00000000",
        "/evaluate-model/deadbeef00000000",
        "/model-metadata/deadbeef00000000",
    ] {
        let response = get(app.router.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");

        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["token"], "deadbeef00000000");
    }
}

#[tokio::test]
async fn start_training_without_dataset_returns_404() {
    let app = build_test_app();

    let response = post_form(
        app.router.clone(),
        "/start-training/nodata0000000000",
        "target=label&task=classification&iterations=15",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn start_training_rejects_unknown_task() {
    let app = build_test_app();

    common::post_csv(
        app.router.clone(),
        "/upload-dataset/args0000000000aa",
        "x,y\n1,2\n3,4\n",
    )
    .await;

    let response = post_form(
        app.router.clone(),
        "/start-training/args0000000000aa",
        "target=y&task=clustering&iterations=15",
    )
    .await;
    // Rejected by form deserialization before the handler runs.
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn start_training_rejects_zero_iterations_and_missing_target() {
    let app = build_test_app();

    common::post_csv(
        app.router.clone(),
        "/upload-dataset/args0000000000bb",
        "x,y\n1,2\n3,4\n",
    )
    .await;

    let response = post_form(
        app.router.clone(),
        "/start-training/args0000000000bb",
        "target=y&task=regression&iterations=0",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let response = post_form(
        app.router.clone(),
        "/start-training/args0000000000bb",
        "target=missing&task=regression&iterations=15",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    // A rejected start leaves the job in its uploaded state.
    let status = body_json(get(app.router.clone(), "/check-status/args0000000000bb").await).await;
    assert_eq!(status["data"]["state"], "created");
    assert_eq!(status["data"]["events"].as_array().unwrap().len(), 1);
}
