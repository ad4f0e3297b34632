use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use tabforge_api::config::ServerConfig;
use tabforge_api::routes;
use tabforge_api::state::AppState;
use tabforge_pipeline::{worker, BuiltinSearch, ModelSearch, Orchestrator};
use tabforge_store::{ArtifactStore, FsStore, StatusJournal};

/// A fully wired test application: the router plus the artifact root it
/// writes to (kept alive for the duration of the test).
pub struct TestApp {
    pub router: Router,
    _artifact_root: TempDir,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(artifact_root: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        artifact_root: artifact_root.path().display().to_string(),
        workers: 1,
        queue_capacity: 8,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the application with the built-in model search and one worker.
pub fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(BuiltinSearch::new()), 1, 8)
}

/// Build the application with an injected model search and an explicit
/// worker/queue shape. Mirrors the router construction in `main.rs` so
/// integration tests exercise the same middleware stack production uses.
pub fn build_test_app_with(
    search: Arc<dyn ModelSearch>,
    workers: usize,
    queue_capacity: usize,
) -> TestApp {
    let artifact_root = tempfile::tempdir().expect("create artifact tempdir");
    let mut config = test_config(&artifact_root);
    config.workers = workers;
    config.queue_capacity = queue_capacity;

    let store: Arc<dyn ArtifactStore> = Arc::new(FsStore::new(artifact_root.path()));
    let journal = Arc::new(StatusJournal::new(Arc::clone(&store)));
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&store),
        Arc::clone(&journal),
        search,
    ));
    let (queue, _pool) = worker::start(Arc::clone(&orchestrator), workers, queue_capacity);

    let state = AppState {
        store,
        journal,
        orchestrator,
        queue,
        config: Arc::new(config),
    };

    let request_id_header = HeaderName::from_static("x-request-id");

    let router = Router::new()
        .merge(routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state);

    TestApp {
        router,
        _artifact_root: artifact_root,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("build request"),
    )
    .await
    .expect("request failed")
}

/// POST a urlencoded form body.
pub async fn post_form(app: Router, uri: &str, form: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("build request"),
    )
    .await
    .expect("request failed")
}

/// POST a multipart body with a single file part named `csv`.
pub async fn post_file(
    app: Router,
    uri: &str,
    content: &str,
    content_type: &str,
    filename: &str,
) -> Response<Body> {
    let boundary = "tabforge-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"csv\"; filename=\"{filename}\"\r\n\
         Content-Type: {content_type}\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );

    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .expect("build request"),
    )
    .await
    .expect("request failed")
}

/// Upload a CSV document the happy-path way.
pub async fn post_csv(app: Router, uri: &str, content: &str) -> Response<Body> {
    post_file(app, uri, content, "text/csv", "data.csv").await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}
