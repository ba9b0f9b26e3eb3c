use std::{collections::HashSet, path::PathBuf, sync::Arc};

use axum::{body::Body, http::Request};
use brezza::{
    application::{users::UserDirectory, videos::VideoCatalog},
    config::AppEnv,
    infra::{
        assets::StaticAssets,
        http::{AppState, build_router},
    },
    presentation::views::SiteView,
};
use metrics_util::debugging::DebuggingRecorder;
use tower::ServiceExt;

fn state() -> AppState {
    AppState {
        env: AppEnv::Development,
        site: SiteView {
            title: "Brezza".to_string(),
            environment: AppEnv::Development.as_str(),
        },
        assets: Arc::new(StaticAssets::new(PathBuf::from("public"))),
        users: Arc::new(UserDirectory::seeded()),
        videos: Arc::new(VideoCatalog::seeded()),
        max_body_bytes: 1024 * 1024,
    }
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn request_pipeline_emits_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let app = build_router(state());
    let _ = app.oneshot(get_request("/")).await.expect("response");

    let app = build_router(state());
    let _ = app
        .oneshot(get_request("/definitely-missing"))
        .await
        .expect("response");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(key, _, _, _)| key.key().name().to_string())
        .collect();

    assert!(names.contains("brezza_http_requests_total"));
    assert!(names.contains("brezza_http_request_duration_ms"));
    assert!(names.contains("brezza_http_errors_total"));
}
