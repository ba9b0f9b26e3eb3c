use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::error;

use crate::application::error::HttpError;
use crate::infra::assets::asset_response;
use crate::presentation::views::{
    IndexContext, IndexTemplate, LayoutContext, render_template_response,
};

use super::AppState;

pub(super) fn index_routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}

async fn index(State(state): State<AppState>) -> Response {
    let content = IndexContext {
        welcome: format!("Welcome to {}", state.site.title),
    };
    render_template_response(
        IndexTemplate {
            view: LayoutContext::new(state.site.clone(), content),
        },
        StatusCode::OK,
    )
}

pub(super) async fn serve_public(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Response {
    const SOURCE: &str = "infra::http::public::serve_public";

    match state.assets.read(&path).await {
        Ok(bytes) => asset_response(&path, bytes),
        Err(err) if err.is_not_found() => HttpError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            "Not Found",
            format!("no static asset at `{path}`"),
        )
        .into_response(),
        Err(err) => {
            error!(
                target = SOURCE,
                path = %path,
                error = %err,
                "failed to read static asset"
            );
            HttpError::from_error(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read static asset",
                &err,
            )
            .into_response()
        }
    }
}

pub(super) async fn favicon(State(state): State<AppState>) -> Response {
    const SOURCE: &str = "infra::http::public::favicon";

    match state.assets.read("favicon.ico").await {
        Ok(bytes) => asset_response("favicon.ico", bytes),
        Err(err) if err.is_not_found() => HttpError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            "Not Found",
            "no favicon.ico in the public directory",
        )
        .into_response(),
        Err(err) => HttpError::from_error(
            SOURCE,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to read favicon",
            &err,
        )
        .into_response(),
    }
}

/// Reached only when every earlier stage declined the request.
pub(super) async fn not_found(request: Request<Body>) -> Response {
    HttpError::new(
        "infra::http::public::not_found",
        StatusCode::NOT_FOUND,
        "Not Found",
        format!("no route matched `{}`", request.uri().path()),
    )
    .into_response()
}
