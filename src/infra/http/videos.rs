use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use uuid::Uuid;

use crate::application::error::HttpError;
use crate::application::videos::{NewVideo, Video};

use super::AppState;
use super::middleware::JsonBody;

pub(super) fn videos_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_videos).post(create_video))
        .route("/{id}", get(get_video))
}

async fn list_videos(State(state): State<AppState>) -> Json<Vec<Video>> {
    Json(state.videos.list())
}

async fn get_video(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.videos.find(id) {
        Some(video) => Json(video).into_response(),
        None => HttpError::new(
            "infra::http::videos::get_video",
            StatusCode::NOT_FOUND,
            "Video not found",
            format!("no video with id `{id}`"),
        )
        .into_response(),
    }
}

async fn create_video(State(state): State<AppState>, request: Request<Body>) -> Response {
    const SOURCE: &str = "infra::http::videos::create_video";

    let Some(body) = request.extensions().get::<JsonBody>() else {
        return HttpError::new(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Expected a JSON body",
            "request reached the video catalog without a parsed JSON body",
        )
        .into_response();
    };

    let new = match serde_json::from_value::<NewVideo>(body.0.clone()) {
        Ok(new) => new,
        Err(err) => {
            return HttpError::from_error(
                SOURCE,
                StatusCode::BAD_REQUEST,
                "Invalid video payload",
                &err,
            )
            .into_response();
        }
    };

    if new.title.trim().is_empty() {
        return HttpError::new(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Video title must not be empty",
            "rejected a video payload with a blank title",
        )
        .into_response();
    }

    let video = state.videos.add(new);
    (StatusCode::CREATED, Json(video)).into_response()
}
