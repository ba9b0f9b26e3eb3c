//! HTTP composition root: application state, middleware chain, and the
//! three mounted route groups.

mod middleware;
mod public;
mod users;
mod videos;

pub use middleware::{FormBody, JsonBody, RequestCookies, RequestContext};

use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};

use crate::application::users::UserDirectory;
use crate::application::videos::VideoCatalog;
use crate::config::{AppEnv, Settings};
use crate::infra::assets::StaticAssets;
use crate::presentation::views::SiteView;

/// Application state injected into handlers. Built once at startup and
/// immutable afterwards (the video catalog guards its own interior state).
#[derive(Clone)]
pub struct AppState {
    pub env: AppEnv,
    pub site: SiteView,
    pub assets: Arc<StaticAssets>,
    pub users: Arc<UserDirectory>,
    pub videos: Arc<VideoCatalog>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            env: settings.runtime.environment,
            site: SiteView {
                title: settings.site.title.clone(),
                environment: settings.runtime.environment.as_str(),
            },
            assets: Arc::new(StaticAssets::new(settings.assets.directory.clone())),
            users: Arc::new(UserDirectory::seeded()),
            videos: Arc::new(VideoCatalog::seeded()),
            max_body_bytes: settings.http.max_body_bytes_usize(),
        }
    }
}

/// The three route collaborators mounted by the composition root. The
/// composition only promises prefix delegation, so tests can substitute a
/// stub for any group.
pub struct RouteGroups {
    pub index: Router<AppState>,
    pub users: Router<AppState>,
    pub videos: Router<AppState>,
}

impl Default for RouteGroups {
    fn default() -> Self {
        Self {
            index: public::index_routes(),
            users: users::users_routes(),
            videos: videos::videos_routes(),
        }
    }
}

/// Assemble the full pipeline with the default route groups.
pub fn build_router(state: AppState) -> Router {
    build_router_with(RouteGroups::default(), state)
}

/// Assemble the pipeline. Layer order is the contract: request id →
/// request logging → error rendering → JSON parse → form parse → cookie
/// parse → static assets / route groups → not-found fallback.
pub fn build_router_with(groups: RouteGroups, state: AppState) -> Router {
    let static_routes = Router::new()
        .route("/public/{*path}", get(public::serve_public))
        .route("/favicon.ico", get(public::favicon));

    Router::new()
        .merge(groups.index)
        .nest("/users", groups.users)
        .nest("/api/videos", groups.videos)
        .merge(static_routes)
        .fallback(public::not_found)
        .layer(from_fn(middleware::parse_cookies))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::parse_form_body,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::parse_json_body,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::render_error_pages,
        ))
        .layer(from_fn(middleware::log_requests))
        .layer(from_fn(middleware::set_request_context))
        .with_state(state)
}
