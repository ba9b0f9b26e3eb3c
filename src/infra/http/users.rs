use axum::{Router, extract::State, http::StatusCode, response::Response, routing::get};

use crate::presentation::views::{
    LayoutContext, UserCard, UsersContext, UsersTemplate, render_template_response,
};

use super::AppState;

pub(super) fn users_routes() -> Router<AppState> {
    Router::new().route("/", get(list_users))
}

async fn list_users(State(state): State<AppState>) -> Response {
    let content = UsersContext {
        users: state.users.list().iter().map(UserCard::from).collect(),
    };
    render_template_response(
        UsersTemplate {
            view: LayoutContext::new(state.site.clone(), content),
        },
        StatusCode::OK,
    )
}
