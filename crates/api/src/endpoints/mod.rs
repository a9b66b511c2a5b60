//! API endpoints.

mod answers;
mod auth;
mod comments;
mod polls;
mod votes;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(polls::router())
        .merge(answers::router())
        .merge(comments::router())
        .merge(votes::router())
        .nest("/auth", auth::router())
}
