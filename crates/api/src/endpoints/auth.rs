//! Identity endpoints.
//!
//! Users have no accounts; a browser fingerprint request ID resolves into
//! a user token. These routes back that identification flow.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use quorum_common::AppResult;
use quorum_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// User response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: String,
    pub is_strong: bool,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            is_strong: user.is_strong(),
            user_id: user.id,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Weak identification query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakIdentificationQuery {
    pub request_id: String,
}

/// Resolve a fingerprint request ID into a user, creating one on first
/// contact.
async fn get_user_id_weak(
    State(state): State<AppState>,
    Query(query): Query<WeakIdentificationQuery>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.identity_service.resolve_weak(&query.request_id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Mark strong query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkStrongQuery {
    pub user_id: String,
}

/// Promote a user to verified/strong status.
async fn mark_user_strong(
    State(state): State<AppState>,
    Query(query): Query<MarkStrongQuery>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.identity_service.mark_strong(&query.user_id).await?;
    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/getUserIdWeak", get(get_user_id_weak))
        .route("/markUserStrong", get(mark_user_strong))
}
