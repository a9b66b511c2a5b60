//! Poll endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use quorum_common::{AppError, AppResult};
use quorum_core::CreatePollInput;
use quorum_db::entities::poll;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Poll response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    pub require_verification: bool,
    pub is_actionable: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
}

impl TryFrom<poll::Model> for PollResponse {
    type Error = AppError;

    fn try_from(poll: poll::Model) -> Result<Self, Self::Error> {
        let options = poll
            .option_labels()
            .map_err(|e| AppError::Internal(format!("Poll options are not a string array: {e}")))?;
        Ok(Self {
            id: poll.id,
            title: poll.title,
            description: poll.description,
            options,
            require_verification: poll.require_verification,
            is_actionable: poll.is_actionable,
            created_at: poll.created_at.to_rfc3339(),
            closed_at: poll.closed_at.map(|c| c.to_rfc3339()),
        })
    }
}

fn to_responses(polls: Vec<poll::Model>) -> AppResult<Vec<PollResponse>> {
    polls.into_iter().map(PollResponse::try_from).collect()
}

/// Create poll request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub require_verification: bool,
    #[serde(default)]
    pub is_actionable: bool,
    pub closes_at: Option<DateTime<Utc>>,
}

/// Create a poll.
async fn create_poll(
    State(state): State<AppState>,
    Json(req): Json<CreatePollRequest>,
) -> AppResult<ApiResponse<PollResponse>> {
    let poll = state
        .poll_service
        .create_poll(CreatePollInput {
            title: req.title,
            description: req.description,
            options: req.options,
            require_verification: req.require_verification,
            is_actionable: req.is_actionable,
            closes_at: req.closes_at,
        })
        .await?;

    Ok(ApiResponse::ok(poll.try_into()?))
}

/// Get poll query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPollQuery {
    pub poll_id: String,
}

/// Get a poll by ID.
async fn get_poll(
    State(state): State<AppState>,
    Query(query): Query<GetPollQuery>,
) -> AppResult<ApiResponse<PollResponse>> {
    let poll = state.poll_service.get_poll(&query.poll_id).await?;
    Ok(ApiResponse::ok(poll.try_into()?))
}

/// Get all polls.
async fn get_all_polls(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<PollResponse>>> {
    let polls = state.poll_service.list_polls().await?;
    Ok(ApiResponse::ok(to_responses(polls)?))
}

/// Close poll request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePollRequest {
    pub poll_id: String,
}

/// Close a poll.
async fn close_poll(
    State(state): State<AppState>,
    Json(req): Json<ClosePollRequest>,
) -> AppResult<ApiResponse<PollResponse>> {
    let poll = state.poll_service.close_poll(&req.poll_id).await?;
    Ok(ApiResponse::ok(poll.try_into()?))
}

/// Unanswered polls query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnansweredPollsQuery {
    pub user_id: String,
}

/// Get the open polls a user has not answered yet.
async fn get_unanswered_polls(
    State(state): State<AppState>,
    Query(query): Query<UnansweredPollsQuery>,
) -> AppResult<ApiResponse<Vec<PollResponse>>> {
    let polls = state.poll_service.list_unanswered(&query.user_id).await?;
    Ok(ApiResponse::ok(to_responses(polls)?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/createPoll", post(create_poll))
        .route("/getPoll", get(get_poll))
        .route("/getAllPolls", get(get_all_polls))
        .route("/closePoll", post(close_poll))
        .route("/getUnansweredPolls", get(get_unanswered_polls))
}
