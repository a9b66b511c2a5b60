//! Answer endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use quorum_common::AppResult;
use quorum_db::entities::answer;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Answer response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub id: String,
    pub user_id: String,
    pub poll_id: String,
    pub answer: String,
    pub created_at: String,
}

impl From<answer::Model> for AnswerResponse {
    fn from(answer: answer::Model) -> Self {
        Self {
            id: answer.id,
            user_id: answer.user_id,
            poll_id: answer.poll_id,
            answer: answer.answer,
            created_at: answer.created_at.to_rfc3339(),
        }
    }
}

/// Answer poll request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPollRequest {
    pub user_id: String,
    pub poll_id: String,
    pub answer: String,
}

/// Record a user's answer to a poll.
async fn answer_poll(
    State(state): State<AppState>,
    Json(req): Json<AnswerPollRequest>,
) -> AppResult<ApiResponse<AnswerResponse>> {
    let answer = state
        .answer_service
        .submit_answer(&req.user_id, &req.poll_id, &req.answer)
        .await?;

    Ok(ApiResponse::ok(answer.into()))
}

/// User answers query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswersQuery {
    pub user_id: String,
}

/// Get a user's answers, newest first.
async fn get_user_answers(
    State(state): State<AppState>,
    Query(query): Query<UserAnswersQuery>,
) -> AppResult<ApiResponse<Vec<AnswerResponse>>> {
    let answers = state.answer_service.list_by_user(&query.user_id).await?;
    Ok(ApiResponse::ok(
        answers.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/answerPoll", post(answer_poll))
        .route("/getUserAnswers", get(get_user_answers))
}
