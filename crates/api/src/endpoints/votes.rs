//! Vote endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use quorum_common::AppResult;
use quorum_core::VoteCounts;
use serde::{Deserialize, Serialize};

use super::comments::CommentResponse;
use crate::{middleware::AppState, response::ApiResponse};

/// Vote comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCommentRequest {
    pub user_id: String,
    pub comment_id: String,
    pub vote_type: i32,
}

/// Cast a vote on a comment, returning the updated comment.
async fn vote_comment(
    State(state): State<AppState>,
    Json(req): Json<VoteCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .vote_service
        .cast_vote(&req.user_id, &req.comment_id, req.vote_type)
        .await?;

    Ok(ApiResponse::ok(comment.into()))
}

/// Comment votes query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentVotesQuery {
    pub comment_id: String,
}

/// Get the vote tallies for a comment.
async fn get_comment_votes(
    State(state): State<AppState>,
    Query(query): Query<CommentVotesQuery>,
) -> AppResult<ApiResponse<VoteCounts>> {
    let counts = state.vote_service.get_vote_counts(&query.comment_id).await?;
    Ok(ApiResponse::ok(counts))
}

/// User vote query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVoteQuery {
    pub comment_id: String,
    pub user_id: String,
}

/// User vote response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVoteResponse {
    pub vote_type: i32,
}

/// Get a user's vote on a comment (+1, -1, or 0 when they have not voted).
async fn get_user_vote_on_comment(
    State(state): State<AppState>,
    Query(query): Query<UserVoteQuery>,
) -> AppResult<ApiResponse<UserVoteResponse>> {
    let vote_type = state
        .vote_service
        .get_user_vote(&query.user_id, &query.comment_id)
        .await?;

    Ok(ApiResponse::ok(UserVoteResponse { vote_type }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/voteComment", post(vote_comment))
        .route("/getCommentVotes", get(get_comment_votes))
        .route("/getUserVoteOnComment", get(get_user_vote_on_comment))
}
