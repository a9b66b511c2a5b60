//! Comment and thread endpoints.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use quorum_common::AppResult;
use quorum_db::entities::comment;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub poll_id: String,
    pub poll_answer: String,
    pub thread_id: String,
    pub thread_position: i32,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(comment: comment::Model) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            user_id: comment.user_id,
            poll_id: comment.poll_id,
            poll_answer: comment.poll_answer,
            thread_id: comment.thread_id,
            thread_position: comment.thread_position,
            upvotes: comment.upvotes,
            downvotes: comment.downvotes,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

fn to_responses(comments: Vec<comment::Model>) -> Vec<CommentResponse> {
    comments.into_iter().map(Into::into).collect()
}

/// Create comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub user_id: String,
    pub poll_id: String,
    pub content: String,
    pub thread_id: Option<String>,
}

/// Create a comment, starting a new thread or replying to an existing one.
async fn create_comment(
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .create_comment(
            &req.user_id,
            &req.poll_id,
            &req.content,
            req.thread_id.as_deref(),
        )
        .await?;

    Ok(ApiResponse::ok(comment.into()))
}

/// Poll comments query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollCommentsQuery {
    pub poll_id: String,
}

/// Get all comments on a poll.
async fn get_poll_comments(
    State(state): State<AppState>,
    Query(query): Query<PollCommentsQuery>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state.comment_service.get_poll_comments(&query.poll_id).await?;
    Ok(ApiResponse::ok(to_responses(comments)))
}

/// Get a poll's comments grouped into threads.
async fn get_poll_threads(
    State(state): State<AppState>,
    Query(query): Query<PollCommentsQuery>,
) -> AppResult<ApiResponse<HashMap<String, Vec<CommentResponse>>>> {
    let threads = state.comment_service.get_poll_threads(&query.poll_id).await?;
    Ok(ApiResponse::ok(
        threads
            .into_iter()
            .map(|(thread_id, comments)| (thread_id, to_responses(comments)))
            .collect(),
    ))
}

/// Thread query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadQuery {
    pub thread_id: String,
}

/// Get a thread's comments in position order.
async fn get_thread(
    State(state): State<AppState>,
    Query(query): Query<ThreadQuery>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state.comment_service.get_thread(&query.thread_id).await?;
    Ok(ApiResponse::ok(to_responses(comments)))
}

/// User comments query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCommentsQuery {
    pub user_id: String,
}

/// Get a user's comments, newest first.
async fn get_user_comments(
    State(state): State<AppState>,
    Query(query): Query<UserCommentsQuery>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state.comment_service.list_user_comments(&query.user_id).await?;
    Ok(ApiResponse::ok(to_responses(comments)))
}

/// Least-replied opposing thread query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeastRepliedThreadQuery {
    pub poll_id: String,
    pub user_id: String,
}

/// Get the least-replied thread arguing against the user's answer.
async fn get_least_replied_thread_for_user(
    State(state): State<AppState>,
    Query(query): Query<LeastRepliedThreadQuery>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let thread = state
        .discussion_service
        .find_least_replied_opposing_thread(&query.poll_id, &query.user_id)
        .await?;

    Ok(ApiResponse::ok(to_responses(thread)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/createComment", post(create_comment))
        .route("/getPollComments", get(get_poll_comments))
        .route("/getPollThreads", get(get_poll_threads))
        .route("/getThread", get(get_thread))
        .route("/getUserComments", get(get_user_comments))
        .route(
            "/getLeastRepliedThreadForUser",
            get(get_least_replied_thread_for_user),
        )
}
