//! API integration tests.
//!
//! These tests drive the router over a mock database connection.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use quorum_api::{middleware::AppState, router as api_router};
use quorum_common::AppResult;
use quorum_core::{
    AnswerService, CommentService, DiscussionService, FingerprintIdentity, FingerprintResolver,
    IdentityService, PollService, VoteService,
};
use quorum_db::entities::{answer, poll, user};
use quorum_db::repositories::{
    AnswerRepository, CommentRepository, PollRepository, UserRepository, VoteRepository,
};
use sea_orm::{DatabaseBackend, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

struct StubResolver;

#[async_trait]
impl FingerprintResolver for StubResolver {
    async fn resolve(&self, _request_id: &str) -> AppResult<FingerprintIdentity> {
        Ok(FingerprintIdentity {
            visitor_id: Some("fp-test".to_string()),
            ip_address: Some("10.0.0.1".to_string()),
        })
    }
}

/// Build a router over a mock database.
fn test_router(db: MockDatabase) -> Router {
    let conn = Arc::new(db.into_connection());

    let poll_repo = PollRepository::new(Arc::clone(&conn));
    let answer_repo = AnswerRepository::new(Arc::clone(&conn));
    let comment_repo = CommentRepository::new(Arc::clone(&conn));
    let vote_repo = VoteRepository::new(Arc::clone(&conn));
    let user_repo = UserRepository::new(Arc::clone(&conn));

    let state = AppState {
        poll_service: PollService::new(poll_repo.clone()),
        answer_service: AnswerService::new(
            answer_repo.clone(),
            poll_repo.clone(),
            user_repo.clone(),
        ),
        comment_service: CommentService::new(
            comment_repo.clone(),
            answer_repo.clone(),
            poll_repo.clone(),
        ),
        discussion_service: DiscussionService::new(comment_repo.clone(), answer_repo, poll_repo),
        vote_service: VoteService::new(vote_repo, comment_repo),
        identity_service: IdentityService::new(user_repo, Arc::new(StubResolver)),
    };

    api_router().with_state(state)
}

fn test_poll(id: &str) -> poll::Model {
    poll::Model {
        id: id.to_string(),
        title: "Test poll".to_string(),
        description: "A poll".to_string(),
        options: serde_json::json!(["yes", "no"]),
        require_verification: false,
        is_actionable: false,
        created_at: Utc::now().into(),
        closed_at: None,
    }
}

#[tokio::test]
async fn test_get_all_polls_returns_data() {
    let router = test_router(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_poll("p1"), test_poll("p2")]]),
    );

    let response = router
        .oneshot(
            Request::builder()
                .uri("/getAllPolls")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["options"][0], "yes");
}

#[tokio::test]
async fn test_get_poll_not_found() {
    let router = test_router(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<poll::Model>::new()]),
    );

    let response = router
        .oneshot(
            Request::builder()
                .uri("/getPoll?pollId=missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vote_comment_rejects_invalid_vote_type() {
    let router = test_router(MockDatabase::new(DatabaseBackend::Postgres));

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/voteComment")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"userId":"u1","commentId":"c1","voteType":2}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_answer_poll_duplicate_conflict() {
    let user = user::Model {
        id: "u1".to_string(),
        fingerprint_id: Some("fp1".to_string()),
        strong_fingerprint_id: None,
        ip_address: None,
        created_at: Utc::now().into(),
    };
    let existing = answer::Model {
        id: "a1".to_string(),
        user_id: "u1".to_string(),
        poll_id: "p1".to_string(),
        answer: "no".to_string(),
        created_at: Utc::now().into(),
    };

    let router = test_router(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .append_query_results([[test_poll("p1")]])
            .append_query_results([[existing]]),
    );

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/answerPoll")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"userId":"u1","pollId":"p1","answer":"yes"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_comment_without_answer_precondition_failed() {
    let router = test_router(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_poll("p1")]])
            .append_query_results([Vec::<answer::Model>::new()]),
    );

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/createComment")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"userId":"u1","pollId":"p1","content":"Hello"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn test_get_user_id_weak_creates_user() {
    let created = user::Model {
        id: "u-new".to_string(),
        fingerprint_id: Some("fp-test".to_string()),
        strong_fingerprint_id: None,
        ip_address: Some("10.0.0.1".to_string()),
        created_at: Utc::now().into(),
    };

    let router = test_router(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([[created]]),
    );

    let response = router
        .oneshot(
            Request::builder()
                .uri("/auth/getUserIdWeak?requestId=req1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["userId"], "u-new");
    assert_eq!(body["data"]["isStrong"], false);
}
