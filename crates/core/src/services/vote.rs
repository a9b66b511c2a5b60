//! Vote service.
//!
//! First vote is sticky: once a user has voted on a comment, casting again
//! is an idempotent no-op returning the current comment state. The counters
//! on the comment are denormalized tallies maintained in the same
//! transaction as the vote insert.

use chrono::Utc;
use quorum_common::{AppError, AppResult, IdGenerator};
use quorum_db::{
    entities::{comment, vote},
    repositories::{CommentRepository, VoteRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Vote tallies for a comment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCounts {
    pub upvotes: i32,
    pub downvotes: i32,
    pub score: i32,
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository, comment_repo: CommentRepository) -> Self {
        Self {
            vote_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast a vote on a comment, returning the updated comment.
    ///
    /// `vote_type` must be +1 or -1. A repeat vote by the same user does
    /// not change anything and returns the comment as-is.
    pub async fn cast_vote(
        &self,
        user_id: &str,
        comment_id: &str,
        vote_type: i32,
    ) -> AppResult<comment::Model> {
        if vote_type != vote::UPVOTE && vote_type != vote::DOWNVOTE {
            return Err(AppError::Validation(
                "Vote type must be +1 or -1".to_string(),
            ));
        }

        let comment = self.comment_repo.get_by_id(comment_id).await?;

        if self
            .vote_repo
            .find_by_user_and_comment(user_id, comment_id)
            .await?
            .is_some()
        {
            tracing::debug!(user_id = %user_id, comment_id = %comment_id, "Repeat vote ignored");
            return Ok(comment);
        }

        let model = vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            comment_id: Set(comment_id.to_string()),
            vote_type: Set(vote_type),
            created_at: Set(Utc::now().into()),
        };

        match self.vote_repo.insert_and_apply(model).await {
            Ok(updated) => Ok(updated),
            // Lost a race against an identical concurrent vote; the first
            // one stands.
            Err(AppError::Conflict(_)) => self.comment_repo.get_by_id(comment_id).await,
            Err(e) => Err(e),
        }
    }

    /// Get a user's vote on a comment: +1, -1, or 0 when they have not
    /// voted.
    pub async fn get_user_vote(&self, user_id: &str, comment_id: &str) -> AppResult<i32> {
        Ok(self
            .vote_repo
            .find_by_user_and_comment(user_id, comment_id)
            .await?
            .map_or(0, |v| v.vote_type))
    }

    /// Get the vote tallies for a comment.
    pub async fn get_vote_counts(&self, comment_id: &str) -> AppResult<VoteCounts> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        Ok(VoteCounts {
            upvotes: comment.upvotes,
            downvotes: comment.downvotes,
            score: comment.upvotes - comment.downvotes,
        })
    }
}
