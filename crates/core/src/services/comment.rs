//! Comment service.
//!
//! The thread store. Comments are append-only: a comment with no thread
//! starts a new one at position 0, a comment naming a thread is appended
//! at the next free position. Each comment snapshots its author's poll
//! answer at creation time, so a thread permanently records which side of
//! the debate each entry came from.

use std::collections::HashMap;

use chrono::Utc;
use quorum_common::{AppError, AppResult, IdGenerator};
use quorum_db::{
    entities::comment,
    repositories::{AnswerRepository, CommentRepository, PollRepository},
};
use sea_orm::{ActiveValue, Set};

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    answer_repo: AnswerRepository,
    poll_repo: PollRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        answer_repo: AnswerRepository,
        poll_repo: PollRepository,
    ) -> Self {
        Self {
            comment_repo,
            answer_repo,
            poll_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a comment on a poll.
    ///
    /// With no `thread_id` the comment starts a new thread at position 0.
    /// With a `thread_id` it is appended to that thread at the next free
    /// position. The author must have answered the poll; their answer is
    /// snapshotted onto the comment.
    pub async fn create_comment(
        &self,
        user_id: &str,
        poll_id: &str,
        content: &str,
        thread_id: Option<&str>,
    ) -> AppResult<comment::Model> {
        if content.trim().is_empty() {
            return Err(AppError::Validation(
                "Comment content cannot be empty".to_string(),
            ));
        }

        let poll = self.poll_repo.get_by_id(poll_id).await?;

        let answer = self
            .answer_repo
            .find_by_user_and_poll(user_id, poll_id)
            .await?
            .ok_or_else(|| {
                AppError::PreconditionFailed(
                    "User has not answered this poll yet".to_string(),
                )
            })?;

        let mut model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            content: Set(content.to_string()),
            user_id: Set(user_id.to_string()),
            poll_id: Set(poll.id),
            poll_answer: Set(answer.answer),
            thread_id: ActiveValue::NotSet,
            thread_position: ActiveValue::NotSet,
            upvotes: Set(0),
            downvotes: Set(0),
            created_at: Set(Utc::now().into()),
        };

        match thread_id.filter(|t| !t.is_empty()) {
            Some(tid) => {
                if !self.comment_repo.thread_exists(tid).await? {
                    return Err(AppError::ThreadNotFound(tid.to_string()));
                }
                model.thread_id = Set(tid.to_string());
                let created = self.comment_repo.append_to_thread(model).await?;
                tracing::debug!(
                    comment_id = %created.id,
                    thread_id = %created.thread_id,
                    position = created.thread_position,
                    "Appended comment to thread"
                );
                Ok(created)
            }
            None => {
                model.thread_id = Set(self.id_gen.generate());
                let created = self.comment_repo.create_root(model).await?;
                tracing::debug!(
                    comment_id = %created.id,
                    thread_id = %created.thread_id,
                    "Started new comment thread"
                );
                Ok(created)
            }
        }
    }

    /// Get all comments on a poll, ordered by thread and position.
    pub async fn get_poll_comments(&self, poll_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_poll(poll_id).await
    }

    /// Get a poll's comments grouped into threads.
    ///
    /// Each value is the thread's comments in position order.
    pub async fn get_poll_threads(
        &self,
        poll_id: &str,
    ) -> AppResult<HashMap<String, Vec<comment::Model>>> {
        let comments = self.comment_repo.find_by_poll(poll_id).await?;

        let mut threads: HashMap<String, Vec<comment::Model>> = HashMap::new();
        for comment in comments {
            threads
                .entry(comment.thread_id.clone())
                .or_default()
                .push(comment);
        }
        Ok(threads)
    }

    /// Get a thread's comments in position order.
    pub async fn get_thread(&self, thread_id: &str) -> AppResult<Vec<comment::Model>> {
        let comments = self.comment_repo.find_by_thread(thread_id).await?;
        if comments.is_empty() {
            return Err(AppError::ThreadNotFound(thread_id.to_string()));
        }
        Ok(comments)
    }

    /// Get a user's comments, newest first.
    pub async fn list_user_comments(&self, user_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_user(user_id).await
    }
}
