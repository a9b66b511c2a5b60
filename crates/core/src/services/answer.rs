//! Answer service.
//!
//! The answer ledger: one immutable answer per (user, poll) pair. A
//! duplicate submission is a hard `Conflict`, both at the application
//! pre-check and at the unique index underneath it.

use chrono::Utc;
use quorum_common::{AppError, AppResult, IdGenerator};
use quorum_db::{
    entities::answer,
    repositories::{AnswerRepository, PollRepository, UserRepository},
};
use sea_orm::Set;

/// Answer service for business logic.
#[derive(Clone)]
pub struct AnswerService {
    answer_repo: AnswerRepository,
    poll_repo: PollRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl AnswerService {
    /// Create a new answer service.
    #[must_use]
    pub const fn new(
        answer_repo: AnswerRepository,
        poll_repo: PollRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            answer_repo,
            poll_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a user's answer to a poll.
    pub async fn submit_answer(
        &self,
        user_id: &str,
        poll_id: &str,
        answer: &str,
    ) -> AppResult<answer::Model> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        if poll.require_verification && !user.is_strong() {
            return Err(AppError::Unauthorized);
        }

        let options = poll
            .option_labels()
            .map_err(|e| AppError::Internal(format!("Poll options are not a string array: {e}")))?;
        if !options.iter().any(|o| o == answer) {
            return Err(AppError::Validation(format!(
                "'{answer}' is not one of the poll's options"
            )));
        }

        if self.answer_repo.has_answered(user_id, poll_id).await? {
            return Err(AppError::Conflict(
                "User has already answered this poll".to_string(),
            ));
        }

        let model = answer::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            poll_id: Set(poll_id.to_string()),
            answer: Set(answer.to_string()),
            created_at: Set(Utc::now().into()),
        };

        let created = self.answer_repo.create(model).await?;
        tracing::info!(user_id = %user_id, poll_id = %poll_id, "Recorded poll answer");
        Ok(created)
    }

    /// Get a user's answer to a poll, if any.
    pub async fn get_answer(
        &self,
        user_id: &str,
        poll_id: &str,
    ) -> AppResult<Option<answer::Model>> {
        self.answer_repo.find_by_user_and_poll(user_id, poll_id).await
    }

    /// Get a user's answers, newest first.
    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<answer::Model>> {
        self.answer_repo.find_by_user(user_id).await
    }
}
