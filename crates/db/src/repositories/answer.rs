//! Answer repository.

use std::sync::Arc;

use crate::entities::{Answer, answer};
use quorum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    SqlErr,
};

/// Answer repository for database operations.
#[derive(Clone)]
pub struct AnswerRepository {
    db: Arc<DatabaseConnection>,
}

impl AnswerRepository {
    /// Create a new answer repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an answer by user and poll.
    pub async fn find_by_user_and_poll(
        &self,
        user_id: &str,
        poll_id: &str,
    ) -> AppResult<Option<answer::Model>> {
        Answer::find()
            .filter(answer::Column::UserId.eq(user_id))
            .filter(answer::Column::PollId.eq(poll_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has answered a poll.
    pub async fn has_answered(&self, user_id: &str, poll_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_poll(user_id, poll_id)
            .await?
            .is_some())
    }

    /// Create a new answer.
    ///
    /// The unique (`user_id`, `poll_id`) index is the backstop against a
    /// concurrent duplicate submission; a lost race surfaces as `Conflict`.
    pub async fn create(&self, model: answer::ActiveModel) -> AppResult<answer::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("User has already answered this poll".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Get a user's answers, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<answer::Model>> {
        Answer::find()
            .filter(answer::Column::UserId.eq(user_id))
            .order_by_desc(answer::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a poll's answers, newest first.
    pub async fn find_by_poll(&self, poll_id: &str) -> AppResult<Vec<answer::Model>> {
        Answer::find()
            .filter(answer::Column::PollId.eq(poll_id))
            .order_by_desc(answer::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_answer(id: &str, user_id: &str, poll_id: &str, answer_str: &str) -> answer::Model {
        answer::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            poll_id: poll_id.to_string(),
            answer: answer_str.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_and_poll_found() {
        let answer = create_test_answer("a1", "user1", "poll1", "yes");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[answer.clone()]])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        let result = repo.find_by_user_and_poll("user1", "poll1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().answer, "yes");
    }

    #[tokio::test]
    async fn test_has_answered_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<answer::Model>::new()])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        let result = repo.has_answered("user1", "poll1").await.unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let a1 = create_test_answer("a1", "user1", "poll1", "yes");
        let a2 = create_test_answer("a2", "user1", "poll2", "no");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a1, a2]])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        let result = repo.find_by_user("user1").await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
