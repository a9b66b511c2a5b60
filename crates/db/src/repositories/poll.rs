//! Poll repository.

use std::sync::Arc;

use crate::entities::{Answer, Poll, answer, poll};
use chrono::Utc;
use quorum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait,
};

/// Poll repository for database operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a poll by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<poll::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PollNotFound(id.to_string()))
    }

    /// Create a new poll.
    pub async fn create(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all polls, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .order_by_desc(poll::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the polls a user has not answered yet.
    ///
    /// Closed polls are excluded; results are newest-created first.
    pub async fn find_unanswered_for_user(&self, user_id: &str) -> AppResult<Vec<poll::Model>> {
        let answered = Answer::find()
            .select_only()
            .column(answer::Column::PollId)
            .filter(answer::Column::UserId.eq(user_id))
            .into_query();

        Poll::find()
            .filter(poll::Column::Id.not_in_subquery(answered))
            .filter(
                Condition::any()
                    .add(poll::Column::ClosedAt.is_null())
                    .add(poll::Column::ClosedAt.gt(Utc::now())),
            )
            .order_by_desc(poll::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Close a poll by setting its close time to now.
    pub async fn close(&self, id: &str) -> AppResult<poll::Model> {
        let poll = self.get_by_id(id).await?;

        let mut active: poll::ActiveModel = poll.into();
        active.closed_at = ActiveValue::Set(Some(Utc::now().into()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
