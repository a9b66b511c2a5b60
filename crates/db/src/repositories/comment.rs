//! Comment repository.
//!
//! Threads are implicit: a thread is the set of comments sharing a
//! `thread_id`. Appending a reply is a read-max-then-insert step, so it
//! runs inside a transaction and retries when the (`thread_id`,
//! `thread_position`) unique index rejects a losing concurrent writer.

use std::sync::Arc;

use crate::entities::{Comment, comment};
use quorum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait,
};

/// Bounded retries for a lost position race.
const MAX_POSITION_RETRIES: u32 = 3;

#[derive(FromQueryResult)]
struct MaxPosition {
    max_position: Option<i32>,
}

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound(id.to_string()))
    }

    /// Check whether any comment carries the given thread ID.
    pub async fn thread_exists(&self, thread_id: &str) -> AppResult<bool> {
        let count = Comment::find()
            .filter(comment::Column::ThreadId.eq(thread_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Get a thread's comments ordered by position.
    pub async fn find_by_thread(&self, thread_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::ThreadId.eq(thread_id))
            .order_by_asc(comment::Column::ThreadPosition)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all comments on a poll, grouped-friendly ordering
    /// (thread, then position).
    pub async fn find_by_poll(&self, poll_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::PollId.eq(poll_id))
            .order_by_asc(comment::Column::ThreadId)
            .order_by_asc(comment::Column::ThreadPosition)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user's comments, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::UserId.eq(user_id))
            .order_by_desc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a thread root (position 0).
    pub async fn create_root(&self, mut model: comment::ActiveModel) -> AppResult<comment::Model> {
        model.thread_position = ActiveValue::Set(0);
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append a reply to an existing thread.
    ///
    /// Assigns `thread_position` = current max + 1 inside a transaction.
    /// Two concurrent replies can still read the same max; the unique
    /// (`thread_id`, `thread_position`) index rejects the loser, which is
    /// retried with a fresh max.
    pub async fn append_to_thread(
        &self,
        model: comment::ActiveModel,
    ) -> AppResult<comment::Model> {
        let ActiveValue::Set(thread_id) = model.thread_id.clone() else {
            return Err(AppError::Internal(
                "append_to_thread requires a thread id".to_string(),
            ));
        };

        for _ in 0..MAX_POSITION_RETRIES {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            let next = Self::next_position(&txn, &thread_id).await?;

            let mut attempt = model.clone();
            attempt.thread_position = ActiveValue::Set(next);

            match attempt.insert(&txn).await {
                Ok(created) => {
                    txn.commit()
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))?;
                    return Ok(created);
                }
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    txn.rollback().await.ok();
                    tracing::debug!(thread_id = %thread_id, position = next, "Lost position race, retrying");
                }
                Err(e) => {
                    txn.rollback().await.ok();
                    return Err(AppError::Database(e.to_string()));
                }
            }
        }

        Err(AppError::Conflict(
            "Thread is receiving too many concurrent replies".to_string(),
        ))
    }

    async fn next_position<C: ConnectionTrait>(conn: &C, thread_id: &str) -> AppResult<i32> {
        let row = Comment::find()
            .filter(comment::Column::ThreadId.eq(thread_id))
            .select_only()
            .column_as(comment::Column::ThreadPosition.max(), "max_position")
            .into_model::<MaxPosition>()
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row
            .and_then(|r| r.max_position)
            .map_or(0, |max| max + 1))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_comment(
        id: &str,
        thread_id: &str,
        position: i32,
        poll_answer: &str,
    ) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            content: "Test comment".to_string(),
            user_id: "user1".to_string(),
            poll_id: "poll1".to_string(),
            poll_answer: poll_answer.to_string(),
            thread_id: thread_id.to_string(),
            thread_position: position,
            upvotes: 0,
            downvotes: 0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let comment = create_test_comment("c1", "t1", 0, "yes");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment.clone()]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.find_by_id("c1").await.unwrap();

        assert!(result.is_some());
        assert!(result.unwrap().is_root());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.get_by_id("nonexistent").await;

        assert!(matches!(result, Err(AppError::CommentNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_thread_ordering() {
        let c0 = create_test_comment("c0", "t1", 0, "yes");
        let c1 = create_test_comment("c1", "t1", 1, "no");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[c0, c1]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.find_by_thread("t1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].thread_position, 0);
        assert_eq!(result[1].thread_position, 1);
    }
}
