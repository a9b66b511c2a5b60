//! Vote repository.

use std::sync::Arc;

use crate::entities::{Comment, Vote, comment, vote};
use quorum_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, SqlErr, TransactionTrait,
};

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a vote by user and comment.
    pub async fn find_by_user_and_comment(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::CommentId.eq(comment_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count votes on a comment.
    pub async fn count_by_comment(&self, comment_id: &str) -> AppResult<u64> {
        Vote::find()
            .filter(vote::Column::CommentId.eq(comment_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a vote and bump the matching comment counter, atomically.
    ///
    /// Both writes commit as a unit: the vote row and exactly one counter
    /// increment. A concurrent identical vote loses on the unique
    /// (`user_id`, `comment_id`) index and the whole transaction rolls
    /// back, surfacing as `Conflict` for the caller to degrade into the
    /// idempotent no-op path.
    pub async fn insert_and_apply(&self, model: vote::ActiveModel) -> AppResult<comment::Model> {
        let (ActiveValue::Set(comment_id), ActiveValue::Set(vote_type)) =
            (model.comment_id.clone(), model.vote_type.clone())
        else {
            return Err(AppError::Internal(
                "insert_and_apply requires comment id and vote type".to_string(),
            ));
        };

        let counter = if vote_type > 0 {
            comment::Column::Upvotes
        } else {
            comment::Column::Downvotes
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Err(e) = model.insert(&txn).await {
            txn.rollback().await.ok();
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                return Err(AppError::Conflict(
                    "User has already voted on this comment".to_string(),
                ));
            }
            return Err(AppError::Database(e.to_string()));
        }

        Comment::update_many()
            .col_expr(counter, Expr::col(counter).add(1))
            .filter(comment::Column::Id.eq(comment_id.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = Comment::find_by_id(comment_id.as_str())
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::CommentNotFound(comment_id.clone()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_vote(id: &str, user_id: &str, comment_id: &str, vote_type: i32) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            comment_id: comment_id.to_string(),
            vote_type,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_and_comment_found() {
        let vote = create_test_vote("v1", "user1", "c1", 1);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote.clone()]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.find_by_user_and_comment("user1", "c1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().vote_type, 1);
    }

    #[tokio::test]
    async fn test_find_by_user_and_comment_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<vote::Model>::new()])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.find_by_user_and_comment("user1", "c1").await.unwrap();

        assert!(result.is_none());
    }
}
