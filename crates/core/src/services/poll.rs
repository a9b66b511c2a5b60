//! Poll service.

use chrono::{DateTime, Utc};
use quorum_common::{AppError, AppResult, IdGenerator};
use quorum_db::{entities::poll, repositories::PollRepository};
use sea_orm::Set;
use serde_json::json;

/// Input for creating a poll.
pub struct CreatePollInput {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    pub require_verification: bool,
    pub is_actionable: bool,
    pub closes_at: Option<DateTime<Utc>>,
}

/// Poll service for business logic.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
    id_gen: IdGenerator,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub const fn new(poll_repo: PollRepository) -> Self {
        Self {
            poll_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a poll.
    pub async fn create_poll(&self, input: CreatePollInput) -> AppResult<poll::Model> {
        if input.title.trim().is_empty() {
            return Err(AppError::Validation(
                "Poll title cannot be empty".to_string(),
            ));
        }
        if input.options.len() < 2 {
            return Err(AppError::Validation(
                "Poll must have at least 2 options".to_string(),
            ));
        }
        for option in &input.options {
            if option.trim().is_empty() {
                return Err(AppError::Validation(
                    "Poll options cannot be empty".to_string(),
                ));
            }
        }

        let model = poll::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            description: Set(input.description),
            options: Set(json!(input.options)),
            require_verification: Set(input.require_verification),
            is_actionable: Set(input.is_actionable),
            created_at: Set(Utc::now().into()),
            closed_at: Set(input.closes_at.map(Into::into)),
        };

        let poll = self.poll_repo.create(model).await?;
        tracing::info!(poll_id = %poll.id, "Created poll");
        Ok(poll)
    }

    /// Get a poll by ID.
    pub async fn get_poll(&self, id: &str) -> AppResult<poll::Model> {
        self.poll_repo.get_by_id(id).await
    }

    /// Get all polls, newest first.
    pub async fn list_polls(&self) -> AppResult<Vec<poll::Model>> {
        self.poll_repo.find_all().await
    }

    /// Close a poll.
    pub async fn close_poll(&self, id: &str) -> AppResult<poll::Model> {
        let poll = self.poll_repo.close(id).await?;
        tracing::info!(poll_id = %poll.id, "Closed poll");
        Ok(poll)
    }

    /// Get the open polls a user has not answered yet.
    pub async fn list_unanswered(&self, user_id: &str) -> AppResult<Vec<poll::Model>> {
        self.poll_repo.find_unanswered_for_user(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: MockDatabase) -> PollService {
        let conn = Arc::new(db.into_connection());
        PollService::new(PollRepository::new(conn))
    }

    fn input(options: &[&str]) -> CreatePollInput {
        CreatePollInput {
            title: "Test poll".to_string(),
            description: "A poll".to_string(),
            options: options.iter().map(ToString::to_string).collect(),
            require_verification: false,
            is_actionable: false,
            closes_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_poll_requires_two_options() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.create_poll(input(&["only one"])).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_poll_rejects_blank_option() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.create_poll(input(&["yes", "   "])).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_poll_rejects_blank_title() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let mut bad = input(&["yes", "no"]);
        bad.title = "  ".to_string();
        let result = service.create_poll(bad).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_poll_success() {
        let created = poll::Model {
            id: "p1".to_string(),
            title: "Test poll".to_string(),
            description: "A poll".to_string(),
            options: json!(["yes", "no"]),
            require_verification: false,
            is_actionable: false,
            created_at: Utc::now().into(),
            closed_at: None,
        };

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[created]]),
        );

        let poll = service.create_poll(input(&["yes", "no"])).await.unwrap();

        assert_eq!(poll.option_labels().unwrap(), vec!["yes", "no"]);
    }
}
