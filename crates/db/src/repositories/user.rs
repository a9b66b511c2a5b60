//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use quorum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter,
};

/// Changed identity fields to apply to a user record.
///
/// Replaces conditional attribute patching on fetched records: the caller
/// states exactly which fields changed and the update is a single atomic
/// write.
#[derive(Debug, Clone, Default)]
pub struct UserIdentityPatch {
    /// New fingerprint ID, when it changed.
    pub fingerprint_id: Option<String>,
    /// New IP address, when it changed.
    pub ip_address: Option<String>,
}

impl UserIdentityPatch {
    /// Whether the patch changes anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fingerprint_id.is_none() && self.ip_address.is_none()
    }
}

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find a user matching either the fingerprint or the IP address.
    ///
    /// At least one of the two must be provided.
    pub async fn find_by_fingerprint_or_ip(
        &self,
        fingerprint_id: Option<&str>,
        ip_address: Option<&str>,
    ) -> AppResult<Option<user::Model>> {
        if fingerprint_id.is_none() && ip_address.is_none() {
            return Err(AppError::BadRequest(
                "Either fingerprint or IP address must be provided".to_string(),
            ));
        }

        let mut condition = Condition::any();
        if let Some(fp) = fingerprint_id {
            condition = condition.add(user::Column::FingerprintId.eq(fp));
        }
        if let Some(ip) = ip_address {
            condition = condition.add(user::Column::IpAddress.eq(ip));
        }

        User::find()
            .filter(condition)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply an identity patch to a user.
    pub async fn apply_identity_patch(
        &self,
        user_id: &str,
        patch: UserIdentityPatch,
    ) -> AppResult<user::Model> {
        let user = self.get_by_id(user_id).await?;

        if patch.is_empty() {
            return Ok(user);
        }

        let mut active: user::ActiveModel = user.into();
        if let Some(fp) = patch.fingerprint_id {
            active.fingerprint_id = ActiveValue::Set(Some(fp));
        }
        if let Some(ip) = patch.ip_address {
            active.ip_address = ActiveValue::Set(Some(ip));
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Promote a user to verified/strong status.
    pub async fn set_strong_fingerprint(
        &self,
        user_id: &str,
        strong_fingerprint_id: &str,
    ) -> AppResult<user::Model> {
        let user = self.get_by_id(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.strong_fingerprint_id = ActiveValue::Set(Some(strong_fingerprint_id.to_string()));

        active
            .update(self.db.as_ref())
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

    fn create_test_user(id: &str, fingerprint_id: Option<&str>) -> user::Model {
        user::Model {
            id: id.to_string(),
            fingerprint_id: fingerprint_id.map(String::from),
            strong_fingerprint_id: None,
            ip_address: Some("127.0.0.1".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_fingerprint_or_ip_requires_input() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = UserRepository::new(db);
        let result = repo.find_by_fingerprint_or_ip(None, None).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_find_by_fingerprint() {
        let user = create_test_user("u1", Some("fp1"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo
            .find_by_fingerprint_or_ip(Some("fp1"), None)
            .await
            .unwrap();

        assert!(result.is_some());
        assert!(!result.unwrap().is_strong());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("nonexistent").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }
}
