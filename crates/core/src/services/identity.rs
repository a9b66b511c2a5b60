//! Identity service.
//!
//! Users are identified without accounts: a browser fingerprint request ID
//! is resolved through a third-party events API into a visitor ID and IP
//! address, which map onto a user record. "Weak" identification is this
//! fingerprint-or-IP match; a user becomes "strong" once explicitly
//! verified.

use async_trait::async_trait;
use chrono::Utc;
use quorum_common::{AppError, AppResult, FingerprintConfig, IdGenerator};
use quorum_db::{
    entities::user,
    repositories::{UserIdentityPatch, UserRepository},
};
use sea_orm::Set;
use std::sync::Arc;

/// Identity observed for a fingerprint request.
#[derive(Debug, Clone)]
pub struct FingerprintIdentity {
    pub visitor_id: Option<String>,
    pub ip_address: Option<String>,
}

/// Trait for resolving a fingerprint request ID into an identity.
///
/// This keeps the identity service independent of the HTTP transport; tests
/// supply a stub resolver.
#[async_trait]
pub trait FingerprintResolver: Send + Sync {
    /// Resolve a request ID into the observed identity.
    async fn resolve(&self, request_id: &str) -> AppResult<FingerprintIdentity>;
}

/// Shared fingerprint resolver handle.
pub type SharedFingerprintResolver = Arc<dyn FingerprintResolver>;

/// Resolver backed by the fingerprint events HTTP API.
pub struct HttpFingerprintResolver {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpFingerprintResolver {
    /// Create a resolver from the fingerprint configuration.
    #[must_use]
    pub fn new(config: &FingerprintConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl FingerprintResolver for HttpFingerprintResolver {
    async fn resolve(&self, request_id: &str) -> AppResult<FingerprintIdentity> {
        let url = format!("{}/{request_id}", self.api_url);

        let response = self
            .client
            .get(&url)
            .header("Auth-API-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("Fingerprint API request failed: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Fingerprint API returned status {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Fingerprint API returned invalid JSON: {e}"))
        })?;

        let data = &body["products"]["identification"]["data"];

        Ok(FingerprintIdentity {
            visitor_id: data["visitorId"].as_str().map(String::from),
            ip_address: data["ip"].as_str().map(String::from),
        })
    }
}

/// Identity service for business logic.
#[derive(Clone)]
pub struct IdentityService {
    user_repo: UserRepository,
    resolver: SharedFingerprintResolver,
    id_gen: IdGenerator,
}

impl IdentityService {
    /// Create a new identity service.
    #[must_use]
    pub fn new(user_repo: UserRepository, resolver: SharedFingerprintResolver) -> Self {
        Self {
            user_repo,
            resolver,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve a fingerprint request ID into a user, creating one if no
    /// existing user matches the observed fingerprint or IP.
    ///
    /// When an existing user matches but some identity field changed (new
    /// fingerprint from the same IP, or a new IP for the same fingerprint),
    /// only the changed fields are written back.
    pub async fn resolve_weak(&self, request_id: &str) -> AppResult<user::Model> {
        let identity = self.resolver.resolve(request_id).await?;

        if identity.visitor_id.is_none() && identity.ip_address.is_none() {
            return Err(AppError::ExternalService(
                "Fingerprint API returned no identity data".to_string(),
            ));
        }

        let existing = self
            .user_repo
            .find_by_fingerprint_or_ip(
                identity.visitor_id.as_deref(),
                identity.ip_address.as_deref(),
            )
            .await?;

        if let Some(user) = existing {
            let mut patch = UserIdentityPatch::default();
            if identity.visitor_id.is_some() && identity.visitor_id != user.fingerprint_id {
                patch.fingerprint_id = identity.visitor_id;
            }
            if identity.ip_address.is_some() && identity.ip_address != user.ip_address {
                patch.ip_address = identity.ip_address;
            }

            if patch.is_empty() {
                return Ok(user);
            }
            tracing::debug!(user_id = %user.id, "Updating changed identity fields");
            return self.user_repo.apply_identity_patch(&user.id, patch).await;
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            fingerprint_id: Set(identity.visitor_id),
            strong_fingerprint_id: Set(None),
            ip_address: Set(identity.ip_address),
            created_at: Set(Utc::now().into()),
        };

        let created = self.user_repo.create(model).await?;
        tracing::info!(user_id = %created.id, "Created user from fingerprint identification");
        Ok(created)
    }

    /// Promote a user to verified/strong status. Idempotent.
    pub async fn mark_strong(&self, user_id: &str) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(user_id).await?;

        if user.is_strong() {
            return Ok(user);
        }

        let strong_id = user.fingerprint_id.clone().unwrap_or_else(|| user.id.clone());
        let updated = self
            .user_repo
            .set_strong_fingerprint(&user.id, &strong_id)
            .await?;
        tracing::info!(user_id = %updated.id, "Marked user as strong");
        Ok(updated)
    }

    /// Whether a user has verified/strong status.
    pub async fn is_strong(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.user_repo.get_by_id(user_id).await?.is_strong())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    struct StubResolver {
        identity: FingerprintIdentity,
    }

    #[async_trait]
    impl FingerprintResolver for StubResolver {
        async fn resolve(&self, _request_id: &str) -> AppResult<FingerprintIdentity> {
            Ok(self.identity.clone())
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl FingerprintResolver for FailingResolver {
        async fn resolve(&self, _request_id: &str) -> AppResult<FingerprintIdentity> {
            Err(AppError::ExternalService("boom".to_string()))
        }
    }

    fn service(db: MockDatabase, resolver: SharedFingerprintResolver) -> IdentityService {
        let conn = Arc::new(db.into_connection());
        IdentityService::new(UserRepository::new(conn), resolver)
    }

    fn test_user(id: &str, fingerprint: Option<&str>, ip: Option<&str>) -> user::Model {
        user::Model {
            id: id.to_string(),
            fingerprint_id: fingerprint.map(String::from),
            strong_fingerprint_id: None,
            ip_address: ip.map(String::from),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_resolve_weak_returns_existing_user() {
        let resolver = Arc::new(StubResolver {
            identity: FingerprintIdentity {
                visitor_id: Some("fp1".to_string()),
                ip_address: Some("10.0.0.1".to_string()),
            },
        });

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u1", Some("fp1"), Some("10.0.0.1"))]]),
            resolver,
        );

        let user = service.resolve_weak("req1").await.unwrap();

        assert_eq!(user.id, "u1");
    }

    #[tokio::test]
    async fn test_resolve_weak_creates_user_when_no_match() {
        let resolver = Arc::new(StubResolver {
            identity: FingerprintIdentity {
                visitor_id: Some("fp-new".to_string()),
                ip_address: Some("10.0.0.2".to_string()),
            },
        });

        let created = test_user("u2", Some("fp-new"), Some("10.0.0.2"));

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created]]),
            resolver,
        );

        let user = service.resolve_weak("req1").await.unwrap();

        assert_eq!(user.fingerprint_id.as_deref(), Some("fp-new"));
    }

    #[tokio::test]
    async fn test_resolve_weak_patches_changed_ip() {
        let resolver = Arc::new(StubResolver {
            identity: FingerprintIdentity {
                visitor_id: Some("fp1".to_string()),
                ip_address: Some("10.0.0.9".to_string()),
            },
        });

        let existing = test_user("u1", Some("fp1"), Some("10.0.0.1"));
        let patched = test_user("u1", Some("fp1"), Some("10.0.0.9"));

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing.clone()]])
                .append_query_results([[existing]])
                .append_query_results([[patched]]),
            resolver,
        );

        let user = service.resolve_weak("req1").await.unwrap();

        assert_eq!(user.ip_address.as_deref(), Some("10.0.0.9"));
    }

    #[tokio::test]
    async fn test_resolve_weak_propagates_resolver_failure() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            Arc::new(FailingResolver),
        );

        let result = service.resolve_weak("req1").await;

        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }

    #[tokio::test]
    async fn test_mark_strong_unknown_user() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
            Arc::new(FailingResolver),
        );

        let result = service.mark_strong("nobody").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_mark_strong_is_idempotent() {
        let mut strong = test_user("u1", Some("fp1"), None);
        strong.strong_fingerprint_id = Some("fp1".to_string());

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[strong]]),
            Arc::new(FailingResolver),
        );

        let user = service.mark_strong("u1").await.unwrap();

        assert!(user.is_strong());
    }
}
