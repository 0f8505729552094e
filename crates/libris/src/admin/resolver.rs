//! Role resolution against the admin registry.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use super::repository::{AdminRegistry, RegistryError};
use crate::auth::Role;

/// Classifies an external account id as `User` or `Admin`.
///
/// Every call goes to the registry; nothing is cached. Lookups are bounded
/// by `timeout`, and a timeout is reported as a registry failure.
#[derive(Clone)]
pub struct RoleResolver {
    registry: Arc<dyn AdminRegistry>,
    timeout: Duration,
}

impl RoleResolver {
    pub fn new(registry: Arc<dyn AdminRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Resolve the role for `uid`. An id with no registry entry is a user.
    #[instrument(skip(self))]
    pub async fn resolve_role(&self, uid: &str) -> Result<Role, RegistryError> {
        let record = tokio::time::timeout(self.timeout, self.registry.find_by_uid(uid))
            .await
            .map_err(|_| RegistryError::Timeout(self.timeout))??;

        let role = match record {
            Some(record) if record.role == Role::Admin => Role::Admin,
            _ => Role::User,
        };

        debug!(role = %role, "resolved role");
        Ok(role)
    }
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::AdminRecord;
    use async_trait::async_trait;
    use chrono::Utc;

    struct FixedRegistry(Option<Role>);

    #[async_trait]
    impl AdminRegistry for FixedRegistry {
        async fn find_by_uid(&self, uid: &str) -> Result<Option<AdminRecord>, RegistryError> {
            Ok(self.0.map(|role| AdminRecord {
                uid: uid.to_string(),
                email: "someone@x.com".to_string(),
                role,
                created_at: Utc::now(),
            }))
        }
    }

    struct StalledRegistry;

    #[async_trait]
    impl AdminRegistry for StalledRegistry {
        async fn find_by_uid(&self, _uid: &str) -> Result<Option<AdminRecord>, RegistryError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }
    }

    fn resolver(registry: impl AdminRegistry + 'static) -> RoleResolver {
        RoleResolver::new(Arc::new(registry), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_registered_admin() {
        let role = resolver(FixedRegistry(Some(Role::Admin)))
            .resolve_role("uid-1")
            .await
            .unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[tokio::test]
    async fn test_unknown_uid_is_user() {
        let role = resolver(FixedRegistry(None))
            .resolve_role("uid-1")
            .await
            .unwrap();
        assert_eq!(role, Role::User);
    }

    #[tokio::test]
    async fn test_non_admin_entry_is_user() {
        let role = resolver(FixedRegistry(Some(Role::User)))
            .resolve_role("uid-1")
            .await
            .unwrap();
        assert_eq!(role, Role::User);
    }

    #[tokio::test]
    async fn test_timeout_is_an_error() {
        let err = resolver(StalledRegistry)
            .resolve_role("uid-1")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Timeout(_)));
    }
}
