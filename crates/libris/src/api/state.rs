//! Application state shared across handlers.

use std::sync::Arc;

use crate::admin::{AdminRegistry, RoleResolver};
use crate::auth::{AuthConfig, AuthState, TokenIssuer};
use crate::catalog::{BookRepository, BorrowRepository, CategoryRepository};
use crate::config::AppConfig;
use crate::db::Database;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Credential verification for the session gates.
    pub auth: AuthState,
    /// Credential issuance at login.
    pub issuer: TokenIssuer,
    pub books: BookRepository,
    pub categories: CategoryRepository,
    pub borrowed: BorrowRepository,
}

impl AppState {
    /// Wire state from its parts. The issuer signs with the same codec the
    /// gates verify with.
    pub fn new(auth: AuthConfig, roles: RoleResolver, db: &Database) -> Self {
        let auth = AuthState::new(auth);
        let issuer = TokenIssuer::new(auth.codec().clone(), roles);
        let pool = db.pool().clone();

        Self {
            auth,
            issuer,
            books: BookRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            borrowed: BorrowRepository::new(pool),
        }
    }

    /// Build state from loaded configuration and an admin registry.
    pub fn from_config(
        config: &AppConfig,
        registry: Arc<dyn AdminRegistry>,
        db: &Database,
    ) -> Self {
        let roles = RoleResolver::new(registry, config.admins.lookup_timeout());
        Self::new(config.auth.clone(), roles, db)
    }

    pub fn roles(&self) -> &RoleResolver {
        self.issuer.roles()
    }
}
