//! Administrator registry and role resolution.

mod models;
mod repository;
mod resolver;

pub use models::{AdminRecord, AdminSeed};
pub use repository::{AdminRegistry, RegistryError, SqliteAdminRegistry};
pub use resolver::RoleResolver;
