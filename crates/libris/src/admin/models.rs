//! Admin registry records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// A registry entry keyed by external account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub uid: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Administrator provisioned from configuration at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSeed {
    pub uid: String,
    pub email: String,
}
