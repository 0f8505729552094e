//! Credential claims, identity payloads and user roles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Claim names owned by the codec. Identity payload fields with these names
/// are never copied into a credential.
const RESERVED_CLAIMS: &[&str] = &["sub", "role", "iat", "exp", "nbf", "iss", "aud", "jti"];

/// Coarse privilege classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ordinary signed-in reader.
    #[default]
    User,
    /// Registered administrator.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

/// The payload embedded in a credential.
///
/// `sub` carries the email-like subject. Any additional fields supplied at
/// issuance are kept verbatim in `extra` so a decoded credential reproduces
/// the identity it was issued for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the caller's email).
    pub sub: String,

    /// Role tag baked in at issuance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Issued at (Unix seconds).
    pub iat: i64,

    /// Expiry (Unix seconds). Always `iat` plus the codec lifetime.
    pub exp: i64,

    /// Remaining identity payload fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Claims {
    /// Build an unstamped claim set. The codec fills in `iat`/`exp`.
    pub fn new(sub: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            sub: sub.into(),
            role,
            iat: 0,
            exp: 0,
            extra: BTreeMap::new(),
        }
    }

    /// Attach extra identity fields, dropping any that collide with
    /// codec-owned claim names.
    pub fn with_extra(mut self, extra: BTreeMap<String, Value>) -> Self {
        self.extra = extra
            .into_iter()
            .filter(|(key, _)| !RESERVED_CLAIMS.contains(&key.as_str()))
            .collect();
        self
    }

    /// Role carried by the credential, `User` when untagged.
    pub fn effective_role(&self) -> Role {
        self.role.unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.effective_role() == Role::Admin
    }
}

/// Identity payload posted by a client at login.
///
/// `email` is the session subject; `uid` is the external account id used
/// for administrator lookups. The two are never interchangeable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityPayload {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub uid: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl IdentityPayload {
    pub fn for_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Subject identifier, if present and non-blank.
    pub fn subject(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    /// External id, if present and non-blank.
    pub fn external_id(&self) -> Option<&str> {
        non_blank(self.uid.as_deref())
    }

    /// Fields that travel into the credential besides the subject.
    pub(crate) fn claim_fields(&self) -> BTreeMap<String, Value> {
        let mut fields = self.extra.clone();
        if let Some(uid) = self.external_id() {
            fields.insert("uid".to_string(), Value::String(uid.to_string()));
        }
        fields
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("librarian".parse::<Role>().is_err());
    }

    #[test]
    fn test_effective_role_defaults_to_user() {
        let claims = Claims::new("a@x.com", None);
        assert_eq!(claims.effective_role(), Role::User);
        assert!(!claims.is_admin());

        let admin = Claims::new("a@x.com", Some(Role::Admin));
        assert!(admin.is_admin());
    }

    #[test]
    fn test_with_extra_drops_reserved_names() {
        let mut extra = BTreeMap::new();
        extra.insert("exp".to_string(), json!(1));
        extra.insert("sub".to_string(), json!("b@x.com"));
        extra.insert("name".to_string(), json!("Ada"));

        let claims = Claims::new("a@x.com", None).with_extra(extra);
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.extra.len(), 1);
        assert_eq!(claims.extra["name"], json!("Ada"));
    }

    #[test]
    fn test_identity_payload_parses_arbitrary_fields() {
        let payload: IdentityPayload = serde_json::from_value(json!({
            "email": "a@x.com",
            "uid": "firebase-123",
            "displayName": "Ada"
        }))
        .unwrap();

        assert_eq!(payload.subject(), Some("a@x.com"));
        assert_eq!(payload.external_id(), Some("firebase-123"));

        let fields = payload.claim_fields();
        assert_eq!(fields["uid"], json!("firebase-123"));
        assert_eq!(fields["displayName"], json!("Ada"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_blank_subject_is_absent() {
        let payload = IdentityPayload::for_email("   ");
        assert_eq!(payload.subject(), None);
        assert_eq!(IdentityPayload::default().subject(), None);
    }
}
