//! Credential issuance for user and administrator sessions.

use tracing::{error, info, instrument, warn};

use super::codec::CredentialCodec;
use super::cookie::{ADMIN_COOKIE, CookieSpec, USER_COOKIE};
use super::{AuthError, Claims, IdentityPayload, Role};
use crate::admin::RoleResolver;

/// A signed credential plus the cookie that carries it.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub token: String,
    pub claims: Claims,
    pub cookie: CookieSpec,
}

/// Builds credentials from identity payloads.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    codec: CredentialCodec,
    roles: RoleResolver,
}

impl TokenIssuer {
    pub fn new(codec: CredentialCodec, roles: RoleResolver) -> Self {
        Self { codec, roles }
    }

    pub fn roles(&self) -> &RoleResolver {
        &self.roles
    }

    /// Issue an ordinary session credential for the payload's subject.
    #[instrument(skip(self, payload))]
    pub fn issue_user_token(&self, payload: &IdentityPayload) -> Result<IssuedCredential, AuthError> {
        let subject = payload
            .subject()
            .ok_or_else(|| AuthError::BadRequest("email is required".to_string()))?;

        let claims = Claims::new(subject, Some(Role::User)).with_extra(payload.claim_fields());
        let issued = self.sign(claims, USER_COOKIE)?;

        info!(subject = %subject, "issued session credential");
        Ok(issued)
    }

    /// Issue an administrator credential.
    ///
    /// The registry is consulted by `uid`, never by email. Non-admins get
    /// `Forbidden` and no credential.
    #[instrument(skip(self, payload))]
    pub async fn issue_admin_token(
        &self,
        payload: &IdentityPayload,
    ) -> Result<IssuedCredential, AuthError> {
        let uid = payload
            .external_id()
            .ok_or_else(|| AuthError::BadRequest("uid is required".to_string()))?;
        let subject = payload
            .subject()
            .ok_or_else(|| AuthError::BadRequest("email is required".to_string()))?;

        let role = self.roles.resolve_role(uid).await.map_err(|e| {
            error!(error = %e, "admin registry lookup failed");
            AuthError::Internal(e.to_string())
        })?;

        if role != Role::Admin {
            warn!(subject = %subject, "admin credential refused");
            return Err(AuthError::Forbidden("not a registered administrator".to_string()));
        }

        let claims = Claims::new(subject, Some(Role::Admin)).with_extra(payload.claim_fields());
        let issued = self.sign(claims, ADMIN_COOKIE)?;

        info!(subject = %subject, "issued administrator credential");
        Ok(issued)
    }

    fn sign(&self, claims: Claims, cookie_name: &'static str) -> Result<IssuedCredential, AuthError> {
        let credential = self.codec.encode(claims).map_err(|e| {
            error!(error = %e, "credential signing failed");
            AuthError::from(e)
        })?;

        let cookie = CookieSpec::session(cookie_name, credential.token.clone(), self.codec.lifetime());

        Ok(IssuedCredential {
            token: credential.token,
            claims: credential.claims,
            cookie,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::{AdminRecord, AdminRegistry, RegistryError};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;

    const SECRET: &str = "issuer-test-secret-long-enough-for-hs256-signing";

    struct OneAdmin;

    #[async_trait]
    impl AdminRegistry for OneAdmin {
        async fn find_by_uid(&self, uid: &str) -> Result<Option<AdminRecord>, RegistryError> {
            Ok((uid == "admin-uid").then(|| AdminRecord {
                uid: uid.to_string(),
                email: "admin@x.com".to_string(),
                role: Role::Admin,
                created_at: Utc::now(),
            }))
        }
    }

    fn issuer_with(secret: Option<&str>) -> TokenIssuer {
        TokenIssuer::new(
            CredentialCodec::new(secret, Duration::from_secs(3600)),
            RoleResolver::new(Arc::new(OneAdmin), Duration::from_secs(1)),
        )
    }

    fn issuer() -> TokenIssuer {
        issuer_with(Some(SECRET))
    }

    fn payload(email: Option<&str>, uid: Option<&str>) -> IdentityPayload {
        IdentityPayload {
            email: email.map(str::to_string),
            uid: uid.map(str::to_string),
            ..IdentityPayload::default()
        }
    }

    #[test]
    fn test_user_token_carries_subject_and_cookie() {
        let issued = issuer()
            .issue_user_token(&payload(Some("a@x.com"), None))
            .unwrap();

        assert_eq!(issued.claims.sub, "a@x.com");
        assert_eq!(issued.claims.role, Some(Role::User));
        assert_eq!(issued.claims.exp - issued.claims.iat, 3600);
        assert_eq!(issued.cookie.name, USER_COOKIE);
        assert_eq!(issued.cookie.value, issued.token);
    }

    #[test]
    fn test_user_token_requires_subject() {
        let err = issuer().issue_user_token(&payload(None, None)).unwrap_err();
        assert!(matches!(err, AuthError::BadRequest(_)));
    }

    #[test]
    fn test_signing_failure_is_internal() {
        let err = issuer_with(None)
            .issue_user_token(&payload(Some("a@x.com"), None))
            .unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[tokio::test]
    async fn test_admin_token_for_registered_admin() {
        let issued = issuer()
            .issue_admin_token(&payload(Some("admin@x.com"), Some("admin-uid")))
            .await
            .unwrap();

        assert_eq!(issued.claims.role, Some(Role::Admin));
        assert_eq!(issued.cookie.name, ADMIN_COOKIE);
    }

    #[tokio::test]
    async fn test_admin_token_refused_for_user() {
        let err = issuer()
            .issue_admin_token(&payload(Some("a@x.com"), Some("someone-else")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_lookup_ignores_email() {
        // The admin's email with a foreign uid is still not an admin.
        let err = issuer()
            .issue_admin_token(&payload(Some("admin@x.com"), Some("someone-else")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_token_requires_uid() {
        let err = issuer()
            .issue_admin_token(&payload(Some("admin@x.com"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::BadRequest(_)));
    }
}
