//! Session and administrator gates.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{HeaderMap, header::COOKIE, request::Parts},
    middleware::Next,
    response::Response,
};
use log::{debug, warn};

use super::codec::CredentialCodec;
use super::cookie::{ADMIN_COOKIE, USER_COOKIE, cookie_from_header};
use super::{AuthConfig, AuthError, Claims, Role};

/// Authentication state shared across handlers.
#[derive(Clone)]
pub struct AuthState {
    config: Arc<AuthConfig>,
    codec: CredentialCodec,
}

impl AuthState {
    /// Create auth state from config, resolving `env:VAR_NAME` in
    /// `jwt_secret` once at construction time.
    ///
    /// An unresolvable secret leaves the codec without a key; every
    /// verification then fails as an internal error rather than as 401.
    pub fn new(config: AuthConfig) -> Self {
        let secret = match config.resolve_jwt_secret() {
            Ok(secret) => secret,
            Err(e) => {
                warn!("JWT secret unavailable: {}", e);
                None
            }
        };

        let codec = CredentialCodec::new(secret.as_deref(), config.token_lifetime());

        Self {
            config: Arc::new(config),
            codec,
        }
    }

    pub fn codec(&self) -> &CredentialCodec {
        &self.codec
    }

    /// Get allowed CORS origins from config.
    pub fn allowed_origins(&self) -> &[String] {
        &self.config.allowed_origins
    }

    /// Decode and validate a credential.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.codec.decode(token).map_err(|e| {
            if e.is_unauthenticated() {
                debug!("credential rejected: {}", e);
            }
            AuthError::from(e)
        })
    }

    /// Read the credential for `cookie_name` from the request headers and
    /// verify it. No signature check is attempted when the cookie is absent.
    pub fn verify_cookie(&self, headers: &HeaderMap, cookie_name: &str) -> Result<Claims, AuthError> {
        let token = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .find_map(|h| cookie_from_header(h, cookie_name))
            .ok_or(AuthError::MissingCredential)?;

        self.verify(token)
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

/// Verified identity for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    subject: String,
    role: Role,
}

impl CurrentUser {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }

    /// The verified subject (email).
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&Claims> for CurrentUser {
    fn from(claims: &Claims) -> Self {
        Self::new(claims.sub.clone(), claims.effective_role())
    }
}

/// Extract the verified identity. Rejects with 401 when no gate ran.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingCredential)
    }
}

/// `Option<CurrentUser>` never rejects; ownership checks decide what an
/// absent identity means.
impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned())
    }
}

/// Session gate for the `token` cookie.
///
/// Injects `CurrentUser` into request extensions on success.
pub async fn session_middleware(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = auth.verify_cookie(req.headers(), USER_COOKIE)?;

    req.extensions_mut().insert(CurrentUser::from(&claims));
    Ok(next.run(req).await)
}

/// Administrator gate for the `adminToken` cookie.
///
/// The role was resolved when the credential was issued and is not looked
/// up again here, so a demoted administrator keeps access until the
/// credential expires.
pub async fn admin_middleware(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = auth.verify_cookie(req.headers(), ADMIN_COOKIE)?;

    if !claims.is_admin() {
        warn!("non-admin credential presented in {} cookie", ADMIN_COOKIE);
        return Err(AuthError::InvalidCredential(
            "credential is not admin-scoped".to_string(),
        ));
    }

    req.extensions_mut()
        .insert(CurrentUser::new(claims.sub, Role::Admin));
    Ok(next.run(req).await)
}

/// Require an administrator identity.
///
/// Use as an extractor in handlers mounted behind `admin_middleware`.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = <CurrentUser as FromRequestParts<S>>::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::Forbidden("admin role required".to_string()));
        }

        Ok(RequireAdmin(user))
    }
}
