//! Session and identity subsystem.
//!
//! Provides:
//! - HS256 credential encoding with a fixed lifetime
//! - Cookie-borne user (`token`) and administrator (`adminToken`) sessions
//! - Gates that attach the verified identity to each request
//! - Ownership checks for caller-identified resources

mod claims;
mod codec;
mod config;
pub mod cookie;
mod error;
mod issuer;
mod middleware;
pub mod ownership;

pub use claims::{Claims, IdentityPayload, Role};
pub use codec::{CodecError, Credential, CredentialCodec};
pub use config::{AuthConfig, ConfigValidationError};
pub use cookie::{ADMIN_COOKIE, CookieScope, CookieSpec, USER_COOKIE};
pub use error::{AuthError, AuthErrorResponse, FORBIDDEN_ACCESS, NOT_AUTHORIZED};
pub use issuer::{IssuedCredential, TokenIssuer};
pub use middleware::{AuthState, CurrentUser, RequireAdmin, admin_middleware, session_middleware};
