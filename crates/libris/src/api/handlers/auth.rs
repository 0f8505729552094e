//! Session issuance, role lookup and logout handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::api::error::{ApiError, ApiJson, ApiResult};
use crate::api::state::AppState;
use crate::auth::{AuthError, CookieScope, FORBIDDEN_ACCESS, IdentityPayload, Role, cookie};

/// Plain confirmation body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of an administrator login attempt.
#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub message: String,
    pub role: Role,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleQuery {
    #[serde(default)]
    pub uid: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

/// Issue a user session credential in the `token` cookie.
#[instrument(skip_all)]
pub async fn issue_token(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<IdentityPayload>,
) -> ApiResult<impl IntoResponse> {
    let issued = state.issuer.issue_user_token(&payload).map_err(|e| match e {
        AuthError::Internal(_) => ApiError::internal("Token generating failed."),
        other => ApiError::from(other),
    })?;

    Ok((
        AppendHeaders([(SET_COOKIE, issued.cookie.header_value())]),
        Json(MessageResponse::new("Token generated Successfully.")),
    ))
}

/// Issue an administrator credential in the `adminToken` cookie.
///
/// A caller that is not a registered administrator gets 403 with its role
/// and no cookie.
#[instrument(skip_all)]
pub async fn issue_admin_token(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<IdentityPayload>,
) -> ApiResult<Response> {
    match state.issuer.issue_admin_token(&payload).await {
        Ok(issued) => Ok((
            AppendHeaders([(SET_COOKIE, issued.cookie.header_value())]),
            Json(AdminLoginResponse {
                message: "Admin token generated Successfully.".to_string(),
                role: Role::Admin,
            }),
        )
            .into_response()),
        Err(AuthError::Forbidden(_)) => Ok((
            StatusCode::FORBIDDEN,
            Json(AdminLoginResponse {
                message: FORBIDDEN_ACCESS.to_string(),
                role: Role::User,
            }),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Report the role registered for an external account id.
///
/// Unknown or absent ids are users; only a registry failure is an error.
#[instrument(skip_all)]
pub async fn check_admin(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<RoleQuery>,
) -> ApiResult<Json<RoleResponse>> {
    let Some(uid) = query.uid.as_deref().map(str::trim).filter(|uid| !uid.is_empty()) else {
        return Ok(Json(RoleResponse { role: Role::User }));
    };

    let role = state.roles().resolve_role(uid).await.map_err(|e| {
        error!(error = %e, "role lookup failed");
        ApiError::internal("Error checking role")
    })?;

    Ok(Json(RoleResponse { role }))
}

/// Expire both session cookies.
pub async fn logout() -> impl IntoResponse {
    let cookies: Vec<_> = cookie::terminate(CookieScope::Both)
        .into_iter()
        .map(|spec| (SET_COOKIE, spec.header_value()))
        .collect();

    info!("session cookies cleared");

    (
        AppendHeaders(cookies),
        Json(MessageResponse::new("Logged out successfully.")),
    )
}
