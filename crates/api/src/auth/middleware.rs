//! Session middleware for admin-only routes

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use eyantra_shared::{Admin, AdminId};

use super::cookies::ACCESS_COOKIE;
use crate::error::ApiError;
use crate::state::AppState;

/// Identity of the verified admin, attached to request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentAdmin {
    pub id: AdminId,
    pub name: String,
    pub email: String,
}

impl From<Admin> for CurrentAdmin {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            email: admin.email,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized request")]
    MissingToken,
    #[error("Invalid access token")]
    InvalidToken,
    #[error("Internal server error")]
    Store,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store => ApiError::Internal,
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Access token from the `accessToken` cookie, else `Authorization: Bearer`
fn extract_access_token(request: &Request) -> Option<String> {
    let jar = CookieJar::from_headers(request.headers());
    if let Some(cookie) = jar.get(ACCESS_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .filter(|token| !token.is_empty())
        .map(String::from)
}

/// Credentials of a `Bearer` authorization header; the scheme is case-insensitive
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim_start().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then_some(token.trim())
}

async fn authenticate(state: &AppState, token: &str) -> Result<CurrentAdmin, AuthError> {
    let claims = state.tokens.validate_access_token(token).map_err(|e| {
        tracing::warn!(reason = %e, "Access token rejected");
        AuthError::InvalidToken
    })?;

    // One read per request; the token alone does not prove the admin still exists
    match state.credentials.find_admin(claims.sub).await {
        Ok(Some(admin)) => Ok(admin.into()),
        Ok(None) => {
            tracing::warn!(admin_id = %claims.sub, "Access token for unknown admin");
            Err(AuthError::InvalidToken)
        }
        Err(e) => {
            tracing::error!(admin_id = %claims.sub, error = %e, "Admin lookup failed");
            Err(AuthError::Store)
        }
    }
}

/// Rejects the request with 401 unless it carries a valid access token for
/// an existing admin; otherwise inserts [`CurrentAdmin`] and continues.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let Some(token) = extract_access_token(&request) else {
        tracing::debug!(path = %path, "require_admin: no access token");
        return AuthError::MissingToken.into_response();
    };

    match authenticate(&state, &token).await {
        Ok(admin) => {
            tracing::debug!(path = %path, admin_id = %admin.id, "require_admin: authenticated");
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}
