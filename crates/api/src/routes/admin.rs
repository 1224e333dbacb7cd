//! Admin authentication routes: register, login, logout, refresh, profile,
//! change-password.

use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use eyantra_shared::{normalize_email, Admin};
use serde::{Deserialize, Serialize};

use super::validation::{is_valid_email, required};
use crate::{
    auth::{validate_password_length, CurrentAdmin, TokenPair, REFRESH_COOKIE},
    error::{ApiError, ApiJson, ApiResponse, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Admin plus tokens. Tokens are omitted when delivery is cookie-only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub admin: Admin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

type AuthReply = (StatusCode, CookieJar, Json<ApiResponse<AuthResponse>>);

/// Apply the token delivery policy to a freshly issued pair
fn deliver(
    state: &AppState,
    jar: CookieJar,
    status: StatusCode,
    message: &str,
    admin: Admin,
    tokens: TokenPair,
) -> AuthReply {
    let delivery = state.config.token_delivery;
    let jar = if delivery.uses_cookies() {
        state.cookies.set_tokens(jar, &tokens)
    } else {
        jar
    };

    let (access_token, refresh_token) = if delivery.uses_body() {
        (Some(tokens.access_token), Some(tokens.refresh_token))
    } else {
        (None, None)
    };

    (
        status,
        jar,
        ApiResponse::ok(
            message,
            AuthResponse {
                admin,
                access_token,
                refresh_token,
            },
        ),
    )
}

fn issue_tokens(state: &AppState, admin: &Admin) -> ApiResult<TokenPair> {
    state.tokens.issue_pair(admin).map_err(|e| {
        tracing::error!(admin_id = %admin.id, error = %e, "Token issuance failed");
        ApiError::Internal
    })
}

/// POST /api/admin/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<AuthReply> {
    let (Some(name), Some(email), Some(password)) = (
        required(req.name.as_deref()),
        required(req.email.as_deref()),
        req.password.filter(|p| !p.trim().is_empty()),
    ) else {
        return Err(ApiError::bad_request("Name, email and password are required"));
    };

    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }
    validate_password_length(&password).map_err(|e| ApiError::bad_request(e.to_string()))?;

    if !state.config.registration_allowed(&email) {
        tracing::warn!(email = %email, "register: registration closed for email");
        return Err(ApiError::forbidden("Admin registration is closed"));
    }

    let admin = state
        .credentials
        .create_admin(&name, &email, &password)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("Admin with this email already exists".to_string()),
            other => other,
        })?;

    let tokens = issue_tokens(&state, &admin)?;
    state
        .credentials
        .rotate_refresh_token(admin.id, &tokens.refresh_token)
        .await?;

    tracing::info!(admin_id = %admin.id, email = %admin.email, "register: admin created");

    Ok(deliver(
        &state,
        jar,
        StatusCode::CREATED,
        "Admin registered successfully",
        admin,
        tokens,
    ))
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<AuthReply> {
    let (Some(email), Some(password)) = (
        required(req.email.as_deref()),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let Some(account) = state.credentials.find_by_email(&email).await? else {
        tracing::info!(email = %normalize_email(&email), "login: unknown email");
        return Err(ApiError::not_found("Admin not found"));
    };

    if !state.credentials.verify_password(&account, &password).await? {
        tracing::warn!(admin_id = %account.admin.id, "login: wrong password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let admin = account.admin;
    let tokens = issue_tokens(&state, &admin)?;
    state
        .credentials
        .rotate_refresh_token(admin.id, &tokens.refresh_token)
        .await?;

    tracing::info!(admin_id = %admin.id, "login: admin logged in");

    Ok(deliver(
        &state,
        jar,
        StatusCode::OK,
        "Admin logged in successfully",
        admin,
        tokens,
    ))
}

/// POST /api/admin/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAdmin>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<ApiResponse<()>>)> {
    state.credentials.clear_refresh_token(current.id).await?;

    tracing::info!(admin_id = %current.id, "logout: refresh token cleared");

    Ok((
        state.cookies.clear(jar),
        ApiResponse::message("Admin logged out successfully"),
    ))
}

/// POST /api/admin/refresh-token
///
/// Takes the refresh token from the `refreshToken` cookie, else from the
/// body. The presented token must still be the stored one; the swap to the
/// new token is atomic, so a token is honored at most once.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<ApiJson<RefreshRequest>>,
) -> ApiResult<AuthReply> {
    let from_cookie = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());
    let presented = from_cookie
        .or_else(|| body.and_then(|ApiJson(req)| required(req.refresh_token.as_deref())))
        .ok_or_else(|| ApiError::unauthorized("Unauthorized request"))?;

    let claims = state
        .tokens
        .validate_refresh_token(&presented)
        .map_err(|e| {
            tracing::warn!(reason = %e, "refresh: refresh token rejected");
            ApiError::unauthorized("Invalid refresh token")
        })?;

    let Some(account) = state.credentials.find_account(claims.sub).await? else {
        tracing::warn!(admin_id = %claims.sub, "refresh: token for unknown admin");
        return Err(ApiError::unauthorized("Invalid refresh token"));
    };

    let admin = account.admin;
    let tokens = issue_tokens(&state, &admin)?;
    let swapped = state
        .credentials
        .swap_refresh_token(admin.id, &presented, &tokens.refresh_token)
        .await?;
    if !swapped {
        tracing::warn!(admin_id = %admin.id, "refresh: token already used or revoked");
        return Err(ApiError::unauthorized("Refresh token is expired or used"));
    }

    tracing::debug!(admin_id = %admin.id, "refresh: tokens rotated");

    Ok(deliver(
        &state,
        jar,
        StatusCode::OK,
        "Access token refreshed",
        admin,
        tokens,
    ))
}

/// GET /api/admin/profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAdmin>,
) -> ApiResult<Json<ApiResponse<Admin>>> {
    let admin = state
        .credentials
        .find_admin(current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    Ok(ApiResponse::ok("Admin profile fetched successfully", admin))
}

/// POST /api/admin/change-password
///
/// Every outstanding refresh token is revoked; access tokens live out their TTL.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAdmin>,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let (Some(current_password), Some(new_password)) = (
        req.current_password.filter(|p| !p.is_empty()),
        req.new_password.filter(|p| !p.trim().is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "Current password and new password are required",
        ));
    };
    validate_password_length(&new_password).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let account = state
        .credentials
        .find_account(current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    if !state
        .credentials
        .verify_password(&account, &current_password)
        .await?
    {
        tracing::warn!(admin_id = %current.id, "change_password: wrong current password");
        return Err(ApiError::unauthorized("Invalid current password"));
    }

    state.credentials.set_password(current.id, &new_password).await?;
    state.credentials.clear_refresh_token(current.id).await?;

    tracing::info!(admin_id = %current.id, "change_password: password updated");

    Ok(ApiResponse::message("Password changed successfully"))
}
