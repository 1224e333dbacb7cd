//! Developer profile routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use eyantra_shared::{normalize_email, Developer, DeveloperId, DeveloperPatch, NewDeveloper};
use serde::Deserialize;

use super::validation::{is_valid_email, optional, parse_id, required};
use crate::{
    error::{ApiError, ApiJson, ApiResponse, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperRequest {
    pub name: Option<String>,
    pub department: Option<String>,
    /// URL of an already uploaded picture
    pub avatar: Option<String>,
    pub registration_number: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub email: Option<String>,
    pub github: Option<String>,
    pub batch: Option<String>,
}

fn checked_email(raw: Option<String>) -> ApiResult<Option<String>> {
    match optional(raw) {
        Some(email) if !is_valid_email(&email) => Err(ApiError::bad_request("Invalid email format")),
        other => Ok(other.map(|e| normalize_email(&e))),
    }
}

/// GET /api/developers
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Developer>>>> {
    let developers = state.stores.developers.list_developers().await?;
    Ok(ApiResponse::ok("Developers fetched successfully", developers))
}

/// GET /api/developers/view/:id
pub async fn view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Developer>>> {
    let id: DeveloperId = parse_id(&id, "developer")?;
    let developer = state
        .stores
        .developers
        .find_developer(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Developer not found"))?;
    Ok(ApiResponse::ok("Developer fetched successfully", developer))
}

/// POST /api/developers/create
pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DeveloperRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Developer>>)> {
    let (Some(name), Some(department)) = (
        required(req.name.as_deref()),
        required(req.department.as_deref()),
    ) else {
        return Err(ApiError::bad_request("Name and Department are required"));
    };
    let Some(avatar) = required(req.avatar.as_deref()) else {
        return Err(ApiError::bad_request("Developer image is required"));
    };

    let developer = state
        .stores
        .developers
        .insert_developer(NewDeveloper {
            name,
            department,
            avatar,
            registration_number: optional(req.registration_number),
            instagram: optional(req.instagram),
            linkedin: optional(req.linkedin),
            email: checked_email(req.email)?,
            github: optional(req.github),
            batch: optional(req.batch),
        })
        .await?;

    tracing::info!(developer_id = %developer.id, "Developer created");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Developer created successfully", developer),
    ))
}

/// PUT /api/developers/update/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<DeveloperRequest>,
) -> ApiResult<Json<ApiResponse<Developer>>> {
    let id: DeveloperId = parse_id(&id, "developer")?;
    let patch = DeveloperPatch {
        name: optional(req.name),
        department: optional(req.department),
        avatar: optional(req.avatar),
        registration_number: optional(req.registration_number),
        instagram: optional(req.instagram),
        linkedin: optional(req.linkedin),
        email: checked_email(req.email)?,
        github: optional(req.github),
        batch: optional(req.batch),
    };

    let developer = state
        .stores
        .developers
        .update_developer(id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Developer not found"))?;

    tracing::info!(developer_id = %id, "Developer updated");

    Ok(ApiResponse::ok("Developer updated successfully", developer))
}

/// DELETE /api/developers/delete/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let id: DeveloperId = parse_id(&id, "developer")?;
    if !state.stores.developers.delete_developer(id).await? {
        return Err(ApiError::not_found("Developer not found"));
    }

    tracing::info!(developer_id = %id, "Developer deleted");

    Ok(ApiResponse::message("Developer deleted successfully"))
}
