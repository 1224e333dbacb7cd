//! Contact form routes: public submission, admin review

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use eyantra_shared::{normalize_email, Contact, ContactId, NewContact};
use serde::Deserialize;

use super::validation::{is_valid_email, parse_id, required};
use crate::{
    error::{ApiError, ApiJson, ApiResponse, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub project_name: Option<String>,
    pub project_detail: Option<String>,
}

/// POST /api/contact/create
pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ContactRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Contact>>)> {
    let (Some(name), Some(email), Some(department), Some(project_name), Some(project_detail)) = (
        required(req.name.as_deref()),
        required(req.email.as_deref()),
        required(req.department.as_deref()),
        required(req.project_name.as_deref()),
        required(req.project_detail.as_deref()),
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }

    let contact = state
        .stores
        .contacts
        .insert_contact(NewContact {
            name,
            email: normalize_email(&email),
            department,
            project_name,
            project_detail,
        })
        .await?;

    tracing::info!(contact_id = %contact.id, "Contact form submitted");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Contact form submitted successfully", contact),
    ))
}

/// GET /api/contact
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Contact>>>> {
    let contacts = state.stores.contacts.list_contacts().await?;
    Ok(ApiResponse::ok("All contact entries fetched", contacts))
}

/// GET /api/contact/view/:id
pub async fn view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Contact>>> {
    let id: ContactId = parse_id(&id, "contact")?;
    let contact = state
        .stores
        .contacts
        .find_contact(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;
    Ok(ApiResponse::ok("Contact fetched successfully", contact))
}

/// DELETE /api/contact/delete/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let id: ContactId = parse_id(&id, "contact")?;
    if !state.stores.contacts.delete_contact(id).await? {
        return Err(ApiError::not_found("Contact not found"));
    }

    tracing::info!(contact_id = %id, "Contact deleted");

    Ok(ApiResponse::message("Contact deleted successfully"))
}
