//! Event routes. Listing and detail are public; mutations are limited to the
//! admin who created the event.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use eyantra_shared::{AdminSummary, Event, EventDetail, EventId, EventPatch, NewEvent};
use serde::Deserialize;
use serde_json::Value;

use super::validation::{optional, parse_date, parse_id, required};
use crate::{
    auth::CurrentAdmin,
    error::{ApiError, ApiJson, ApiResponse, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub description: Option<String>,
    /// URL of an already uploaded image
    pub image: Option<String>,
    pub date: Option<String>,
    /// Honored only when it is a JSON boolean
    pub is_published: Option<Value>,
}

impl EventRequest {
    fn published_flag(&self) -> Option<bool> {
        self.is_published.as_ref().and_then(Value::as_bool)
    }
}

/// GET /api/events
pub async fn list_published(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<Event>>>> {
    let events = state.stores.events.list_published_events().await?;
    Ok(ApiResponse::ok("Events fetched successfully", events))
}

/// GET /api/events/view/:id
pub async fn view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<EventDetail>>> {
    let id: EventId = parse_id(&id, "event")?;

    let event = state
        .stores
        .events
        .find_event(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    let creator = state
        .stores
        .admins
        .find_admin(event.created_by)
        .await?
        .map(|admin| AdminSummary::from(&admin));

    Ok(ApiResponse::ok(
        "Event fetched successfully",
        EventDetail::new(event, creator),
    ))
}

/// GET /api/events/admin
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAdmin>,
) -> ApiResult<Json<ApiResponse<Vec<Event>>>> {
    let events = state
        .stores
        .events
        .list_events_by_creator(current.id)
        .await?;
    Ok(ApiResponse::ok("Admin events fetched successfully", events))
}

/// POST /api/events/create
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAdmin>,
    ApiJson(req): ApiJson<EventRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Event>>)> {
    let (Some(title), Some(description), Some(date)) = (
        required(req.title.as_deref()),
        required(req.description.as_deref()),
        required(req.date.as_deref()),
    ) else {
        return Err(ApiError::bad_request(
            "Title, description, and date are required",
        ));
    };
    let Some(image) = required(req.image.as_deref()) else {
        return Err(ApiError::bad_request("Event image is required"));
    };
    let date = parse_date(&date)?;
    let is_published = req.published_flag().unwrap_or(false);

    let event = state
        .stores
        .events
        .insert_event(NewEvent {
            title,
            sub_title: optional(req.sub_title),
            description,
            image,
            date,
            is_published,
            created_by: current.id,
        })
        .await?;

    tracing::info!(event_id = %event.id, admin_id = %current.id, "Event created");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Event created successfully", event),
    ))
}

/// Load the event and make sure `current` created it
async fn owned_event(
    state: &AppState,
    id: EventId,
    current: &CurrentAdmin,
    action: &str,
) -> ApiResult<Event> {
    let event = state
        .stores
        .events
        .find_event(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    if event.created_by != current.id {
        tracing::warn!(
            event_id = %id,
            owner = %event.created_by,
            admin_id = %current.id,
            "Event {} refused: not the creator", action
        );
        return Err(ApiError::forbidden(format!(
            "Unauthorized to {} this event",
            action
        )));
    }
    Ok(event)
}

/// PUT /api/events/update/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAdmin>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<EventRequest>,
) -> ApiResult<Json<ApiResponse<Event>>> {
    let id: EventId = parse_id(&id, "event")?;

    // Blank strings keep the stored value
    let date = match required(req.date.as_deref()) {
        Some(raw) => Some(parse_date(&raw)?),
        None => None,
    };
    let is_published = req.published_flag();
    let patch = EventPatch {
        title: optional(req.title),
        sub_title: optional(req.sub_title),
        description: optional(req.description),
        image: optional(req.image),
        date,
        is_published,
    };

    owned_event(&state, id, &current, "update").await?;

    let event = state
        .stores
        .events
        .update_event(id, current.id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    tracing::info!(event_id = %id, admin_id = %current.id, "Event updated");

    Ok(ApiResponse::ok("Event updated successfully", event))
}

/// DELETE /api/events/delete/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAdmin>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    let id: EventId = parse_id(&id, "event")?;

    owned_event(&state, id, &current, "delete").await?;

    if !state.stores.events.delete_event(id, current.id).await? {
        return Err(ApiError::not_found("Event not found"));
    }

    tracing::info!(event_id = %id, admin_id = %current.id, "Event deleted");

    Ok(ApiResponse::ok(
        "Event deleted successfully",
        Value::Object(Default::default()),
    ))
}
