//! Common types used across the eYantra backend

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

id_type!(
    /// Admin ID wrapper
    AdminId
);
id_type!(
    /// Event ID wrapper
    EventId
);
id_type!(
    /// Developer profile ID wrapper
    DeveloperId
);
id_type!(
    /// Contact submission ID wrapper
    ContactId
);

/// Emails are stored and compared trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Admins
// =============================================================================

/// Admin as exposed to handlers and clients: never carries the password hash
/// or the stored refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: AdminId,
    pub name: String,
    pub email: String,
    /// Events created by this admin, oldest first
    pub events: Vec<EventId>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Full admin record including credential columns. Only the credential
/// store and the auth handlers see this type.
#[derive(Clone)]
pub struct AdminAccount {
    pub admin: Admin,
    pub password_hash: String,
    pub refresh_token: Option<String>,
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("admin", &self.admin)
            .field("password_hash", &"[REDACTED]")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// The public face of an event's creator (`createdBy` populated)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSummary {
    pub id: AdminId,
    pub name: String,
    pub email: String,
}

impl From<&Admin> for AdminSummary {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name.clone(),
            email: admin.email.clone(),
        }
    }
}

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub sub_title: Option<String>,
    /// Rich-text HTML produced by the admin editor, stored verbatim
    pub description: String,
    /// URL of the event image in external object storage
    pub image: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub is_published: bool,
    pub created_by: AdminId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub sub_title: Option<String>,
    pub description: String,
    pub image: String,
    pub date: OffsetDateTime,
    pub is_published: bool,
    pub created_by: AdminId,
}

/// Partial event update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub date: Option<OffsetDateTime>,
    pub is_published: Option<bool>,
}

impl EventPatch {
    pub fn apply(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(sub_title) = &self.sub_title {
            event.sub_title = Some(sub_title.clone());
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(image) = &self.image {
            event.image = image.clone();
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(is_published) = self.is_published {
            event.is_published = is_published;
        }
    }
}

/// Event with `createdBy` populated, as served by the public detail view.
/// `created_by` is `None` when the creating admin no longer exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    pub id: EventId,
    pub title: String,
    pub sub_title: Option<String>,
    pub description: String,
    pub image: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub is_published: bool,
    pub created_by: Option<AdminSummary>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl EventDetail {
    pub fn new(event: Event, creator: Option<AdminSummary>) -> Self {
        Self {
            id: event.id,
            title: event.title,
            sub_title: event.sub_title,
            description: event.description,
            image: event.image,
            date: event.date,
            is_published: event.is_published,
            created_by: creator,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

// =============================================================================
// Developers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Developer {
    pub id: DeveloperId,
    pub name: String,
    pub department: String,
    /// URL of the profile picture in external object storage
    pub avatar: String,
    pub registration_number: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub email: Option<String>,
    pub github: Option<String>,
    pub batch: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct NewDeveloper {
    pub name: String,
    pub department: String,
    pub avatar: String,
    pub registration_number: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub email: Option<String>,
    pub github: Option<String>,
    pub batch: Option<String>,
}

/// Partial developer update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct DeveloperPatch {
    pub name: Option<String>,
    pub department: Option<String>,
    pub avatar: Option<String>,
    pub registration_number: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub email: Option<String>,
    pub github: Option<String>,
    pub batch: Option<String>,
}

impl DeveloperPatch {
    pub fn apply(&self, developer: &mut Developer) {
        if let Some(name) = &self.name {
            developer.name = name.clone();
        }
        if let Some(department) = &self.department {
            developer.department = department.clone();
        }
        if let Some(avatar) = &self.avatar {
            developer.avatar = avatar.clone();
        }
        let optional = [
            (&self.registration_number, &mut developer.registration_number),
            (&self.instagram, &mut developer.instagram),
            (&self.linkedin, &mut developer.linkedin),
            (&self.email, &mut developer.email),
            (&self.github, &mut developer.github),
            (&self.batch, &mut developer.batch),
        ];
        for (update, field) in optional {
            if let Some(value) = update {
                *field = Some(value.clone());
            }
        }
    }
}

// =============================================================================
// Contacts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub department: String,
    pub project_name: String,
    pub project_detail: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub department: String,
    pub project_name: String,
    pub project_detail: String,
}
