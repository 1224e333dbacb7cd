//! Persistence traits and their backends.
//!
//! Every collection is reached through a trait object so handlers never know
//! whether they talk to PostgreSQL or to the in-memory store. The backend is
//! chosen once at startup: `DATABASE_URL` set means PostgreSQL.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use eyantra_shared::{
    Admin, AdminAccount, AdminId, Contact, ContactId, Developer, DeveloperId, DeveloperPatch,
    Event, EventId, EventPatch, NewAdmin, NewContact, NewDeveloper, NewEvent, StoreError,
};
use sqlx::PgPool;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the email is taken
    async fn insert_admin(&self, admin: NewAdmin) -> StoreResult<Admin>;

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<AdminAccount>>;

    async fn find_account(&self, id: AdminId) -> StoreResult<Option<AdminAccount>>;

    /// Projection without credential columns
    async fn find_admin(&self, id: AdminId) -> StoreResult<Option<Admin>>;

    /// Overwrite (or clear) the stored refresh token. `false` if no such admin.
    async fn set_refresh_token(&self, id: AdminId, token: Option<&str>) -> StoreResult<bool>;

    /// Compare-and-set: store `new` only if the current value equals `expected`.
    async fn replace_refresh_token(
        &self,
        id: AdminId,
        expected: &str,
        new: &str,
    ) -> StoreResult<bool>;

    async fn set_password_hash(&self, id: AdminId, password_hash: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event>;

    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>>;

    /// Published events, latest `date` first
    async fn list_published_events(&self) -> StoreResult<Vec<Event>>;

    /// Events created by `owner`, newest first
    async fn list_events_by_creator(&self, owner: AdminId) -> StoreResult<Vec<Event>>;

    /// Applies the patch only when `owner` created the event.
    async fn update_event(
        &self,
        id: EventId,
        owner: AdminId,
        patch: &EventPatch,
    ) -> StoreResult<Option<Event>>;

    /// Deletes only when `owner` created the event.
    async fn delete_event(&self, id: EventId, owner: AdminId) -> StoreResult<bool>;
}

#[async_trait]
pub trait DeveloperStore: Send + Sync {
    async fn insert_developer(&self, developer: NewDeveloper) -> StoreResult<Developer>;

    async fn find_developer(&self, id: DeveloperId) -> StoreResult<Option<Developer>>;

    async fn list_developers(&self) -> StoreResult<Vec<Developer>>;

    async fn update_developer(
        &self,
        id: DeveloperId,
        patch: &DeveloperPatch,
    ) -> StoreResult<Option<Developer>>;

    async fn delete_developer(&self, id: DeveloperId) -> StoreResult<bool>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert_contact(&self, contact: NewContact) -> StoreResult<Contact>;

    async fn find_contact(&self, id: ContactId) -> StoreResult<Option<Contact>>;

    async fn list_contacts(&self) -> StoreResult<Vec<Contact>>;

    async fn delete_contact(&self, id: ContactId) -> StoreResult<bool>;
}

/// Reachability probe for the health endpoint
#[async_trait]
pub trait StoreHealth: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> StoreResult<()>;
}

/// Handles to every collection, all backed by the same store
#[derive(Clone)]
pub struct Stores {
    pub admins: Arc<dyn AdminStore>,
    pub events: Arc<dyn EventStore>,
    pub developers: Arc<dyn DeveloperStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_backend(Arc::new(PgStore::new(pool)))
    }

    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()))
    }

    fn from_backend<S>(store: Arc<S>) -> Self
    where
        S: AdminStore + EventStore + DeveloperStore + ContactStore + StoreHealth + 'static,
    {
        Self {
            admins: store.clone(),
            events: store.clone(),
            developers: store.clone(),
            contacts: store.clone(),
            health: store,
        }
    }
}
