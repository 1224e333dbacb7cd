//! In-memory store for tests and database-less local runs.
//! Nothing survives a restart.

use async_trait::async_trait;
use eyantra_shared::{
    normalize_email, Admin, AdminAccount, AdminId, Contact, ContactId, Developer, DeveloperId,
    DeveloperPatch, Event, EventId, EventPatch, NewAdmin, NewContact, NewDeveloper, NewEvent,
    StoreError,
};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{
    AdminStore, ContactStore, DeveloperStore, EventStore, StoreHealth, StoreResult,
};

struct AdminRecord {
    id: AdminId,
    name: String,
    email: String,
    password_hash: String,
    refresh_token: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

/// Collections in insertion order
#[derive(Default)]
struct Collections {
    admins: Vec<AdminRecord>,
    events: Vec<Event>,
    developers: Vec<Developer>,
    contacts: Vec<Contact>,
}

impl Collections {
    fn admin_mut(&mut self, id: AdminId) -> Option<&mut AdminRecord> {
        self.admins.iter_mut().find(|a| a.id == id)
    }

    fn account(&self, record: &AdminRecord) -> AdminAccount {
        let mut owned: Vec<&Event> = self
            .events
            .iter()
            .filter(|e| e.created_by == record.id)
            .collect();
        owned.sort_by_key(|e| e.created_at);

        AdminAccount {
            admin: Admin {
                id: record.id,
                name: record.name.clone(),
                email: record.email.clone(),
                events: owned.into_iter().map(|e| e.id).collect(),
                created_at: record.created_at,
                updated_at: record.updated_at,
            },
            password_hash: record.password_hash.clone(),
            refresh_token: record.refresh_token.clone(),
        }
    }
}

/// Newest first; ties keep the later insertion first
fn newest_first<T: Clone>(items: &[T], key: impl Fn(&T) -> OffsetDateTime) -> Vec<T> {
    let mut out: Vec<T> = items.iter().rev().cloned().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

/// One lock over every collection, so check-then-write sequences
/// (unique email, refresh token swap, owner check) are atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn insert_admin(&self, admin: NewAdmin) -> StoreResult<Admin> {
        let mut inner = self.inner.write().await;
        let email = normalize_email(&admin.email);
        if inner.admins.iter().any(|a| a.email == email) {
            return Err(StoreError::Conflict("admins_email_key".to_string()));
        }

        let now = OffsetDateTime::now_utc();
        let record = AdminRecord {
            id: AdminId::new(),
            name: admin.name,
            email,
            password_hash: admin.password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        let account = inner.account(&record);
        inner.admins.push(record);
        Ok(account.admin)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<AdminAccount>> {
        let inner = self.inner.read().await;
        let email = normalize_email(email);
        Ok(inner
            .admins
            .iter()
            .find(|a| a.email == email)
            .map(|record| inner.account(record)))
    }

    async fn find_account(&self, id: AdminId) -> StoreResult<Option<AdminAccount>> {
        let inner = self.inner.read().await;
        Ok(inner
            .admins
            .iter()
            .find(|a| a.id == id)
            .map(|record| inner.account(record)))
    }

    async fn find_admin(&self, id: AdminId) -> StoreResult<Option<Admin>> {
        Ok(self.find_account(id).await?.map(|account| account.admin))
    }

    async fn set_refresh_token(&self, id: AdminId, token: Option<&str>) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(match inner.admin_mut(id) {
            Some(record) => {
                record.refresh_token = token.map(String::from);
                record.updated_at = OffsetDateTime::now_utc();
                true
            }
            None => false,
        })
    }

    async fn replace_refresh_token(
        &self,
        id: AdminId,
        expected: &str,
        new: &str,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(match inner.admin_mut(id) {
            Some(record) if record.refresh_token.as_deref() == Some(expected) => {
                record.refresh_token = Some(new.to_string());
                record.updated_at = OffsetDateTime::now_utc();
                true
            }
            _ => false,
        })
    }

    async fn set_password_hash(&self, id: AdminId, password_hash: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(match inner.admin_mut(id) {
            Some(record) => {
                record.password_hash = password_hash.to_string();
                record.updated_at = OffsetDateTime::now_utc();
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let now = OffsetDateTime::now_utc();
        let event = Event {
            id: EventId::new(),
            title: event.title,
            sub_title: event.sub_title,
            description: event.description,
            image: event.image,
            date: event.date,
            is_published: event.is_published,
            created_by: event.created_by,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.events.push(event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        let inner = self.inner.read().await;
        Ok(inner.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_published_events(&self) -> StoreResult<Vec<Event>> {
        let inner = self.inner.read().await;
        let published: Vec<Event> = inner
            .events
            .iter()
            .filter(|e| e.is_published)
            .cloned()
            .collect();
        Ok(newest_first(&published, |e| e.date))
    }

    async fn list_events_by_creator(&self, owner: AdminId) -> StoreResult<Vec<Event>> {
        let inner = self.inner.read().await;
        let owned: Vec<Event> = inner
            .events
            .iter()
            .filter(|e| e.created_by == owner)
            .cloned()
            .collect();
        Ok(newest_first(&owned, |e| e.created_at))
    }

    async fn update_event(
        &self,
        id: EventId,
        owner: AdminId,
        patch: &EventPatch,
    ) -> StoreResult<Option<Event>> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .events
            .iter_mut()
            .find(|e| e.id == id && e.created_by == owner)
            .map(|event| {
                patch.apply(event);
                event.updated_at = OffsetDateTime::now_utc();
                event.clone()
            }))
    }

    async fn delete_event(&self, id: EventId, owner: AdminId) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.events.len();
        inner
            .events
            .retain(|e| !(e.id == id && e.created_by == owner));
        Ok(inner.events.len() < before)
    }
}

#[async_trait]
impl DeveloperStore for MemoryStore {
    async fn insert_developer(&self, developer: NewDeveloper) -> StoreResult<Developer> {
        let now = OffsetDateTime::now_utc();
        let developer = Developer {
            id: DeveloperId::new(),
            name: developer.name,
            department: developer.department,
            avatar: developer.avatar,
            registration_number: developer.registration_number,
            instagram: developer.instagram,
            linkedin: developer.linkedin,
            email: developer.email,
            github: developer.github,
            batch: developer.batch,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.developers.push(developer.clone());
        Ok(developer)
    }

    async fn find_developer(&self, id: DeveloperId) -> StoreResult<Option<Developer>> {
        let inner = self.inner.read().await;
        Ok(inner.developers.iter().find(|d| d.id == id).cloned())
    }

    async fn list_developers(&self) -> StoreResult<Vec<Developer>> {
        let inner = self.inner.read().await;
        Ok(newest_first(&inner.developers, |d| d.created_at))
    }

    async fn update_developer(
        &self,
        id: DeveloperId,
        patch: &DeveloperPatch,
    ) -> StoreResult<Option<Developer>> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .developers
            .iter_mut()
            .find(|d| d.id == id)
            .map(|developer| {
                patch.apply(developer);
                developer.updated_at = OffsetDateTime::now_utc();
                developer.clone()
            }))
    }

    async fn delete_developer(&self, id: DeveloperId) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.developers.len();
        inner.developers.retain(|d| d.id != id);
        Ok(inner.developers.len() < before)
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn insert_contact(&self, contact: NewContact) -> StoreResult<Contact> {
        let now = OffsetDateTime::now_utc();
        let contact = Contact {
            id: ContactId::new(),
            name: contact.name,
            email: contact.email,
            department: contact.department,
            project_name: contact.project_name,
            project_detail: contact.project_detail,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.contacts.push(contact.clone());
        Ok(contact)
    }

    async fn find_contact(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        let inner = self.inner.read().await;
        Ok(inner.contacts.iter().find(|c| c.id == id).cloned())
    }

    async fn list_contacts(&self) -> StoreResult<Vec<Contact>> {
        let inner = self.inner.read().await;
        Ok(newest_first(&inner.contacts, |c| c.created_at))
    }

    async fn delete_contact(&self, id: ContactId) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.contacts.len();
        inner.contacts.retain(|c| c.id != id);
        Ok(inner.contacts.len() < before)
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
