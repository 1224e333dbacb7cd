//! PostgreSQL store

use async_trait::async_trait;
use eyantra_shared::{
    normalize_email, Admin, AdminAccount, AdminId, Contact, ContactId, Developer, DeveloperId,
    DeveloperPatch, Event, EventId, EventPatch, NewAdmin, NewContact, NewDeveloper, NewEvent,
};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    AdminStore, ContactStore, DeveloperStore, EventStore, StoreHealth, StoreResult,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// =============================================================================
// Row types
// =============================================================================

/// Admin columns plus owned event ids, oldest first
const ACCOUNT_SELECT: &str = r#"
    SELECT a.id, a.name, a.email, a.password_hash, a.refresh_token,
           a.created_at, a.updated_at,
           ARRAY(SELECT e.id FROM events e WHERE e.created_by = a.id ORDER BY e.created_at) AS events
    FROM admins a
"#;

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    refresh_token: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    events: Vec<Uuid>,
}

impl From<AccountRow> for AdminAccount {
    fn from(row: AccountRow) -> Self {
        AdminAccount {
            admin: Admin {
                id: row.id.into(),
                name: row.name,
                email: row.email,
                events: row.events.into_iter().map(EventId::from).collect(),
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: row.password_hash,
            refresh_token: row.refresh_token,
        }
    }
}

const EVENT_COLUMNS: &str =
    "id, title, sub_title, description, image, date, is_published, created_by, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    sub_title: Option<String>,
    description: String,
    image: String,
    date: OffsetDateTime,
    is_published: bool,
    created_by: Uuid,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id.into(),
            title: row.title,
            sub_title: row.sub_title,
            description: row.description,
            image: row.image,
            date: row.date,
            is_published: row.is_published,
            created_by: row.created_by.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const DEVELOPER_COLUMNS: &str = "id, name, department, avatar, registration_number, instagram, \
     linkedin, email, github, batch, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct DeveloperRow {
    id: Uuid,
    name: String,
    department: String,
    avatar: String,
    registration_number: Option<String>,
    instagram: Option<String>,
    linkedin: Option<String>,
    email: Option<String>,
    github: Option<String>,
    batch: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<DeveloperRow> for Developer {
    fn from(row: DeveloperRow) -> Self {
        Developer {
            id: row.id.into(),
            name: row.name,
            department: row.department,
            avatar: row.avatar,
            registration_number: row.registration_number,
            instagram: row.instagram,
            linkedin: row.linkedin,
            email: row.email,
            github: row.github,
            batch: row.batch,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CONTACT_COLUMNS: &str =
    "id, name, email, department, project_name, project_detail, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    name: String,
    email: String,
    department: String,
    project_name: String,
    project_detail: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id.into(),
            name: row.name,
            email: row.email,
            department: row.department,
            project_name: row.project_name,
            project_detail: row.project_detail,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// =============================================================================
// Admins
// =============================================================================

#[async_trait]
impl AdminStore for PgStore {
    async fn insert_admin(&self, admin: NewAdmin) -> StoreResult<Admin> {
        let row: (Uuid, String, String, OffsetDateTime, OffsetDateTime) = sqlx::query_as(
            r#"
            INSERT INTO admins (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(AdminId::new().0)
        .bind(&admin.name)
        .bind(normalize_email(&admin.email))
        .bind(&admin.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(Admin {
            id: row.0.into(),
            name: row.1,
            email: row.2,
            events: Vec::new(),
            created_at: row.3,
            updated_at: row.4,
        })
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<AdminAccount>> {
        let query = format!("{ACCOUNT_SELECT} WHERE LOWER(a.email) = $1");
        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(AdminAccount::from))
    }

    async fn find_account(&self, id: AdminId) -> StoreResult<Option<AdminAccount>> {
        let query = format!("{ACCOUNT_SELECT} WHERE a.id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(AdminAccount::from))
    }

    async fn find_admin(&self, id: AdminId) -> StoreResult<Option<Admin>> {
        Ok(self.find_account(id).await?.map(|account| account.admin))
    }

    async fn set_refresh_token(&self, id: AdminId, token: Option<&str>) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE admins SET refresh_token = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.0)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn replace_refresh_token(
        &self,
        id: AdminId,
        expected: &str,
        new: &str,
    ) -> StoreResult<bool> {
        // Single statement: of two concurrent swaps with the same token, one matches zero rows
        let result = sqlx::query(
            r#"
            UPDATE admins SET refresh_token = $3, updated_at = NOW()
            WHERE id = $1 AND refresh_token = $2
            "#,
        )
        .bind(id.0)
        .bind(expected)
        .bind(new)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_password_hash(&self, id: AdminId, password_hash: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE admins SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.0)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Events
// =============================================================================

#[async_trait]
impl EventStore for PgStore {
    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let query = format!(
            r#"
            INSERT INTO events (id, title, sub_title, description, image, date, is_published, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, EventRow>(&query)
            .bind(EventId::new().0)
            .bind(&event.title)
            .bind(&event.sub_title)
            .bind(&event.description)
            .bind(&event.image)
            .bind(event.date)
            .bind(event.is_published)
            .bind(event.created_by.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Event::from))
    }

    async fn list_published_events(&self) -> StoreResult<Vec<Event>> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE is_published ORDER BY date DESC, created_at DESC"
        );
        let rows = sqlx::query_as::<_, EventRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn list_events_by_creator(&self, owner: AdminId) -> StoreResult<Vec<Event>> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE created_by = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, EventRow>(&query)
            .bind(owner.0)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn update_event(
        &self,
        id: EventId,
        owner: AdminId,
        patch: &EventPatch,
    ) -> StoreResult<Option<Event>> {
        let query = format!(
            r#"
            UPDATE events SET
                title = COALESCE($3, title),
                sub_title = COALESCE($4, sub_title),
                description = COALESCE($5, description),
                image = COALESCE($6, image),
                date = COALESCE($7, date),
                is_published = COALESCE($8, is_published),
                updated_at = NOW()
            WHERE id = $1 AND created_by = $2
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, EventRow>(&query)
            .bind(id.0)
            .bind(owner.0)
            .bind(&patch.title)
            .bind(&patch.sub_title)
            .bind(&patch.description)
            .bind(&patch.image)
            .bind(patch.date)
            .bind(patch.is_published)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Event::from))
    }

    async fn delete_event(&self, id: EventId, owner: AdminId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND created_by = $2")
            .bind(id.0)
            .bind(owner.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Developers
// =============================================================================

#[async_trait]
impl DeveloperStore for PgStore {
    async fn insert_developer(&self, developer: NewDeveloper) -> StoreResult<Developer> {
        let query = format!(
            r#"
            INSERT INTO developers (id, name, department, avatar, registration_number,
                                    instagram, linkedin, email, github, batch)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {DEVELOPER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, DeveloperRow>(&query)
            .bind(DeveloperId::new().0)
            .bind(&developer.name)
            .bind(&developer.department)
            .bind(&developer.avatar)
            .bind(&developer.registration_number)
            .bind(&developer.instagram)
            .bind(&developer.linkedin)
            .bind(&developer.email)
            .bind(&developer.github)
            .bind(&developer.batch)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn find_developer(&self, id: DeveloperId) -> StoreResult<Option<Developer>> {
        let query = format!("SELECT {DEVELOPER_COLUMNS} FROM developers WHERE id = $1");
        let row = sqlx::query_as::<_, DeveloperRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Developer::from))
    }

    async fn list_developers(&self) -> StoreResult<Vec<Developer>> {
        let query = format!("SELECT {DEVELOPER_COLUMNS} FROM developers ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, DeveloperRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Developer::from).collect())
    }

    async fn update_developer(
        &self,
        id: DeveloperId,
        patch: &DeveloperPatch,
    ) -> StoreResult<Option<Developer>> {
        let query = format!(
            r#"
            UPDATE developers SET
                name = COALESCE($2, name),
                department = COALESCE($3, department),
                avatar = COALESCE($4, avatar),
                registration_number = COALESCE($5, registration_number),
                instagram = COALESCE($6, instagram),
                linkedin = COALESCE($7, linkedin),
                email = COALESCE($8, email),
                github = COALESCE($9, github),
                batch = COALESCE($10, batch),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DEVELOPER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, DeveloperRow>(&query)
            .bind(id.0)
            .bind(&patch.name)
            .bind(&patch.department)
            .bind(&patch.avatar)
            .bind(&patch.registration_number)
            .bind(&patch.instagram)
            .bind(&patch.linkedin)
            .bind(&patch.email)
            .bind(&patch.github)
            .bind(&patch.batch)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Developer::from))
    }

    async fn delete_developer(&self, id: DeveloperId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM developers WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Contacts
// =============================================================================

#[async_trait]
impl ContactStore for PgStore {
    async fn insert_contact(&self, contact: NewContact) -> StoreResult<Contact> {
        let query = format!(
            r#"
            INSERT INTO contacts (id, name, email, department, project_name, project_detail)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CONTACT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ContactRow>(&query)
            .bind(ContactId::new().0)
            .bind(&contact.name)
            .bind(&contact.email)
            .bind(&contact.department)
            .bind(&contact.project_name)
            .bind(&contact.project_detail)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn find_contact(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        let query = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1");
        let row = sqlx::query_as::<_, ContactRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Contact::from))
    }

    async fn list_contacts(&self) -> StoreResult<Vec<Contact>> {
        let query = format!("SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, ContactRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Contact::from).collect())
    }

    async fn delete_contact(&self, id: ContactId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = eyantra_shared::create_pool(&url, 2).await.expect("pool");
        eyantra_shared::run_migrations(&pool).await.expect("migrations");
        PgStore::new(pool)
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_admin_email_unique_and_refresh_swap() {
        let store = store().await;
        let email = format!("lead-{}@lab.edu", Uuid::new_v4());
        let admin = store
            .insert_admin(NewAdmin {
                name: "Lead".to_string(),
                email: email.clone(),
                password_hash: "$argon2id$placeholder".to_string(),
            })
            .await
            .unwrap();

        let dup = store
            .insert_admin(NewAdmin {
                name: "Lead".to_string(),
                email: email.to_uppercase(),
                password_hash: "$argon2id$placeholder".to_string(),
            })
            .await
            .unwrap_err();
        assert!(dup.is_conflict());

        assert!(store.set_refresh_token(admin.id, Some("r1")).await.unwrap());
        assert!(store.replace_refresh_token(admin.id, "r1", "r2").await.unwrap());
        assert!(!store.replace_refresh_token(admin.id, "r1", "r3").await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_event_owner_guard() {
        let store = store().await;
        let admin = store
            .insert_admin(NewAdmin {
                name: "Owner".to_string(),
                email: format!("owner-{}@lab.edu", Uuid::new_v4()),
                password_hash: "$argon2id$placeholder".to_string(),
            })
            .await
            .unwrap();
        let event = store
            .insert_event(NewEvent {
                title: "Arena".to_string(),
                sub_title: None,
                description: "<p>x</p>".to_string(),
                image: "https://cdn.example.com/a.png".to_string(),
                date: OffsetDateTime::now_utc(),
                is_published: true,
                created_by: admin.id,
            })
            .await
            .unwrap();

        assert!(!store.delete_event(event.id, AdminId::new()).await.unwrap());
        let owner = store.find_admin(admin.id).await.unwrap().unwrap();
        assert_eq!(owner.events, vec![event.id]);
        assert!(store.delete_event(event.id, admin.id).await.unwrap());
    }
}
