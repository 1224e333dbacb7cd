//! Admin credential operations over the admin store.
//!
//! This is the only place that hashes passwords or writes the password and
//! refresh-token columns.

use std::sync::Arc;

use eyantra_shared::{normalize_email, Admin, AdminAccount, AdminId, NewAdmin, StoreError};

use super::password::{hash_password, verify_password, PasswordError};
use crate::error::ApiError;
use crate::store::AdminStore;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("Password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Store(err) => err.into(),
            other => {
                tracing::error!(error = %other, "Credential operation failed");
                ApiError::Internal
            }
        }
    }
}

#[derive(Clone)]
pub struct CredentialStore {
    admins: Arc<dyn AdminStore>,
}

impl CredentialStore {
    pub fn new(admins: Arc<dyn AdminStore>) -> Self {
        Self { admins }
    }

    /// Hash the password off the async runtime, then persist the admin.
    /// Fails with a store conflict when the email is already registered.
    pub async fn create_admin(
        &self,
        name: &str,
        email: &str,
        raw_password: &str,
    ) -> Result<Admin, CredentialError> {
        let password_hash = hash_blocking(raw_password).await?;
        let admin = self
            .admins
            .insert_admin(NewAdmin {
                name: name.trim().to_string(),
                email: normalize_email(email),
                password_hash,
            })
            .await?;
        Ok(admin)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, CredentialError> {
        Ok(self.admins.find_account_by_email(email).await?)
    }

    pub async fn find_account(&self, id: AdminId) -> Result<Option<AdminAccount>, CredentialError> {
        Ok(self.admins.find_account(id).await?)
    }

    /// Admin projection without password hash or refresh token
    pub async fn find_admin(&self, id: AdminId) -> Result<Option<Admin>, CredentialError> {
        Ok(self.admins.find_admin(id).await?)
    }

    pub async fn verify_password(
        &self,
        account: &AdminAccount,
        raw_password: &str,
    ) -> Result<bool, CredentialError> {
        let password = raw_password.to_string();
        let hash = account.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await??;
        Ok(valid)
    }

    /// Overwrite the stored refresh token. Touches nothing else.
    pub async fn rotate_refresh_token(
        &self,
        id: AdminId,
        token: &str,
    ) -> Result<bool, CredentialError> {
        Ok(self.admins.set_refresh_token(id, Some(token)).await?)
    }

    /// Store `new` only if `presented` is still the live refresh token.
    pub async fn swap_refresh_token(
        &self,
        id: AdminId,
        presented: &str,
        new: &str,
    ) -> Result<bool, CredentialError> {
        Ok(self.admins.replace_refresh_token(id, presented, new).await?)
    }

    pub async fn clear_refresh_token(&self, id: AdminId) -> Result<bool, CredentialError> {
        Ok(self.admins.set_refresh_token(id, None).await?)
    }

    /// The only path that rewrites a password hash after creation
    pub async fn set_password(
        &self,
        id: AdminId,
        raw_password: &str,
    ) -> Result<bool, CredentialError> {
        let password_hash = hash_blocking(raw_password).await?;
        Ok(self.admins.set_password_hash(id, &password_hash).await?)
    }
}

async fn hash_blocking(raw_password: &str) -> Result<String, CredentialError> {
    let password = raw_password.to_string();
    Ok(tokio::task::spawn_blocking(move || hash_password(&password)).await??)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn credentials() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_password_round_trip() {
        let creds = credentials();
        let admin = creds
            .create_admin("  Lab Lead ", " Lead@Lab.EDU", "secret1")
            .await
            .unwrap();
        assert_eq!(admin.name, "Lab Lead");
        assert_eq!(admin.email, "lead@lab.edu");

        let account = creds.find_by_email("LEAD@lab.edu").await.unwrap().unwrap();
        assert_ne!(account.password_hash, "secret1");
        assert!(creds.verify_password(&account, "secret1").await.unwrap());
        assert!(!creds.verify_password(&account, "secret2").await.unwrap());
        assert!(!creds.verify_password(&account, "Secret1").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let creds = credentials();
        creds.create_admin("A", "a@lab.edu", "secret1").await.unwrap();

        let err = creds
            .create_admin("B", "A@LAB.EDU", "secret2")
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::Store(ref e) if e.is_conflict()));
    }

    #[tokio::test]
    async fn test_rotation_leaves_password_alone() {
        let creds = credentials();
        let admin = creds.create_admin("A", "a@lab.edu", "secret1").await.unwrap();
        let before = creds.find_account(admin.id).await.unwrap().unwrap();

        creds.rotate_refresh_token(admin.id, "r1").await.unwrap();

        let after = creds.find_account(admin.id).await.unwrap().unwrap();
        assert_eq!(after.password_hash, before.password_hash);
        assert_eq!(after.refresh_token.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_set_password_replaces_hash() {
        let creds = credentials();
        let admin = creds.create_admin("A", "a@lab.edu", "secret1").await.unwrap();

        assert!(creds.set_password(admin.id, "newsecret").await.unwrap());

        let account = creds.find_account(admin.id).await.unwrap().unwrap();
        assert!(creds.verify_password(&account, "newsecret").await.unwrap());
        assert!(!creds.verify_password(&account, "secret1").await.unwrap());
    }

    #[tokio::test]
    async fn test_swap_is_single_use() {
        let creds = credentials();
        let admin = creds.create_admin("A", "a@lab.edu", "secret1").await.unwrap();
        creds.rotate_refresh_token(admin.id, "r1").await.unwrap();

        assert!(creds.swap_refresh_token(admin.id, "r1", "r2").await.unwrap());
        assert!(!creds.swap_refresh_token(admin.id, "r1", "r3").await.unwrap());

        creds.clear_refresh_token(admin.id).await.unwrap();
        assert!(!creds.swap_refresh_token(admin.id, "r2", "r4").await.unwrap());
    }
}
