//! Principal repository seam.
//!
//! Durable persistence belongs to the surrounding platform. The auth core
//! talks to it through this trait; the in-memory implementation backs tests
//! and local development.

use dashmap::DashMap;
use gallery_core::axum::async_trait;
use gallery_core::error::AppError;
use uuid::Uuid;

use crate::models::Principal;

#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<Principal>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, AppError>;
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<Principal>, AppError>;
    async fn insert(&self, principal: &Principal) -> Result<(), AppError>;
    async fn save(&self, principal: &Principal) -> Result<(), AppError>;
    async fn delete(&self, user_id: Uuid) -> Result<(), AppError>;
}

/// In-memory principal store keyed by id, with email lookups over a
/// secondary index.
#[derive(Default)]
pub struct MemoryPrincipalStore {
    by_id: DashMap<Uuid, Principal>,
    id_by_email: DashMap<String, Uuid>,
}

impl MemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl PrincipalRepository for MemoryPrincipalStore {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<Principal>, AppError> {
        Ok(self.by_id.get(&user_id).map(|p| p.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, AppError> {
        let id = match self.id_by_email.get(&normalize_email(email)) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.by_id.get(&id).map(|p| p.clone()))
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<Principal>, AppError> {
        Ok(self
            .by_id
            .iter()
            .find(|p| p.google_id.as_deref() == Some(google_id))
            .map(|p| p.clone()))
    }

    async fn insert(&self, principal: &Principal) -> Result<(), AppError> {
        let email_key = normalize_email(&principal.email);
        if self.id_by_email.contains_key(&email_key) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Email already registered"
            )));
        }
        self.id_by_email.insert(email_key, principal.user_id);
        self.by_id.insert(principal.user_id, principal.clone());
        Ok(())
    }

    async fn save(&self, principal: &Principal) -> Result<(), AppError> {
        if !self.by_id.contains_key(&principal.user_id) {
            return Err(AppError::NotFound(anyhow::anyhow!("User not found")));
        }
        let mut updated = principal.clone();
        updated.updated_utc = chrono::Utc::now();
        self.by_id.insert(principal.user_id, updated);
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), AppError> {
        if let Some((_, principal)) = self.by_id.remove(&user_id) {
            self.id_by_email.remove(&normalize_email(&principal.email));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{hash_password, Password};

    fn principal(email: &str) -> Principal {
        let hash = hash_password(&Password::new("secret123".to_string())).expect("hash");
        Principal::new(email.to_string(), hash.into_string(), None)
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = MemoryPrincipalStore::new();
        let p = principal("ann@example.com");
        store.insert(&p).await.expect("insert");

        let by_id = store.find_by_id(p.user_id).await.expect("find");
        assert!(by_id.is_some());

        let by_email = store.find_by_email("Ann@Example.com").await.expect("find");
        assert_eq!(by_email.map(|p| p.user_id), Some(p.user_id));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryPrincipalStore::new();
        store
            .insert(&principal("ann@example.com"))
            .await
            .expect("insert");

        let result = store.insert(&principal("ANN@example.com")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_save_updates_fields() {
        let store = MemoryPrincipalStore::new();
        let mut p = principal("bob@example.com");
        store.insert(&p).await.expect("insert");

        p.email_verified = true;
        store.save(&p).await.expect("save");

        let loaded = store
            .find_by_id(p.user_id)
            .await
            .expect("find")
            .expect("present");
        assert!(loaded.email_verified);
    }

    #[tokio::test]
    async fn test_delete_removes_email_index() {
        let store = MemoryPrincipalStore::new();
        let p = principal("carl@example.com");
        store.insert(&p).await.expect("insert");
        store.delete(p.user_id).await.expect("delete");

        assert!(store
            .find_by_email("carl@example.com")
            .await
            .expect("find")
            .is_none());
    }
}
