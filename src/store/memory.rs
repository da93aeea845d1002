//! In-memory user store for tests and ephemeral runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Mutator, UserStore, apply_mutation};
use crate::error::Result;
use crate::user::{UserId, UserRecord};

/// Records held in an `Arc<RwLock<HashMap>>`; cheaply cloneable.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, UserRecord>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records.
    pub fn with_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let users = records
            .into_iter()
            .map(|r| (r.user_id.clone(), r))
            .collect();
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn get_all(&self) -> Result<HashMap<UserId, UserRecord>> {
        Ok(self.users.read().await.clone())
    }

    async fn upsert(&self, user_id: &str, mutate: Mutator) -> Result<UserRecord> {
        let mut users = self.users.write().await;
        let record = apply_mutation(&mut users, user_id, mutate, true);
        Ok(record.unwrap_or_else(|| UserRecord::new(user_id)))
    }

    async fn update(&self, user_id: &str, mutate: Mutator) -> Result<Option<UserRecord>> {
        let mut users = self.users.write().await;
        Ok(apply_mutation(&mut users, user_id, mutate, false))
    }
}
