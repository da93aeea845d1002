//! User record storage.
//!
//! Every mutation is a read-modify-write of the full collection: the backend
//! reads the latest persisted state, applies one closure, and writes the whole
//! collection back. Callers must never hold a record across an `.await` and
//! write it back wholesale; they pass a [`Mutator`] that touches only the
//! fields they mean to change.

pub mod json_file;
pub mod memory;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::user::{UserId, UserRecord};

pub use json_file::JsonFileUserStore;
pub use memory::MemoryUserStore;

/// Field-level change applied to one record.
pub type Mutator = Box<dyn FnOnce(&mut UserRecord) + Send>;

/// Async user record storage backend.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load one record.
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>>;

    /// Load every record, keyed by user identifier.
    async fn get_all(&self) -> Result<HashMap<UserId, UserRecord>>;

    /// Apply `mutate` to the current record, or to a default-initialized one
    /// when absent, and persist the collection.
    ///
    /// On error nothing is persisted. Returns the record as written.
    async fn upsert(&self, user_id: &str, mutate: Mutator) -> Result<UserRecord>;

    /// Like [`upsert`](Self::upsert) but leaves absent users absent.
    ///
    /// Returns `Ok(None)` without writing when the user does not exist.
    async fn update(&self, user_id: &str, mutate: Mutator) -> Result<Option<UserRecord>>;
}

/// Apply a mutator over an in-memory collection.
///
/// Shared by the backends so upsert/update semantics stay identical.
pub(crate) fn apply_mutation(
    users: &mut HashMap<UserId, UserRecord>,
    user_id: &str,
    mutate: Mutator,
    create_missing: bool,
) -> Option<UserRecord> {
    if !users.contains_key(user_id) {
        if !create_missing {
            return None;
        }
        users.insert(user_id.to_owned(), UserRecord::new(user_id));
    }
    let record = users.get_mut(user_id)?;
    mutate(record);
    // The map key is authoritative for identity.
    record.user_id = user_id.to_owned();
    Some(record.clone())
}
