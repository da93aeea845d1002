//! JSON-file user store.
//!
//! All users live in one human-inspectable document mapping user id to
//! record. Writes go to a temp file which is fsynced and renamed over the
//! original, so a crash mid-write leaves the previous collection intact.
//!
//! Mutations are serialized through one async mutex, and each one re-reads
//! the file under that lock before writing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error};

use super::{Mutator, UserStore, apply_mutation};
use crate::error::{CheckinError, Result};
use crate::user::{UserId, UserRecord};

/// Default file name inside the data directory.
pub const USERS_FILE: &str = "users.json";

/// Filesystem-backed [`UserStore`].
#[derive(Debug)]
pub struct JsonFileUserStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileUserStore {
    /// Store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at `data_dir/users.json`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Persistence`] if the directory cannot be created.
    pub async fn open_in(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await.map_err(|e| {
            CheckinError::Persistence(format!(
                "cannot create data directory {}: {e}",
                data_dir.display()
            ))
        })?;
        Ok(Self::new(data_dir.join(USERS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<UserId, UserRecord>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(CheckinError::Persistence(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )));
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(HashMap::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            CheckinError::Persistence(format!("cannot parse {}: {e}", self.path.display()))
        })
    }

    async fn save(&self, users: &HashMap<UserId, UserRecord>) -> Result<()> {
        let json = serde_json::to_vec_pretty(users)
            .map_err(|e| CheckinError::Persistence(format!("cannot serialize users: {e}")))?;

        let tmp_path = self.tmp_path();
        let write_res = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(&json).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp_path, &self.path).await
        }
        .await;

        write_res.map_err(|e| {
            CheckinError::Persistence(format!("cannot write {}: {e}", self.path.display()))
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| USERS_FILE.to_owned());
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    async fn mutate(
        &self,
        user_id: &str,
        mutate: Mutator,
        create_missing: bool,
    ) -> Result<Option<UserRecord>> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.load().await?;
        let Some(record) = apply_mutation(&mut users, user_id, mutate, create_missing) else {
            return Ok(None);
        };
        if let Err(e) = self.save(&users).await {
            error!(user_id, "user record change discarded: {e}");
            return Err(e);
        }
        debug!(user_id, path = %self.path.display(), "user record written");
        Ok(Some(record))
    }
}

#[async_trait]
impl UserStore for JsonFileUserStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>> {
        Ok(self.load().await?.remove(user_id))
    }

    async fn get_all(&self) -> Result<HashMap<UserId, UserRecord>> {
        self.load().await
    }

    async fn upsert(&self, user_id: &str, mutate: Mutator) -> Result<UserRecord> {
        let record = self.mutate(user_id, mutate, true).await?;
        Ok(record.unwrap_or_else(|| UserRecord::new(user_id)))
    }

    async fn update(&self, user_id: &str, mutate: Mutator) -> Result<Option<UserRecord>> {
        self.mutate(user_id, mutate, false).await
    }
}
