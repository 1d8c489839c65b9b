use std::collections::HashMap;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::code::CodeRecord;
use crate::models::usage::UsageEvent;
use crate::models::user::UserRecord;
use crate::state::AppState;

/// The checkpoint document: both indices plus the full usage log, written
/// wholesale on each checkpoint. Not an incremental log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub users: HashMap<String, UserRecord>,
    pub codes: HashMap<String, CodeRecord>,
    pub events: Vec<UsageEvent>,
    pub saved_at: DateTime<Utc>,
}

/// Serializes a checkpoint document to `path`, creating parent directories
/// as needed.
pub async fn save(path: &Path, state: &PersistedState) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = sonic_rs::to_string(state)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Loads a previously saved checkpoint, or `None` if no file exists yet.
pub async fn load(path: &Path) -> Result<Option<PersistedState>> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Ok(Some(sonic_rs::from_str(&raw)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Checkpoints the live store to the configured data file.
///
/// The state is cloned under the lock and serialized and written after the
/// lock is released, so a disk write never blocks in-memory readers.
pub async fn checkpoint(state: &AppState) -> Result<()> {
    let persisted = {
        let store = state.store.read().unwrap();
        store.to_persisted(Utc::now())
    };
    save(&state.config.data_file, &persisted).await
}
