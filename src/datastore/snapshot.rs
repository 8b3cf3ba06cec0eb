//! Snapshot format: the whole task collection as a UTF-8 JSON array of
//! `{"id", "title", "completed"}` records, stored under a single key.

use thiserror::*;

use super::error::StoreError;
use super::storage::KeyValueStorage;
use crate::model::TaskCollection;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
}

pub fn encode(tasks: &TaskCollection) -> Result<Vec<u8>, SnapshotError> {
    Ok(serde_json::to_vec(tasks)?)
}

/// Blank input and a JSON `null` decode to `None`. Extra record fields are
/// ignored.
pub fn decode(bytes: &[u8]) -> Result<Option<TaskCollection>, SnapshotError> {
    let text = std::str::from_utf8(bytes)?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str::<Option<TaskCollection>>(text)?)
}

/// Reads and decodes the snapshot stored under `key`.
pub async fn read<S: KeyValueStorage + ?Sized>(
    storage: &S,
    key: &str,
) -> Result<Option<TaskCollection>, StoreError> {
    let bytes = storage
        .get(key)
        .await
        .map_err(|source| StoreError::StorageRead {
            key: key.to_string(),
            source,
        })?;
    match bytes {
        Some(bytes) => decode(&bytes).map_err(|source| StoreError::Parse {
            key: key.to_string(),
            source,
        }),
        None => Ok(None),
    }
}

/// Encodes `tasks` and overwrites the snapshot stored under `key`.
pub async fn write<S: KeyValueStorage + ?Sized>(
    storage: &S,
    key: &str,
    tasks: &TaskCollection,
) -> Result<(), StoreError> {
    let payload = encode(tasks).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    storage
        .set(key, payload)
        .await
        .map_err(|source| StoreError::StorageWrite {
            key: key.to_string(),
            source,
        })
}
