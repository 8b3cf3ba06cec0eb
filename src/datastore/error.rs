use thiserror::*;

use super::snapshot::SnapshotError;
use super::storage::StorageError;
use crate::model::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StorageRead,
    StorageWrite,
    Parse,
    Encode,
    NotFound,
    IdsExhausted,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unable to read snapshot '{key}': {source}")]
    StorageRead { key: String, source: StorageError },

    #[error("unable to write snapshot '{key}': {source}")]
    StorageWrite { key: String, source: StorageError },

    #[error("malformed snapshot '{key}': {source}")]
    Parse { key: String, source: SnapshotError },

    #[error("unable to encode snapshot '{key}': {source}")]
    Encode { key: String, source: SnapshotError },

    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("cannot add a task: no id left after {0}")]
    IdsExhausted(TaskId),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::StorageRead { .. } => ErrorKind::StorageRead,
            StoreError::StorageWrite { .. } => ErrorKind::StorageWrite,
            StoreError::Parse { .. } => ErrorKind::Parse,
            StoreError::Encode { .. } => ErrorKind::Encode,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::IdsExhausted(_) => ErrorKind::IdsExhausted,
        }
    }
}
