use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use super::error::StorageError;
use super::KeyValueStorage;

/// In-process key-value storage.
///
/// Clones share the same underlying map, so two components holding a clone
/// observe each other's writes the way two screens share one device store.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value<K: Into<String>>(key: K, value: Vec<u8>) -> Self {
        let storage = Self::new();
        storage.values.lock().insert(key.into(), value);
        storage
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Release);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Acquire)
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.values.lock().get(key).cloned()
    }
}

#[async_trait::async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if self.fail_reads.load(Ordering::Acquire) {
            return Err(StorageError::Unavailable(format!("read of '{}' refused", key)));
        }
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(StorageError::Unavailable(format!("write of '{}' refused", key)));
        }
        self.values.lock().insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
