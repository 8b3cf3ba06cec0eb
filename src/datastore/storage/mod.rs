mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;

// Storage
#[async_trait::async_trait]
pub trait KeyValueStorage: Sync + Send + 'static {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    /// Overwrites the whole value stored under `key`.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;
}
