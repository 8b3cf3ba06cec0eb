mod datastore;
mod diagnostics;
mod editor;
mod error;
pub mod snapshot;
pub mod storage;
mod writer;

pub use datastore::{StoreSettings, TaskStore, DEFAULT_SNAPSHOT_KEY};
pub use diagnostics::{Diagnostics, RecordingDiagnostics, TracingDiagnostics};
pub use editor::{SaveOutcome, TaskEditor};
pub use error::{ErrorKind, StoreError};
pub use snapshot::SnapshotError;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use writer::SnapshotWriter;
