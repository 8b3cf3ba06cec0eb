//! On-device to-do task store.
//!
//! [`TaskStore`](datastore::TaskStore) owns the task list of the main screen
//! and writes every change through to a [`KeyValueStorage`](datastore::KeyValueStorage).
//! [`TaskEditor`](datastore::TaskEditor) is the independent single-task edit
//! path that reads and rewrites the same stored snapshot.

pub mod config;
pub mod datastore;
pub mod log;
pub mod model;
pub mod session;

pub use datastore::{
    Diagnostics, KeyValueStorage, SaveOutcome, StoreError, StoreSettings, TaskEditor, TaskStore,
};
pub use model::{IdPolicy, Task, TaskCollection, TaskId};

#[cfg(test)]
mod scenarios;
