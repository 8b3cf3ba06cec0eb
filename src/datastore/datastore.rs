use std::sync::Arc;
use tracing::{debug, info};

use super::diagnostics::Diagnostics;
use super::error::StoreError;
use super::snapshot;
use super::storage::KeyValueStorage;
use super::writer::SnapshotWriter;
use crate::model::{default_tasks, IdPolicy, ModelError, Task, TaskCollection, TaskId};

pub const DEFAULT_SNAPSHOT_KEY: &str = "TodoApp";

#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Key the snapshot is stored under.
    pub key: String,
    pub id_policy: IdPolicy,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            key: DEFAULT_SNAPSHOT_KEY.to_string(),
            id_policy: IdPolicy::default(),
        }
    }
}

/// Owns the in-memory task list of the list screen and writes every change
/// through to storage.
///
/// Mutations apply to memory immediately; the snapshot write is queued and
/// performed in the background. Storage and parse errors never reach the
/// caller, they are handed to the injected [`Diagnostics`].
pub struct TaskStore<S: KeyValueStorage> {
    tasks: TaskCollection,
    storage: Arc<S>,
    settings: StoreSettings,
    diagnostics: Arc<dyn Diagnostics>,
    writer: SnapshotWriter,
}

impl<S> TaskStore<S>
where
    S: KeyValueStorage,
{
    /// Must be called from within a Tokio runtime.
    pub fn new(
        storage: Arc<S>,
        settings: StoreSettings,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        let writer =
            SnapshotWriter::spawn(storage.clone(), settings.key.clone(), diagnostics.clone());
        Self {
            tasks: TaskCollection::new(),
            storage,
            settings,
            diagnostics,
            writer,
        }
    }

    pub fn tasks(&self) -> &TaskCollection {
        &self.tasks
    }

    /// Adopts the saved snapshot, or the default list when there is nothing
    /// usable to adopt.
    ///
    /// The default list is written back only when the snapshot was absent or
    /// empty; an unreadable or malformed snapshot is left in place until the
    /// next mutation.
    pub async fn initialize(&mut self) {
        info!(key = &*self.settings.key, "Loading tasks from storage...");
        match snapshot::read(self.storage.as_ref(), &self.settings.key).await {
            Ok(Some(tasks)) if !tasks.is_empty() => {
                self.tasks = tasks;
            }
            Ok(_) => {
                info!("No saved tasks, using the default list.");
                self.tasks = default_tasks();
                self.persist();
            }
            Err(err) => {
                self.diagnostics.report(&err);
                self.tasks = default_tasks();
            }
        }
        info!("Loaded tasks: {}", self.tasks.len());
    }

    /// Re-reads the snapshot and adopts it when it holds any tasks.
    ///
    /// Returns whether the in-memory list was replaced.
    pub async fn reload(&mut self) -> bool {
        match snapshot::read(self.storage.as_ref(), &self.settings.key).await {
            Ok(Some(tasks)) if !tasks.is_empty() => {
                debug!(count = tasks.len(), "reloaded tasks from storage");
                self.tasks = tasks;
                true
            }
            Ok(_) => false,
            Err(err) => {
                self.diagnostics.report(&err);
                false
            }
        }
    }

    /// Appends a new open task and returns its id. Blank titles are ignored,
    /// as is any add once the largest id is taken.
    pub fn add(&mut self, title: &str) -> Option<TaskId> {
        if title.trim().is_empty() {
            debug!("ignoring task with a blank title");
            return None;
        }
        let id = match self.tasks.next_id(self.settings.id_policy) {
            Ok(id) => id,
            Err(err) => {
                self.absorb(Err(err));
                return None;
            }
        };
        self.tasks.push(Task::new(id, title));
        debug!(id, "task added");
        self.persist();
        Some(id)
    }

    pub fn delete(&mut self, id: TaskId) {
        let res = self.tasks.remove(id).map(|_| ());
        self.absorb(res);
        self.persist();
    }

    pub fn toggle_completed(&mut self, id: TaskId) {
        let res = self.tasks.toggle(id).map(|_| ());
        self.absorb(res);
        self.persist();
    }

    pub fn update_title(&mut self, id: TaskId, title: &str) {
        let res = self.tasks.rename(id, title.to_string());
        self.absorb(res);
        self.persist();
    }

    /// Waits for every queued snapshot write to be attempted.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    fn absorb(&self, res: Result<(), ModelError>) {
        match res {
            Ok(()) => {}
            Err(ModelError::NotFound(id)) => self.diagnostics.report(&StoreError::NotFound(id)),
            Err(ModelError::IdsExhausted(id)) => {
                self.diagnostics.report(&StoreError::IdsExhausted(id))
            }
        }
    }

    fn persist(&self) {
        match snapshot::encode(&self.tasks) {
            Ok(payload) => self.writer.submit(payload),
            Err(source) => self.diagnostics.report(&StoreError::Encode {
                key: self.settings.key.clone(),
                source,
            }),
        }
    }
}
