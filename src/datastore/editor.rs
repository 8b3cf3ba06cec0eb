use std::sync::Arc;
use tracing::debug;

use super::diagnostics::Diagnostics;
use super::snapshot;
use super::storage::KeyValueStorage;
use crate::model::{Task, TaskCollection};

/// Result of [`TaskEditor::save_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The snapshot held the task and it was replaced.
    Replaced,
    /// The snapshot was absent or empty and now holds only the edited task.
    Seeded,
    /// The snapshot held other tasks but not this one; it was written back
    /// unchanged.
    Unmatched,
    /// Reading or writing failed; nothing is known to have been saved.
    Failed,
}

impl SaveOutcome {
    /// Whether the edit view may close.
    pub fn is_done(&self) -> bool {
        !matches!(self, SaveOutcome::Failed)
    }
}

/// Single-task edit path.
///
/// Works directly against the stored snapshot and shares no state with a
/// [`TaskStore`](super::TaskStore). Every call re-reads the snapshot, and
/// `save_one` overwrites it wholesale, so it races with any other writer of
/// the same key: whichever write lands last wins.
pub struct TaskEditor<S: KeyValueStorage> {
    storage: Arc<S>,
    key: String,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<S> TaskEditor<S>
where
    S: KeyValueStorage,
{
    pub fn new<K: Into<String>>(
        storage: Arc<S>,
        key: K,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            storage,
            key: key.into(),
            diagnostics,
        }
    }

    /// Looks a task up by its id as routing text.
    pub async fn load_one(&self, id: &str) -> Option<Task> {
        let tasks = self.read().await?;
        let found = tasks.find_by_text_id(id).cloned();
        if found.is_none() {
            debug!(id, "task not in snapshot");
        }
        found
    }

    pub async fn save_one(&self, edited: Task) -> SaveOutcome {
        let current = match snapshot::read(self.storage.as_ref(), &self.key).await {
            Ok(current) => current,
            Err(err) => {
                self.diagnostics.report(&err);
                return SaveOutcome::Failed;
            }
        };

        let (tasks, outcome) = match current {
            Some(mut tasks) if !tasks.is_empty() => match tasks.replace(&edited) {
                Ok(()) => (tasks, SaveOutcome::Replaced),
                Err(_) => {
                    debug!(
                        id = edited.id,
                        "edited task no longer stored, writing snapshot back as read"
                    );
                    (tasks, SaveOutcome::Unmatched)
                }
            },
            _ => (TaskCollection::from(vec![edited]), SaveOutcome::Seeded),
        };

        match snapshot::write(self.storage.as_ref(), &self.key, &tasks).await {
            Ok(()) => outcome,
            Err(err) => {
                self.diagnostics.report(&err);
                SaveOutcome::Failed
            }
        }
    }

    async fn read(&self) -> Option<TaskCollection> {
        match snapshot::read(self.storage.as_ref(), &self.key).await {
            Ok(Some(tasks)) if !tasks.is_empty() => Some(tasks),
            Ok(_) => None,
            Err(err) => {
                self.diagnostics.report(&err);
                None
            }
        }
    }
}
