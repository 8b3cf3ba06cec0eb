use serde_derive::{Deserialize, Serialize};

use super::error::ModelError;
use super::task::{Task, TaskId};

/// How a new task id is derived from the current collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// `max(ids) + 1`.
    MaxPlusOne,
    /// `(first element id) + 1`. Only yields a fresh id while the collection
    /// is kept sorted by descending id; may collide otherwise.
    FirstPlusOne,
}

impl Default for IdPolicy {
    fn default() -> Self {
        IdPolicy::MaxPlusOne
    }
}

/// Ordered tasks as held in memory and persisted in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TaskCollection(Vec<Task>);

impl TaskCollection {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.0
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.0.iter().find(|task| task.id == id)
    }

    pub fn find_by_text_id(&self, id: &str) -> Option<&Task> {
        self.0.iter().find(|task| task.has_text_id(id))
    }

    pub fn next_id(&self, policy: IdPolicy) -> Result<TaskId, ModelError> {
        let base = match policy {
            IdPolicy::MaxPlusOne => self.0.iter().map(|task| task.id).max(),
            IdPolicy::FirstPlusOne => self.0.first().map(|task| task.id),
        };
        match base {
            Some(id) => id.checked_add(1).ok_or(ModelError::IdsExhausted(id)),
            None => Ok(1),
        }
    }

    pub fn push(&mut self, task: Task) {
        self.0.push(task);
    }

    pub fn remove(&mut self, id: TaskId) -> Result<Task, ModelError> {
        let index = self
            .0
            .iter()
            .position(|task| task.id == id)
            .ok_or(ModelError::NotFound(id))?;
        Ok(self.0.remove(index))
    }

    pub fn toggle(&mut self, id: TaskId) -> Result<bool, ModelError> {
        let task = self.get_mut(id)?;
        task.toggle();
        Ok(task.completed)
    }

    pub fn rename(&mut self, id: TaskId, title: String) -> Result<(), ModelError> {
        self.get_mut(id)?.title = title;
        Ok(())
    }

    /// Replaces every task sharing `task.id` with `task`.
    pub fn replace(&mut self, task: &Task) -> Result<(), ModelError> {
        let mut matched = false;
        for slot in self.0.iter_mut().filter(|slot| slot.id == task.id) {
            *slot = task.clone();
            matched = true;
        }
        if matched {
            Ok(())
        } else {
            Err(ModelError::NotFound(task.id))
        }
    }

    /// Tasks in display order: newest (highest id) first.
    pub fn display_order(&self) -> Vec<Task> {
        let mut list = self.0.clone();
        list.sort_by(|a, b| b.id.cmp(&a.id));
        list
    }

    fn get_mut(&mut self, id: TaskId) -> Result<&mut Task, ModelError> {
        self.0
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(ModelError::NotFound(id))
    }
}

impl From<Vec<Task>> for TaskCollection {
    fn from(tasks: Vec<Task>) -> Self {
        Self(tasks)
    }
}

impl From<TaskCollection> for Vec<Task> {
    fn from(collection: TaskCollection) -> Self {
        collection.0
    }
}

impl FromIterator<Task> for TaskCollection {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TaskCollection {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
