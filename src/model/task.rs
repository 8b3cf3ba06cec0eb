use serde_derive::{Deserialize, Serialize};

/// Upper bound on title length enforced by input surfaces.
pub const MAX_TITLE_CHARS: usize = 180;

pub type TaskId = u64;

/// Task is a single to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
}

impl Task {
    pub fn new<T: Into<String>>(id: TaskId, title: T) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// Matches the id the way routing parameters arrive: as text.
    pub fn has_text_id(&self, id: &str) -> bool {
        self.id.to_string() == id
    }
}

/// Truncates `title` to at most [`MAX_TITLE_CHARS`] characters.
pub fn clamp_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_CHARS).collect()
}
