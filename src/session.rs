//! Headless model of the list screen: input text, edit selection and theme.
//!
//! Rendering is left to the host; this only tracks the state that decides
//! which store operation a user action maps to.

use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use crate::datastore::{KeyValueStorage, TaskStore};
use crate::model::{clamp_title, Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    Light,
    Dark,
}

impl ColorScheme {
    pub fn toggled(self) -> Self {
        match self {
            ColorScheme::Light => ColorScheme::Dark,
            ColorScheme::Dark => ColorScheme::Light,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::Light
    }
}

/// Theme state for one application session. Passed to whoever needs it
/// instead of living in a global.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeContext {
    scheme: ColorScheme,
}

impl ThemeContext {
    pub fn new(scheme: ColorScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    pub fn set_scheme(&mut self, scheme: ColorScheme) {
        self.scheme = scheme;
    }

    pub fn toggle(&mut self) -> ColorScheme {
        self.scheme = self.scheme.toggled();
        self.scheme
    }
}

/// What [`ListSession::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    Added(TaskId),
    Updated(TaskId),
    Nothing,
}

pub struct ListSession<S: KeyValueStorage> {
    store: TaskStore<S>,
    theme: ThemeContext,
    input: String,
    selected: Option<TaskId>,
}

impl<S> ListSession<S>
where
    S: KeyValueStorage,
{
    pub fn new(store: TaskStore<S>, theme: ThemeContext) -> Self {
        Self {
            store,
            theme,
            input: String::new(),
            selected: None,
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn theme(&self) -> &ThemeContext {
        &self.theme
    }

    pub fn toggle_theme(&mut self) -> ColorScheme {
        self.theme.toggle()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn selected(&self) -> Option<TaskId> {
        self.selected
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = clamp_title(text);
    }

    /// Puts the session in edit mode for `id`, prefilling the input with its
    /// title. Unknown ids are ignored.
    pub fn select(&mut self, id: TaskId) {
        match self.store.tasks().find(id) {
            Some(task) => {
                self.input = task.title.clone();
                self.selected = Some(id);
            }
            None => debug!(id, "cannot select a missing task"),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.input.clear();
        self.selected = None;
    }

    /// Adds the input as a new task, or renames the selected task to it.
    /// Either way the input is cleared afterwards and edit mode ends.
    pub fn submit(&mut self) -> Submitted {
        let title = std::mem::take(&mut self.input);
        match self.selected.take() {
            Some(id) => {
                self.store.update_title(id, &title);
                Submitted::Updated(id)
            }
            None => match self.store.add(&title) {
                Some(id) => Submitted::Added(id),
                None => Submitted::Nothing,
            },
        }
    }

    pub fn toggle_completed(&mut self, id: TaskId) {
        self.store.toggle_completed(id);
    }

    pub fn delete(&mut self, id: TaskId) {
        if self.selected == Some(id) {
            self.cancel_edit();
        }
        self.store.delete(id);
    }

    /// Tasks as the list shows them: highest id first.
    pub fn visible_tasks(&self) -> Vec<Task> {
        self.store.tasks().display_order()
    }
}
