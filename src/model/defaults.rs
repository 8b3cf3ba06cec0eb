//! Bundled task list used when no snapshot has been saved yet.

use super::{Task, TaskCollection};

const DEFAULT_TASKS: [(u64, &str, bool); 6] = [
    (1, "Learn the basics of the app", false),
    (2, "Add a task of your own", false),
    (3, "Long press a task to complete it", true),
    (4, "Tap a task to edit its title", false),
    (5, "Switch between light and dark theme", false),
    (6, "Delete the tasks you no longer need", false),
];

pub fn default_tasks() -> TaskCollection {
    DEFAULT_TASKS
        .iter()
        .map(|(id, title, completed)| Task {
            id: *id,
            title: title.to_string(),
            completed: *completed,
        })
        .collect()
}
