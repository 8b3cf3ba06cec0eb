pub mod collection;
pub mod defaults;
pub mod error;
pub mod task;

pub use collection::{IdPolicy, TaskCollection};
pub use defaults::default_tasks;
pub use error::ModelError;
pub use task::{clamp_title, Task, TaskId, MAX_TITLE_CHARS};
