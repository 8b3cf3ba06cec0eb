use thiserror::Error;

use super::TaskId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("task {0} not found")]
    NotFound(TaskId),
    #[error("no task id left after {0}")]
    IdsExhausted(TaskId),
}
