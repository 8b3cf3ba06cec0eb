use parking_lot::Mutex;
use tracing::{debug, error, warn};

use super::error::{ErrorKind, StoreError};

/// Receives every error the store absorbs instead of propagating.
pub trait Diagnostics: Send + Sync + 'static {
    fn report(&self, error: &StoreError);
}

/// Forwards absorbed errors to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, err: &StoreError) {
        match err.kind() {
            ErrorKind::NotFound => debug!(err = %err, "ignoring operation on a missing task"),
            ErrorKind::Parse => warn!(err = %err, "discarding unreadable snapshot"),
            ErrorKind::IdsExhausted => warn!(err = %err, "refusing to add a task"),
            _ => error!(err = %err, "storage operation failed"),
        }
    }
}

/// Keeps absorbed errors in memory, for hosts and tests that need to look at
/// them.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    reports: Mutex<Vec<(ErrorKind, String)>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.reports.lock().iter().map(|(kind, _)| *kind).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.reports.lock().iter().map(|(_, msg)| msg.clone()).collect()
    }

    pub fn count(&self, kind: ErrorKind) -> usize {
        self.reports.lock().iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn clear(&self) {
        self.reports.lock().clear();
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, err: &StoreError) {
        TracingDiagnostics.report(err);
        self.reports.lock().push((err.kind(), err.to_string()));
    }
}
