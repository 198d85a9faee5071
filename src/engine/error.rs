use chrono::NaiveDate;

use crate::model::ClockWindow;
use crate::store::StoreError;

#[derive(Debug)]
pub enum EngineError {
    /// Report range with the end day before the start day.
    InvalidRange { start: NaiveDate, end: NaiveDate },
    /// Caller-supplied shift window with a non-positive length.
    InvalidShift {
        shift: &'static str,
        window: ClockWindow,
    },
    LimitExceeded(&'static str),
    /// Collaborator failure, propagated unchanged.
    Store(StoreError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidRange { start, end } => {
                write!(f, "invalid range: end day {end} before start day {start}")
            }
            EngineError::InvalidShift { shift, window } => {
                write!(
                    f,
                    "invalid {shift} shift: [{}, {}) is empty",
                    window.start, window.end
                )
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Store(e) => Some(e),
            _ => None,
        }
    }
}
