//! Error types for the expedition scheduler.

use crate::catalog::ExpeditionId;

/// Top-level error type for scheduler operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpeditionError {
    /// A roster expedition could not be located on the in-game list.
    ///
    /// This means the roster names content the account has not unlocked
    /// (or an id that does not exist), which no amount of retrying fixes.
    /// Callers are expected to stop the run and surface the message.
    #[error("could not find expedition {expedition}; make sure it is unlocked")]
    ExpeditionNotFound {
        /// Roster entry that failed to resolve on screen.
        expedition: ExpeditionId,
    },

    /// Configuration error (unreadable file, invalid roster).
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ExpeditionError>;
