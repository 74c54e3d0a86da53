//! Error types for labhost-exec

use thiserror::Error;

/// Errors that can occur while launching a command.
///
/// Commands that launch but exit non-zero are reported through
/// `CommandResult::status`, not through this enum.
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// Process spawn error
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// I/O error during execution
    #[error("I/O error: {0}")]
    IoError(String),
}
