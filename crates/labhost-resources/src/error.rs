//! Error types for labhost-resources

use thiserror::Error;

use labhost_exec::ExecError;

/// Errors that can occur while checking or applying a resource
#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    /// Could not launch the underlying command at all
    #[error("execution error: {0}")]
    Exec(#[from] ExecError),

    /// The invoked system tool returned non-zero
    #[error("command failed: {status} - {message}")]
    CommandFailed {
        /// Exit status
        status: i32,
        /// stderr (or stdout when stderr is empty)
        message: String,
    },

    /// Config file could not be created
    #[error("cannot write {path}: {reason}")]
    Write {
        /// Target path
        path: String,
        /// Underlying I/O failure
        reason: String,
    },

    /// A template placeholder had no value
    #[error("no value for template parameter {0:?}")]
    MissingParameter(String),

    /// Resource has no removal action
    #[error("{0} does not support removal")]
    RemovalUnsupported(String),
}

impl ResourceError {
    /// Build a `CommandFailed` from a finished command's output.
    #[must_use]
    pub fn from_output(result: &labhost_exec::CommandResult) -> Self {
        let message = if result.stderr.trim().is_empty() {
            result.stdout.trim().to_string()
        } else {
            result.stderr.trim().to_string()
        };
        ResourceError::CommandFailed {
            status: result.status,
            message,
        }
    }
}
