//! System runner trait

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;

/// Capability to run a command against the host being configured.
///
/// Every resource check and apply-action goes through this seam, so the
/// whole configurator can be exercised against a scripted fake.
#[async_trait]
pub trait SystemRunner: Send + Sync {
    /// Run a command and capture its exit status and output.
    ///
    /// A non-zero exit status is NOT an `Err` here; callers inspect
    /// `CommandResult::success()` because "check commands" use the exit
    /// status as their answer.
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError>;

    /// Short identifier for logging ("local", "fake")
    fn runner_type(&self) -> &'static str;
}
