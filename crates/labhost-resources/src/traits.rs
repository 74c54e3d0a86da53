//! Resource trait

use async_trait::async_trait;

use crate::error::ResourceError;

/// One declarative configuration requirement.
///
/// Applying a resource whose predicate already holds must perform no
/// action; re-running the whole configurator is the retry mechanism, so
/// every implementation has to be safe to repeat.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Stable identifier used in reports and status lines
    fn id(&self) -> String;

    /// Does the live system already satisfy this requirement?
    async fn is_satisfied(&self) -> Result<bool, ResourceError>;

    /// Drive the system to the desired state.
    ///
    /// Only called when `is_satisfied` returned false; implementations
    /// may still guard again since checks are cheap.
    async fn apply(&self) -> Result<(), ResourceError>;

    /// Undo the requirement, for the narrow removal modes.
    ///
    /// Removing something that is not present is a no-op success.
    async fn remove(&self) -> Result<(), ResourceError> {
        Err(ResourceError::RemovalUnsupported(self.id()))
    }
}
