//! System user resource

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use labhost_exec::SystemRunner;

use crate::error::ResourceError;
use crate::traits::Resource;

/// A local account that must exist.
///
/// When a password is supplied it is set right after creation; an
/// account that already exists keeps whatever password it has.
pub struct SystemUser {
    name: String,
    password: Option<String>,
    runner: Arc<dyn SystemRunner>,
}

impl SystemUser {
    /// Require account `name` to exist
    pub fn new(name: impl Into<String>, runner: Arc<dyn SystemRunner>) -> Self {
        Self {
            name: name.into(),
            password: None,
            runner,
        }
    }

    /// Set this password on creation
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

#[async_trait]
impl Resource for SystemUser {
    fn id(&self) -> String {
        format!("user {}", self.name)
    }

    #[instrument(skip(self), fields(user = %self.name))]
    async fn is_satisfied(&self) -> Result<bool, ResourceError> {
        let result = self.runner.run(&format!("id -u {}", self.name)).await?;
        Ok(result.success())
    }

    #[instrument(skip(self), fields(user = %self.name))]
    async fn apply(&self) -> Result<(), ResourceError> {
        info!(user = %self.name, "creating account");

        let cmd = format!("useradd --create-home --shell /bin/bash {}", self.name);
        let result = self.runner.run(&cmd).await?;
        if !result.success() {
            return Err(ResourceError::from_output(&result));
        }

        if let Some(password) = &self.password {
            let cmd = format!("printf '%s:%s' '{}' '{}' | chpasswd", self.name, password);
            let result = self.runner.run(&cmd).await?;
            if !result.success() {
                return Err(ResourceError::from_output(&result));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labhost_exec::{CommandResult, FakeRunner};

    #[tokio::test]
    async fn test_existing_user_is_satisfied() {
        let runner = Arc::new(FakeRunner::new().on("id -u", CommandResult::ok("1001\n")));
        let user = SystemUser::new("gns3", runner);

        assert!(user.is_satisfied().await.unwrap());
    }

    #[tokio::test]
    async fn test_apply_creates_user_and_sets_password() {
        let runner = Arc::new(FakeRunner::new());
        let user = SystemUser::new("gns3", runner.clone()).with_password("hunter2");

        user.apply().await.unwrap();

        let history = runner.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], "useradd --create-home --shell /bin/bash gns3");
        assert!(history[1].contains("chpasswd"));
        assert!(history[1].contains("hunter2"));
    }

    #[tokio::test]
    async fn test_apply_without_password() {
        let runner = Arc::new(FakeRunner::new());
        let user = SystemUser::new("gns3", runner.clone());

        user.apply().await.unwrap();

        assert_eq!(runner.history().len(), 1);
        assert_eq!(runner.count_matching("useradd"), 1);
    }

    #[tokio::test]
    async fn test_failed_useradd() {
        let runner = Arc::new(FakeRunner::failing_with(9));
        let user = SystemUser::new("gns3", runner);

        // is_satisfied sees the failing `id` as "absent", apply then fails
        assert!(!user.is_satisfied().await.unwrap());
        assert!(matches!(
            user.apply().await,
            Err(ResourceError::CommandFailed { status: 9, .. })
        ));
    }
}
