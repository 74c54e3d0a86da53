//! APT package resource (Debian/Ubuntu)

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use labhost_exec::SystemRunner;

use crate::error::ResourceError;
use crate::traits::Resource;

/// A Debian package that must be installed
pub struct AptPackage {
    name: String,
    runner: Arc<dyn SystemRunner>,
}

impl AptPackage {
    /// Require `name` to be installed
    pub fn new(name: impl Into<String>, runner: Arc<dyn SystemRunner>) -> Self {
        Self {
            name: name.into(),
            runner,
        }
    }

    /// Parse `dpkg-query -W -f='${Status}'` output.
    ///
    /// dpkg reports three words (want/flag/status); only a final status
    /// of "installed" counts. "deinstall ok config-files" does not.
    fn status_installed(output: &str) -> bool {
        output.trim() == "install ok installed"
    }
}

#[async_trait]
impl Resource for AptPackage {
    fn id(&self) -> String {
        format!("package {}", self.name)
    }

    #[instrument(skip(self), fields(package = %self.name))]
    async fn is_satisfied(&self) -> Result<bool, ResourceError> {
        let cmd = format!("dpkg-query -W -f='${{Status}}' {}", self.name);
        let result = self.runner.run(&cmd).await?;

        // dpkg-query exits non-zero for packages it has never heard of
        if !result.success() {
            debug!(package = %self.name, "not known to dpkg");
            return Ok(false);
        }

        Ok(Self::status_installed(&result.stdout))
    }

    #[instrument(skip(self), fields(package = %self.name))]
    async fn apply(&self) -> Result<(), ResourceError> {
        info!(package = %self.name, "installing");

        let cmd = format!(
            "DEBIAN_FRONTEND=noninteractive apt-get install -y {}",
            self.name
        );
        let result = self.runner.run(&cmd).await?;

        if !result.success() {
            return Err(ResourceError::from_output(&result));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labhost_exec::{CommandResult, FakeRunner};

    #[test]
    fn test_status_parsing() {
        assert!(AptPackage::status_installed("install ok installed"));
        assert!(AptPackage::status_installed("install ok installed\n"));
        assert!(!AptPackage::status_installed("deinstall ok config-files"));
        assert!(!AptPackage::status_installed(""));
    }

    #[tokio::test]
    async fn test_installed_package_is_satisfied() {
        let runner = Arc::new(
            FakeRunner::new().on("dpkg-query", CommandResult::ok("install ok installed")),
        );
        let pkg = AptPackage::new("bind9", runner);

        assert!(pkg.is_satisfied().await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_package_is_not_satisfied() {
        let runner = Arc::new(FakeRunner::failing_with(1));
        let pkg = AptPackage::new("no-such-package", runner);

        assert!(!pkg.is_satisfied().await.unwrap());
    }

    #[tokio::test]
    async fn test_apply_runs_noninteractive_install() {
        let runner = Arc::new(FakeRunner::new());
        let pkg = AptPackage::new("isc-dhcp-server", runner.clone());

        pkg.apply().await.unwrap();

        let history = runner.history();
        assert_eq!(
            history,
            vec!["DEBIAN_FRONTEND=noninteractive apt-get install -y isc-dhcp-server".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_install_surfaces_stderr() {
        let runner = Arc::new(FakeRunner::new().on(
            "DEBIAN_FRONTEND",
            CommandResult {
                status: 100,
                stdout: String::new(),
                stderr: "E: Unable to locate package bird2".to_string(),
                duration: std::time::Duration::ZERO,
            },
        ));
        let pkg = AptPackage::new("bird2", runner);

        let err = pkg.apply().await.unwrap_err();
        match err {
            ResourceError::CommandFailed { status, message } => {
                assert_eq!(status, 100);
                assert!(message.contains("bird2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
