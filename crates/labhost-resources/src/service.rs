//! systemd unit resource

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use labhost_exec::SystemRunner;

use crate::error::ResourceError;
use crate::file::install_file;
use crate::traits::Resource;

/// A systemd service that must be registered, enabled and running.
///
/// The unit file is written only if absent, then the unit is enabled and
/// started in one step. Removal disables the unit and deletes the file.
pub struct SystemdUnit {
    name: String,
    unit_text: String,
    unit_dir: PathBuf,
    runner: Arc<dyn SystemRunner>,
}

impl SystemdUnit {
    /// Require service `name` (without the `.service` suffix)
    pub fn new(
        name: impl Into<String>,
        unit_text: impl Into<String>,
        unit_dir: impl Into<PathBuf>,
        runner: Arc<dyn SystemRunner>,
    ) -> Self {
        Self {
            name: name.into(),
            unit_text: unit_text.into(),
            unit_dir: unit_dir.into(),
            runner,
        }
    }

    /// Path of the unit file
    #[must_use]
    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(format!("{}.service", self.name))
    }
}

#[async_trait]
impl Resource for SystemdUnit {
    fn id(&self) -> String {
        format!("service {}", self.name)
    }

    #[instrument(skip(self), fields(service = %self.name))]
    async fn is_satisfied(&self) -> Result<bool, ResourceError> {
        if !self.unit_path().exists() {
            return Ok(false);
        }

        let result = self
            .runner
            .run(&format!("systemctl is-enabled {}", self.name))
            .await?;
        Ok(result.success())
    }

    #[instrument(skip(self), fields(service = %self.name))]
    async fn apply(&self) -> Result<(), ResourceError> {
        if install_file(&self.unit_path(), &self.unit_text)? {
            info!(service = %self.name, "unit file installed");

            let result = self.runner.run("systemctl daemon-reload").await?;
            if !result.success() {
                return Err(ResourceError::from_output(&result));
            }
        }

        let result = self
            .runner
            .run(&format!("systemctl enable --now {}", self.name))
            .await?;
        if !result.success() {
            return Err(ResourceError::from_output(&result));
        }

        info!(service = %self.name, "enabled and started");
        Ok(())
    }

    #[instrument(skip(self), fields(service = %self.name))]
    async fn remove(&self) -> Result<(), ResourceError> {
        let unit_path = self.unit_path();
        if !unit_path.exists() {
            info!(service = %self.name, "unit not registered, nothing to remove");
            return Ok(());
        }

        // Best effort: the unit may already be stopped or masked
        let result = self
            .runner
            .run(&format!("systemctl disable --now {}", self.name))
            .await?;
        if !result.success() {
            warn!(service = %self.name, stderr = %result.stderr, "disable reported an error");
        }

        std::fs::remove_file(&unit_path).map_err(|e| ResourceError::Write {
            path: unit_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let result = self.runner.run("systemctl daemon-reload").await?;
        if !result.success() {
            return Err(ResourceError::from_output(&result));
        }

        info!(service = %self.name, "unit removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labhost_exec::FakeRunner;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("labhost-service-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    const UNIT: &str = "[Unit]\nDescription=test\n[Service]\nExecStart=/bin/true\n";

    #[tokio::test]
    async fn test_missing_unit_file_means_unsatisfied() {
        let dir = scratch_dir("missing");
        let runner = Arc::new(FakeRunner::new());
        let unit = SystemdUnit::new("labhost-gns3", UNIT, &dir, runner.clone());

        assert!(!unit.is_satisfied().await.unwrap());
        // No point asking systemctl when the file is not even there
        assert!(runner.history().is_empty());
    }

    #[tokio::test]
    async fn test_apply_writes_reloads_enables() {
        let dir = scratch_dir("apply");
        let runner = Arc::new(FakeRunner::new());
        let unit = SystemdUnit::new("labhost-gns3", UNIT, &dir, runner.clone());

        unit.apply().await.unwrap();

        assert!(unit.unit_path().exists());
        let history = runner.history();
        assert_eq!(
            history,
            vec![
                "systemctl daemon-reload".to_string(),
                "systemctl enable --now labhost-gns3".to_string(),
            ]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_reapply_skips_daemon_reload() {
        let dir = scratch_dir("reapply");
        let runner = Arc::new(FakeRunner::new());
        let unit = SystemdUnit::new("labhost-gns3", UNIT, &dir, runner.clone());

        unit.apply().await.unwrap();
        unit.apply().await.unwrap();

        // Unit file existed the second time, so only one reload
        assert_eq!(runner.count_matching("systemctl daemon-reload"), 1);
        assert_eq!(runner.count_matching("systemctl enable"), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_remove_absent_unit_is_noop() {
        let dir = scratch_dir("rm-noop");
        let runner = Arc::new(FakeRunner::new());
        let unit = SystemdUnit::new("labhost-gns3", UNIT, &dir, runner.clone());

        unit.remove().await.unwrap();
        assert!(runner.history().is_empty());
    }

    #[tokio::test]
    async fn test_remove_disables_and_deletes() {
        let dir = scratch_dir("rm");
        let runner = Arc::new(FakeRunner::new());
        let unit = SystemdUnit::new("labhost-gns3", UNIT, &dir, runner.clone());

        unit.apply().await.unwrap();
        unit.remove().await.unwrap();

        assert!(!unit.unit_path().exists());
        assert_eq!(runner.count_matching("systemctl disable --now labhost-gns3"), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
