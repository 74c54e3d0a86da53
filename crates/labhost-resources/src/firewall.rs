//! NAT masquerade rule resource

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use labhost_exec::SystemRunner;

use crate::error::ResourceError;
use crate::traits::Resource;

/// An iptables MASQUERADE rule for traffic leaving the lab subnet.
///
/// Uses `iptables -C` as the typed presence check, so re-running never
/// stacks duplicate rules.
pub struct NatMasquerade {
    cidr: String,
    runner: Arc<dyn SystemRunner>,
}

impl NatMasquerade {
    /// NAT for the given subnet (CIDR notation)
    pub fn new(cidr: impl Into<String>, runner: Arc<dyn SystemRunner>) -> Self {
        Self {
            cidr: cidr.into(),
            runner,
        }
    }

    fn rule(&self) -> String {
        format!(
            "POSTROUTING -s {0} ! -d {0} -j MASQUERADE",
            self.cidr
        )
    }
}

#[async_trait]
impl Resource for NatMasquerade {
    fn id(&self) -> String {
        format!("nat {}", self.cidr)
    }

    #[instrument(skip(self), fields(subnet = %self.cidr))]
    async fn is_satisfied(&self) -> Result<bool, ResourceError> {
        let result = self
            .runner
            .run(&format!("iptables -t nat -C {}", self.rule()))
            .await?;
        Ok(result.success())
    }

    #[instrument(skip(self), fields(subnet = %self.cidr))]
    async fn apply(&self) -> Result<(), ResourceError> {
        info!(subnet = %self.cidr, "adding masquerade rule");

        let result = self
            .runner
            .run(&format!("iptables -t nat -A {}", self.rule()))
            .await?;
        if !result.success() {
            return Err(ResourceError::from_output(&result));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(subnet = %self.cidr))]
    async fn remove(&self) -> Result<(), ResourceError> {
        if !self.is_satisfied().await? {
            info!(subnet = %self.cidr, "no masquerade rule present");
            return Ok(());
        }

        let result = self
            .runner
            .run(&format!("iptables -t nat -D {}", self.rule()))
            .await?;
        if !result.success() {
            return Err(ResourceError::from_output(&result));
        }

        info!(subnet = %self.cidr, "masquerade rule removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labhost_exec::FakeRunner;

    #[tokio::test]
    async fn test_apply_adds_exactly_one_rule() {
        // -C fails (rule absent), -A succeeds
        let runner = Arc::new(FakeRunner::new().on(
            "iptables -t nat -C",
            labhost_exec::CommandResult::with_status(1, ""),
        ));
        let nat = NatMasquerade::new("192.168.8.0/24", runner.clone());

        assert!(!nat.is_satisfied().await.unwrap());
        nat.apply().await.unwrap();

        assert_eq!(runner.count_matching("iptables -t nat -A"), 1);
        assert_eq!(
            runner.history().last().unwrap(),
            "iptables -t nat -A POSTROUTING -s 192.168.8.0/24 ! -d 192.168.8.0/24 -j MASQUERADE"
        );
    }

    #[tokio::test]
    async fn test_remove_when_absent_is_success() {
        let runner = Arc::new(FakeRunner::new().on(
            "iptables -t nat -C",
            labhost_exec::CommandResult::with_status(1, ""),
        ));
        let nat = NatMasquerade::new("192.168.8.0/24", runner.clone());

        nat.remove().await.unwrap();

        // Checked, never deleted
        assert_eq!(runner.count_matching("iptables -t nat -D"), 0);
    }

    #[tokio::test]
    async fn test_remove_deletes_present_rule() {
        let runner = Arc::new(FakeRunner::new());
        let nat = NatMasquerade::new("192.168.8.0/24", runner.clone());

        assert!(nat.is_satisfied().await.unwrap());
        nat.remove().await.unwrap();

        assert_eq!(runner.count_matching("iptables -t nat -D"), 1);
    }
}
