//! Mode dispatch
//!
//! Recognized non-install modes short-circuit the full reconciliation
//! pass and perform one narrow action. Unrecognized mode strings fall
//! through to a full install rather than aborting.

use std::sync::Arc;

use tracing::{info, warn};

use labhost_exec::SystemRunner;
use labhost_resources::{ConfigFile, NatMasquerade, Resource, ResourceError, SystemdUnit};

use crate::config::Config;
use crate::plan::{DNSMASQ_DROPIN, GNS3_UNIT_NAME};

/// Operation mode, from the positional CLI argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Full reconciliation (the default)
    Install,
    /// Disable and delete the lab server unit
    RemoveService,
    /// Add the NAT masquerade rule, nothing else
    EnableNat,
    /// Delete the NAT masquerade rule, nothing else
    DisableNat,
    /// Stop dnsmasq and delete its generated drop-in
    RemoveDnsmasq,
}

impl Mode {
    /// Map the positional argument to a mode.
    ///
    /// Anything unrecognized falls through to `Install` with a warning.
    #[must_use]
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some("install") => Mode::Install,
            Some("remove-service") => Mode::RemoveService,
            Some("enable-nat") => Mode::EnableNat,
            Some("disable-nat") => Mode::DisableNat,
            Some("remove-dnsmasq") => Mode::RemoveDnsmasq,
            Some(other) => {
                warn!(mode = %other, "unrecognized mode, running full install");
                Mode::Install
            }
        }
    }
}

/// Result of the NAT modes, for the operator-facing status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NatOutcome {
    /// Rule added
    Enabled,
    /// Rule was already present
    AlreadyEnabled,
    /// Rule deleted
    Removed,
    /// Nothing to delete
    NotConfigured,
}

impl std::fmt::Display for NatOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NatOutcome::Enabled => write!(f, "NAT enabled"),
            NatOutcome::AlreadyEnabled => write!(f, "NAT already configured"),
            NatOutcome::Removed => write!(f, "NAT rule removed"),
            NatOutcome::NotConfigured => write!(f, "NAT not configured"),
        }
    }
}

/// Add the masquerade rule for the lab subnet (idempotent).
///
/// # Errors
/// Runner failures and non-zero iptables exits.
pub async fn enable_nat(
    cidr: &str,
    runner: Arc<dyn SystemRunner>,
) -> Result<NatOutcome, ResourceError> {
    let nat = NatMasquerade::new(cidr, runner);

    if nat.is_satisfied().await? {
        Ok(NatOutcome::AlreadyEnabled)
    } else {
        nat.apply().await?;
        Ok(NatOutcome::Enabled)
    }
}

/// Delete the masquerade rule; an absent rule is a success, not an
/// error.
///
/// # Errors
/// Runner failures and non-zero iptables exits while deleting.
pub async fn disable_nat(
    cidr: &str,
    runner: Arc<dyn SystemRunner>,
) -> Result<NatOutcome, ResourceError> {
    let nat = NatMasquerade::new(cidr, runner);

    if nat.is_satisfied().await? {
        nat.remove().await?;
        Ok(NatOutcome::Removed)
    } else {
        Ok(NatOutcome::NotConfigured)
    }
}

/// Disable and delete the lab server unit.
///
/// # Errors
/// Runner failures and unit file deletion failures.
pub async fn remove_service(
    config: &Config,
    runner: Arc<dyn SystemRunner>,
) -> Result<(), ResourceError> {
    // Unit text is irrelevant for removal
    let unit = SystemdUnit::new(GNS3_UNIT_NAME, "", &config.paths.unit_dir, runner);
    unit.remove().await
}

/// Stop dnsmasq and delete the generated drop-in.
///
/// # Errors
/// Runner failures and drop-in deletion failures.
pub async fn remove_dnsmasq(
    config: &Config,
    runner: Arc<dyn SystemRunner>,
) -> Result<(), ResourceError> {
    let result = runner.run("systemctl disable --now dnsmasq").await?;
    if !result.success() {
        // Not installed or already stopped; removing the drop-in is
        // still worthwhile
        info!(stderr = %result.stderr.trim(), "dnsmasq was not running");
    }

    let dropin = ConfigFile::new(config.paths.dnsmasq_dir.join(DNSMASQ_DROPIN), "");
    dropin.remove().await
}
