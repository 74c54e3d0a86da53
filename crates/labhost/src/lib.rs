//! labhost: Idempotent configurator for virtual-lab servers
//!
//! Brings a machine to the desired state for hosting a GNS3-style
//! virtual lab: daemon packages, a service account, DHCP/DNS/routing
//! configs derived from one subnet, a systemd unit for the lab server,
//! and an optional NAT rule. Safe to re-run; everything already in place
//! is skipped.

pub mod config;
pub mod modes;
pub mod plan;
pub mod templates;

pub use config::{Config, DnsBackend};
pub use modes::Mode;
