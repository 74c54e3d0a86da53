//! labhost-net: Subnet parameter derivation
//!
//! Derives every address the daemon configs need (gateway, broadcast,
//! DHCP range, reverse zone) from a single /24 CIDR string. Pure
//! functions, no side effects.

pub mod error;
pub mod params;

pub use error::NetError;
pub use params::NetworkParameters;
