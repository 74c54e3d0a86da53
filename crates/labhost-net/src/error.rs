//! Error types for labhost-net

use thiserror::Error;

/// Errors from subnet parameter derivation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetError {
    /// Input is not `a.b.c.d/len`
    #[error("malformed CIDR: {0}")]
    MalformedCidr(String),

    /// Only /24 networks are supported
    #[error("unsupported prefix length /{0} (only /24 is supported)")]
    UnsupportedPrefix(u8),

    /// Base address has host bits set (e.g. 192.168.8.5/24)
    #[error("{0} is not a network address")]
    HostBitsSet(String),
}
