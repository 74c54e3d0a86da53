//! Derived subnet parameters

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::error::NetError;

/// DHCP pool offsets within the /24, matching the lab installer's
/// convention: static assignments below .129, pool .129-.199, the rest
/// reserved for routers and test gear.
const DHCP_RANGE_START_HOST: u8 = 129;
const DHCP_RANGE_END_HOST: u8 = 199;

/// Gateway is the first usable host.
const GATEWAY_HOST: u8 = 1;

/// Addresses derived from a /24 subnet.
///
/// Derivation is a pure function of the CIDR string: the same input
/// yields the same parameters on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParameters {
    /// Network address (host octet 0)
    pub network: Ipv4Addr,
    /// Prefix length (always 24)
    pub prefix_len: u8,
    /// First usable host, used as gateway and DNS server address
    pub gateway: Ipv4Addr,
    /// Broadcast address
    pub broadcast: Ipv4Addr,
    /// First address handed out by DHCP
    pub dhcp_range_start: Ipv4Addr,
    /// Last address handed out by DHCP
    pub dhcp_range_end: Ipv4Addr,
}

impl NetworkParameters {
    /// Derive all parameters from a CIDR string.
    ///
    /// # Errors
    /// - `MalformedCidr` if the input is not `a.b.c.d/len`
    /// - `UnsupportedPrefix` for any prefix length other than 24
    /// - `HostBitsSet` if the base address is not the network address
    pub fn derive(cidr: &str) -> Result<Self, NetError> {
        let malformed = || NetError::MalformedCidr(cidr.to_string());

        let (addr_part, len_part) = cidr.trim().split_once('/').ok_or_else(malformed)?;

        let base: Ipv4Addr = addr_part.parse().map_err(|_| malformed())?;
        let prefix_len: u8 = len_part.parse().map_err(|_| malformed())?;

        if prefix_len != 24 {
            return Err(NetError::UnsupportedPrefix(prefix_len));
        }

        let [a, b, c, d] = base.octets();
        if d != 0 {
            return Err(NetError::HostBitsSet(cidr.to_string()));
        }

        Ok(Self {
            network: base,
            prefix_len,
            gateway: Ipv4Addr::new(a, b, c, GATEWAY_HOST),
            broadcast: Ipv4Addr::new(a, b, c, 255),
            dhcp_range_start: Ipv4Addr::new(a, b, c, DHCP_RANGE_START_HOST),
            dhcp_range_end: Ipv4Addr::new(a, b, c, DHCP_RANGE_END_HOST),
        })
    }

    /// The nth address within the network.
    #[must_use]
    pub fn host(&self, n: u8) -> Ipv4Addr {
        let [a, b, c, _] = self.network.octets();
        Ipv4Addr::new(a, b, c, n)
    }

    /// Dotted-quad netmask for daemons that do not take prefix notation.
    #[must_use]
    pub fn netmask(&self) -> Ipv4Addr {
        Ipv4Addr::new(255, 255, 255, 0)
    }

    /// Canonical CIDR string ("192.168.8.0/24")
    #[must_use]
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.network, self.prefix_len)
    }

    /// Reverse-lookup zone name for bind ("8.168.192.in-addr.arpa")
    #[must_use]
    pub fn reverse_zone(&self) -> String {
        let [a, b, c, _] = self.network.octets();
        format!("{c}.{b}.{a}.in-addr.arpa")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_default_subnet() {
        let params = NetworkParameters::derive("192.168.8.0/24").unwrap();

        assert_eq!(params.network, Ipv4Addr::new(192, 168, 8, 0));
        assert_eq!(params.gateway, Ipv4Addr::new(192, 168, 8, 1));
        assert_eq!(params.broadcast, Ipv4Addr::new(192, 168, 8, 255));
        assert_eq!(params.dhcp_range_start, Ipv4Addr::new(192, 168, 8, 129));
        assert_eq!(params.dhcp_range_end, Ipv4Addr::new(192, 168, 8, 199));
    }

    #[test]
    fn test_derive_is_deterministic() {
        let first = NetworkParameters::derive("10.10.10.0/24").unwrap();
        let second = NetworkParameters::derive("10.10.10.0/24").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_unsupported_prefix() {
        let err = NetworkParameters::derive("192.168.0.0/16").unwrap_err();
        assert_eq!(err, NetError::UnsupportedPrefix(16));
    }

    #[test]
    fn test_malformed_inputs() {
        for input in ["192.168.8.0", "not-a-subnet/24", "192.168.8.0/abc", ""] {
            let err = NetworkParameters::derive(input).unwrap_err();
            assert!(matches!(err, NetError::MalformedCidr(_)), "input: {input}");
        }
    }

    #[test]
    fn test_host_bits_rejected() {
        let err = NetworkParameters::derive("192.168.8.5/24").unwrap_err();
        assert!(matches!(err, NetError::HostBitsSet(_)));
    }

    #[test]
    fn test_helpers() {
        let params = NetworkParameters::derive("192.168.8.0/24").unwrap();

        assert_eq!(params.cidr(), "192.168.8.0/24");
        assert_eq!(params.netmask(), Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(params.reverse_zone(), "8.168.192.in-addr.arpa");
        assert_eq!(params.host(53), Ipv4Addr::new(192, 168, 8, 53));
    }
}
