//! Configuration loading and types
//!
//! Everything is parsed once at startup into one `Config` passed by
//! reference; no component reads the environment on its own.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which DNS server the lab profile configures.
///
/// The lab installers historically diverged between bind and dnsmasq;
/// both survive as selectable profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DnsBackend {
    /// bind9 with generated forward and reverse zones
    Bind,
    /// dnsmasq with a single drop-in config
    Dnsmasq,
}

/// Filesystem locations the configurator writes to.
///
/// Overridable so tests can point everything at a scratch directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    /// systemd unit directory
    #[serde(default = "default_unit_dir")]
    pub unit_dir: PathBuf,
    /// isc-dhcp-server config directory
    #[serde(default = "default_dhcp_dir")]
    pub dhcp_dir: PathBuf,
    /// bind9 config directory
    #[serde(default = "default_bind_dir")]
    pub bind_dir: PathBuf,
    /// dnsmasq drop-in directory
    #[serde(default = "default_dnsmasq_dir")]
    pub dnsmasq_dir: PathBuf,
    /// bird routing daemon config directory
    #[serde(default = "default_bird_dir")]
    pub bird_dir: PathBuf,
}

fn default_unit_dir() -> PathBuf {
    PathBuf::from("/etc/systemd/system")
}

fn default_dhcp_dir() -> PathBuf {
    PathBuf::from("/etc/dhcp")
}

fn default_bind_dir() -> PathBuf {
    PathBuf::from("/etc/bind")
}

fn default_dnsmasq_dir() -> PathBuf {
    PathBuf::from("/etc/dnsmasq.d")
}

fn default_bird_dir() -> PathBuf {
    PathBuf::from("/etc/bird")
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            unit_dir: default_unit_dir(),
            dhcp_dir: default_dhcp_dir(),
            bind_dir: default_bind_dir(),
            dnsmasq_dir: default_dnsmasq_dir(),
            bird_dir: default_bird_dir(),
        }
    }
}

/// Top-level configuration for the configurator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Lab subnet in CIDR notation (/24 only)
    #[serde(default = "default_subnet")]
    pub subnet: String,
    /// DNS domain for the lab; defaults to the host's own name
    pub domain: Option<String>,
    /// DNS profile
    #[serde(default = "default_dns_backend")]
    pub dns_backend: DnsBackend,
    /// Configure NAT during install (otherwise opt-in via enable-nat)
    #[serde(default)]
    pub nat: bool,
    /// Account the lab server runs as
    #[serde(default = "default_service_user")]
    pub service_user: String,
    /// Target directories
    #[serde(default)]
    pub paths: Paths,
}

fn default_subnet() -> String {
    "192.168.8.0/24".to_string()
}

fn default_dns_backend() -> DnsBackend {
    DnsBackend::Bind
}

fn default_service_user() -> String {
    "gns3".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subnet: default_subnet(),
            domain: None,
            dns_backend: default_dns_backend(),
            nat: false,
            service_user: default_service_user(),
            paths: Paths::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &PathBuf) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from default paths or use defaults, then apply the
    /// `SUBNET`/`DOMAIN` environment overrides.
    pub fn load_default() -> eyre::Result<Self> {
        let mut config = Self::discover()?;
        config.apply_env_overrides(
            std::env::var("SUBNET").ok(),
            std::env::var("DOMAIN").ok(),
        );
        Ok(config)
    }

    fn discover() -> eyre::Result<Self> {
        // Check environment variable
        if let Ok(path) = std::env::var("LABHOST_CONFIG") {
            return Self::load(&PathBuf::from(path));
        }

        // Try common paths
        let paths = [
            PathBuf::from("labhost.toml"),
            PathBuf::from("/etc/labhost/labhost.toml"),
            dirs::config_dir()
                .map(|p| p.join("labhost/labhost.toml"))
                .unwrap_or_default(),
        ];

        for path in paths {
            if path.exists() {
                return Self::load(&path);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Config::default())
    }

    /// Environment variables win over file values.
    pub fn apply_env_overrides(&mut self, subnet: Option<String>, domain: Option<String>) {
        if let Some(subnet) = subnet {
            self.subnet = subnet;
        }
        if let Some(domain) = domain {
            self.domain = Some(domain);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.subnet, "192.168.8.0/24");
        assert_eq!(config.dns_backend, DnsBackend::Bind);
        assert!(!config.nat);
        assert_eq!(config.service_user, "gns3");
        assert_eq!(config.paths.unit_dir, PathBuf::from("/etc/systemd/system"));
    }

    #[test]
    fn test_parse_toml_profile() {
        let config: Config = toml::from_str(
            r#"
            subnet = "10.1.1.0/24"
            dns_backend = "dnsmasq"
            nat = true
            "#,
        )
        .unwrap();

        assert_eq!(config.subnet, "10.1.1.0/24");
        assert_eq!(config.dns_backend, DnsBackend::Dnsmasq);
        assert!(config.nat);
        assert_eq!(config.service_user, "gns3");
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = Config::default();
        config.apply_env_overrides(
            Some("172.16.5.0/24".to_string()),
            Some("lab.example.org".to_string()),
        );

        assert_eq!(config.subnet, "172.16.5.0/24");
        assert_eq!(config.domain.as_deref(), Some("lab.example.org"));
    }
}
