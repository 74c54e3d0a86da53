//! Install plan assembly
//!
//! Turns the configuration and derived subnet parameters into the
//! ordered resource list the engine walks: packages first, then the
//! service account, daemon configs, the lab server unit, and finally the
//! optional NAT rule.

use std::sync::Arc;

use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::debug;

use labhost_exec::SystemRunner;
use labhost_net::NetworkParameters;
use labhost_resources::{
    AptPackage, ConfigFile, NatMasquerade, Resource, ResourceError, SystemUser, SystemdUnit,
    template::render,
};

use crate::config::{Config, DnsBackend};
use crate::templates;

/// Name of the lab server's systemd unit (without `.service`)
pub const GNS3_UNIT_NAME: &str = "labhost-gns3";

/// dnsmasq drop-in file written by the dnsmasq profile
pub const DNSMASQ_DROPIN: &str = "lab.conf";

/// Generated service-account credentials, printed once at the end of the
/// run. Only present when the account did not exist yet.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// The ordered desired state for a full install
pub struct InstallPlan {
    pub resources: Vec<Arc<dyn Resource>>,
    pub credentials: Option<Credentials>,
}

fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// Domain for the lab: configured value, else the host's own name.
///
/// # Errors
/// Propagates runner failures from the hostname lookup.
pub async fn resolve_domain(
    config: &Config,
    runner: &Arc<dyn SystemRunner>,
) -> Result<String, ResourceError> {
    if let Some(domain) = &config.domain {
        return Ok(domain.clone());
    }

    let result = runner.run("hostname -f 2>/dev/null || hostname").await?;
    let name = result
        .stdout
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string();

    if name.is_empty() {
        debug!("hostname lookup came back empty, falling back to lab.local");
        Ok("lab.local".to_string())
    } else {
        Ok(name)
    }
}

/// Assemble the install plan.
///
/// Credentials are generated only when the service account is still
/// missing; an existing account keeps its password and none is printed.
///
/// # Errors
/// Template rendering failures and runner failures from the account
/// presence probe.
pub async fn build_install_plan(
    config: &Config,
    net: &NetworkParameters,
    domain: &str,
    runner: Arc<dyn SystemRunner>,
) -> Result<InstallPlan, ResourceError> {
    let params = templates::template_params(net, domain, &config.service_user, &config.paths.bind_dir);
    let mut resources: Vec<Arc<dyn Resource>> = Vec::new();

    // Daemon packages; the DNS profile decides bind vs dnsmasq
    let mut packages = vec!["isc-dhcp-server", "bird2", "qemu-kvm", "gns3-server"];
    match config.dns_backend {
        DnsBackend::Bind => packages.insert(1, "bind9"),
        DnsBackend::Dnsmasq => packages.insert(1, "dnsmasq"),
    }
    for name in packages {
        resources.push(Arc::new(AptPackage::new(name, runner.clone())));
    }

    // Service account, with a fresh password only if it does not exist
    let probe = runner
        .run(&format!("id -u {}", config.service_user))
        .await?;
    let credentials = if probe.success() {
        None
    } else {
        Some(Credentials {
            user: config.service_user.clone(),
            password: generate_password(),
        })
    };
    let mut user = SystemUser::new(&config.service_user, runner.clone());
    if let Some(credentials) = &credentials {
        user = user.with_password(&credentials.password);
    }
    resources.push(Arc::new(user));

    // DHCP
    resources.push(Arc::new(ConfigFile::new(
        config.paths.dhcp_dir.join("dhcpd.conf"),
        render(templates::DHCPD_CONF, &params)?,
    )));

    // DNS, per profile
    match config.dns_backend {
        DnsBackend::Bind => {
            resources.push(Arc::new(ConfigFile::new(
                config.paths.bind_dir.join("named.conf.lab"),
                render(templates::NAMED_CONF_LAB, &params)?,
            )));
            resources.push(Arc::new(ConfigFile::new(
                config.paths.bind_dir.join(format!("db.{domain}")),
                render(templates::FORWARD_ZONE, &params)?,
            )));
            resources.push(Arc::new(ConfigFile::new(
                config.paths.bind_dir.join(format!("db.{}", net.reverse_zone())),
                render(templates::REVERSE_ZONE, &params)?,
            )));
        }
        DnsBackend::Dnsmasq => {
            resources.push(Arc::new(ConfigFile::new(
                config.paths.dnsmasq_dir.join(DNSMASQ_DROPIN),
                render(templates::DNSMASQ_CONF, &params)?,
            )));
        }
    }

    // OSPF
    resources.push(Arc::new(ConfigFile::new(
        config.paths.bird_dir.join("bird.conf"),
        render(templates::BIRD_CONF, &params)?,
    )));

    // Lab server unit
    resources.push(Arc::new(SystemdUnit::new(
        GNS3_UNIT_NAME,
        render(templates::GNS3_UNIT, &params)?,
        &config.paths.unit_dir,
        runner.clone(),
    )));

    // NAT is opt-in
    if config.nat {
        resources.push(Arc::new(NatMasquerade::new(net.cidr(), runner)));
    }

    Ok(InstallPlan {
        resources,
        credentials,
    })
}

#[cfg(test)]
mod tests {
    use labhost_exec::FakeRunner;

    use super::*;

    fn test_config() -> Config {
        Config {
            domain: Some("lab.example".to_string()),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_bind_profile_plan_shape() {
        let runner: Arc<dyn SystemRunner> = Arc::new(FakeRunner::failing_with(1));
        let net = NetworkParameters::derive("192.168.8.0/24").unwrap();
        let config = test_config();

        let plan = build_install_plan(&config, &net, "lab.example", runner)
            .await
            .unwrap();

        let ids: Vec<String> = plan.resources.iter().map(|r| r.id()).collect();
        assert!(ids.contains(&"package bind9".to_string()));
        assert!(ids.contains(&"user gns3".to_string()));
        assert!(ids.contains(&"service labhost-gns3".to_string()));
        assert!(!ids.iter().any(|id| id.starts_with("nat ")), "NAT is opt-in");
        // Missing account (id -u failed) means fresh credentials
        assert!(plan.credentials.is_some());
    }

    #[tokio::test]
    async fn test_dnsmasq_profile_swaps_dns_resources() {
        let runner: Arc<dyn SystemRunner> = Arc::new(FakeRunner::new());
        let net = NetworkParameters::derive("192.168.8.0/24").unwrap();
        let config = Config {
            dns_backend: DnsBackend::Dnsmasq,
            nat: true,
            ..test_config()
        };

        let plan = build_install_plan(&config, &net, "lab.example", runner)
            .await
            .unwrap();

        let ids: Vec<String> = plan.resources.iter().map(|r| r.id()).collect();
        assert!(ids.contains(&"package dnsmasq".to_string()));
        assert!(!ids.contains(&"package bind9".to_string()));
        assert!(ids.contains(&"nat 192.168.8.0/24".to_string()));
        // Account exists on this host, so no generated credentials
        assert!(plan.credentials.is_none());
    }

    #[tokio::test]
    async fn test_resolve_domain_prefers_config() {
        let runner = Arc::new(FakeRunner::new());
        let dyn_runner: Arc<dyn SystemRunner> = runner.clone();

        let domain = resolve_domain(&test_config(), &dyn_runner).await.unwrap();

        assert_eq!(domain, "lab.example");
        assert!(runner.history().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_domain_falls_back_to_hostname() {
        let runner: Arc<dyn SystemRunner> = Arc::new(
            FakeRunner::new().on("hostname", labhost_exec::CommandResult::ok("lab-a.example\n")),
        );
        let config = Config::default();

        let domain = resolve_domain(&config, &runner).await.unwrap();
        assert_eq!(domain, "lab-a.example");
    }

    #[test]
    fn test_generated_passwords_differ() {
        let first = generate_password();
        let second = generate_password();

        assert_eq!(first.len(), 16);
        assert_ne!(first, second);
    }
}
