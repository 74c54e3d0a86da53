//! labhost CLI
//!
//! One-shot configurator bringing a lab server to its desired state.
//! Every action is guarded by a presence check, so re-running after a
//! partial failure is the retry mechanism.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use eyre::{WrapErr, bail};

use labhost::config::{Config, DnsBackend};
use labhost::modes::{self, Mode};
use labhost::plan;
use labhost_exec::{LocalRunner, SystemRunner};
use labhost_net::NetworkParameters;
use labhost_resources::reconcile;

#[derive(Parser)]
#[command(name = "labhost")]
#[command(about = "Idempotent configurator for virtual-lab servers", long_about = None)]
struct Cli {
    /// Operation mode: install (default), remove-service, enable-nat,
    /// disable-nat, remove-dnsmasq
    mode: Option<String>,

    /// Config file (overrides the default discovery)
    #[arg(long)]
    config: Option<PathBuf>,

    /// DNS profile override
    #[arg(long, value_enum)]
    dns: Option<DnsBackend>,

    /// Configure NAT as part of the install pass
    #[arg(long)]
    nat: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Interrupt only prints a notice; in-flight system mutations are not
    // rolled back, the next run picks up where this one stopped.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupted; already-applied changes are left in place, re-run to finish");
            std::process::exit(130);
        }
    });

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::load(path)
                .wrap_err_with(|| format!("cannot load config {}", path.display()))?;
            config.apply_env_overrides(
                std::env::var("SUBNET").ok(),
                std::env::var("DOMAIN").ok(),
            );
            config
        }
        None => Config::load_default()?,
    };
    if let Some(dns) = cli.dns {
        config.dns_backend = dns;
    }
    if cli.nat {
        config.nat = true;
    }

    let runner: Arc<dyn SystemRunner> = Arc::new(LocalRunner::new());

    // Fatal preconditions, checked before any mutation
    ensure_root(&runner).await?;
    let net = NetworkParameters::derive(&config.subnet)
        .map_err(|e| eyre::eyre!("invalid SUBNET {:?}: {e}", config.subnet))?;

    match Mode::from_arg(cli.mode.as_deref()) {
        Mode::Install => run_install(&config, &net, runner, cli.json).await?,
        Mode::EnableNat => {
            let outcome = modes::enable_nat(&net.cidr(), runner).await?;
            println!("{outcome}");
        }
        Mode::DisableNat => {
            let outcome = modes::disable_nat(&net.cidr(), runner).await?;
            println!("{outcome}");
        }
        Mode::RemoveService => {
            modes::remove_service(&config, runner).await?;
            println!("service {} removed", plan::GNS3_UNIT_NAME);
        }
        Mode::RemoveDnsmasq => {
            modes::remove_dnsmasq(&config, runner).await?;
            println!("dnsmasq configuration removed");
        }
    }

    Ok(())
}

async fn ensure_root(runner: &Arc<dyn SystemRunner>) -> Result<()> {
    let result = runner.run("id -u").await?;
    if result.stdout.trim() != "0" {
        bail!("labhost must run as root (re-run with sudo)");
    }
    Ok(())
}

async fn run_install(
    config: &Config,
    net: &NetworkParameters,
    runner: Arc<dyn SystemRunner>,
    json: bool,
) -> Result<()> {
    let domain = plan::resolve_domain(config, &runner).await?;
    println!("configuring lab on {} (domain {domain})", net.cidr());

    let install = plan::build_install_plan(config, net, &domain, runner).await?;
    let report = reconcile(&install.resources, |check| {
        println!("  {:<44} {}", check.id, check.outcome);
    })
    .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    println!(
        "done: {} applied, {} already satisfied, {} failed",
        report.applied_count(),
        report.checks.len() - report.applied_count() - report.failure_count(),
        report.failure_count()
    );

    if let Some(credentials) = install.credentials {
        println!(
            "created account {} with password {} (store it now, it is not kept anywhere)",
            credentials.user, credentials.password
        );
    }

    Ok(())
}
