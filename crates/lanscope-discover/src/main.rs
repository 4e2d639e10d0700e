//! CLI entry point for the lanscope LAN scanner.

use std::io::Write;
use std::net::IpAddr;
use std::ops::ControlFlow;

use clap::Parser;
use ipnet::Ipv4Net;
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use lanscope_core::events::{EventPayload, ScanEvent};

use lanscope_discover::config::{DiscoverConfig, ScanProfile};
use lanscope_discover::monitor::NetworkMonitor;

#[derive(Parser)]
#[command(name = "lanscope")]
#[command(about = "Discover devices on the local network and probe their TCP ports")]
struct Cli {
    /// Range to sweep (CIDR, e.g. 192.168.0.0/24). Defaults to the local /24.
    #[arg(short, long)]
    target: Option<Ipv4Net>,

    /// Scan profile: quick, standard, full. Defaults to discover.default_profile.
    #[arg(short, long)]
    profile: Option<ScanProfile>,

    /// Probe every discovered device for open ports.
    #[arg(long)]
    ports: bool,

    /// Probe these hosts without running discovery. Repeatable.
    #[arg(long = "host", value_name = "IP")]
    hosts: Vec<IpAddr>,

    /// Only report devices whose IP, MAC, or vendor contains this text.
    #[arg(short, long)]
    filter: Option<String>,

    /// Keep running discovery passes and report new devices.
    #[arg(short, long, conflicts_with_all = ["hosts", "ports"])]
    watch: bool,

    /// Override the ARP reply collection window, in milliseconds.
    #[arg(long)]
    window_ms: Option<u64>,

    /// Config file prefix (default: lanscope).
    #[arg(short, long, default_value = "lanscope")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let mut config = DiscoverConfig::load(&cli.config)?;
    if let Some(window_ms) = cli.window_ms {
        config.discovery_window_ms = window_ms;
    }
    let profile = cli.profile.unwrap_or(config.default_profile);

    let mut monitor = NetworkMonitor::from_config(&config)?;

    if !cli.hosts.is_empty() {
        for host in monitor.probe_hosts(&cli.hosts, profile).await {
            emit(&ScanEvent::new(EventPayload::PortsProbed {
                profile: profile.as_str().to_string(),
                host,
            }))?;
        }
        return Ok(());
    }

    if cli.watch {
        let every = config.watch_interval();
        tracing::info!(interval_secs = every.as_secs(), "Watch mode started");

        let query = cli.filter.unwrap_or_default();
        let watch = monitor.watch(cli.target, every, |event| {
            if let EventPayload::DeviceDiscovered { device, .. } = &event.payload {
                if !device.matches(&query) {
                    return ControlFlow::Continue(());
                }
            }
            match emit(&event) {
                Ok(()) => ControlFlow::Continue(()),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to write event, stopping");
                    ControlFlow::Break(())
                }
            }
        });

        tokio::select! {
            _ = watch => {}
            _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted, shutting down"),
        }
        return Ok(());
    }

    let report = monitor.run_pass(cli.target).await;
    let query = cli.filter.unwrap_or_default();
    let devices: Vec<_> = report
        .devices
        .iter()
        .filter(|d| d.matches(&query))
        .collect();

    for device in &devices {
        emit(device)?;
    }

    if cli.ports {
        let ips: Vec<IpAddr> = devices.iter().map(|d| IpAddr::V4(d.ip)).collect();
        for host in monitor.probe_hosts(&ips, profile).await {
            emit(&ScanEvent::new(EventPayload::PortsProbed {
                profile: profile.as_str().to_string(),
                host,
            }))?;
        }
    }

    Ok(())
}

/// Write one JSON line to stdout.
fn emit<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
