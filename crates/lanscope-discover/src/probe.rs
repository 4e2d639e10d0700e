//! Bounded-concurrency TCP port probing.
//!
//! One task per port is spawned into a [`JoinSet`]; each holds a permit from
//! a semaphore owned by the engine, so the in-flight ceiling holds across
//! every `probe` call made through the same engine, not just within one.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lanscope_core::OpenPort;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::{DiscoverConfig, ScanProfile};
use crate::services::service_name;

/// Opens (and immediately closes) a TCP connection.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, addr: SocketAddr) -> io::Result<()>;
}

/// Plain tokio TCP connect. Nothing is sent on the socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, addr: SocketAddr) -> io::Result<()> {
        let stream = TcpStream::connect(addr).await?;
        drop(stream);
        Ok(())
    }
}

/// Probes a host's ports with at most `max_in_flight` attempts at once.
pub struct PortProbeEngine<C = TcpConnector> {
    connector: Arc<C>,
    permits: Arc<Semaphore>,
}

impl PortProbeEngine<TcpConnector> {
    pub fn from_config(config: &DiscoverConfig) -> Self {
        Self::new(TcpConnector, config.max_concurrent_probes)
    }
}

impl<C: Connector> PortProbeEngine<C> {
    /// The ceiling is clamped to `1..=Semaphore::MAX_PERMITS`.
    pub fn new(connector: C, max_in_flight: usize) -> Self {
        Self {
            connector: Arc::new(connector),
            permits: Arc::new(Semaphore::new(
                max_in_flight.clamp(1, Semaphore::MAX_PERMITS),
            )),
        }
    }

    /// Open ports on `ip` for the profile's port set, sorted by port.
    ///
    /// Closed, filtered, and timed-out ports are omitted. Never fails.
    pub async fn probe(&self, ip: IpAddr, profile: ScanProfile) -> Vec<OpenPort> {
        let start = Instant::now();
        let open = self
            .probe_ports(ip, &profile.ports(), profile.timeout())
            .await;

        tracing::info!(
            ip = %ip,
            profile = profile.as_str(),
            open = open.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Port probe complete"
        );

        open
    }

    /// Probe an explicit port list with a per-port `timeout`.
    pub async fn probe_ports(&self, ip: IpAddr, ports: &[u16], timeout: Duration) -> Vec<OpenPort> {
        let mut tasks = JoinSet::new();

        for &port in ports {
            let permit = match Arc::clone(&self.permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!(ip = %ip, "Probe semaphore closed");
                    break;
                }
            };
            let connector = Arc::clone(&self.connector);

            tasks.spawn(async move {
                let _permit = permit;
                let addr = SocketAddr::new(ip, port);
                match tokio::time::timeout(timeout, connector.connect(addr)).await {
                    Ok(Ok(())) => Some(port),
                    Ok(Err(e)) => {
                        tracing::trace!(addr = %addr, error = %e, "Port closed");
                        None
                    }
                    Err(_) => {
                        tracing::trace!(addr = %addr, "Port timed out");
                        None
                    }
                }
            });
        }

        let mut open = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(port)) => open.push(port),
                Ok(None) => {}
                Err(e) => tracing::warn!(ip = %ip, error = %e, "Probe task failed"),
            }
        }

        open.sort_unstable();
        open.dedup();
        open.into_iter()
            .map(|port| OpenPort::new(port, service_name(port)))
            .collect()
    }
}
