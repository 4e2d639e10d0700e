//! Link-layer transport for ARP sweeps.
//!
//! The [`LinkLayer`] trait is the seam between the discovery engine and raw
//! sockets. [`PnetLink`] is the real implementation and requires root (or
//! `CAP_NET_RAW`) to open an Ethernet channel.

use std::collections::HashSet;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use ipnet::Ipv4Net;
use pnet::datalink::{self, Channel, Config, NetworkInterface};
use pnet::util::MacAddr;

use crate::arp::{self, ArpReply};
use crate::error::{DiscoverError, Result};

const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Sends ARP requests over a range and collects the replies.
pub trait LinkLayer: Send + Sync {
    /// Ask every host address in `range` once, then collect replies until
    /// `window` has elapsed. Replies are returned in arrival order.
    fn sweep(&self, range: Ipv4Net, window: Duration) -> Result<Vec<ArpReply>>;
}

/// ARP sweeps over a pnet Ethernet channel.
#[derive(Debug, Clone, Default)]
pub struct PnetLink {
    interface: Option<String>,
}

/// The interface chosen for a sweep and the addresses we send from.
struct SweepSource {
    interface: NetworkInterface,
    mac: MacAddr,
    ip: Ipv4Addr,
}

impl PnetLink {
    /// Use the named interface, or auto-select one when `None`.
    pub fn new(interface: Option<String>) -> Self {
        Self { interface }
    }

    fn select_source(&self, range: Ipv4Net) -> Result<SweepSource> {
        let interfaces = datalink::interfaces();

        let candidate = match &self.interface {
            Some(name) => interfaces
                .into_iter()
                .find(|i| &i.name == name)
                .ok_or_else(|| DiscoverError::NoInterface(format!("interface {name} not found")))?,
            None => {
                let usable: Vec<NetworkInterface> = interfaces
                    .into_iter()
                    .filter(|i| i.is_up() && !i.is_loopback() && i.mac.is_some())
                    .filter(|i| first_ipv4(i).is_some())
                    .collect();

                let in_range = usable
                    .iter()
                    .position(|i| ipv4_in(i, range).is_some())
                    .unwrap_or(0);

                usable.into_iter().nth(in_range).ok_or_else(|| {
                    DiscoverError::NoInterface("no up, non-loopback IPv4 interface".to_string())
                })?
            }
        };

        let mac = candidate.mac.ok_or_else(|| {
            DiscoverError::NoInterface(format!("{} has no hardware address", candidate.name))
        })?;
        let ip = ipv4_in(&candidate, range)
            .or_else(|| first_ipv4(&candidate))
            .ok_or_else(|| {
                DiscoverError::NoInterface(format!("{} has no IPv4 address", candidate.name))
            })?;

        Ok(SweepSource {
            interface: candidate,
            mac,
            ip,
        })
    }
}

impl LinkLayer for PnetLink {
    fn sweep(&self, range: Ipv4Net, window: Duration) -> Result<Vec<ArpReply>> {
        let source = self.select_source(range)?;
        let name = source.interface.name.clone();

        let config = Config {
            read_timeout: Some(READ_TIMEOUT),
            ..Default::default()
        };
        let (mut tx, mut rx) = match datalink::channel(&source.interface, config) {
            Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => {
                return Err(DiscoverError::Transport(format!(
                    "non-ethernet channel for {name}"
                )))
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(DiscoverError::PermissionDenied { interface: name })
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            interface = %name,
            source_ip = %source.ip,
            target = %range,
            "Sending ARP requests"
        );

        for target in range.hosts().filter(|ip| *ip != source.ip) {
            let frame = arp::build_request(source.mac, source.ip, target)?;
            if let Some(Err(e)) = tx.send_to(&frame, None) {
                return Err(e.into());
            }
        }

        let deadline = Instant::now() + window;
        let mut seen: HashSet<ArpReply> = HashSet::new();
        let mut replies = Vec::new();

        while Instant::now() < deadline {
            match rx.next() {
                Ok(frame) => {
                    let Some(reply) = arp::parse_reply(frame) else {
                        continue;
                    };
                    if range.contains(&reply.ip) && seen.insert(reply) {
                        replies.push(reply);
                    }
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut
                            | io::ErrorKind::WouldBlock
                            | io::ErrorKind::Interrupted
                    ) =>
                {
                    continue
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(replies)
    }
}

fn first_ipv4(interface: &NetworkInterface) -> Option<Ipv4Addr> {
    interface.ips.iter().find_map(|net| match net.ip() {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(_) => None,
    })
}

fn ipv4_in(interface: &NetworkInterface, range: Ipv4Net) -> Option<Ipv4Addr> {
    interface.ips.iter().find_map(|net| match net.ip() {
        IpAddr::V4(v4) if range.contains(&v4) => Some(v4),
        _ => None,
    })
}
