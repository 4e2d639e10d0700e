//! Local subnet detection.
//!
//! Routes an unconnected UDP socket towards an external address so the OS
//! picks the outbound interface, then derives the /24 around the bound local
//! address. No packet leaves the host.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use ipnet::Ipv4Net;

use crate::config::DiscoverConfig;
use crate::error::{DiscoverError, Result};

/// Finds the /24 to sweep, falling back to a fixed range on any failure.
#[derive(Debug, Clone)]
pub struct SubnetLocator {
    route_probe_addr: SocketAddr,
    fallback: Ipv4Net,
}

impl SubnetLocator {
    pub fn new(route_probe_addr: SocketAddr, fallback: Ipv4Net) -> Self {
        Self {
            route_probe_addr,
            fallback,
        }
    }

    pub fn from_config(config: &DiscoverConfig) -> Self {
        Self::new(config.route_probe_addr, config.fallback_range)
    }

    /// The local /24 as `a.b.c.1/24`, or the fallback range.
    ///
    /// Never fails: a wrong subnet is preferable to no discovery at all.
    pub fn locate(&self) -> Ipv4Net {
        self.range_from(self.local_addr())
    }

    /// Convert a local-address lookup result into the range to sweep.
    pub fn range_from(&self, local: Result<IpAddr>) -> Ipv4Net {
        match local.and_then(gateway_range) {
            Ok(range) => {
                tracing::debug!(range = %range, "Located local subnet");
                range
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = %self.fallback,
                    "Local subnet detection failed, using fallback range"
                );
                self.fallback
            }
        }
    }

    fn local_addr(&self) -> Result<IpAddr> {
        let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))?;
        socket.connect(self.route_probe_addr)?;
        Ok(socket.local_addr()?.ip())
    }
}

/// The /24 containing `addr`, with the host part set to `.1`.
///
/// Loopback and unspecified addresses are errors, so a host with no LAN
/// address gets the fallback range rather than `127.0.0.1/24`.
pub fn gateway_range(addr: IpAddr) -> Result<Ipv4Net> {
    let v4 = match addr {
        IpAddr::V4(v4) => v4,
        IpAddr::V6(_) => return Err(DiscoverError::NotIpv4(addr)),
    };

    if v4.is_unspecified() || v4.is_loopback() {
        return Err(DiscoverError::NoInterface(format!(
            "bound address {v4} is not on a LAN"
        )));
    }

    let [a, b, c, _] = v4.octets();
    Ipv4Net::new(Ipv4Addr::new(a, b, c, 1), 24)
        .map_err(|e| DiscoverError::NoInterface(e.to_string()))
}
