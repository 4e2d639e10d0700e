//! Core domain types for the lanscope device inventory.
//!
//! These types are the records the discovery and probing engines hand to
//! presentation, alerting, and tracking consumers.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Vendor placeholder used whenever a manufacturer cannot be determined.
pub const UNKNOWN_VENDOR: &str = "Unknown";

/// Service placeholder for ports missing from the service-name table.
pub const UNKNOWN_SERVICE: &str = "unknown";

// ── Devices ───────────────────────────────────────────────────────

/// Coarse device category derived from address and vendor heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Router,
    Pc,
    Phone,
    Tablet,
    Printer,
    Tv,
    GameConsole,
    Unknown,
}

impl DeviceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Router => "router",
            Self::Pc => "pc",
            Self::Phone => "phone",
            Self::Tablet => "tablet",
            Self::Printer => "printer",
            Self::Tv => "tv",
            Self::GameConsole => "game_console",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device that answered a discovery pass.
///
/// Identity is the MAC address. A device is a snapshot: the next discovery
/// pass produces a fresh `Device` rather than updating this one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    pub ip: Ipv4Addr,
    /// Colon-separated hex, upper-case.
    pub mac: String,
    pub vendor: String,
    pub category: DeviceCategory,
}

impl Device {
    /// Build a device, upper-casing the MAC and substituting the vendor
    /// placeholder for an empty vendor.
    pub fn new(
        ip: Ipv4Addr,
        mac: &str,
        vendor: impl Into<String>,
        category: DeviceCategory,
    ) -> Self {
        let vendor = vendor.into();
        let vendor = if vendor.trim().is_empty() {
            UNKNOWN_VENDOR.to_string()
        } else {
            vendor
        };

        Self {
            ip,
            mac: mac.trim().to_uppercase(),
            vendor,
            category,
        }
    }

    /// Case-insensitive substring match against IP, MAC, and vendor.
    ///
    /// An empty (or all-whitespace) query matches every device.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.ip.to_string().contains(&query)
            || self.mac.to_lowercase().contains(&query)
            || self.vendor.to_lowercase().contains(&query)
    }
}

// ── Ports ─────────────────────────────────────────────────────────

/// State of a reported port. Only ports that accepted a connection are
/// ever reported, so `Open` is the single state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    #[default]
    Open,
}

/// A TCP port that accepted a connection during a probe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenPort {
    pub port: u16,
    pub service: String,
    pub state: PortState,
}

impl OpenPort {
    pub fn new(port: u16, service: impl Into<String>) -> Self {
        Self {
            port,
            service: service.into(),
            state: PortState::Open,
        }
    }
}

/// Probe results for a single host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostPorts {
    pub ip: IpAddr,
    pub open_ports: Vec<OpenPort>,
    pub duration_ms: u64,
}
