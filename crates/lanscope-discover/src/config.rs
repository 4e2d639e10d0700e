//! Configuration for the lanscope discovery and probing engines.

use std::net::SocketAddr;
use std::time::Duration;

use ipnet::Ipv4Net;
use serde::Deserialize;

/// Top-level discover configuration.
///
/// Loaded from `lanscope.toml` `[discover]` section or
/// `LANSCOPE_DISCOVER__` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverConfig {
    /// How long to collect ARP replies per discovery pass.
    #[serde(default = "default_discovery_window_ms")]
    pub discovery_window_ms: u64,

    /// Ceiling on TCP connection attempts in flight at once.
    #[serde(default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: usize,

    /// Scan profile used when none is given on the command line.
    #[serde(default)]
    pub default_profile: ScanProfile,

    /// Range used when the local address cannot be determined.
    #[serde(default = "default_fallback_range")]
    pub fallback_range: Ipv4Net,

    /// External address the subnet locator routes towards. No packet is sent.
    #[serde(default = "default_route_probe_addr")]
    pub route_probe_addr: SocketAddr,

    /// Interface to send discovery frames on. Auto-selected when unset.
    #[serde(default)]
    pub interface: Option<String>,

    /// Remote vendor lookup service.
    #[serde(default)]
    pub vendor: VendorConfig,

    /// Delay between passes in watch mode.
    #[serde(default = "default_watch_interval")]
    pub watch_interval_secs: u64,
}

impl DiscoverConfig {
    /// Load the `[discover]` section from `<file_prefix>.*` and
    /// `LANSCOPE_DISCOVER__*` variables, defaulting when neither is present.
    pub fn load(file_prefix: &str) -> crate::error::Result<Self> {
        Ok(lanscope_core::config::load_section(
            file_prefix,
            "LANSCOPE",
            "discover",
        )?)
    }

    pub fn discovery_window(&self) -> Duration {
        Duration::from_millis(self.discovery_window_ms)
    }

    /// Delay between watch passes. Zero is raised to one second.
    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs.max(1))
    }
}

/// Vendor lookup service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorConfig {
    /// Base URL; the MAC address is appended as the final path segment.
    #[serde(default = "default_vendor_url")]
    pub base_url: String,

    #[serde(default = "default_vendor_timeout_ms")]
    pub timeout_ms: u64,
}

impl VendorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            base_url: default_vendor_url(),
            timeout_ms: default_vendor_timeout_ms(),
        }
    }
}

/// Quick: the 20 most common service ports.
const QUICK_PORTS: [u16; 20] = [
    20, 21, 22, 23, 25, 53, 80, 110, 135, 139, 143, 443, 445, 993, 995, 3306, 3389, 5432, 8080,
    8443,
];

/// Added on top of `QUICK_PORTS` by the standard profile.
const STANDARD_EXTRA_PORTS: [u16; 30] = [
    // Web & databases
    81, 3000, 5000, 8000, 8008, 8081, 8888, 9000, 1433, 1521, 6379, 9200, 27017,
    // Mail & file sharing
    111, 161, 465, 548, 587, 2049,
    // Remote access
    5631, 5900, 5901,
    // IoT & home automation
    554, 1883, 5353, 5683, 8123, 9100,
    // Games
    25565, 27015,
];

/// Predefined port sets with a per-port connection timeout.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScanProfile {
    /// 20 well-known ports, 500 ms per port.
    #[default]
    Quick,
    /// Quick plus 30 application ports, 300 ms per port.
    Standard,
    /// Ports 1-1024, 100 ms per port.
    Full,
}

impl ScanProfile {
    /// The ordered, duplicate-free port list for this profile.
    pub fn ports(&self) -> Vec<u16> {
        match self {
            Self::Quick => QUICK_PORTS.to_vec(),
            Self::Standard => QUICK_PORTS
                .iter()
                .chain(STANDARD_EXTRA_PORTS.iter())
                .copied()
                .collect(),
            Self::Full => (1..=1024).collect(),
        }
    }

    /// Connection timeout applied to each port.
    pub fn timeout(&self) -> Duration {
        match self {
            Self::Quick => Duration::from_millis(500),
            Self::Standard => Duration::from_millis(300),
            Self::Full => Duration::from_millis(100),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Standard => "standard",
            Self::Full => "full",
        }
    }
}

impl std::str::FromStr for ScanProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "standard" => Ok(Self::Standard),
            "full" => Ok(Self::Full),
            _ => Err(format!("Invalid profile: {s}. Choose: quick, standard, full")),
        }
    }
}

fn default_discovery_window_ms() -> u64 {
    1000
}

fn default_max_concurrent_probes() -> usize {
    20
}

fn default_fallback_range() -> Ipv4Net {
    Ipv4Net::new(std::net::Ipv4Addr::new(192, 168, 1, 1), 24).unwrap_or_default()
}

fn default_route_probe_addr() -> SocketAddr {
    SocketAddr::from(([8, 8, 8, 8], 80))
}

fn default_vendor_url() -> String {
    "https://api.macvendors.com/".to_string()
}

fn default_vendor_timeout_ms() -> u64 {
    2000
}

fn default_watch_interval() -> u64 {
    60
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            discovery_window_ms: default_discovery_window_ms(),
            max_concurrent_probes: default_max_concurrent_probes(),
            default_profile: ScanProfile::default(),
            fallback_range: default_fallback_range(),
            route_probe_addr: default_route_probe_addr(),
            interface: None,
            vendor: VendorConfig::default(),
            watch_interval_secs: default_watch_interval(),
        }
    }
}
