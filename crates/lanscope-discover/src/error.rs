//! Error types for the lanscope-discover crate.
//!
//! These never cross the public engine boundaries: `locate`, `discover`,
//! `get_vendor`, and `probe` log them and return their conservative default.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("No usable interface: {0}")]
    NoInterface(String),

    #[error("Permission denied opening raw socket on {interface} (requires root or CAP_NET_RAW)")]
    PermissionDenied { interface: String },

    #[error("Datalink transport error: {0}")]
    Transport(String),

    #[error("Local address is not IPv4: {0}")]
    NotIpv4(std::net::IpAddr),

    #[error("Vendor lookup for {mac} timed out")]
    VendorTimeout { mac: String },

    #[error("Vendor lookup for {mac} failed: {source}")]
    VendorRequest {
        mac: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(#[from] lanscope_core::LanscopeError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DiscoverError>;
