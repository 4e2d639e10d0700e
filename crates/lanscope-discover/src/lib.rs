//! lanscope-discover: LAN device discovery and TCP port probing.
//!
//! Locates the local /24, sweeps it with ARP, enriches each reply with a
//! cached vendor lookup and a heuristic category, tracks which devices are
//! new, and probes hosts for open TCP ports with bounded concurrency.

pub mod arp;
pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod link;
pub mod monitor;
pub mod probe;
pub mod services;
pub mod subnet;
pub mod tracker;
pub mod vendor;
