//! lanscope-core: Shared types, events, configuration, and error handling for lanscope.
//!
//! This crate provides the foundational types used across all lanscope components:
//! - Device inventory types (Device, DeviceCategory) produced by discovery
//! - Port probe results (OpenPort, HostPorts)
//! - Event types for alerting and tracking consumers
//! - Layered configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use error::LanscopeError;
pub use types::{Device, DeviceCategory, HostPorts, OpenPort, PortState};
