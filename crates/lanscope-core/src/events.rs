//! Event types for alerting and tracking consumers.
//!
//! The discovery orchestrator emits one event per lifecycle step. Events are
//! serialized as JSON lines so notification and presentation layers can
//! consume them without linking against the engines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Device, HostPorts};

/// Unique identifier for an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// An event emitted during a discovery pass or port probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

impl ScanEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// The event payload, tagged by type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum EventPayload {
    // ── Discovery events ──────────────────────────────────────
    /// A discovery pass started against `target`.
    ScanStarted { scan_id: Uuid, target: String },
    /// A device not seen by any earlier pass answered.
    DeviceDiscovered { scan_id: Uuid, device: Device },
    /// A discovery pass finished.
    ScanCompleted {
        scan_id: Uuid,
        devices_found: u32,
        new_devices: u32,
        duration_ms: u64,
    },

    // ── Probe events ──────────────────────────────────────────
    /// A host finished port probing.
    PortsProbed { profile: String, host: HostPorts },
}
