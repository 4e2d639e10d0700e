//! Remembers which hardware addresses have been seen across passes.

use std::collections::HashSet;

use lanscope_core::Device;

/// Set difference between successive discovery results, keyed by MAC.
#[derive(Debug, Default)]
pub struct NewDeviceTracker {
    known: HashSet<String>,
}

impl NewDeviceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Devices in `devices` whose MAC has not been seen before, in input
    /// order. Every returned MAC is then recorded as seen. Devices with an
    /// empty MAC are ignored.
    pub fn diff_and_record(&mut self, devices: &[Device]) -> Vec<Device> {
        devices
            .iter()
            .filter(|d| !d.mac.is_empty())
            .filter(|d| self.known.insert(d.mac.clone()))
            .cloned()
            .collect()
    }

    pub fn is_known(&self, mac: &str) -> bool {
        self.known.contains(mac)
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }
}
