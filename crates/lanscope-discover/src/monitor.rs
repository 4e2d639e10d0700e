//! Discovery orchestration.
//!
//! [`NetworkMonitor`] owns one of each engine plus the new-device tracker and
//! runs them in the order subnet → discovery → tracker. Port probing is
//! driven separately from a list of addresses. Watch mode repeats discovery
//! passes on an interval and streams [`ScanEvent`]s to a callback.

use std::net::IpAddr;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use ipnet::Ipv4Net;
use tokio::time::{interval, MissedTickBehavior};
use uuid::Uuid;

use lanscope_core::events::{EventPayload, ScanEvent};
use lanscope_core::{Device, HostPorts};

use crate::config::{DiscoverConfig, ScanProfile};
use crate::discovery::DiscoveryEngine;
use crate::error::Result;
use crate::link::{LinkLayer, PnetLink};
use crate::probe::{Connector, PortProbeEngine, TcpConnector};
use crate::subnet::SubnetLocator;
use crate::tracker::NewDeviceTracker;
use crate::vendor::{HttpVendorLookup, VendorLookup, VendorResolver};

/// Floor for the watch period; `tokio::time::interval` rejects zero.
const MIN_WATCH_PERIOD: Duration = Duration::from_millis(1);

/// Outcome of a single discovery pass.
#[derive(Debug, Clone)]
pub struct PassReport {
    pub scan_id: Uuid,
    pub target: Ipv4Net,
    pub started_at: DateTime<Utc>,
    /// Every device that answered, in arrival order.
    pub devices: Vec<Device>,
    /// The subset of `devices` no earlier pass had seen.
    pub new_devices: Vec<Device>,
    pub duration: Duration,
}

impl PassReport {
    /// `ScanStarted`, one `DeviceDiscovered` per new device, `ScanCompleted`.
    pub fn events(&self) -> Vec<ScanEvent> {
        let mut events = Vec::with_capacity(self.new_devices.len() + 2);

        let mut started = ScanEvent::new(EventPayload::ScanStarted {
            scan_id: self.scan_id,
            target: self.target.to_string(),
        });
        started.timestamp = self.started_at;
        events.push(started);

        events.extend(self.new_devices.iter().map(|device| {
            ScanEvent::new(EventPayload::DeviceDiscovered {
                scan_id: self.scan_id,
                device: device.clone(),
            })
        }));

        events.push(ScanEvent::new(EventPayload::ScanCompleted {
            scan_id: self.scan_id,
            devices_found: self.devices.len() as u32,
            new_devices: self.new_devices.len() as u32,
            duration_ms: self.duration.as_millis() as u64,
        }));

        events
    }
}

pub struct NetworkMonitor<K, L, C = TcpConnector> {
    locator: SubnetLocator,
    discovery: DiscoveryEngine<K, L>,
    tracker: NewDeviceTracker,
    prober: PortProbeEngine<C>,
}

impl NetworkMonitor<PnetLink, HttpVendorLookup, TcpConnector> {
    /// Wire the production engines from configuration.
    pub fn from_config(config: &DiscoverConfig) -> Result<Self> {
        let lookup = HttpVendorLookup::new(&config.vendor)?;
        let discovery = DiscoveryEngine::new(
            PnetLink::new(config.interface.clone()),
            VendorResolver::new(lookup),
            config.discovery_window(),
        );

        Ok(Self::new(
            SubnetLocator::from_config(config),
            discovery,
            PortProbeEngine::from_config(config),
        ))
    }
}

impl<K, L, C> NetworkMonitor<K, L, C>
where
    K: LinkLayer + 'static,
    L: VendorLookup,
    C: Connector,
{
    pub fn new(
        locator: SubnetLocator,
        discovery: DiscoveryEngine<K, L>,
        prober: PortProbeEngine<C>,
    ) -> Self {
        Self {
            locator,
            discovery,
            tracker: NewDeviceTracker::new(),
            prober,
        }
    }

    pub fn tracker(&self) -> &NewDeviceTracker {
        &self.tracker
    }

    pub fn discovery(&self) -> &DiscoveryEngine<K, L> {
        &self.discovery
    }

    /// Discover `target`, or the located subnet when `None`, and diff the
    /// result against every earlier pass.
    pub async fn run_pass(&mut self, target: Option<Ipv4Net>) -> PassReport {
        let scan_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        let range = target.unwrap_or_else(|| self.locator.locate());

        tracing::info!(scan_id = %scan_id, target = %range, "Starting discovery pass");

        let devices = self.discovery.discover(range).await;
        let new_devices = self.tracker.diff_and_record(&devices);
        let duration = start.elapsed();

        tracing::info!(
            scan_id = %scan_id,
            target = %range,
            devices = devices.len(),
            new = new_devices.len(),
            known = self.tracker.known_count(),
            duration_ms = duration.as_millis() as u64,
            "Pass complete"
        );

        PassReport {
            scan_id,
            target: range,
            started_at,
            devices,
            new_devices,
            duration,
        }
    }

    /// Probe each address in turn. One entry per input address, in order.
    pub async fn probe_hosts(&self, ips: &[IpAddr], profile: ScanProfile) -> Vec<HostPorts> {
        let mut results = Vec::with_capacity(ips.len());

        for &ip in ips {
            let start = Instant::now();
            let open_ports = self.prober.probe(ip, profile).await;
            results.push(HostPorts {
                ip,
                open_ports,
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }

        results
    }

    /// Run discovery passes every `every` until `emit` breaks.
    ///
    /// The first pass starts immediately. A pass that overruns the interval
    /// delays the next tick instead of bursting to catch up. A zero period
    /// is raised to one millisecond.
    pub async fn watch<F>(&mut self, target: Option<Ipv4Net>, every: Duration, mut emit: F)
    where
        F: FnMut(ScanEvent) -> ControlFlow<()>,
    {
        let mut ticker = interval(every.max(MIN_WATCH_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let report = self.run_pass(target).await;
            for event in report.events() {
                if emit(event).is_break() {
                    tracing::info!(known = self.tracker.known_count(), "Watch stopped");
                    return;
                }
            }
        }
    }
}
