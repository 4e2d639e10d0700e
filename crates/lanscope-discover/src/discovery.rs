//! Device discovery: ARP sweep, vendor enrichment, classification.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ipnet::Ipv4Net;
use lanscope_core::Device;

use crate::arp::ArpReply;
use crate::classify::classify;
use crate::error::Result;
use crate::link::LinkLayer;
use crate::vendor::{VendorLookup, VendorResolver};

/// Runs discovery passes over a link layer and enriches each reply.
///
/// Holds the vendor cache for its whole lifetime, so repeated passes over a
/// stable network only hit the vendor service for new hardware.
pub struct DiscoveryEngine<K, L> {
    link: Arc<K>,
    vendors: VendorResolver<L>,
    window: Duration,
}

impl<K, L> DiscoveryEngine<K, L>
where
    K: LinkLayer + 'static,
    L: VendorLookup,
{
    pub fn new(link: K, vendors: VendorResolver<L>, window: Duration) -> Self {
        Self {
            link: Arc::new(link),
            vendors,
            window,
        }
    }

    /// Default reply collection window.
    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn vendors(&self) -> &VendorResolver<L> {
        &self.vendors
    }

    /// One discovery pass over `range` with the configured window.
    pub async fn discover(&mut self, range: Ipv4Net) -> Vec<Device> {
        self.discover_within(range, self.window).await
    }

    /// One discovery pass with an explicit collection window.
    ///
    /// Devices come back in reply arrival order. A transport failure is
    /// logged and reported as zero devices, which callers cannot tell apart
    /// from an empty network.
    pub async fn discover_within(&mut self, range: Ipv4Net, window: Duration) -> Vec<Device> {
        let start = Instant::now();

        let replies = match self.sweep(range, window).await {
            Ok(replies) => replies,
            Err(e) => {
                tracing::warn!(
                    target_range = %range,
                    error = %e,
                    "Discovery transport failed, reporting no devices"
                );
                return Vec::new();
            }
        };

        let mut devices = Vec::with_capacity(replies.len());
        for reply in replies {
            devices.push(self.enrich(reply).await);
        }

        if devices.is_empty() {
            tracing::info!(target_range = %range, "No devices answered the sweep");
        } else {
            tracing::info!(
                target_range = %range,
                devices = devices.len(),
                vendors_cached = self.vendors.cache_len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Discovery pass complete"
            );
        }

        devices
    }

    async fn sweep(&self, range: Ipv4Net, window: Duration) -> Result<Vec<ArpReply>> {
        let link = Arc::clone(&self.link);
        tokio::task::spawn_blocking(move || link.sweep(range, window)).await?
    }

    async fn enrich(&mut self, reply: ArpReply) -> Device {
        let mac = reply.mac.to_string();
        let vendor = self.vendors.get_vendor(&mac).await;
        let category = classify(&mac, Some(&vendor), &reply.ip.to_string());
        Device::new(reply.ip, &mac, vendor, category)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use lanscope_core::DeviceCategory;
    use pnet::util::MacAddr;

    use super::*;
    use crate::error::DiscoverError;
    use crate::vendor::LookupOutcome;

    struct FakeLink {
        replies: Vec<ArpReply>,
        fail: bool,
        windows: Mutex<Vec<Duration>>,
    }

    impl FakeLink {
        fn answering(replies: Vec<ArpReply>) -> Self {
            Self {
                replies,
                fail: false,
                windows: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                replies: Vec::new(),
                fail: true,
                windows: Mutex::new(Vec::new()),
            }
        }
    }

    impl LinkLayer for FakeLink {
        fn sweep(&self, _range: Ipv4Net, window: Duration) -> Result<Vec<ArpReply>> {
            self.windows.lock().unwrap().push(window);
            if self.fail {
                return Err(DiscoverError::PermissionDenied {
                    interface: "eth0".to_string(),
                });
            }
            Ok(self.replies.clone())
        }
    }

    /// Answers from a fixed OUI table and counts calls.
    #[derive(Default)]
    struct OuiTable {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VendorLookup for OuiTable {
        async fn lookup(&self, mac: &str) -> Result<LookupOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = match &mac[..8] {
                "00:14:22" => LookupOutcome::Found("Dell Inc.".to_string()),
                "00:1e:8f" => LookupOutcome::Found("Canon Inc.".to_string()),
                "50:c7:bf" => LookupOutcome::Found("TP-LINK TECHNOLOGIES CO.,LTD.".to_string()),
                _ => LookupOutcome::Missing { status: 404 },
            };
            Ok(outcome)
        }
    }

    fn reply(last_octet: u8, mac: [u8; 6]) -> ArpReply {
        ArpReply {
            ip: Ipv4Addr::new(192, 168, 1, last_octet),
            mac: MacAddr::new(mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]),
        }
    }

    fn range() -> Ipv4Net {
        "192.168.1.1/24".parse().unwrap()
    }

    fn engine(link: FakeLink) -> DiscoveryEngine<FakeLink, OuiTable> {
        DiscoveryEngine::new(
            link,
            VendorResolver::new(OuiTable::default()),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_discover_enriches_in_arrival_order() {
        let link = FakeLink::answering(vec![
            reply(50, [0x00, 0x14, 0x22, 0x01, 0x02, 0x03]),
            reply(1, [0x50, 0xc7, 0xbf, 0x0a, 0x0b, 0x0c]),
            reply(60, [0x00, 0x1e, 0x8f, 0xaa, 0xbb, 0xcc]),
            reply(99, [0x02, 0x42, 0xac, 0x11, 0x00, 0x02]),
        ]);
        let mut engine = engine(link);

        let devices = engine.discover(range()).await;

        let ips: Vec<u8> = devices.iter().map(|d| d.ip.octets()[3]).collect();
        assert_eq!(ips, vec![50, 1, 60, 99]);

        assert_eq!(devices[0].mac, "00:14:22:01:02:03");
        assert_eq!(devices[0].vendor, "Dell Inc.");
        assert_eq!(devices[0].category, DeviceCategory::Pc);

        assert_eq!(devices[1].category, DeviceCategory::Router);
        assert_eq!(devices[2].category, DeviceCategory::Printer);

        assert_eq!(devices[3].mac, "02:42:AC:11:00:02");
        assert_eq!(devices[3].vendor, "Unknown");
        assert_eq!(devices[3].category, DeviceCategory::Unknown);
    }

    #[tokio::test]
    async fn test_repeat_pass_is_served_from_cache() {
        let link = FakeLink::answering(vec![
            reply(50, [0x00, 0x14, 0x22, 0x01, 0x02, 0x03]),
            reply(99, [0x02, 0x42, 0xac, 0x11, 0x00, 0x02]),
        ]);
        let mut engine = engine(link);

        engine.discover(range()).await;
        engine.discover(range()).await;

        assert_eq!(engine.vendors().cache_len(), 2);
        assert_eq!(engine.vendors.lookup_calls(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_yields_no_devices() {
        let mut engine = engine(FakeLink::failing());
        assert!(engine.discover(range()).await.is_empty());
    }

    #[tokio::test]
    async fn test_window_is_passed_to_link() {
        let mut engine = engine(FakeLink::answering(Vec::new()));

        engine.discover(range()).await;
        engine
            .discover_within(range(), Duration::from_millis(250))
            .await;

        let windows = engine.link.windows.lock().unwrap().clone();
        assert_eq!(
            windows,
            vec![Duration::from_secs(1), Duration::from_millis(250)]
        );
    }

    impl VendorResolver<OuiTable> {
        fn lookup_calls(&self) -> usize {
            self.lookup().calls.load(Ordering::SeqCst)
        }
    }
}
