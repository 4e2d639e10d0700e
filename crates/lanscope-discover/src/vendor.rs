//! MAC vendor resolution with a process-lifetime cache.
//!
//! [`VendorResolver`] owns the cache and talks to the remote service through
//! the [`VendorLookup`] seam. Definitive answers (a vendor name, or a non-200
//! status) are cached once per upper-cased MAC. Transient failures such as
//! timeouts are logged and not cached, so the next pass retries them.

use std::collections::HashMap;

use async_trait::async_trait;
use lanscope_core::types::UNKNOWN_VENDOR;
use reqwest::StatusCode;

use crate::config::VendorConfig;
use crate::error::{DiscoverError, Result};

/// Shortest string that can carry an OUI (`AA:BB:CC`).
const MIN_MAC_LEN: usize = 8;

/// A definitive answer from the vendor service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// HTTP 200 with the vendor name as the (untrimmed) body.
    Found(String),
    /// Any other status. Treated as an authoritative negative.
    Missing { status: u16 },
}

/// Remote MAC-to-vendor lookup.
#[async_trait]
pub trait VendorLookup: Send + Sync {
    /// Look up `mac` exactly as given. `Err` means the answer is unknown,
    /// not that the vendor does not exist.
    async fn lookup(&self, mac: &str) -> Result<LookupOutcome>;
}

/// HTTP client for services of the form `GET <base_url><mac>`.
#[derive(Debug, Clone)]
pub struct HttpVendorLookup {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVendorLookup {
    pub fn new(config: &VendorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        let base_url = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };

        Ok(Self { client, base_url })
    }

    pub fn url_for(&self, mac: &str) -> String {
        format!("{}{mac}", self.base_url)
    }
}

#[async_trait]
impl VendorLookup for HttpVendorLookup {
    async fn lookup(&self, mac: &str) -> Result<LookupOutcome> {
        let wrap = |source: reqwest::Error| {
            if source.is_timeout() {
                DiscoverError::VendorTimeout {
                    mac: mac.to_string(),
                }
            } else {
                DiscoverError::VendorRequest {
                    mac: mac.to_string(),
                    source,
                }
            }
        };

        let response = self.client.get(self.url_for(mac)).send().await.map_err(wrap)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Ok(LookupOutcome::Missing {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(wrap)?;
        Ok(LookupOutcome::Found(body))
    }
}

/// Caching front end for a [`VendorLookup`].
///
/// Owned by a single orchestrator. Callers driving discovery from several
/// tasks must wrap it in their own lock.
pub struct VendorResolver<L> {
    lookup: L,
    cache: HashMap<String, String>,
}

impl<L: VendorLookup> VendorResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            cache: HashMap::new(),
        }
    }

    /// Vendor name for `mac`, or `"Unknown"`. Never fails.
    pub async fn get_vendor(&mut self, mac: &str) -> String {
        if mac.len() < MIN_MAC_LEN {
            return UNKNOWN_VENDOR.to_string();
        }

        let key = mac.to_uppercase();
        if let Some(vendor) = self.cache.get(&key) {
            return vendor.clone();
        }

        match self.resolve(mac).await {
            Ok(vendor) => self.cache.entry(key).or_insert(vendor).clone(),
            Err(e) => {
                tracing::warn!(mac = %mac, error = %e, "Vendor lookup failed, not caching");
                UNKNOWN_VENDOR.to_string()
            }
        }
    }

    /// The remote answer for `mac`, mapped to the value that should be cached.
    async fn resolve(&self, mac: &str) -> Result<String> {
        match self.lookup.lookup(mac).await? {
            LookupOutcome::Found(body) => {
                let vendor = body.trim();
                if vendor.is_empty() {
                    Ok(UNKNOWN_VENDOR.to_string())
                } else {
                    Ok(vendor.to_string())
                }
            }
            LookupOutcome::Missing { status } => {
                tracing::debug!(mac = %mac, status, "Vendor not found");
                Ok(UNKNOWN_VENDOR.to_string())
            }
        }
    }

    /// Cached value for `mac` in any casing.
    pub fn cached(&self, mac: &str) -> Option<&str> {
        self.cache.get(&mac.to_uppercase()).map(String::as_str)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Scripted lookup that records every MAC it was asked for.
    #[derive(Clone, Default)]
    struct FakeLookup {
        calls: Arc<AtomicUsize>,
        requested: Arc<Mutex<Vec<String>>>,
        reply: Arc<Mutex<Option<fn(&str) -> Result<LookupOutcome>>>>,
    }

    impl FakeLookup {
        fn replying(reply: fn(&str) -> Result<LookupOutcome>) -> Self {
            let fake = Self::default();
            *fake.reply.lock().unwrap() = Some(reply);
            fake
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VendorLookup for FakeLookup {
        async fn lookup(&self, mac: &str) -> Result<LookupOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(mac.to_string());
            let reply = self.reply.lock().unwrap().expect("reply not scripted");
            reply(mac)
        }
    }

    fn found(_: &str) -> Result<LookupOutcome> {
        Ok(LookupOutcome::Found("  Apple, Inc.  \n".to_string()))
    }

    fn not_found(_: &str) -> Result<LookupOutcome> {
        Ok(LookupOutcome::Missing { status: 404 })
    }

    fn timed_out(mac: &str) -> Result<LookupOutcome> {
        Err(DiscoverError::VendorTimeout {
            mac: mac.to_string(),
        })
    }

    #[tokio::test]
    async fn test_found_vendor_is_trimmed_and_cached() {
        let fake = FakeLookup::replying(found);
        let mut resolver = VendorResolver::new(fake.clone());

        assert_eq!(resolver.get_vendor("00:1A:2B:3C:4D:5E").await, "Apple, Inc.");
        assert_eq!(resolver.cached("00:1a:2b:3c:4d:5e"), Some("Apple, Inc."));
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_mac_skips_lookup_and_cache() {
        let fake = FakeLookup::replying(found);
        let mut resolver = VendorResolver::new(fake.clone());

        assert_eq!(resolver.get_vendor("").await, "Unknown");
        assert_eq!(resolver.get_vendor("123").await, "Unknown");
        assert_eq!(resolver.get_vendor("AA:BB:C").await, "Unknown");
        assert_eq!(fake.calls(), 0);
        assert_eq!(resolver.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_cache_key_ignores_case() {
        let fake = FakeLookup::replying(found);
        let mut resolver = VendorResolver::new(fake.clone());

        let first = resolver.get_vendor("aa:bb:cc:dd:ee:ff").await;
        let second = resolver.get_vendor("AA:BB:CC:DD:EE:FF").await;

        assert_eq!(first, second);
        assert_eq!(fake.calls(), 1);
        assert_eq!(resolver.cache_len(), 1);
        assert_eq!(resolver.cached("AA:BB:CC:DD:EE:FF"), Some("Apple, Inc."));
    }

    #[tokio::test]
    async fn test_outbound_request_keeps_original_casing() {
        let fake = FakeLookup::replying(found);
        let mut resolver = VendorResolver::new(fake.clone());

        resolver.get_vendor("aa:bb:cc:dd:ee:ff").await;
        assert_eq!(
            fake.requested.lock().unwrap().as_slice(),
            &["aa:bb:cc:dd:ee:ff".to_string()]
        );
    }

    #[tokio::test]
    async fn test_not_found_is_cached_as_unknown() {
        let fake = FakeLookup::replying(not_found);
        let mut resolver = VendorResolver::new(fake.clone());

        assert_eq!(resolver.get_vendor("FF:FF:FF:FF:FF:FF").await, "Unknown");
        assert_eq!(resolver.cached("FF:FF:FF:FF:FF:FF"), Some("Unknown"));

        assert_eq!(resolver.get_vendor("ff:ff:ff:ff:ff:ff").await, "Unknown");
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_not_cached() {
        let fake = FakeLookup::replying(timed_out);
        let mut resolver = VendorResolver::new(fake.clone());

        assert_eq!(resolver.get_vendor("00:11:22:33:44:55").await, "Unknown");
        assert_eq!(resolver.cached("00:11:22:33:44:55"), None);

        // The next call goes back to the network.
        resolver.get_vendor("00:11:22:33:44:55").await;
        assert_eq!(fake.calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_after_timeout_caches_success() {
        let fake = FakeLookup::replying(timed_out);
        let mut resolver = VendorResolver::new(fake.clone());
        resolver.get_vendor("00:11:22:33:44:55").await;

        *fake.reply.lock().unwrap() = Some(found);
        assert_eq!(resolver.get_vendor("00:11:22:33:44:55").await, "Apple, Inc.");
        assert_eq!(resolver.cache_len(), 1);
    }

    /// Serve one canned HTTP response per connection and report request lines.
    async fn serve(status_line: &'static str, body: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_task = seen.clone();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = vec![0u8; 4096];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                if let Some(line) = request.lines().next() {
                    seen_task.lock().unwrap().push(line.to_string());
                }
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{addr}"), seen)
    }

    fn http_lookup(base_url: String, timeout_ms: u64) -> HttpVendorLookup {
        HttpVendorLookup::new(&VendorConfig {
            base_url,
            timeout_ms,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_http_lookup_found() {
        let (base_url, seen) = serve("200 OK", "Dell Inc.\n").await;
        let lookup = http_lookup(base_url, 2000);

        let outcome = lookup.lookup("00:14:22:01:23:45").await.unwrap();
        assert_eq!(outcome, LookupOutcome::Found("Dell Inc.\n".to_string()));
        assert_eq!(
            seen.lock().unwrap().first().map(String::as_str),
            Some("GET /00:14:22:01:23:45 HTTP/1.1")
        );
    }

    #[tokio::test]
    async fn test_http_lookup_not_found() {
        let (base_url, _) = serve("404 Not Found", "{\"errors\":{\"detail\":\"Not Found\"}}").await;
        let lookup = http_lookup(base_url, 2000);

        let outcome = lookup.lookup("FF:FF:FF:FF:FF:FF").await.unwrap();
        assert_eq!(outcome, LookupOutcome::Missing { status: 404 });
    }

    #[tokio::test]
    async fn test_http_lookup_timeout() {
        // Accept connections but never answer.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let lookup = http_lookup(format!("http://{addr}/"), 100);
        let started = std::time::Instant::now();
        let result = lookup.lookup("00:11:22:33:44:55").await;

        assert!(matches!(result, Err(DiscoverError::VendorTimeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_url_appends_mac_segment() {
        let lookup = http_lookup("https://api.macvendors.com".to_string(), 2000);
        assert_eq!(
            lookup.url_for("aa:bb:cc:dd:ee:ff"),
            "https://api.macvendors.com/aa:bb:cc:dd:ee:ff"
        );
    }
}
