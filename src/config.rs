//! Node and peer configuration, and the default timers from RFC 6733 §12.

use std::time::Duration;

/// Default Tw, the watchdog interval (RFC 3539 §3.4 recommends 30s as a floor).
pub const DEFAULT_WATCHDOG_INTERVAL: Duration = Duration::from_secs(30);
/// How long to wait for a DWA before declaring the link dead.
pub const DEFAULT_DWA_TIMEOUT: Duration = Duration::from_secs(30);
/// How long a connection may sit outside the Ready state before it's dropped.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// How long to wait for a CEA after sending a CER before giving up.
pub const DEFAULT_CEA_TIMEOUT: Duration = Duration::from_secs(3);
/// How long to wait for an answer to an application request before giving up.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Ceiling on a single message, guarding against a peer claiming an absurd length.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    /// Declared for configuration compatibility; no SCTP association support
    /// is implemented.
    Sctp,
}

#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: u32,
}

impl Default for ReconnectBackoff {
    fn default() -> ReconnectBackoff {
        ReconnectBackoff {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
            multiplier: 2,
        }
    }
}

impl ReconnectBackoff {
    pub fn next(&self, current: Duration) -> Duration {
        let scaled = current
            .checked_mul(self.multiplier)
            .unwrap_or(self.max);
        std::cmp::min(scaled, self.max)
    }
}

/// Settings for the local node identity, shared across all its peer connections.
#[derive(Debug, Clone)]
pub struct NodeSettings {
    pub origin_host: String,
    pub origin_realm: String,
    pub vendor_id: u32,
    pub product_name: String,
    pub firmware_revision: Option<u32>,
    pub auth_application_ids: Vec<u32>,
    pub acct_application_ids: Vec<u32>,
    pub supported_vendor_ids: Vec<u32>,
    /// Address the node listens on for inbound connections, e.g. `"0.0.0.0:3868"`.
    pub listen_addr: String,
    pub watchdog_interval: Duration,
    pub dwa_timeout: Duration,
    pub cea_timeout: Duration,
    pub request_timeout: Duration,
}

impl NodeSettings {
    pub fn new(origin_host: impl Into<String>, origin_realm: impl Into<String>) -> NodeSettings {
        NodeSettings {
            origin_host: origin_host.into(),
            origin_realm: origin_realm.into(),
            vendor_id: 0,
            product_name: "diameter-rs".to_string(),
            firmware_revision: None,
            auth_application_ids: Vec::new(),
            acct_application_ids: Vec::new(),
            supported_vendor_ids: Vec::new(),
            listen_addr: "0.0.0.0:3868".to_string(),
            watchdog_interval: DEFAULT_WATCHDOG_INTERVAL,
            dwa_timeout: DEFAULT_DWA_TIMEOUT,
            cea_timeout: DEFAULT_CEA_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Settings for a single configured peer.
#[derive(Debug, Clone)]
pub struct PeerSettings {
    pub host: String,
    pub port: u16,
    pub transport: Transport,
    pub use_tls: bool,
    pub verify_cert: bool,
    pub connect_timeout: Duration,
    pub watchdog_interval: Duration,
    pub dwa_timeout: Duration,
    pub reconnect: ReconnectBackoff,
}

impl PeerSettings {
    pub fn new(host: impl Into<String>, port: u16) -> PeerSettings {
        PeerSettings {
            host: host.into(),
            port,
            transport: Transport::Tcp,
            use_tls: false,
            verify_cert: true,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            watchdog_interval: DEFAULT_WATCHDOG_INTERVAL,
            dwa_timeout: DEFAULT_DWA_TIMEOUT,
            reconnect: ReconnectBackoff::default(),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_until_cap() {
        let backoff = ReconnectBackoff::default();
        let a = backoff.initial;
        let b = backoff.next(a);
        let c = backoff.next(b);
        assert_eq!(b, Duration::from_secs(2));
        assert_eq!(c, Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_caps_at_max() {
        let backoff = ReconnectBackoff::default();
        let mut current = backoff.initial;
        for _ in 0..20 {
            current = backoff.next(current);
        }
        assert_eq!(current, backoff.max);
    }

    #[test]
    fn test_peer_settings_address() {
        let settings = PeerSettings::new("dra2.gy.mno.net", 3868);
        assert_eq!(settings.address(), "dra2.gy.mno.net:3868");
    }
}
