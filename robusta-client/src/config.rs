//! Client configuration

use std::time::Duration;

/// Configuration for connecting to the backoffice backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST backend base URL (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Bearer token for privileged calls
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Sync channel address (host:port of the socket hub)
    pub sync_addr: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
            sync_addr: None,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the sync channel address
    pub fn with_sync_addr(mut self, addr: impl Into<String>) -> Self {
        self.sync_addr = Some(addr.into());
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

/// Sync channel configuration
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Broadcast buffer per subscriber
    pub capacity: usize,
    /// First reconnect delay
    pub reconnect_delay: Duration,
    /// Exponential backoff cap
    pub max_reconnect_delay: Duration,
    /// Maximum reconnect attempts per outage (0 means retry forever)
    pub max_reconnect_attempts: u32,
}

impl Default for ChannelConfig {
    /// LAN profile: fast detection, fast recovery.
    fn default() -> Self {
        Self {
            capacity: 1024,
            reconnect_delay: Duration::from_millis(500),
            max_reconnect_delay: Duration::from_secs(10),
            max_reconnect_attempts: 20,
        }
    }
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }
}
