//! Client configuration.

use serde::{Deserialize, Serialize};

use crate::error::{GnmiError, Result};
use crate::target::TargetAddress;

/// Default port assigned to gRPC services when the target string carries none.
pub const DEFAULT_PORT: u16 = 50051;

/// Top-level client configuration, loadable from a JSON5 file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Target endpoint (e.g., "192.168.1.1:9339"). A scheme prefix is
    /// tolerated and ignored.
    pub address: String,

    /// Port applied when `address` has none.
    #[serde(default = "default_port")]
    pub default_port: u16,

    /// Authentication credentials, sent as request metadata.
    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// TLS configuration.
    #[serde(default)]
    pub tls: TlsConfig,

    /// Channel options (timeouts, keepalive, message sizes).
    #[serde(default)]
    pub options: ChannelOptions,

    /// Reconnect policy for streaming subscriptions.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Minimal configuration for a plaintext connection to `address`.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            default_port: DEFAULT_PORT,
            credentials: None,
            tls: TlsConfig::default(),
            options: ChannelOptions::default(),
            retry: RetryConfig::default(),
        }
    }

    /// Load configuration from a JSON5 file.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            json5::from_str(&content).map_err(|e| GnmiError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Resolve the configured address into a [`ChannelConfig`].
    pub fn channel_config(&self) -> Result<ChannelConfig> {
        let target = TargetAddress::parse(&self.address, self.default_port)?;
        Ok(ChannelConfig {
            target,
            credentials: self.credentials.clone(),
            tls: self.tls.clone(),
            options: self.options.clone(),
        })
    }
}

/// Resolved inputs for channel construction. Immutable once built.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub target: TargetAddress,
    pub credentials: Option<Credentials>,
    pub tls: TlsConfig,
    pub options: ChannelOptions,
}

/// Authentication credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Username for authentication.
    pub username: String,

    /// Password for authentication.
    pub password: String,
}

/// TLS configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Enable TLS.
    #[serde(default)]
    pub enabled: bool,

    /// Path to CA certificate file (PEM).
    #[serde(default)]
    pub ca_cert: Option<String>,

    /// Path to client certificate file (PEM).
    #[serde(default)]
    pub client_cert: Option<String>,

    /// Path to client key file (PEM).
    #[serde(default)]
    pub client_key: Option<String>,

    /// Override the domain name used for certificate verification.
    #[serde(default)]
    pub domain: Option<String>,
}

/// Channel options applied at endpoint construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelOptions {
    /// TCP connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Deadline for unary calls in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// HTTP/2 keepalive ping interval in milliseconds.
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,

    /// Deadline for a keepalive ping acknowledgement in milliseconds.
    #[serde(default = "default_keepalive_timeout_ms")]
    pub keepalive_timeout_ms: u64,

    /// Maximum decoded message size in bytes, if bounded.
    #[serde(default)]
    pub max_message_size: Option<usize>,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            keepalive_interval_ms: default_keepalive_interval_ms(),
            keepalive_timeout_ms: default_keepalive_timeout_ms(),
            max_message_size: None,
        }
    }
}

/// Reconnect policy for subscription sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of reconnect attempts before the session terminates.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Backoff delay cap in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Multiplier applied to the delay after each attempt.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Whether to randomize delays to avoid thundering herds.
    #[serde(default = "default_use_jitter")]
    pub use_jitter: bool,
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }

    pub fn with_max_delay(mut self, delay_ms: u64) -> Self {
        self.max_delay_ms = delay_ms;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            use_jitter: default_use_jitter(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_keepalive_interval_ms() -> u64 {
    30_000
}

fn default_keepalive_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_use_jitter() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_config() {
        let json = r#"{
            "address": "192.168.1.1:9339",
            "credentials": {
                "username": "admin",
                "password": "admin"
            },
            "tls": {
                "enabled": true,
                "ca_cert": "/etc/certs/ca.pem"
            }
        }"#;

        let config: ClientConfig = json5::from_str(json).unwrap();
        assert_eq!(config.address, "192.168.1.1:9339");
        assert!(config.tls.enabled);
        assert_eq!(config.tls.ca_cert.as_deref(), Some("/etc/certs/ca.pem"));
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.options.request_timeout_ms, 30_000);
    }

    #[test]
    fn test_channel_config_resolves_target() {
        let config = ClientConfig::new("device.local");
        let channel = config.channel_config().unwrap();
        assert_eq!(channel.target.host(), "device.local");
        assert_eq!(channel.target.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_channel_config_bad_target() {
        let config = ClientConfig::new("");
        assert!(config.channel_config().is_err());
    }

    #[test]
    fn test_tls_config_defaults() {
        let tls = TlsConfig::default();
        assert!(!tls.enabled);
        assert!(tls.ca_cert.is_none());
        assert!(tls.client_cert.is_none());
    }

    #[test]
    fn test_retry_config_builder() {
        let retry = RetryConfig::default()
            .with_max_retries(2)
            .with_initial_delay(10)
            .with_max_delay(100)
            .without_jitter();
        assert_eq!(retry.max_retries, 2);
        assert_eq!(retry.initial_delay_ms, 10);
        assert_eq!(retry.max_delay_ms, 100);
        assert!(!retry.use_jitter);
    }
}
