//! gRPC channel construction.

use std::time::Duration;

use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};
use tracing::debug;

use crate::config::ChannelConfig;
use crate::error::{GnmiError, Result};

/// Builds a secure or plaintext [`Channel`] from a [`ChannelConfig`].
///
/// The TCP connection itself is established lazily, on the first RPC,
/// matching standard gRPC channel semantics.
pub struct ChannelFactory;

impl ChannelFactory {
    pub async fn build(config: &ChannelConfig) -> Result<Channel> {
        let uri = config.target.uri(config.tls.enabled);
        debug!(uri = %uri, "building channel");

        let mut endpoint = Endpoint::from_shared(uri)
            .map_err(|e| GnmiError::ChannelConstruction(e.to_string()))?
            .connect_timeout(Duration::from_millis(config.options.connect_timeout_ms))
            .http2_keep_alive_interval(Duration::from_millis(
                config.options.keepalive_interval_ms,
            ))
            .keep_alive_timeout(Duration::from_millis(config.options.keepalive_timeout_ms))
            .keep_alive_while_idle(true);

        if config.tls.enabled {
            let tls = Self::tls_config(config).await?;
            endpoint = endpoint
                .tls_config(tls)
                .map_err(|e| GnmiError::ChannelConstruction(e.to_string()))?;
        }

        Ok(endpoint.connect_lazy())
    }

    async fn tls_config(config: &ChannelConfig) -> Result<ClientTlsConfig> {
        let mut tls = ClientTlsConfig::new();

        match &config.tls.ca_cert {
            Some(path) => {
                let pem = read_pem(path, "CA certificate").await?;
                tls = tls.ca_certificate(Certificate::from_pem(pem));
            }
            None => {
                tls = tls.with_native_roots();
            }
        }

        match (&config.tls.client_cert, &config.tls.client_key) {
            (Some(cert_path), Some(key_path)) => {
                let cert = read_pem(cert_path, "client certificate").await?;
                let key = read_pem(key_path, "client key").await?;
                tls = tls.identity(Identity::from_pem(cert, key));
            }
            (None, None) => {}
            _ => {
                return Err(GnmiError::ChannelConstruction(
                    "client_cert and client_key must be provided together".to_string(),
                ));
            }
        }

        if let Some(domain) = &config.tls.domain {
            tls = tls.domain_name(domain.clone());
        }

        Ok(tls)
    }
}

async fn read_pem(path: &str, what: &str) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| GnmiError::ChannelConstruction(format!("failed to read {} {}: {}", what, path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[tokio::test]
    async fn test_build_plaintext_channel() {
        let config = ClientConfig::new("localhost:9339").channel_config().unwrap();
        // Lazy connect: no listener needed.
        assert!(ChannelFactory::build(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_build_fails_on_missing_ca() {
        let mut client = ClientConfig::new("localhost:9339");
        client.tls.enabled = true;
        client.tls.ca_cert = Some("/nonexistent/ca.pem".to_string());
        let config = client.channel_config().unwrap();
        assert!(matches!(
            ChannelFactory::build(&config).await,
            Err(GnmiError::ChannelConstruction(_))
        ));
    }

    #[tokio::test]
    async fn test_build_fails_on_half_identity() {
        let mut client = ClientConfig::new("localhost:9339");
        client.tls.enabled = true;
        client.tls.client_cert = Some("/etc/certs/client.pem".to_string());
        let config = client.channel_config().unwrap();
        assert!(matches!(
            ChannelFactory::build(&config).await,
            Err(GnmiError::ChannelConstruction(_))
        ));
    }
}
