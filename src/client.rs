//! High-level gNMI client.

use std::time::Duration;

use tokio::sync::mpsc;
use tonic::Request;
use tonic::transport::Channel;
use tracing::{debug, info};

use crate::channel::ChannelFactory;
use crate::codec::EnumValue;
use crate::config::{ClientConfig, Credentials, RetryConfig};
use crate::error::{GnmiError, Result};
use crate::generated::gnmi::g_nmi_client::GNmiClient;
use crate::generated::gnmi::{
    CapabilityResponse, SetResponse, SubscribeRequest, SubscriptionMode, TypedValue,
    subscribe_request, subscription_list,
};
use crate::request::{RequestBuilder, SubscribeOptions};
use crate::session::{
    GrpcTransport, SessionEvent, SubscriptionSession, UpdateSink,
};
use crate::value::{UpdateEvent, events_from_notification};

/// Connected gNMI client. Cheap to clone; all clones share one channel.
#[derive(Clone)]
pub struct GnmiClient {
    inner: GNmiClient<Channel>,
    builder: RequestBuilder,
    credentials: Option<Credentials>,
    request_timeout: Duration,
    retry: RetryConfig,
}

impl GnmiClient {
    /// Build a client from configuration. The underlying connection is
    /// established lazily on first use.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let channel_config = config.channel_config()?;
        info!(target = %channel_config.target, tls = channel_config.tls.enabled, "connecting");

        let request_timeout = Duration::from_millis(channel_config.options.request_timeout_ms);
        let max_message_size = channel_config.options.max_message_size;
        let credentials = channel_config.credentials.clone();

        let channel = ChannelFactory::build(&channel_config).await?;
        let mut inner = GNmiClient::new(channel);
        if let Some(limit) = max_message_size {
            inner = inner
                .max_decoding_message_size(limit)
                .max_encoding_message_size(limit);
        }

        Ok(Self {
            inner,
            builder: RequestBuilder::new(),
            credentials,
            request_timeout,
            retry: config.retry.clone(),
        })
    }

    /// Query the target's supported models, encodings, and gNMI version.
    pub async fn capabilities(&self) -> Result<CapabilityResponse> {
        let request = self.unary_request(self.builder.capabilities())?;
        let response = self.inner.clone().capabilities(request).await?;
        Ok(response.into_inner())
    }

    /// Retrieve a snapshot of the given paths, flattened into update events.
    pub async fn get(
        &self,
        paths: &[String],
        data_type: impl Into<EnumValue>,
        encoding: impl Into<EnumValue>,
    ) -> Result<Vec<UpdateEvent>> {
        let request = self.unary_request(self.builder.get(paths, data_type, encoding)?)?;
        let response = self.inner.clone().get(request).await?.into_inner();
        debug!(notifications = response.notification.len(), "get response");
        Ok(response
            .notification
            .iter()
            .flat_map(events_from_notification)
            .collect())
    }

    /// Apply updates, replaces, and deletes in a single transaction.
    pub async fn set(
        &self,
        updates: &[(String, TypedValue)],
        replaces: &[(String, TypedValue)],
        deletes: &[String],
    ) -> Result<SetResponse> {
        let request = self.unary_request(self.builder.set(updates, replaces, deletes)?)?;
        let response = self.inner.clone().set(request).await?;
        Ok(response.into_inner())
    }

    /// Start a streaming subscription, dispatching output to `sink`.
    ///
    /// Must be called from within a tokio runtime; the session runs on a
    /// spawned task until it completes or [`SubscriptionSession::close`] is
    /// called.
    pub fn subscribe<S: UpdateSink>(
        &self,
        options: &SubscribeOptions,
        sink: S,
    ) -> Result<SubscriptionSession> {
        let request = self.builder.subscribe(options)?;
        let immediate = immediate_dispatch(&request);
        let transport = GrpcTransport::new(self.inner.clone(), self.credentials.clone());
        Ok(SubscriptionSession::spawn(
            Box::new(transport),
            request,
            immediate,
            self.retry.clone(),
            sink,
        ))
    }

    /// Like [`subscribe`](Self::subscribe), delivering output through an
    /// unbounded channel instead of a sink implementation.
    pub fn subscribe_channel(
        &self,
        options: &SubscribeOptions,
    ) -> Result<(SubscriptionSession, mpsc::UnboundedReceiver<SessionEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = self.subscribe(options, tx)?;
        Ok((session, rx))
    }

    fn unary_request<T>(&self, message: T) -> Result<Request<T>> {
        let mut request = Request::new(message);
        request.set_timeout(self.request_timeout);
        if let Some(creds) = &self.credentials {
            let username: tonic::metadata::AsciiMetadataValue =
                creds.username.parse().map_err(|_| {
                    GnmiError::ChannelConstruction("username is not valid metadata".to_string())
                })?;
            let password: tonic::metadata::AsciiMetadataValue =
                creds.password.parse().map_err(|_| {
                    GnmiError::ChannelConstruction("password is not valid metadata".to_string())
                })?;
            request.metadata_mut().insert("username", username);
            request.metadata_mut().insert("password", password);
        }
        Ok(request)
    }
}

/// ON_CHANGE streams carry no meaningful initial snapshot boundary for
/// consumers that want changes as they happen, so updates are dispatched
/// without waiting for the sync marker.
fn immediate_dispatch(request: &SubscribeRequest) -> bool {
    match &request.request {
        Some(subscribe_request::Request::Subscribe(list)) => {
            list.mode == subscription_list::Mode::Stream as i32
                && !list.subscription.is_empty()
                && list
                    .subscription
                    .iter()
                    .all(|s| s.mode == SubscriptionMode::OnChange as i32)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_is_lazy() {
        // No server is listening; construction must still succeed.
        let config = ClientConfig::new("127.0.0.1:9339");
        let client = GnmiClient::connect(&config).await.unwrap();
        assert!(client.credentials.is_none());
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_address() {
        let config = ClientConfig::new("");
        assert!(matches!(
            GnmiClient::connect(&config).await,
            Err(GnmiError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_unary_request_carries_credentials() {
        let client_config = ClientConfig {
            credentials: Some(Credentials {
                username: "admin".to_string(),
                password: "secret".to_string(),
            }),
            ..ClientConfig::new("10.0.0.1")
        };
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let client = runtime
            .block_on(GnmiClient::connect(&client_config))
            .unwrap();

        let request = client.unary_request(()).unwrap();
        assert_eq!(request.metadata().get("username").unwrap(), "admin");
        assert_eq!(request.metadata().get("password").unwrap(), "secret");
    }

    #[test]
    fn test_immediate_dispatch_only_for_stream_on_change() {
        let builder = RequestBuilder::new();

        let on_change = SubscribeOptions {
            stream_mode: "ON_CHANGE".into(),
            ..SubscribeOptions::new(["/interfaces"])
        };
        assert!(immediate_dispatch(&builder.subscribe(&on_change).unwrap()));

        let sampled = SubscribeOptions {
            stream_mode: "SAMPLE".into(),
            sample_interval: Some(Duration::from_secs(10)),
            ..SubscribeOptions::new(["/interfaces"])
        };
        assert!(!immediate_dispatch(&builder.subscribe(&sampled).unwrap()));

        let once = SubscribeOptions {
            mode: "ONCE".into(),
            ..SubscribeOptions::new(["/interfaces"])
        };
        assert!(!immediate_dispatch(&builder.subscribe(&once).unwrap()));
    }
}
