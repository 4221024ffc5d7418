//! gNMI client library.
//!
//! Connects to gNMI targets over gRPC for capability discovery, one-shot
//! state retrieval, configuration changes, and streaming telemetry
//! subscriptions with automatic reconnection.
//!
//! ```no_run
//! use gnmi_client::{ClientConfig, GnmiClient, SessionEvent, SubscribeOptions};
//!
//! # async fn run() -> gnmi_client::Result<()> {
//! let client = GnmiClient::connect(&ClientConfig::new("192.168.1.1:9339")).await?;
//!
//! let options = SubscribeOptions::new(["/interfaces/interface/state/counters"]);
//! let (session, mut events) = client.subscribe_channel(&options)?;
//! while let Some(event) = events.recv().await {
//!     match event {
//!         SessionEvent::Update(update) => println!("{}: {:?}", update.path, update.value),
//!         SessionEvent::Sync => println!("initial sync complete"),
//!         SessionEvent::Error(error) => eprintln!("session terminated: {error}"),
//!     }
//! }
//! session.close();
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod generated;
pub mod request;
pub mod session;
pub mod target;
pub mod value;

pub use client::GnmiClient;
pub use codec::EnumValue;
pub use config::{
    ChannelConfig, ChannelOptions, ClientConfig, Credentials, DEFAULT_PORT, RetryConfig, TlsConfig,
};
pub use error::{GnmiError, Result};
pub use request::{RequestBuilder, SubscribeOptions};
pub use session::{SessionEvent, SessionState, SubscriptionSession, UpdateSink};
pub use target::TargetAddress;
pub use value::{UpdateEvent, UpdateValue};

/// Protocol message types, as generated from the gNMI protobuf definitions.
pub mod proto {
    pub use crate::generated::gnmi;
    pub use crate::generated::gnmi_ext;
}
