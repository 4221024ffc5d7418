//! Request construction for the gNMI RPC surface.
//!
//! Pure constructors: validation and message assembly only, no I/O.

use std::collections::HashMap;
use std::time::Duration;

use crate::codec::{EnumTable, EnumValue};
use crate::error::{GnmiError, Result};
use crate::generated::gnmi::{
    CapabilityRequest, GetRequest, Path, PathElem, SetRequest, SubscribeRequest, Subscription,
    SubscriptionList, SubscriptionMode, TypedValue, Update, subscribe_request,
};

/// Parameters for a streaming subscription.
#[derive(Debug, Clone)]
pub struct SubscribeOptions {
    /// XPath-like paths to subscribe to.
    pub paths: Vec<String>,

    /// Subscription list mode: STREAM, ONCE, or POLL (name or wire code).
    pub mode: EnumValue,

    /// Per-path stream mode: TARGET_DEFINED, ON_CHANGE, or SAMPLE.
    pub stream_mode: EnumValue,

    /// Sampling period; required when `stream_mode` is SAMPLE, ignored
    /// otherwise.
    pub sample_interval: Option<Duration>,

    /// Value encoding requested from the target.
    pub encoding: EnumValue,

    /// Suppress updates whose value has not changed (SAMPLE mode).
    pub suppress_redundant: bool,

    /// Maximum silent period when `suppress_redundant` is set.
    pub heartbeat_interval: Option<Duration>,

    /// Ask the target to skip the initial state snapshot.
    pub updates_only: bool,
}

impl SubscribeOptions {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            mode: EnumValue::Name("STREAM".to_string()),
            stream_mode: EnumValue::Name("TARGET_DEFINED".to_string()),
            sample_interval: None,
            encoding: EnumValue::Name("JSON_IETF".to_string()),
            suppress_redundant: false,
            heartbeat_interval: None,
            updates_only: false,
        }
    }
}

/// Builds gNMI request messages, resolving enum parameters through lookup
/// tables constructed once at client startup.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    subscription_mode: EnumTable,
    list_mode: EnumTable,
    encoding: EnumTable,
    data_type: EnumTable,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            subscription_mode: EnumTable::subscription_mode(),
            list_mode: EnumTable::list_mode(),
            encoding: EnumTable::encoding(),
            data_type: EnumTable::data_type(),
        }
    }

    pub fn capabilities(&self) -> CapabilityRequest {
        CapabilityRequest::default()
    }

    pub fn get(
        &self,
        paths: &[String],
        data_type: impl Into<EnumValue>,
        encoding: impl Into<EnumValue>,
    ) -> Result<GetRequest> {
        if paths.is_empty() {
            return Err(GnmiError::InvalidRequest(
                "get request requires at least one path".to_string(),
            ));
        }
        Ok(GetRequest {
            path: paths.iter().map(|p| Self::parse_path(p)).collect(),
            r#type: self.data_type.resolve("type", data_type)?,
            encoding: self.encoding.resolve("encoding", encoding)?,
            ..Default::default()
        })
    }

    pub fn set(
        &self,
        updates: &[(String, TypedValue)],
        replaces: &[(String, TypedValue)],
        deletes: &[String],
    ) -> Result<SetRequest> {
        if updates.is_empty() && replaces.is_empty() && deletes.is_empty() {
            return Err(GnmiError::InvalidRequest(
                "set request requires at least one update, replace, or delete".to_string(),
            ));
        }
        let to_update = |(path, val): &(String, TypedValue)| Update {
            path: Some(Self::parse_path(path)),
            val: Some(val.clone()),
            ..Default::default()
        };
        Ok(SetRequest {
            update: updates.iter().map(to_update).collect(),
            replace: replaces.iter().map(to_update).collect(),
            delete: deletes.iter().map(|p| Self::parse_path(p)).collect(),
            ..Default::default()
        })
    }

    pub fn subscribe(&self, options: &SubscribeOptions) -> Result<SubscribeRequest> {
        if options.paths.is_empty() {
            return Err(GnmiError::InvalidRequest(
                "subscribe request requires at least one path".to_string(),
            ));
        }

        let list_mode = self.list_mode.resolve("mode", options.mode.clone())?;
        let stream_mode = self
            .subscription_mode
            .resolve("stream_mode", options.stream_mode.clone())?;
        let encoding = self.encoding.resolve("encoding", options.encoding.clone())?;

        let sample_interval = if stream_mode == SubscriptionMode::Sample as i32 {
            let interval = options.sample_interval.ok_or_else(|| {
                GnmiError::InvalidRequest(
                    "sample_interval is required when stream_mode is SAMPLE".to_string(),
                )
            })?;
            interval.as_nanos() as u64
        } else {
            // Ignored by the protocol outside SAMPLE mode.
            0
        };

        let subscriptions = options
            .paths
            .iter()
            .map(|path| Subscription {
                path: Some(Self::parse_path(path)),
                mode: stream_mode,
                sample_interval,
                suppress_redundant: options.suppress_redundant,
                heartbeat_interval: options
                    .heartbeat_interval
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or(0),
            })
            .collect();

        let list = SubscriptionList {
            prefix: None,
            subscription: subscriptions,
            mode: list_mode,
            encoding,
            updates_only: options.updates_only,
            ..Default::default()
        };

        Ok(SubscribeRequest {
            request: Some(subscribe_request::Request::Subscribe(list)),
            extension: vec![],
        })
    }

    /// Parse an XPath-like path into a gNMI [`Path`],
    /// e.g. `/interfaces/interface[name=eth0]/state/counters`.
    pub fn parse_path(path_str: &str) -> Path {
        let elem = path_str
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                let (name, key) = Self::parse_path_segment(segment);
                PathElem { name, key }
            })
            .collect();

        Path {
            elem,
            ..Default::default()
        }
    }

    /// Parse `interface[name=eth0]` into `("interface", {"name": "eth0"})`.
    fn parse_path_segment(segment: &str) -> (String, HashMap<String, String>) {
        match segment.find('[') {
            Some(bracket_pos) => {
                let name = segment[..bracket_pos].to_string();
                let keys_str = segment[bracket_pos + 1..]
                    .strip_suffix(']')
                    .unwrap_or(&segment[bracket_pos + 1..]);
                let keys = keys_str
                    .split(',')
                    .filter_map(|kv| kv.split_once('='))
                    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                    .collect();
                (name, keys)
            }
            None => (segment.to_string(), HashMap::new()),
        }
    }

    /// Render a gNMI [`Path`] back into its XPath-like string form.
    pub fn path_to_string(path: &Path) -> String {
        path.elem
            .iter()
            .map(|elem| {
                if elem.key.is_empty() {
                    elem.name.clone()
                } else {
                    let mut keys: Vec<String> = elem
                        .key
                        .iter()
                        .map(|(k, v)| format!("{}={}", k, v))
                        .collect();
                    keys.sort();
                    format!("{}[{}]", elem.name, keys.join(","))
                }
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}
