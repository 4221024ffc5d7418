//! Typed update values delivered to subscription sinks.

use serde::{Deserialize, Serialize};

use crate::generated::gnmi;
use crate::request::RequestBuilder;

/// A single parsed telemetry update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateEvent {
    /// Full path of the data element, prefix included.
    pub path: String,

    /// The decoded value. `Text("")` for delete events.
    pub value: UpdateValue,

    /// Target timestamp in nanoseconds since epoch.
    pub timestamp: i64,

    /// Whether this event reports a deleted path.
    pub delete: bool,
}

/// Decoded wire value of an update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum UpdateValue {
    Text(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Boolean(bool),
    Binary(Vec<u8>),
    /// JSON-encoded payload (JSON or JSON_IETF encoding).
    Json(String),
}

/// Flatten a gNMI notification into update events, joining the notification
/// prefix onto each update path.
pub fn events_from_notification(notification: &gnmi::Notification) -> Vec<UpdateEvent> {
    let prefix = notification
        .prefix
        .as_ref()
        .map(RequestBuilder::path_to_string)
        .filter(|p| !p.is_empty());

    let full_path = |path: &gnmi::Path| {
        let rendered = RequestBuilder::path_to_string(path);
        match &prefix {
            // An empty update path addresses the prefix itself.
            Some(prefix) if rendered.is_empty() => prefix.clone(),
            Some(prefix) => format!("{}/{}", prefix, rendered),
            None => rendered,
        }
    };

    let mut events = Vec::with_capacity(notification.update.len() + notification.delete.len());

    for update in &notification.update {
        if let Some(path) = &update.path {
            events.push(UpdateEvent {
                path: full_path(path),
                value: extract_value(update),
                timestamp: notification.timestamp,
                delete: false,
            });
        }
    }

    for path in &notification.delete {
        events.push(UpdateEvent {
            path: full_path(path),
            value: UpdateValue::Text(String::new()),
            timestamp: notification.timestamp,
            delete: true,
        });
    }

    events
}

fn extract_value(update: &gnmi::Update) -> UpdateValue {
    if let Some(val) = &update.val {
        return decode_typed_value(val);
    }
    #[allow(deprecated)]
    if let Some(val) = &update.value {
        // Deprecated field, but some implementations still use it.
        return UpdateValue::Binary(val.value.clone());
    }
    UpdateValue::Text(String::new())
}

fn decode_typed_value(val: &gnmi::TypedValue) -> UpdateValue {
    use gnmi::typed_value::Value;

    match &val.value {
        Some(Value::StringVal(s)) => UpdateValue::Text(s.clone()),
        Some(Value::IntVal(i)) => UpdateValue::Int(*i),
        Some(Value::UintVal(u)) => UpdateValue::Uint(*u),
        Some(Value::BoolVal(b)) => UpdateValue::Boolean(*b),
        Some(Value::BytesVal(b)) => UpdateValue::Binary(b.clone()),
        Some(Value::FloatVal(f)) => UpdateValue::Float(*f as f64),
        Some(Value::DoubleVal(d)) => UpdateValue::Float(*d),
        Some(Value::DecimalVal(d)) => {
            UpdateValue::Float(d.digits as f64 * 10f64.powi(-(d.precision as i32)))
        }
        Some(Value::LeaflistVal(ll)) => {
            let values: Vec<String> = ll.element.iter().map(scalar_to_string).collect();
            UpdateValue::Text(format!("[{}]", values.join(",")))
        }
        Some(Value::AnyVal(any)) => UpdateValue::Binary(any.value.clone()),
        Some(Value::JsonVal(j)) => UpdateValue::Json(String::from_utf8_lossy(j).to_string()),
        Some(Value::JsonIetfVal(j)) => UpdateValue::Json(String::from_utf8_lossy(j).to_string()),
        Some(Value::AsciiVal(a)) => UpdateValue::Text(a.clone()),
        Some(Value::ProtoBytes(p)) => UpdateValue::Binary(p.clone()),
        None => UpdateValue::Text(String::new()),
    }
}

fn scalar_to_string(val: &gnmi::TypedValue) -> String {
    use gnmi::typed_value::Value;

    match &val.value {
        Some(Value::StringVal(s)) => format!("\"{}\"", s),
        Some(Value::IntVal(i)) => i.to_string(),
        Some(Value::UintVal(u)) => u.to_string(),
        Some(Value::BoolVal(b)) => b.to_string(),
        Some(Value::FloatVal(f)) => f.to_string(),
        Some(Value::DoubleVal(d)) => d.to_string(),
        _ => "null".to_string(),
    }
}

/// Wrap a JSON document as a gNMI `TypedValue` for Set operations.
pub fn json_value(value: &serde_json::Value) -> gnmi::TypedValue {
    gnmi::TypedValue {
        value: Some(gnmi::typed_value::Value::JsonIetfVal(
            serde_json::to_vec(value).unwrap_or_default(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generated::gnmi::typed_value::Value;

    fn typed(value: Value) -> gnmi::TypedValue {
        gnmi::TypedValue { value: Some(value) }
    }

    fn notification_with_update(path: &str, value: Value) -> gnmi::Notification {
        gnmi::Notification {
            timestamp: 1_700_000_000_000_000_000,
            update: vec![gnmi::Update {
                path: Some(RequestBuilder::parse_path(path)),
                val: Some(typed(value)),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_events_from_notification() {
        let notification =
            notification_with_update("/interfaces/interface[name=eth0]/state/oper-status",
                Value::StringVal("UP".to_string()));
        let events = events_from_notification(&notification);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].path, "interfaces/interface[name=eth0]/state/oper-status");
        assert_eq!(events[0].value, UpdateValue::Text("UP".to_string()));
        assert_eq!(events[0].timestamp, 1_700_000_000_000_000_000);
        assert!(!events[0].delete);
    }

    #[test]
    fn test_prefix_joined_onto_path() {
        let mut notification = notification_with_update("state/counters/in-octets",
            Value::UintVal(42));
        notification.prefix = Some(RequestBuilder::parse_path("/interfaces/interface[name=eth0]"));
        let events = events_from_notification(&notification);
        assert_eq!(
            events[0].path,
            "interfaces/interface[name=eth0]/state/counters/in-octets"
        );
        assert_eq!(events[0].value, UpdateValue::Uint(42));
    }

    #[test]
    fn test_empty_update_path_resolves_to_prefix() {
        let mut notification = notification_with_update("/", Value::UintVal(1));
        notification.prefix = Some(RequestBuilder::parse_path("/interfaces/interface[name=eth0]"));
        let events = events_from_notification(&notification);
        assert_eq!(events[0].path, "interfaces/interface[name=eth0]");
    }

    #[test]
    fn test_delete_event() {
        let notification = gnmi::Notification {
            timestamp: 5,
            delete: vec![RequestBuilder::parse_path("/system/config/banner")],
            ..Default::default()
        };
        let events = events_from_notification(&notification);
        assert_eq!(events.len(), 1);
        assert!(events[0].delete);
        assert_eq!(events[0].path, "system/config/banner");
    }

    #[test]
    fn test_decimal_scaling() {
        let val = typed(Value::DecimalVal(gnmi::Decimal64 {
            digits: 12345,
            precision: 2,
        }));
        match decode_typed_value(&val) {
            UpdateValue::Float(f) => assert!((f - 123.45).abs() < 1e-9),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_leaflist_rendering() {
        let val = typed(Value::LeaflistVal(gnmi::ScalarArray {
            element: vec![
                typed(Value::StringVal("a".to_string())),
                typed(Value::IntVal(7)),
            ],
        }));
        assert_eq!(
            decode_typed_value(&val),
            UpdateValue::Text("[\"a\",7]".to_string())
        );
    }

    #[test]
    fn test_deprecated_value_field_fallback() {
        #[allow(deprecated)]
        let update = gnmi::Update {
            path: Some(RequestBuilder::parse_path("/x")),
            value: Some(gnmi::Value {
                value: b"raw".to_vec(),
                r#type: 0,
            }),
            ..Default::default()
        };
        assert_eq!(extract_value(&update), UpdateValue::Binary(b"raw".to_vec()));
    }
}
