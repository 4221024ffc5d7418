//! Enum resolution between symbolic names and wire codes.
//!
//! Request parameters accept either a symbolic name (`"SAMPLE"`) or the raw
//! wire code (`2`); both resolve to the same canonical integer. The lookup
//! tables are built once from the generated protocol definitions.

use std::collections::HashMap;

use crate::error::{GnmiError, Result};
use crate::generated::gnmi::{Encoding, SubscriptionMode, get_request, subscription_list};

/// A caller-supplied enum value: a symbolic name or a raw wire code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumValue {
    Name(String),
    Code(i32),
}

impl From<&str> for EnumValue {
    fn from(name: &str) -> Self {
        EnumValue::Name(name.to_string())
    }
}

impl From<String> for EnumValue {
    fn from(name: String) -> Self {
        EnumValue::Name(name)
    }
}

impl From<i32> for EnumValue {
    fn from(code: i32) -> Self {
        EnumValue::Code(code)
    }
}

impl std::fmt::Display for EnumValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnumValue::Name(name) => write!(f, "{}", name),
            EnumValue::Code(code) => write!(f, "{}", code),
        }
    }
}

/// Lookup table for one protocol enum.
#[derive(Debug, Clone)]
pub struct EnumTable {
    enum_name: &'static str,
    by_name: HashMap<&'static str, i32>,
    names: Vec<&'static str>,
}

impl EnumTable {
    fn new(enum_name: &'static str, entries: &[(&'static str, i32)]) -> Self {
        Self {
            enum_name,
            by_name: entries.iter().copied().collect(),
            names: entries.iter().map(|(name, _)| *name).collect(),
        }
    }

    /// Table for [`SubscriptionMode`] (per-path stream mode).
    pub fn subscription_mode() -> Self {
        Self::new(
            "SubscriptionMode",
            &[
                SubscriptionMode::TargetDefined,
                SubscriptionMode::OnChange,
                SubscriptionMode::Sample,
            ]
            .map(|m| (m.as_str_name(), m as i32)),
        )
    }

    /// Table for [`subscription_list::Mode`] (subscription list mode).
    pub fn list_mode() -> Self {
        Self::new(
            "SubscriptionList.Mode",
            &[
                subscription_list::Mode::Stream,
                subscription_list::Mode::Once,
                subscription_list::Mode::Poll,
            ]
            .map(|m| (m.as_str_name(), m as i32)),
        )
    }

    /// Table for [`Encoding`].
    pub fn encoding() -> Self {
        Self::new(
            "Encoding",
            &[
                Encoding::Json,
                Encoding::Bytes,
                Encoding::Proto,
                Encoding::Ascii,
                Encoding::JsonIetf,
            ]
            .map(|e| (e.as_str_name(), e as i32)),
        )
    }

    /// Table for [`get_request::DataType`].
    pub fn data_type() -> Self {
        Self::new(
            "GetRequest.DataType",
            &[
                get_request::DataType::All,
                get_request::DataType::Config,
                get_request::DataType::State,
                get_request::DataType::Operational,
            ]
            .map(|d| (d.as_str_name(), d as i32)),
        )
    }

    /// Resolve a name-or-code value to its canonical wire code.
    pub fn resolve(&self, field: &str, value: impl Into<EnumValue>) -> Result<i32> {
        let value = value.into();
        match &value {
            EnumValue::Name(name) => {
                if let Some(code) = self.by_name.get(name.as_str()) {
                    return Ok(*code);
                }
            }
            EnumValue::Code(code) => {
                if self.by_name.values().any(|c| c == code) {
                    return Ok(*code);
                }
            }
        }
        Err(GnmiError::InvalidEnumValue {
            field: field.to_string(),
            value: value.to_string(),
            enum_name: self.enum_name,
            options: self.names.clone(),
        })
    }
}
