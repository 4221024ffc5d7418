//! Target URL parsing and validation.
//!
//! Callers may hand in anything URL-shaped: `device:9339`,
//! `https://device.local`, `admin@device:57400/ignored`. Only the authority
//! (host plus optional port) is used; a scheme is tolerated and ignored.

use std::fmt;

use tracing::debug;

use crate::error::{GnmiError, Result};

/// A validated `host:port` pair used for channel construction.
///
/// Immutable after construction; the port is always resolved (the default is
/// applied when the target string carries none).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetAddress {
    host: String,
    port: u16,
}

impl TargetAddress {
    /// Parse a target string, applying `default_port` when the string has no
    /// explicit port.
    ///
    /// Missing ports are resolved by a single explicit re-parse of the host
    /// with the default appended, so normalization terminates after at most
    /// one retry.
    pub fn parse(raw: &str, default_port: u16) -> Result<Self> {
        let trimmed = raw.trim();

        let rest = match trimmed.find("://") {
            Some(idx) => {
                debug!(raw = trimmed, "scheme identified in target, ignoring and using authority");
                &trimmed[idx + 3..]
            }
            None => trimmed,
        };

        // The authority ends at the first path/query/fragment delimiter, and
        // any userinfo prefix is discarded.
        let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
        let authority = match authority.rsplit_once('@') {
            Some((_, host_port)) => host_port,
            None => authority,
        };

        match split_host_port(raw, authority)? {
            (host, Some(port)) => Ok(Self { host, port }),
            (host, None) => {
                // Re-assemble with the default port and parse once more.
                let ported = if host.contains(':') {
                    format!("[{}]:{}", host, default_port)
                } else {
                    format!("{}:{}", host, default_port)
                };
                debug!(reassembled = %ported, "no target port detected, applying default");
                let (host, port) = split_host_port(raw, &ported)?;
                let port = port.ok_or_else(|| invalid(raw, "unable to apply default port"))?;
                Ok(Self { host, port })
            }
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Endpoint URI for the underlying gRPC channel.
    pub fn uri(&self, use_tls: bool) -> String {
        let scheme = if use_tls { "https" } else { "http" };
        format!("{}://{}", scheme, self)
    }
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

fn invalid(target: &str, reason: impl Into<String>) -> GnmiError {
    GnmiError::InvalidTarget {
        target: target.to_string(),
        reason: reason.into(),
    }
}

/// Split an authority into host and optional port.
///
/// IPv6 literals must be bracketed; everything else treats the last `:` as
/// the host/port separator.
fn split_host_port(raw: &str, authority: &str) -> Result<(String, Option<u16>)> {
    if authority.is_empty() {
        return Err(invalid(raw, "no host component"));
    }

    if let Some(inner) = authority.strip_prefix('[') {
        let (host, after) = inner
            .split_once(']')
            .ok_or_else(|| invalid(raw, "unterminated IPv6 literal"))?;
        if host.is_empty() {
            return Err(invalid(raw, "no host component"));
        }
        return match after {
            "" => Ok((host.to_string(), None)),
            _ => {
                let port = after
                    .strip_prefix(':')
                    .ok_or_else(|| invalid(raw, "garbage after IPv6 literal"))?;
                if port.is_empty() {
                    return Ok((host.to_string(), None));
                }
                Ok((host.to_string(), Some(parse_port(raw, port)?)))
            }
        };
    }

    match authority.rsplit_once(':') {
        Some((host, port)) => {
            if host.is_empty() {
                return Err(invalid(raw, "no host component"));
            }
            if host.contains(':') {
                return Err(invalid(raw, "IPv6 literals must be bracketed"));
            }
            // A trailing colon with no digits counts as no port at all.
            if port.is_empty() {
                return Ok((host.to_string(), None));
            }
            Ok((host.to_string(), Some(parse_port(raw, port)?)))
        }
        None => Ok((authority.to_string(), None)),
    }
}

fn parse_port(raw: &str, port: &str) -> Result<u16> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(invalid(raw, format!("invalid port '{}'", port))),
        Ok(p) => Ok(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_explicit_port() {
        let addr = TargetAddress::parse("192.168.1.1:9339", 50051).unwrap();
        assert_eq!(addr.host(), "192.168.1.1");
        assert_eq!(addr.port(), 9339);
    }

    #[test]
    fn test_parse_applies_default_port() {
        let addr = TargetAddress::parse("device.local", 50051).unwrap();
        assert_eq!(addr.host(), "device.local");
        assert_eq!(addr.port(), 50051);
    }

    #[test]
    fn test_parse_trailing_colon_applies_default_port() {
        let addr = TargetAddress::parse("device.local:", 50051).unwrap();
        assert_eq!(addr.host(), "device.local");
        assert_eq!(addr.port(), 50051);

        let addr = TargetAddress::parse("[2001:db8::1]:", 50051).unwrap();
        assert_eq!(addr.host(), "2001:db8::1");
        assert_eq!(addr.port(), 50051);
    }

    #[test]
    fn test_parse_ignores_scheme() {
        let addr = TargetAddress::parse("https://device.local:443", 50051).unwrap();
        assert_eq!(addr.host(), "device.local");
        assert_eq!(addr.port(), 443);
    }

    #[test]
    fn test_parse_scheme_without_port() {
        let addr = TargetAddress::parse("grpc://device.local", 57400).unwrap();
        assert_eq!(addr.host(), "device.local");
        assert_eq!(addr.port(), 57400);
    }

    #[test]
    fn test_parse_strips_path_and_userinfo() {
        let addr = TargetAddress::parse("http://admin@device.local:9339/some/path", 50051).unwrap();
        assert_eq!(addr.host(), "device.local");
        assert_eq!(addr.port(), 9339);
    }

    #[test]
    fn test_parse_empty_fails() {
        assert!(matches!(
            TargetAddress::parse("", 50051),
            Err(GnmiError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_parse_scheme_only_fails() {
        assert!(matches!(
            TargetAddress::parse("https://", 50051),
            Err(GnmiError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_parse_missing_host_fails() {
        assert!(matches!(
            TargetAddress::parse(":9339", 50051),
            Err(GnmiError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_parse_bad_port_fails() {
        assert!(TargetAddress::parse("device.local:abc", 50051).is_err());
        assert!(TargetAddress::parse("device.local:0", 50051).is_err());
        assert!(TargetAddress::parse("device.local:70000", 50051).is_err());
    }

    #[test]
    fn test_parse_ipv6() {
        let addr = TargetAddress::parse("[2001:db8::1]:9339", 50051).unwrap();
        assert_eq!(addr.host(), "2001:db8::1");
        assert_eq!(addr.port(), 9339);

        let addr = TargetAddress::parse("[2001:db8::1]", 50051).unwrap();
        assert_eq!(addr.port(), 50051);
        assert_eq!(addr.to_string(), "[2001:db8::1]:50051");
    }

    #[test]
    fn test_parse_unbracketed_ipv6_fails() {
        assert!(TargetAddress::parse("2001:db8::1", 50051).is_err());
    }

    #[test]
    fn test_display_and_uri() {
        let addr = TargetAddress::parse("device.local:9339", 50051).unwrap();
        assert_eq!(addr.to_string(), "device.local:9339");
        assert_eq!(addr.uri(false), "http://device.local:9339");
        assert_eq!(addr.uri(true), "https://device.local:9339");
    }
}
