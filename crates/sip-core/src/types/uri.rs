//! # SIP URI
//!
//! Value type for SIP URIs as defined in [RFC 3261](https://tools.ietf.org/html/rfc3261).
//!
//! ```text
//! sip:user:password@host:port;uri-parameters?headers
//! ```
//!
//! URIs are plain values: every operation that changes one either takes
//! `&mut self` on an owned URI or returns a new URI. Nothing aliases a URI held
//! by a message.
//!
//! ## Usage Examples
//!
//! ```rust
//! use sipfwd_sip_core::types::uri::{Uri, Scheme};
//! use sipfwd_sip_core::types::param::Param;
//! use std::str::FromStr;
//!
//! let uri = Uri::from_str("sip:alice@example.com:5060;transport=udp").unwrap();
//! assert_eq!(uri.scheme, Scheme::Sip);
//! assert_eq!(uri.username(), Some("alice"));
//! assert_eq!(uri.port, Some(5060));
//! assert_eq!(uri.transport(), Some("udp"));
//!
//! let uri = Uri::sip("example.com")
//!     .with_user("bob")
//!     .with_port(5060)
//!     .with_parameter(Param::transport("tcp"));
//! assert_eq!(uri.to_string(), "sip:bob@example.com:5060;transport=tcp");
//! ```

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::uri::parse_uri;
use crate::types::param::{write_params, Param, ParamList};

/// Default port for `sip:` and for non-TLS transports
pub const DEFAULT_SIP_PORT: u16 = 5060;
/// Default port for `sips:` and TLS
pub const DEFAULT_SIPS_PORT: u16 = 5061;

/// URI scheme
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
    /// SIP URI (non-secure)
    Sip,
    /// SIPS URI (secure SIP)
    Sips,
    /// TEL URI
    Tel,
    /// Any other scheme
    Custom(String),
}

impl Scheme {
    /// Returns the string representation of the scheme
    pub fn as_str(&self) -> &str {
        match self {
            Scheme::Sip => "sip",
            Scheme::Sips => "sips",
            Scheme::Tel => "tel",
            Scheme::Custom(scheme) => scheme,
        }
    }

    /// `sip` or `sips`
    pub fn is_sip(&self) -> bool {
        matches!(self, Scheme::Sip | Scheme::Sips)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidUri("empty scheme".to_string()));
        }
        match s.to_ascii_lowercase().as_str() {
            "sip" => Ok(Scheme::Sip),
            "sips" => Ok(Scheme::Sips),
            "tel" => Ok(Scheme::Tel),
            _ => Ok(Scheme::Custom(s.to_string())),
        }
    }
}

/// Host part of a URI: a domain name or a literal IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Host {
    /// A domain name (e.g., "example.com"). Not validated beyond being non-empty
    /// for SIP URIs, so malformed values such as `bad@example.com` survive parsing.
    Domain(String),
    /// An IP address (v4 or v6)
    Address(IpAddr),
}

impl Host {
    /// Create a new host from a domain name
    pub fn domain(domain: impl Into<String>) -> Self {
        Host::Domain(domain.into())
    }

    /// True when the host is a literal IP address
    pub fn is_ip(&self) -> bool {
        matches!(self, Host::Address(_))
    }

    /// True when nothing usable is present
    pub fn is_empty(&self) -> bool {
        matches!(self, Host::Domain(d) if d.is_empty())
    }

    /// Host text without IPv6 brackets, as used for name lookups
    pub fn as_str(&self) -> String {
        match self {
            Host::Domain(domain) => domain.clone(),
            Host::Address(addr) => addr.to_string(),
        }
    }

    /// Case-insensitive comparison (domains) / exact comparison (addresses)
    pub fn matches(&self, other: &Host) -> bool {
        match (self, other) {
            (Host::Domain(a), Host::Domain(b)) => a.eq_ignore_ascii_case(b),
            (Host::Address(a), Host::Address(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Domain(domain) => f.write_str(domain),
            Host::Address(IpAddr::V6(addr)) => write!(f, "[{}]", addr),
            Host::Address(addr) => write!(f, "{}", addr),
        }
    }
}

impl FromStr for Host {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(addr) = IpAddr::from_str(s) {
            return Ok(Host::Address(addr));
        }
        if let Some(inner) = s.strip_prefix('[') {
            let inner = inner
                .strip_suffix(']')
                .ok_or_else(|| Error::InvalidHost(format!("unclosed IPv6 bracket: {}", s)))?;
            return Ipv6Addr::from_str(inner)
                .map(|addr| Host::Address(IpAddr::V6(addr)))
                .map_err(|_| Error::InvalidHost(format!("invalid IPv6 address: {}", s)));
        }
        if s.is_empty() {
            return Err(Error::InvalidHost("host cannot be empty".to_string()));
        }
        Ok(Host::Domain(s.to_string()))
    }
}

impl From<IpAddr> for Host {
    fn from(addr: IpAddr) -> Self {
        Host::Address(addr)
    }
}

/// SIP URI components as defined in RFC 3261
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uri {
    /// URI scheme (sip, sips, tel)
    pub scheme: Scheme,
    /// User part (optional)
    pub user: Option<String>,
    /// Password (optional, deprecated)
    pub password: Option<String>,
    /// Host; empty domain for opaque non-SIP URIs
    pub host: Host,
    /// Port (optional)
    pub port: Option<u16>,
    /// URI parameters in wire order
    pub parameters: Vec<Param>,
    /// URI headers (?key=value) in wire order
    pub headers: Vec<(String, String)>,
    /// Scheme-specific part for non-SIP schemes
    pub raw_uri: Option<String>,
}

impl Uri {
    /// Create a new URI with the minimum required fields
    pub fn new(scheme: Scheme, host: Host) -> Self {
        Uri {
            scheme,
            user: None,
            password: None,
            host,
            port: None,
            parameters: Vec::new(),
            headers: Vec::new(),
            raw_uri: None,
        }
    }

    /// Create a `sip:` URI for the given host text
    pub fn sip(host: impl Into<String>) -> Self {
        let host = host.into();
        let host = Host::from_str(&host).unwrap_or(Host::Domain(host));
        Uri::new(Scheme::Sip, host)
    }

    /// Create a `sips:` URI for the given host text
    pub fn sips(host: impl Into<String>) -> Self {
        let mut uri = Uri::sip(host);
        uri.scheme = Scheme::Sips;
        uri
    }

    /// Set the user part
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Append a parameter
    pub fn with_parameter(mut self, param: Param) -> Self {
        self.parameters.push(param);
        self
    }

    /// User part, if any
    pub fn username(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// `sip:` or `sips:`
    pub fn is_sip(&self) -> bool {
        self.scheme.is_sip()
    }

    /// First parameter with the given name
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.parameters.find_param(name)
    }

    /// Value of the first parameter with the given name
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.parameters.param_value(name)
    }

    /// Whether a parameter with the given name is present
    pub fn has_param(&self, name: &str) -> bool {
        self.parameters.has_param(name)
    }

    /// Removes every parameter with the given name; returns true if any was removed
    pub fn remove_param(&mut self, name: &str) -> bool {
        let before = self.parameters.len();
        self.parameters.retain(|p| p.name != name);
        before != self.parameters.len()
    }

    /// `transport` parameter value
    pub fn transport(&self) -> Option<&str> {
        self.param_value("transport")
    }

    /// Replace the host with the given text
    pub fn set_host(&mut self, host: &str) {
        self.host = Host::from_str(host).unwrap_or_else(|_| Host::Domain(host.to_string()));
    }

    /// Port that applies when none is written: 5061 for `sips:` or TLS, else 5060
    pub fn effective_port(&self) -> u16 {
        if let Some(port) = self.port {
            return port;
        }
        let tls = self
            .transport()
            .map(|t| t.eq_ignore_ascii_case("tls"))
            .unwrap_or(false);
        if self.scheme == Scheme::Sips || tls {
            DEFAULT_SIPS_PORT
        } else {
            DEFAULT_SIP_PORT
        }
    }

    /// Host and port (if present) formatted as a string
    pub fn host_port(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.to_string(),
        }
    }

    /// Raw `;`-joined parameter text without the leading separator, as it would
    /// appear on the wire (e.g. `transport=tcp;lr`)
    pub fn params_string(&self) -> Option<String> {
        if self.parameters.is_empty() {
            return None;
        }
        Some(
            self.parameters
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(";"),
        )
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;
        if !self.is_sip() {
            if let Some(raw) = &self.raw_uri {
                f.write_str(raw)?;
                return write_params(f, &self.parameters);
            }
        }
        if let Some(user) = &self.user {
            f.write_str(user)?;
            if let Some(password) = &self.password {
                write!(f, ":{}", password)?;
            }
            f.write_str("@")?;
        }
        write!(f, "{}", self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        write_params(f, &self.parameters)?;
        for (i, (name, value)) in self.headers.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, name, value)?;
        }
        Ok(())
    }
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_uri(s.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_port() {
        assert_eq!(Uri::sip("example.com").effective_port(), 5060);
        assert_eq!(Uri::sips("example.com").effective_port(), 5061);
        let tls = Uri::sip("example.com").with_parameter(Param::transport("TLS"));
        assert_eq!(tls.effective_port(), 5061);
        assert_eq!(Uri::sip("example.com").with_port(5070).effective_port(), 5070);
    }

    #[test]
    fn test_remove_param_drops_duplicates() {
        let mut uri = Uri::sip("example.com")
            .with_parameter(Param::new("a", "1"))
            .with_parameter(Param::flag("b"))
            .with_parameter(Param::new("a", "2"));
        assert!(uri.remove_param("a"));
        assert!(!uri.remove_param("a"));
        assert_eq!(uri.to_string(), "sip:example.com;b");
    }

    #[test]
    fn test_display_ipv6() {
        let uri = Uri::sip("[2001:db8::1]").with_port(5062);
        assert!(uri.host.is_ip());
        assert_eq!(uri.to_string(), "sip:[2001:db8::1]:5062");
        assert_eq!(uri.host.as_str(), "2001:db8::1");
    }

    #[test]
    fn test_set_host() {
        let mut uri = Uri::sip("example.com").with_user("bob");
        uri.set_host("192.0.2.7");
        assert_eq!(uri.host, Host::Address("192.0.2.7".parse().unwrap()));
        assert_eq!(uri.to_string(), "sip:bob@192.0.2.7");
    }
}
