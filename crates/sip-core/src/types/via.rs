//! # SIP Via
//!
//! One entry of the Via chain ([RFC 3261 §20.42](https://datatracker.ietf.org/doc/html/rfc3261#section-20.42)).
//! A request carries its Via entries top first; each hop prepends one.
//!
//! ```text
//! Via: SIP/2.0/UDP pc33.atlanta.com:5060;branch=z9hG4bK776asdhds;rport
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use sipfwd_sip_core::types::via::Via;
//!
//! let via = Via::new("udp", "192.168.1.1", Some(5060)).with_branch("z9hG4bK776asdhds");
//! assert_eq!(via.transport, "UDP");
//! assert_eq!(via.branch(), Some("z9hG4bK776asdhds"));
//! assert_eq!(via.to_string(), "SIP/2.0/UDP 192.168.1.1:5060;branch=z9hG4bK776asdhds");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::param::{write_params, Param, ParamList};
use crate::types::uri::{Host, DEFAULT_SIPS_PORT, DEFAULT_SIP_PORT};

/// A single Via entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Via {
    /// Transport token of the sent-protocol, upper-cased (UDP, TCP, TLS, ...)
    pub transport: String,
    /// sent-by host
    pub host: Host,
    /// sent-by port
    pub port: Option<u16>,
    /// Via parameters (branch, received, rport, ...)
    pub params: Vec<Param>,
}

impl Via {
    /// Create a Via entry without parameters
    pub fn new(transport: impl Into<String>, host: impl Into<String>, port: Option<u16>) -> Self {
        let host = host.into();
        Via {
            transport: transport.into().to_ascii_uppercase(),
            host: Host::from_str(&host).unwrap_or(Host::Domain(host)),
            port,
            params: Vec::new(),
        }
    }

    /// Attach a `branch` parameter
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.params.push(Param::branch(branch));
        self
    }

    /// Attach an arbitrary parameter
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Value of the `branch` parameter
    pub fn branch(&self) -> Option<&str> {
        self.params.param_value("branch")
    }

    /// Value of the `received` parameter
    pub fn received(&self) -> Option<&str> {
        self.params.param_value("received")
    }

    /// Value of the `rport` parameter when it carries one
    pub fn rport(&self) -> Option<u16> {
        self.params.param_value("rport").and_then(|p| p.parse().ok())
    }

    /// sent-by port, defaulting by transport
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.transport.eq_ignore_ascii_case("TLS") {
            DEFAULT_SIPS_PORT
        } else {
            DEFAULT_SIP_PORT
        })
    }
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIP/2.0/{} {}", self.transport, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        write_params(f, &self.params)
    }
}
