//! Transport selection
//!
//! The socket layer is not part of this crate. What the dispatcher needs is a
//! way to ask "is there already a connection to this host/port/protocol, and
//! which registration is it bound to?" That is the [`TransportRegistry`]
//! seam; [`MemoryTransportRegistry`] is a concurrent in-memory
//! implementation that a transport layer can keep up to date.

use std::fmt;
use std::str::FromStr;

use dashmap::DashMap;
use sipfwd_sip_core::{Scheme, Uri};
use uuid::Uuid;

use crate::errors::{ForwardError, ForwardResult};

/// Transport protocol of a SIP hop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportProtocol {
    Udp,
    Tcp,
    Tls,
    Ws,
    Wss,
}

impl TransportProtocol {
    /// Lower-case token as used in the `transport` URI parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportProtocol::Udp => "udp",
            TransportProtocol::Tcp => "tcp",
            TransportProtocol::Tls => "tls",
            TransportProtocol::Ws => "ws",
            TransportProtocol::Wss => "wss",
        }
    }

    /// Protocol a URI asks for, TLS for `sips:` and UDP otherwise when unset
    pub fn from_uri(uri: &Uri) -> ForwardResult<Self> {
        match uri.transport() {
            Some(token) => token.parse(),
            None if uri.scheme == Scheme::Sips => Ok(TransportProtocol::Tls),
            None => Ok(TransportProtocol::Udp),
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportProtocol {
    type Err = ForwardError;

    fn from_str(s: &str) -> ForwardResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(TransportProtocol::Udp),
            "tcp" => Ok(TransportProtocol::Tcp),
            "tls" => Ok(TransportProtocol::Tls),
            "ws" => Ok(TransportProtocol::Ws),
            "wss" => Ok(TransportProtocol::Wss),
            _ => Err(ForwardError::Transport(format!("Unknown transport '{}'", s))),
        }
    }
}

/// Key identifying a remote transport endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportName {
    /// Lower-cased host without IPv6 brackets
    pub host: String,
    pub port: u16,
    pub protocol: TransportProtocol,
}

impl TransportName {
    pub fn new(host: impl Into<String>, port: u16, protocol: TransportProtocol) -> Self {
        let host = host.into();
        let host = host.trim_start_matches('[').trim_end_matches(']').to_ascii_lowercase();
        TransportName { host, port, protocol }
    }

    /// Endpoint a sip/sips destination URI points at
    pub fn from_uri(uri: &Uri) -> ForwardResult<Self> {
        if !uri.is_sip() {
            return Err(ForwardError::Transport(format!("No transport for non-SIP URI {}", uri)));
        }
        if uri.host.is_empty() {
            return Err(ForwardError::Transport(format!("No host in {}", uri)));
        }
        let protocol = TransportProtocol::from_uri(uri)?;
        Ok(TransportName::new(uri.host.as_str(), uri.effective_port(), protocol))
    }
}

impl fmt::Display for TransportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{};transport={}", self.host, self.port, self.protocol)
        } else {
            write!(f, "{}:{};transport={}", self.host, self.port, self.protocol)
        }
    }
}

/// An open transport as seen by the forwarding core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportHandle {
    pub id: Uuid,
    pub remote: TransportName,
    /// Local address the transport is bound to, used for Record-Route and Path
    pub local_host: String,
    pub local_port: u16,
    /// Registration id (RFC 5626) of the flow, when it was set up by a REGISTER
    pub reg_id: Option<u64>,
}

impl TransportHandle {
    pub fn new(remote: TransportName, local_host: impl Into<String>, local_port: u16) -> Self {
        TransportHandle {
            id: Uuid::new_v4(),
            remote,
            local_host: local_host.into(),
            local_port,
            reg_id: None,
        }
    }

    pub fn with_reg_id(mut self, reg_id: u64) -> Self {
        self.reg_id = Some(reg_id);
        self
    }

    pub fn protocol(&self) -> TransportProtocol {
        self.remote.protocol
    }
}

/// Lookup of already open transports
pub trait TransportRegistry: Send + Sync {
    /// Transport currently serving `name`, if any
    fn find_transport(&self, name: &TransportName) -> Option<TransportHandle>;
}

/// Concurrent in-memory transport table
#[derive(Debug, Default)]
pub struct MemoryTransportRegistry {
    transports: DashMap<TransportName, TransportHandle>,
}

impl MemoryTransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the transport for `handle.remote`
    pub fn register(&self, handle: TransportHandle) -> Option<TransportHandle> {
        self.transports.insert(handle.remote.clone(), handle)
    }

    pub fn remove(&self, name: &TransportName) -> Option<TransportHandle> {
        self.transports.remove(name).map(|(_, handle)| handle)
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}

impl TransportRegistry for MemoryTransportRegistry {
    fn find_transport(&self, name: &TransportName) -> Option<TransportHandle> {
        self.transports.get(name).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_uri() {
        let uri: Uri = "sip:bob@GW.Example.com;transport=TCP".parse().unwrap();
        let name = TransportName::from_uri(&uri).unwrap();
        assert_eq!(name, TransportName::new("gw.example.com", 5060, TransportProtocol::Tcp));

        let uri: Uri = "sips:[2001:db8::1]".parse().unwrap();
        let name = TransportName::from_uri(&uri).unwrap();
        assert_eq!(name.host, "2001:db8::1");
        assert_eq!(name.port, 5061);
        assert_eq!(name.protocol, TransportProtocol::Tls);
        assert_eq!(name.to_string(), "[2001:db8::1]:5061;transport=tls");
    }

    #[test]
    fn test_name_from_bad_uri() {
        let uri: Uri = "sip:host;transport=carrier-pigeon".parse().unwrap();
        assert!(matches!(TransportName::from_uri(&uri), Err(ForwardError::Transport(_))));
        let uri: Uri = "tel:+15551234".parse().unwrap();
        assert!(TransportName::from_uri(&uri).is_err());
    }

    #[test]
    fn test_memory_registry() {
        let registry = MemoryTransportRegistry::new();
        let name = TransportName::new("192.0.2.9", 5070, TransportProtocol::Tcp);
        assert!(registry.find_transport(&name).is_none());

        let handle = TransportHandle::new(name.clone(), "192.0.2.1", 5060).with_reg_id(0x1f);
        registry.register(handle.clone());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find_transport(&name), Some(handle));

        let udp = TransportName::new("192.0.2.9", 5070, TransportProtocol::Udp);
        assert!(registry.find_transport(&udp).is_none());

        assert!(registry.remove(&name).is_some());
        assert!(registry.is_empty());
    }
}
