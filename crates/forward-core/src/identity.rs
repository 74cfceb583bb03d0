//! Who "we" are on the wire
//!
//! Route popping, the self-forward guard, Record-Route and Path all need to
//! recognise or produce this instance's own addresses. [`SelfIdentity`] is
//! passed explicitly to every stage that asks.

use sipfwd_sip_core::{Param, Uri};
use uuid::Uuid;

use crate::transport::{TransportHandle, TransportProtocol};

/// The proxy instance's own identity
pub trait SelfIdentity: Send + Sync {
    /// Whether `uri` designates this instance. With `strict_port` the
    /// (defaulted) port and transport must be those of a listen point;
    /// otherwise a host match is enough. Route popping and the self-forward
    /// guard both ask strictly.
    fn is_us(&self, uri: &Uri, strict_port: bool) -> bool;

    /// Identifier unique to this instance, written as `fs-proxy-id`
    fn unique_id(&self) -> &str;

    /// Value for the Server header of locally generated responses
    fn server_string(&self) -> &str;

    /// URI to insert in Record-Route or Path, for the given outgoing transport
    /// when it is known
    fn local_uri(&self, transport: Option<&TransportHandle>) -> Uri;
}

/// A local address the proxy listens on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenPoint {
    pub host: String,
    pub port: u16,
    pub protocol: TransportProtocol,
}

impl ListenPoint {
    pub fn new(host: impl Into<String>, port: u16, protocol: TransportProtocol) -> Self {
        ListenPoint {
            host: host.into(),
            port,
            protocol,
        }
    }
}

/// Statically configured identity
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    unique_id: String,
    server_string: String,
    listen_points: Vec<ListenPoint>,
    aliases: Vec<String>,
}

impl LocalIdentity {
    /// Identity with a single listen point and a random unique id
    pub fn new(listen: ListenPoint) -> Self {
        LocalIdentity {
            unique_id: Uuid::new_v4().simple().to_string(),
            server_string: format!("sipfwd/{}", env!("CARGO_PKG_VERSION")),
            listen_points: vec![listen],
            aliases: Vec::new(),
        }
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = unique_id.into();
        self
    }

    pub fn with_server_string(mut self, server: impl Into<String>) -> Self {
        self.server_string = server.into();
        self
    }

    pub fn with_listen_point(mut self, listen: ListenPoint) -> Self {
        self.listen_points.push(listen);
        self
    }

    /// Extra host name this instance answers to, on the listen-point ports
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn listen_points(&self) -> &[ListenPoint] {
        &self.listen_points
    }
}

fn host_matches(a: &str, b: &str) -> bool {
    let unbracket = |h: &str| h.trim_start_matches('[').trim_end_matches(']').to_string();
    unbracket(a).eq_ignore_ascii_case(&unbracket(b))
}

fn hop_uri(host: &str, port: u16, protocol: TransportProtocol) -> Uri {
    let mut uri = Uri::sip(host).with_port(port);
    if protocol != TransportProtocol::Udp {
        uri = uri.with_parameter(Param::transport(protocol.as_str()));
    }
    uri
}

impl SelfIdentity for LocalIdentity {
    fn is_us(&self, uri: &Uri, strict_port: bool) -> bool {
        // maddr, when present, is where the request is really headed
        let host = match uri.param_value("maddr") {
            Some(maddr) => maddr.to_string(),
            None => uri.host.as_str(),
        };
        let port = uri.effective_port();

        let protocol = TransportProtocol::from_uri(uri).ok();
        let port_ok = |lp: &ListenPoint| !strict_port || (lp.port == port && protocol == Some(lp.protocol));

        if self
            .listen_points
            .iter()
            .any(|lp| host_matches(&host, &lp.host) && port_ok(lp))
        {
            return true;
        }
        self.aliases.iter().any(|alias| host_matches(&host, alias)) && self.listen_points.iter().any(port_ok)
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn server_string(&self) -> &str {
        &self.server_string
    }

    fn local_uri(&self, transport: Option<&TransportHandle>) -> Uri {
        match transport {
            Some(handle) => hop_uri(&handle.local_host, handle.local_port, handle.protocol()),
            None => match self.listen_points.first() {
                Some(lp) => hop_uri(&lp.host, lp.port, lp.protocol),
                None => Uri::sip("localhost"),
            },
        }
    }
}
