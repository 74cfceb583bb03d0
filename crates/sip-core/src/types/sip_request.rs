//! # SIP Request
//!
//! Value representation of a parsed SIP request, with the headers a proxy
//! routes on held as typed fields and everything else kept verbatim.
//!
//! ## Examples
//!
//! ```rust
//! use sipfwd_sip_core::prelude::*;
//!
//! let request = Request::new(Method::Invite, "sip:bob@example.com".parse().unwrap())
//!     .with_via(Via::new("UDP", "pc33.atlanta.com", None).with_branch("z9hG4bK776asdhds"))
//!     .with_max_forwards(70)
//!     .with_from(Address::new("sip:alice@atlanta.com".parse().unwrap()).with_tag("1928301774"))
//!     .with_to(Address::new("sip:bob@example.com".parse().unwrap()))
//!     .with_call_id("a84b4c76e66710")
//!     .with_cseq(314159);
//!
//! assert_eq!(request.via_count(), 1);
//! assert_eq!(request.to_tag(), None);
//! assert_eq!(request.cseq.as_ref().map(|c| c.seq), Some(314159));
//! ```

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::address::Address;
use crate::types::method::Method;
use crate::types::uri::Uri;
use crate::types::via::Via;

/// CSeq header value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CSeq {
    /// Sequence number
    pub seq: u32,
    /// Method named in the CSeq
    pub method: Method,
}

impl fmt::Display for CSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.seq, self.method)
    }
}

/// A SIP request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// The method of the request
    pub method: Method,
    /// The Request-URI
    pub uri: Uri,
    /// Via entries, top first
    pub via: Vec<Via>,
    /// Max-Forwards, when present
    pub max_forwards: Option<u32>,
    /// Route entries, front first
    pub route: Vec<Address>,
    /// Record-Route entries, top first
    pub record_route: Vec<Address>,
    /// Path entries, top first
    pub path: Vec<Address>,
    /// Contact entries
    pub contact: Vec<Address>,
    /// From header
    pub from: Option<Address>,
    /// To header
    pub to: Option<Address>,
    /// Call-ID header
    pub call_id: Option<String>,
    /// CSeq header
    pub cseq: Option<CSeq>,
    /// Remaining headers, kept verbatim in wire order
    pub headers: Vec<(String, String)>,
    /// The body of the request
    pub body: Bytes,
}

impl Request {
    /// Creates a request with no headers and an empty body
    pub fn new(method: Method, uri: Uri) -> Self {
        Request {
            method,
            uri,
            via: Vec::new(),
            max_forwards: None,
            route: Vec::new(),
            record_route: Vec::new(),
            path: Vec::new(),
            contact: Vec::new(),
            from: None,
            to: None,
            call_id: None,
            cseq: None,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Append a Via entry below the existing ones
    pub fn with_via(mut self, via: Via) -> Self {
        self.via.push(via);
        self
    }

    /// Set Max-Forwards
    pub fn with_max_forwards(mut self, count: u32) -> Self {
        self.max_forwards = Some(count);
        self
    }

    /// Append a Route entry
    pub fn with_route(mut self, route: Address) -> Self {
        self.route.push(route);
        self
    }

    /// Append a Contact entry
    pub fn with_contact(mut self, contact: Address) -> Self {
        self.contact.push(contact);
        self
    }

    /// Set the From header
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the To header
    pub fn with_to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    /// Set the Call-ID header
    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    /// Set the CSeq header, using the request method
    pub fn with_cseq(mut self, seq: u32) -> Self {
        self.cseq = Some(CSeq {
            seq,
            method: self.method.clone(),
        });
        self
    }

    /// Append an untyped header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Number of Via entries
    pub fn via_count(&self) -> usize {
        self.via.len()
    }

    /// Tag of the To header, present once a dialog (early or confirmed) exists
    pub fn to_tag(&self) -> Option<&str> {
        self.to.as_ref().and_then(|to| to.tag())
    }

    /// Tag of the From header
    pub fn from_tag(&self) -> Option<&str> {
        self.from.as_ref().and_then(|from| from.tag())
    }

    /// Value of the first untyped header with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} SIP/2.0\r\n", self.method, self.uri)?;
        for via in &self.via {
            write!(f, "Via: {}\r\n", via)?;
        }
        if let Some(mf) = self.max_forwards {
            write!(f, "Max-Forwards: {}\r\n", mf)?;
        }
        for route in &self.route {
            write!(f, "Route: {}\r\n", route)?;
        }
        for rr in &self.record_route {
            write!(f, "Record-Route: {}\r\n", rr)?;
        }
        for path in &self.path {
            write!(f, "Path: {}\r\n", path)?;
        }
        if let Some(from) = &self.from {
            write!(f, "From: {}\r\n", from)?;
        }
        if let Some(to) = &self.to {
            write!(f, "To: {}\r\n", to)?;
        }
        if let Some(call_id) = &self.call_id {
            write!(f, "Call-ID: {}\r\n", call_id)?;
        }
        if let Some(cseq) = &self.cseq {
            write!(f, "CSeq: {}\r\n", cseq)?;
        }
        for contact in &self.contact {
            write!(f, "Contact: {}\r\n", contact)?;
        }
        for (name, value) in &self.headers {
            write!(f, "{}: {}\r\n", name, value)?;
        }
        write!(f, "Content-Length: {}\r\n\r\n", self.body.len())?;
        f.write_str(&String::from_utf8_lossy(&self.body))
    }
}
