//! # SIP Response

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::address::Address;
use crate::types::sip_request::{CSeq, Request};
use crate::types::status::StatusCode;
use crate::types::via::Via;

/// A SIP response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Status code
    pub status: StatusCode,
    /// Reason phrase
    pub reason: String,
    /// Via entries, top first
    pub via: Vec<Via>,
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
    /// Body
    pub body: Bytes,
}

impl Response {
    /// Create a response with the standard reason phrase
    pub fn new(status: StatusCode) -> Self {
        Response {
            status,
            reason: status.reason_phrase().to_string(),
            via: Vec::new(),
            from: None,
            to: None,
            call_id: None,
            cseq: None,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Build a response to `request` per RFC 3261 §8.2.6.2: Via, From, To,
    /// Call-ID and CSeq are copied from the request.
    pub fn for_request(request: &Request, status: StatusCode) -> Self {
        let mut response = Response::new(status);
        response.via = request.via.clone();
        response.from = request.from.clone();
        response.to = request.to.clone();
        response.call_id = request.call_id.clone();
        response.cseq = request.cseq.clone();
        response
    }

    /// Append an untyped header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first untyped header with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Numeric status code
    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIP/2.0 {} {}\r\n", self.status.as_u16(), self.reason)?;
        for via in &self.via {
            write!(f, "Via: {}\r\n", via)?;
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
        for (name, value) in &self.headers {
            write!(f, "{}: {}\r\n", name, value)?;
        }
        write!(f, "Content-Length: {}\r\n\r\n", self.body.len())?;
        f.write_str(&String::from_utf8_lossy(&self.body))
    }
}
