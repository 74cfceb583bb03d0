//! # Name-addr values
//!
//! `From`, `To`, `Contact`, `Route`, `Record-Route` and `Path` all carry a
//! URI wrapped in angle brackets followed by header parameters:
//!
//! ```text
//! Route: <sip:p1.example.com;lr>;fs-proxy-id=4f2a
//! To: "Bob" <sip:bob@example.com>;tag=a6c85cf
//! ```
//!
//! URI parameters live on [`Address::uri`]; header parameters live on
//! [`Address::params`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::param::{write_params, Param, ParamList};
use crate::types::uri::Uri;

/// A name-addr with header parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Optional display name
    pub display_name: Option<String>,
    /// The addressed URI
    pub uri: Uri,
    /// Header parameters following the `>`
    pub params: Vec<Param>,
}

impl Address {
    /// Create an address for a URI
    pub fn new(uri: Uri) -> Self {
        Address {
            display_name: None,
            uri,
            params: Vec::new(),
        }
    }

    /// Set the display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Append a header parameter
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Set the `tag` header parameter
    pub fn with_tag(self, tag: impl Into<String>) -> Self {
        self.with_param(Param::tag(tag))
    }

    /// `tag` header parameter
    pub fn tag(&self) -> Option<&str> {
        self.params.param_value("tag")
    }

    /// Value of a header parameter
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params.param_value(name)
    }
}

impl From<Uri> for Address {
    fn from(uri: Uri) -> Self {
        Address::new(uri)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.display_name {
            write!(f, "\"{}\" ", name)?;
        }
        write!(f, "<{}>", self.uri)?;
        write_params(f, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_uri_and_header_params_apart() {
        let addr = Address::new(Uri::sip("p1.example.com").with_parameter(Param::lr()))
            .with_param(Param::new("fs-proxy-id", "4f2a"));
        assert_eq!(addr.to_string(), "<sip:p1.example.com;lr>;fs-proxy-id=4f2a");
        assert_eq!(addr.param_value("fs-proxy-id"), Some("4f2a"));
        assert!(addr.tag().is_none());
    }

    #[test]
    fn test_tag() {
        let addr = Address::new(Uri::sip("example.com").with_user("bob"))
            .with_display_name("Bob")
            .with_tag("a6c85cf");
        assert_eq!(addr.tag(), Some("a6c85cf"));
        assert_eq!(addr.to_string(), "\"Bob\" <sip:bob@example.com>;tag=a6c85cf");
    }
}
