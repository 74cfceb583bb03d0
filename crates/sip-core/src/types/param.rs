//! # SIP Parameters
//!
//! Parameters attach extra information to URIs and header values:
//!
//! - URI parameters (e.g., `sip:user@example.com;transport=tcp`)
//! - Header field parameters (e.g., `Route: <sip:p1.example.com;lr>;fs-proxy-id=abc`)
//! - Via parameters (e.g., `branch=z9hG4bK776asdhds`)
//!
//! Parameter names are compared case-sensitively. Lists may contain duplicates;
//! lookups return the first match.
//!
//! ## Examples
//!
//! ```rust
//! use sipfwd_sip_core::types::param::{Param, ParamList};
//!
//! let params = vec![Param::lr(), Param::new("fs-proxy-id", "abc")];
//! assert_eq!(params.param_value("fs-proxy-id"), Some("abc"));
//! assert!(params.has_param("lr"));
//! assert_eq!(params[0].to_string(), "lr");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single `name[=value]` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Optional value; `None` for flag parameters such as `lr`
    pub value: Option<String>,
}

impl Param {
    /// Create a parameter carrying a value
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Create a flag parameter without a value
    pub fn flag(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            value: None,
        }
    }

    /// `transport=<value>`
    pub fn transport(value: impl Into<String>) -> Self {
        Param::new("transport", value)
    }

    /// `branch=<value>`
    pub fn branch(value: impl Into<String>) -> Self {
        Param::new("branch", value)
    }

    /// `tag=<value>`
    pub fn tag(value: impl Into<String>) -> Self {
        Param::new("tag", value)
    }

    /// The loose-routing flag `lr`
    pub fn lr() -> Self {
        Param::flag("lr")
    }

    /// Value as a string slice, if any
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for Param {
    type Err = Error;

    /// Parse a raw `name[=value]` token, with or without a leading `;`.
    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim().trim_start_matches(';');
        let (name, value) = match token.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim().to_string())),
            None => (token, None),
        };
        if name.is_empty() {
            return Err(Error::ParseError(format!("empty parameter name in '{}'", s)));
        }
        Ok(Param {
            name: name.to_string(),
            value,
        })
    }
}

/// Lookup helpers shared by every parameter list.
pub trait ParamList {
    /// First parameter with the given name
    fn find_param(&self, name: &str) -> Option<&Param>;

    /// Whether a parameter with the given name exists
    fn has_param(&self, name: &str) -> bool {
        self.find_param(name).is_some()
    }

    /// Value of the first parameter with the given name
    fn param_value(&self, name: &str) -> Option<&str> {
        self.find_param(name).and_then(|p| p.value())
    }
}

impl ParamList for [Param] {
    fn find_param(&self, name: &str) -> Option<&Param> {
        self.iter().find(|p| p.name == name)
    }
}

impl ParamList for Vec<Param> {
    fn find_param(&self, name: &str) -> Option<&Param> {
        self.as_slice().find_param(name)
    }
}

/// Writes `;name[=value]` for every parameter.
pub(crate) fn write_params(f: &mut fmt::Formatter<'_>, params: &[Param]) -> fmt::Result {
    for param in params {
        write!(f, ";{}", param)?;
    }
    Ok(())
}
