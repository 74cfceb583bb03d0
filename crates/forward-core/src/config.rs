//! Forwarding module configuration
//!
//! [`ForwardConfig`] is the loadable form: kebab-case keys, every option
//! optional, readable from TOML or from a flat key/value set. It is checked
//! once by [`ForwardConfig::validate`], which yields the immutable
//! [`ForwardSettings`] the dispatcher runs with.
//!
//! ```rust
//! use sipfwd_forward_core::config::ForwardConfig;
//!
//! let settings = ForwardConfig::from_toml_str(r#"
//!     route = "sip:gw.example.com;transport=tcp"
//!     rewrite-req-uri = true
//!     params-to-remove = "pn-tok pn-type"
//! "#).unwrap().validate().unwrap();
//!
//! assert!(settings.rewrite_req_uri);
//! assert_eq!(settings.params_to_remove, vec!["pn-tok", "pn-type"]);
//! ```

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use sipfwd_sip_core::Uri;

use crate::errors::{ForwardError, ForwardResult};

/// Push notification parameters removed from Contact and Request-URI by default
pub const DEFAULT_PARAMS_TO_REMOVE: &[&str] = &[
    "pn-tok",
    "pn-type",
    "app-id",
    "pn-msg-str",
    "pn-call-str",
    "pn-call-snd",
    "pn-msg-snd",
    "pn-timeout",
];

const TRANSPORTS: &[&str] = &["udp", "tcp", "tls"];

/// Loadable forwarding configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ForwardConfig {
    /// Static next hop overriding the natural destination; empty for none
    pub route: String,
    /// Insert a Path header on REGISTER
    pub add_path: bool,
    /// Overwrite Request-URI host and port with the static route's
    pub rewrite_req_uri: bool,
    /// Transport added to sip destinations lacking one (udp, tcp or tls)
    pub default_transport: String,
    /// URI parameter names stripped before sending
    #[serde(deserialize_with = "string_or_list")]
    pub params_to_remove: Vec<String>,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        ForwardConfig {
            route: String::new(),
            add_path: true,
            rewrite_req_uri: false,
            default_transport: "udp".to_string(),
            params_to_remove: DEFAULT_PARAMS_TO_REMOVE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ForwardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    pub fn with_add_path(mut self, enabled: bool) -> Self {
        self.add_path = enabled;
        self
    }

    pub fn with_rewrite_req_uri(mut self, enabled: bool) -> Self {
        self.rewrite_req_uri = enabled;
        self
    }

    pub fn with_default_transport(mut self, transport: impl Into<String>) -> Self {
        self.default_transport = transport.into();
        self
    }

    pub fn with_params_to_remove<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params_to_remove = names.into_iter().map(Into::into).collect();
        self
    }

    /// Parse a TOML document holding the forwarding options at top level
    pub fn from_toml_str(text: &str) -> ForwardResult<Self> {
        toml::from_str(text).map_err(|e| ForwardError::Config(format!("Invalid forward configuration: {}", e)))
    }

    /// Build from a flat key/value set as produced by a generic config loader.
    ///
    /// Booleans accept `true/false`, `yes/no`, `on/off` and `1/0`. Unknown
    /// keys are an error.
    pub fn from_key_values<'a, I>(entries: I) -> ForwardResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = ForwardConfig::default();
        for (key, value) in entries {
            match key.trim() {
                "route" => config.route = value.trim().to_string(),
                "add-path" => config.add_path = parse_bool(key, value)?,
                "rewrite-req-uri" => config.rewrite_req_uri = parse_bool(key, value)?,
                "default-transport" => config.default_transport = value.trim().to_string(),
                "params-to-remove" => config.params_to_remove = split_names(value),
                other => {
                    return Err(ForwardError::Config(format!("Unknown forward option '{}'", other)));
                }
            }
        }
        Ok(config)
    }

    /// Check every option and freeze the result
    pub fn validate(&self) -> ForwardResult<ForwardSettings> {
        let route = match self.route.trim() {
            "" => None,
            text => Some(parse_route(text)?),
        };

        let transport = self.default_transport.trim().to_ascii_lowercase();
        if !TRANSPORTS.contains(&transport.as_str()) {
            return Err(ForwardError::Config(format!(
                "Unsupported default-transport '{}', expected one of {}",
                self.default_transport,
                TRANSPORTS.join(", ")
            )));
        }
        let default_transport = (transport != "udp").then(|| format!("transport={}", transport));

        let params_to_remove = self
            .params_to_remove
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Ok(ForwardSettings {
            route,
            add_path: self.add_path,
            rewrite_req_uri: self.rewrite_req_uri,
            default_transport,
            params_to_remove,
        })
    }
}

/// Validated, immutable forwarding settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardSettings {
    /// Static next hop
    pub route: Option<Uri>,
    pub add_path: bool,
    pub rewrite_req_uri: bool,
    /// Raw `transport=<name>` token to append, absent when the default is UDP
    pub default_transport: Option<String>,
    pub params_to_remove: Vec<String>,
}

impl Default for ForwardSettings {
    fn default() -> Self {
        ForwardSettings {
            route: None,
            add_path: true,
            rewrite_req_uri: false,
            default_transport: None,
            params_to_remove: DEFAULT_PARAMS_TO_REMOVE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TryFrom<ForwardConfig> for ForwardSettings {
    type Error = ForwardError;

    fn try_from(config: ForwardConfig) -> ForwardResult<Self> {
        config.validate()
    }
}

fn parse_route(text: &str) -> ForwardResult<Uri> {
    let bad_route = || ForwardError::Config(format!("Bad route parameter '{}' in configuration of forward module", text));
    let uri = Uri::from_str(text).map_err(|_| bad_route())?;
    if !uri.is_sip() || uri.host.is_empty() {
        return Err(bad_route());
    }
    Ok(uri)
}

fn parse_bool(key: &str, value: &str) -> ForwardResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ForwardError::Config(format!("Option '{}' expects a boolean, got '{}'", key, value))),
    }
}

fn split_names(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    List(Vec<String>),
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::String(text) => split_names(&text),
        StringOrList::List(names) => names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ForwardConfig::default().validate().unwrap();
        assert_eq!(settings, ForwardSettings::default());
        assert!(settings.add_path);
        assert!(!settings.rewrite_req_uri);
        assert!(settings.route.is_none());
        assert!(settings.default_transport.is_none());
        assert_eq!(settings.params_to_remove.len(), 8);
    }

    #[test]
    fn test_toml_with_list() {
        let config = ForwardConfig::from_toml_str(
            r#"
            add-path = false
            default-transport = "TCP"
            params-to-remove = ["pn-tok", "app-id"]
            "#,
        )
        .unwrap();
        assert!(!config.add_path);
        assert_eq!(config.params_to_remove, vec!["pn-tok", "app-id"]);

        let settings = config.validate().unwrap();
        assert_eq!(settings.default_transport.as_deref(), Some("transport=tcp"));
    }

    #[test]
    fn test_bad_route_is_config_error() {
        for route in ["garbage", "tel:+123", "sip:"] {
            let result = ForwardConfig::new().with_route(route).validate();
            assert!(matches!(result, Err(ForwardError::Config(_))), "route '{}'", route);
        }
    }

    #[test]
    fn test_unknown_transport_rejected() {
        let result = ForwardConfig::new().with_default_transport("sctp").validate();
        assert!(matches!(result, Err(ForwardError::Config(_))));
    }

    #[test]
    fn test_key_values() {
        let config = ForwardConfig::from_key_values([
            ("route", "sip:10.0.0.1:5070"),
            ("rewrite-req-uri", "yes"),
            ("params-to-remove", "  pn-tok   pn-prid "),
        ])
        .unwrap();
        assert!(config.rewrite_req_uri);
        assert_eq!(config.params_to_remove, vec!["pn-tok", "pn-prid"]);

        let settings = ForwardSettings::try_from(config).unwrap();
        assert_eq!(settings.route.unwrap().port, Some(5070));

        assert!(ForwardConfig::from_key_values([("add-path", "maybe")]).is_err());
        assert!(ForwardConfig::from_key_values([("colour", "blue")]).is_err());
    }
}
