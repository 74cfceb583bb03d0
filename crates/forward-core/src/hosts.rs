//! Static host overrides in hosts-file syntax

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;

use tracing::{debug, warn};

use crate::errors::ForwardResult;

/// Default location of the system hosts file
pub const DEFAULT_HOSTS_PATH: &str = "/etc/hosts";

/// Static name to address mapping consulted before sending
pub trait HostsResolver: Send + Sync {
    fn resolve(&self, host: &str) -> Option<IpAddr>;
}

/// Hosts-file backed resolver. Lookups are case-insensitive; when a name is
/// listed twice the first line wins.
#[derive(Debug, Clone, Default)]
pub struct EtcHostsResolver {
    entries: HashMap<String, IpAddr>,
}

impl EtcHostsResolver {
    /// Resolver with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load [`DEFAULT_HOSTS_PATH`]
    pub async fn load() -> ForwardResult<Self> {
        Self::from_path(DEFAULT_HOSTS_PATH).await
    }

    pub async fn from_path(path: impl AsRef<Path>) -> ForwardResult<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let resolver = Self::parse(&contents);
        debug!("Loaded {} host entries from {}", resolver.len(), path.display());
        Ok(resolver)
    }

    /// Parse hosts-file text: `address name [alias...]` per line, `#` comments
    pub fn parse(contents: &str) -> Self {
        let mut entries = HashMap::new();
        for (lineno, line) in contents.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default();
            let mut fields = line.split_whitespace();
            let Some(address) = fields.next() else {
                continue;
            };
            let Ok(address) = address.parse::<IpAddr>() else {
                warn!("Ignoring hosts line {}: bad address '{}'", lineno + 1, address);
                continue;
            };
            for name in fields {
                entries.entry(name.to_ascii_lowercase()).or_insert(address);
            }
        }
        EtcHostsResolver { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HostsResolver for EtcHostsResolver {
    fn resolve(&self, host: &str) -> Option<IpAddr> {
        self.entries.get(&host.to_ascii_lowercase()).copied()
    }
}
