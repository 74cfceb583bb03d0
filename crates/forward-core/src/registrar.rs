//! Registrar lookups
//!
//! The forwarding core only reads from the registrar, and only to turn a
//! GRUU into the contact it stands for. [`MemoryRegistrar`] keeps bindings in
//! a concurrent map and is enough for a single-node proxy or for tests.

use async_trait::async_trait;
use dashmap::DashMap;
use sipfwd_sip_core::Uri;

use crate::errors::RegistrarError;
use crate::routing::{parse_reg_id, REGID_PARAM};

/// GRUU parameter (RFC 5627)
pub const GRUU_PARAM: &str = "gr";

/// One registered contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Contact URI as it was registered
    pub contact: String,
    /// Remaining lifetime in seconds
    pub expires: u32,
}

impl Binding {
    pub fn new(contact: impl Into<String>, expires: u32) -> Self {
        Binding {
            contact: contact.into(),
            expires,
        }
    }
}

/// All bindings registered for a key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub key: String,
    pub bindings: Vec<Binding>,
}

impl Record {
    pub fn new(key: impl Into<String>) -> Self {
        Record {
            key: key.into(),
            bindings: Vec::new(),
        }
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Storage key for `uri`: lower-cased `user@host`, plus the `gr` value
    /// for a GRUU so each instance gets its own record
    pub fn key_for(uri: &Uri) -> String {
        let mut key = match &uri.user {
            Some(user) => format!("{}@{}", user, uri.host.as_str()),
            None => uri.host.as_str(),
        }
        .to_ascii_lowercase();
        if let Some(gr) = uri.param_value(GRUU_PARAM) {
            key.push_str(";gr=");
            key.push_str(gr);
        }
        key
    }
}

/// Read access to the registrar
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Record registered for `uri`. `recursive` follows alias records to the
    /// contacts they point at.
    async fn fetch(&self, uri: &Uri, recursive: bool) -> Result<Option<Record>, RegistrarError>;
}

/// In-memory registrar keyed by [`Record::key_for`]
#[derive(Debug, Default)]
pub struct MemoryRegistrar {
    records: DashMap<String, Record>,
}

impl MemoryRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding under the key of `aor`
    pub fn bind(&self, aor: &Uri, binding: Binding) {
        let key = Record::key_for(aor);
        self.records
            .entry(key.clone())
            .or_insert_with(|| Record::new(key))
            .bindings
            .push(binding);
    }

    /// Drop every binding of `aor`
    pub fn unbind(&self, aor: &Uri) -> Option<Record> {
        self.records.remove(&Record::key_for(aor)).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn lookup(&self, key: &str, recursive: bool, depth: usize) -> Result<Option<Record>, RegistrarError> {
        let Some(record) = self.records.get(key).map(|r| r.value().clone()) else {
            return Ok(None);
        };
        if !recursive {
            return Ok(Some(record));
        }
        if depth > MAX_ALIAS_DEPTH {
            return Err(RegistrarError::Backend(format!("alias chain too deep at {}", key)));
        }

        let mut resolved = Record::new(record.key.clone());
        for binding in record.bindings {
            let alias = binding
                .contact
                .parse::<Uri>()
                .ok()
                .map(|uri| Record::key_for(&uri))
                .filter(|alias| alias != key && self.records.contains_key(alias));
            match alias {
                Some(alias) => {
                    if let Some(target) = self.lookup(&alias, true, depth + 1)? {
                        resolved.bindings.extend(target.bindings);
                    }
                }
                None => resolved.bindings.push(binding),
            }
        }
        Ok(Some(resolved))
    }
}

const MAX_ALIAS_DEPTH: usize = 8;

#[async_trait]
impl Registrar for MemoryRegistrar {
    async fn fetch(&self, uri: &Uri, recursive: bool) -> Result<Option<Record>, RegistrarError> {
        if !uri.is_sip() {
            return Err(RegistrarError::Invalid(format!("not a SIP URI: {}", uri)));
        }
        self.lookup(&Record::key_for(uri), recursive, 0)
    }
}

/// Registration id carried by a contact, parsed as hexadecimal
pub fn contact_reg_id(contact: &Uri) -> Option<u64> {
    contact.param_value(REGID_PARAM).and_then(parse_reg_id)
}
