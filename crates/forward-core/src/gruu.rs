//! GRUU resolution (RFC 5627)
//!
//! A GRUU names one registered instance of a user agent. Inside an
//! established dialog the proxy replaces it with the single contact that
//! instance registered; every other registrar answer is a failure.

use sipfwd_sip_core::{Request, Uri};
use tracing::{debug, warn};

use crate::errors::Rejection;
use crate::registrar::{Registrar, GRUU_PARAM};
use crate::routing::parse_destination;

/// Tagged result of a GRUU lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GruuResolution {
    /// Exactly one binding, with this contact
    Found(Uri),
    /// No record, or a record without bindings
    NotFound,
    /// More than one binding
    TooMany(usize),
    /// Backend failure or an unusable contact
    Error(String),
}

impl GruuResolution {
    /// The contact on success, the rejection to answer with otherwise
    pub fn into_contact(self) -> Result<Uri, Rejection> {
        match self {
            GruuResolution::Found(contact) => Ok(contact),
            GruuResolution::NotFound => Err(Rejection::GruuResolution("no binding for GRUU".to_string())),
            GruuResolution::TooMany(count) => Err(Rejection::GruuResolution(format!(
                "{} bindings for GRUU, expected one",
                count
            ))),
            GruuResolution::Error(reason) => Err(Rejection::GruuResolution(reason)),
        }
    }
}

/// A destination is resolved through the registrar when it is a GRUU and the
/// request belongs to a dialog
pub fn needs_gruu_resolution(destination: &Uri, request: &Request) -> bool {
    destination.has_param(GRUU_PARAM) && request.to_tag().is_some()
}

/// Look `gruu` up without following aliases
pub async fn resolve_gruu(registrar: &dyn Registrar, gruu: &Uri) -> GruuResolution {
    debug!("Resolving GRUU {}", gruu);
    let record = match registrar.fetch(gruu, false).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!("No registrar record for GRUU {}", gruu);
            return GruuResolution::NotFound;
        }
        Err(e) => {
            warn!("Registrar lookup of GRUU {} failed: {}", gruu, e);
            return GruuResolution::Error(e.to_string());
        }
    };

    match record.bindings.as_slice() {
        [] => GruuResolution::NotFound,
        [binding] => match parse_destination(&binding.contact) {
            Ok(contact) => GruuResolution::Found(contact),
            Err(e) => {
                warn!("Unusable contact '{}' registered for GRUU {}: {}", binding.contact, gruu, e);
                GruuResolution::Error(format!("unusable contact '{}'", binding.contact))
            }
        },
        bindings => {
            warn!("GRUU {} has {} bindings", gruu, bindings.len());
            GruuResolution::TooMany(bindings.len())
        }
    }
}
