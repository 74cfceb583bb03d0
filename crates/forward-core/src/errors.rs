//! Error types for the forwarding core
//!
//! Two families live here. [`ForwardError`] covers faults of the process
//! itself (bad configuration, a collaborator failing to deliver) and flows
//! through `?` like any other error. [`Rejection`] covers requests the proxy
//! refuses on protocol grounds; those are answered with a single final
//! response and never surface as a fault.

use sipfwd_sip_core::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("URI error: {0}")]
    Uri(#[from] sipfwd_sip_core::Error),

    #[error("Registrar error: {0}")]
    Registrar(#[from] RegistrarError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ForwardResult<T> = std::result::Result<T, ForwardError>;

/// Failures reported by a registrar backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrarError {
    #[error("Registrar backend error: {0}")]
    Backend(String),

    #[error("Invalid registrar query: {0}")]
    Invalid(String),
}

/// Protocol-level refusal of a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Max-Forwards does not exceed the number of Via entries
    #[error("Too many hops (max-forwards {max_forwards}, {via_count} via entries)")]
    TooManyHops { max_forwards: u32, via_count: usize },

    /// Next hop is not a usable sip/sips URI
    #[error("Bad destination: {0}")]
    BadDestination(String),

    /// Computed branch already present in the Via chain
    #[error("Loop detected on branch {0}")]
    LoopDetected(String),

    /// GRUU could not be turned into exactly one contact
    #[error("GRUU resolution failed: {0}")]
    GruuResolution(String),
}

impl Rejection {
    /// Final response status sent back for this rejection
    pub fn status_code(&self) -> StatusCode {
        match self {
            Rejection::TooManyHops { .. } => StatusCode::TooManyHops,
            Rejection::BadDestination(_) => StatusCode::BadRequest,
            Rejection::LoopDetected(_) => StatusCode::LoopDetected,
            Rejection::GruuResolution(_) => StatusCode::ServerInternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_status_codes() {
        let hops = Rejection::TooManyHops {
            max_forwards: 1,
            via_count: 1,
        };
        assert_eq!(hops.status_code().as_u16(), 483);
        assert_eq!(Rejection::BadDestination("x".into()).status_code().as_u16(), 400);
        assert_eq!(Rejection::LoopDetected("b".into()).status_code().as_u16(), 482);
        assert_eq!(Rejection::GruuResolution("r".into()).status_code().as_u16(), 500);
    }

    #[test]
    fn test_error_conversions() {
        let err: ForwardError = RegistrarError::Backend("down".into()).into();
        assert!(matches!(err, ForwardError::Registrar(_)));
        assert_eq!(err.to_string(), "Registrar error: Registrar backend error: down");

        let err: ForwardError = sipfwd_sip_core::Error::InvalidUri("nope".into()).into();
        assert!(matches!(err, ForwardError::Uri(_)));
    }
}
