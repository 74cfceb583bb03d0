//! # sipfwd-sip-core
//!
//! SIP value types for the sipfwd forwarding proxy.
//!
//! Messages, URIs and headers are plain owned values. A stage that needs to
//! change a URI works on its own copy or on a message it owns outright, so a
//! message retained for logging or retransmission is never edited behind its
//! owner's back.
//!
//! ## Modules
//!
//! - `types`: URI, parameters, Via, name-addr, request, response, status codes
//! - `parser`: nom-based URI parser used for configured routes and registrar contacts
//! - `error`: error type shared by both

pub mod error;
pub mod parser;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Re-export of common types for easier use
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        Address, CSeq, Host, Method, Param, ParamList, Request, Response, Scheme, StatusCode, Uri,
        Via,
    };
}
