//! Parsers for the textual values the proxy core has to interpret itself
//! (configured routes, registrar contact strings). Whole-message parsing
//! belongs to the transport layer.

pub mod uri;

pub use uri::parse_uri;
