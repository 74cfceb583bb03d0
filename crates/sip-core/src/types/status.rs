//! # SIP Status Codes
//!
//! Status codes from [RFC 3261 Section 21](https://datatracker.ietf.org/doc/html/rfc3261#section-21)
//! that a proxy emits or commonly relays. Anything else is carried as
//! [`StatusCode::Other`].
//!
//! ```rust
//! use sipfwd_sip_core::types::status::StatusCode;
//!
//! let status = StatusCode::from_u16(482);
//! assert_eq!(status, StatusCode::LoopDetected);
//! assert_eq!(status.to_string(), "482 Loop Detected");
//! assert!(status.is_error());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// SIP response status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    /// 100 Trying
    Trying,
    /// 180 Ringing
    Ringing,
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 408 Request Timeout
    RequestTimeout,
    /// 482 Loop Detected
    LoopDetected,
    /// 483 Too Many Hops
    TooManyHops,
    /// 486 Busy Here
    BusyHere,
    /// 500 Internal Server Error
    ServerInternalError,
    /// 503 Service Unavailable
    ServiceUnavailable,
    /// Any other code
    Other(u16),
}

impl StatusCode {
    /// Map a numeric code onto a variant
    pub fn from_u16(code: u16) -> Self {
        match code {
            100 => StatusCode::Trying,
            180 => StatusCode::Ringing,
            200 => StatusCode::Ok,
            400 => StatusCode::BadRequest,
            403 => StatusCode::Forbidden,
            404 => StatusCode::NotFound,
            408 => StatusCode::RequestTimeout,
            482 => StatusCode::LoopDetected,
            483 => StatusCode::TooManyHops,
            486 => StatusCode::BusyHere,
            500 => StatusCode::ServerInternalError,
            503 => StatusCode::ServiceUnavailable,
            other => StatusCode::Other(other),
        }
    }

    /// Numeric value
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Trying => 100,
            StatusCode::Ringing => 180,
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::RequestTimeout => 408,
            StatusCode::LoopDetected => 482,
            StatusCode::TooManyHops => 483,
            StatusCode::BusyHere => 486,
            StatusCode::ServerInternalError => 500,
            StatusCode::ServiceUnavailable => 503,
            StatusCode::Other(code) => *code,
        }
    }

    /// Standard reason phrase
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Trying => "Trying",
            StatusCode::Ringing => "Ringing",
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::LoopDetected => "Loop Detected",
            StatusCode::TooManyHops => "Too Many Hops",
            StatusCode::BusyHere => "Busy Here",
            StatusCode::ServerInternalError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
            StatusCode::Other(_) => "Unknown",
        }
    }

    /// 1xx
    pub fn is_provisional(&self) -> bool {
        (100..200).contains(&self.as_u16())
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.as_u16())
    }

    /// 4xx, 5xx or 6xx
    pub fn is_error(&self) -> bool {
        self.as_u16() >= 400
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_known_codes() {
        for code in [400u16, 482, 483, 500] {
            assert_eq!(StatusCode::from_u16(code).as_u16(), code);
        }
        assert_eq!(StatusCode::from_u16(599), StatusCode::Other(599));
    }

    #[test]
    fn test_classes() {
        assert!(StatusCode::Trying.is_provisional());
        assert!(StatusCode::Ok.is_success());
        assert!(StatusCode::TooManyHops.is_error());
        assert!(!StatusCode::Ringing.is_error());
    }
}
