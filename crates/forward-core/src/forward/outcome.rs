//! What became of a request handed to the forwarding module

use sipfwd_sip_core::{StatusCode, Uri};
use uuid::Uuid;

use crate::errors::Rejection;
use crate::routing::BranchToken;

/// Why a request was dropped without any reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The destination is this instance
    SelfForward,
    /// The open transport belongs to another registration
    RegIdMismatch { expected: u64, found: u64 },
}

/// Terminal state of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// Handed to the sink
    Sent {
        destination: Uri,
        branch: BranchToken,
        transport: Option<Uuid>,
    },
    /// Answered locally with a final response
    Rejected(Rejection),
    /// Dropped silently
    Dropped(DropReason),
    /// The sink refused the request
    SendFailed(String),
}

impl ForwardOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, ForwardOutcome::Sent { .. })
    }

    /// Status of the local reply, if one was sent
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ForwardOutcome::Rejected(rejection) => Some(rejection.status_code()),
            _ => None,
        }
    }
}
