//! Via based loop detection (RFC 3261 §16.3 item 4)

use sipfwd_sip_core::Via;

/// True iff some Via entry carries exactly `branch`.
///
/// Only branches derived statelessly can repeat, so a request forwarded
/// through an outgoing transaction (which brings its own branch id) is never
/// reported as looping.
pub fn is_looping(via_chain: &[Via], branch: &str) -> bool {
    via_chain.iter().any(|via| via.branch() == Some(branch))
}
