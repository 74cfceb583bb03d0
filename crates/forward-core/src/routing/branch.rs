//! Via branch computation
//!
//! A forwarded request gets a branch that is a pure function of the fields
//! identifying its transaction, so a retransmission forwarded statelessly
//! carries the same branch as the original and a request that comes back
//! around finds its own branch in the Via chain. When an outgoing transaction
//! already exists its branch id is reused instead.
//!
//! The value is `z9hG4bK.` followed by a 26-character token: the MD5 digest
//! of the identifying fields packed five bits at a time, least significant
//! bit first, onto a 32-symbol alphabet.

use std::fmt;

use md5::{Digest, Md5};
use sipfwd_sip_core::{Request, Uri};

use crate::transaction::OutgoingTransaction;

/// RFC 3261 branch magic cookie
pub const MAGIC_COOKIE: &str = "z9hG4bK";

/// Prefix of every branch this proxy generates
pub const BRANCH_PREFIX: &str = "z9hG4bK.";

/// Width of the token following [`BRANCH_PREFIX`]
pub const TOKEN_LEN: usize = 26;

const TOKEN_ALPHABET: &[u8; 32] = b"aBcDeFgHiJkLmNoPqRsTuVwXyZ012345";

/// A complete branch value, cookie included
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchToken(String);

impl BranchToken {
    fn from_token(token: &str) -> Self {
        BranchToken(format!("{}{}", BRANCH_PREFIX, token))
    }

    /// Full value as written into the Via `branch` parameter
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the cookie and dot
    pub fn token(&self) -> &str {
        &self.0[BRANCH_PREFIX.len()..]
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BranchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BranchToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fields a stateless branch is derived from
#[derive(Debug, Clone)]
pub struct BranchInput<'a> {
    pub server_identity: &'a str,
    pub request_uri: &'a Uri,
    pub call_id: Option<&'a str>,
    pub from_uri: Option<&'a Uri>,
    pub from_tag: Option<&'a str>,
    pub to_uri: Option<&'a Uri>,
    pub cseq: Option<u32>,
    pub route_uris: Vec<&'a Uri>,
}

impl<'a> BranchInput<'a> {
    /// Collect the identifying fields of `request`
    pub fn from_request(server_identity: &'a str, request: &'a Request) -> Self {
        BranchInput {
            server_identity,
            request_uri: &request.uri,
            call_id: request.call_id.as_deref(),
            from_uri: request.from.as_ref().map(|from| &from.uri),
            from_tag: request.from_tag(),
            to_uri: request.to.as_ref().map(|to| &to.uri),
            cseq: request.cseq.as_ref().map(|cseq| cseq.seq),
            route_uris: request.route.iter().map(|route| &route.uri).collect(),
        }
    }
}

/// Branch for the next hop: the outgoing transaction's id when there is one,
/// otherwise a digest of `input`.
pub fn compute_branch(input: &BranchInput<'_>, existing: Option<&OutgoingTransaction>) -> BranchToken {
    match existing {
        Some(transaction) => {
            let token: String = transaction.branch_id().chars().take(TOKEN_LEN).collect();
            BranchToken::from_token(&token)
        }
        None => BranchToken::from_token(&encode_token(&digest(input))),
    }
}

fn digest(input: &BranchInput<'_>) -> [u8; 16] {
    let mut hasher = Md5::new();

    update_str0(&mut hasher, input.server_identity);
    update_uri(&mut hasher, input.request_uri);
    if let Some(params) = input.request_uri.params_string() {
        update_str0(&mut hasher, &params);
    }
    if let Some(call_id) = input.call_id {
        update_str0(&mut hasher, call_id);
    }
    if let Some(from) = input.from_uri {
        update_uri(&mut hasher, from);
    }
    if let Some(tag) = input.from_tag {
        update_str0(&mut hasher, &tag.to_ascii_lowercase());
    }
    // To tag excluded
    if let Some(to) = input.to_uri {
        update_uri(&mut hasher, to);
    }
    if let Some(seq) = input.cseq {
        hasher.update(seq.to_be_bytes());
    }
    for route in &input.route_uris {
        update_uri(&mut hasher, route);
    }

    let mut out = [0u8; 16];
    out.copy_from_slice(&hasher.finalize());
    out
}

fn update_str0(hasher: &mut Md5, value: &str) {
    hasher.update(value.as_bytes());
    hasher.update([0u8]);
}

fn update_uri(hasher: &mut Md5, uri: &Uri) {
    hasher.update(canonical_uri(uri).as_bytes());
}

/// Form of a URI that feeds the digest: for sip/sips the user, lower-cased
/// host, defaulted port and the lower-cased `transport` and `maddr` values;
/// other schemes hash as written.
pub fn canonical_uri(uri: &Uri) -> String {
    if !uri.is_sip() {
        return uri.to_string();
    }
    let mut out = String::from("sip:");
    if let Some(user) = &uri.user {
        out.push_str(user);
        out.push('@');
    }
    out.push_str(&uri.host.to_string().to_ascii_lowercase());
    out.push(':');
    out.push_str(&uri.effective_port().to_string());
    for name in ["transport", "maddr"] {
        if let Some(value) = uri.param_value(name) {
            out.push(';');
            out.push_str(name);
            out.push('=');
            out.push_str(&value.to_ascii_lowercase());
        }
    }
    out
}

fn encode_token(bytes: &[u8]) -> String {
    let mut token = String::with_capacity(TOKEN_LEN);
    let mut pending = bytes.iter();
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;

    while token.len() < TOKEN_LEN {
        if bits < 5 {
            match pending.next() {
                Some(&byte) => {
                    acc |= u32::from(byte) << bits;
                    bits += 8;
                }
                None if bits == 0 => break,
                None => {}
            }
        }
        token.push(char::from(TOKEN_ALPHABET[(acc & 0x1f) as usize]));
        acc >>= 5;
        bits = bits.saturating_sub(5);
    }
    token
}
