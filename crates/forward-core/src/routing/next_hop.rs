//! Next hop resolution (RFC 3261 §16.4 and §16.6)
//!
//! Works on values taken from the request and hands back new ones; the
//! caller writes the updated Max-Forwards and Route set into the message only
//! when resolution succeeds, so a rejected request is answered untouched.

use std::str::FromStr;

use sipfwd_sip_core::{Address, Uri, Via};
use tracing::debug;

use crate::errors::Rejection;
use crate::identity::SelfIdentity;

/// Route marker naming the proxy instance that wrote the entry
pub const PROXY_ID_PARAM: &str = "fs-proxy-id";
/// Route marker carrying the observed source address of a NAT-ed client
pub const RECEIVED_PARAM: &str = "fs-received";
/// Route marker carrying the observed source port of a NAT-ed client
pub const RPORT_PARAM: &str = "fs-rport";
/// Registration id (RFC 5626)
pub const REGID_PARAM: &str = "regid";

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Where the request goes next, before any configured override
    pub next_hop: Uri,
    /// Route set left after popping our own entries
    pub remaining_route: Vec<Address>,
    /// Max-Forwards to write back, already decremented
    pub max_forwards: Option<u32>,
    /// `regid` found on the next hop, parsed as hexadecimal
    pub reg_id: Option<u64>,
}

/// Resolve the next hop of a request.
///
/// Rejects with [`Rejection::TooManyHops`] when Max-Forwards does not exceed
/// the Via count and with [`Rejection::BadDestination`] when the next hop
/// cannot be sent to.
pub fn resolve_next_hop(
    identity: &dyn SelfIdentity,
    max_forwards: Option<u32>,
    via_chain: &[Via],
    route: &[Address],
    request_uri: &Uri,
) -> Result<ResolvedRoute, Rejection> {
    let max_forwards = check_max_forwards(max_forwards, via_chain.len())?;

    let remaining_route = pop_self_routes(identity, route).to_vec();

    let mut next_hop = match remaining_route.first() {
        Some(front) => destination_from_route(front),
        None => request_uri.clone(),
    };

    validate_destination(&next_hop)?;

    let reg_id = take_reg_id(&mut next_hop);

    Ok(ResolvedRoute {
        next_hop,
        remaining_route,
        max_forwards,
        reg_id,
    })
}

/// Returns the decremented Max-Forwards, or rejects when it is exhausted
pub fn check_max_forwards(max_forwards: Option<u32>, via_count: usize) -> Result<Option<u32>, Rejection> {
    match max_forwards {
        None => Ok(None),
        Some(count) if (count as usize) <= via_count => {
            debug!("Too Many Hops (max-forwards {}, {} via)", count, via_count);
            Err(Rejection::TooManyHops {
                max_forwards: count,
                via_count,
            })
        }
        Some(count) => Ok(Some(count - 1)),
    }
}

/// Whether a Route entry was written by, or points at, this instance
pub fn route_is_us(identity: &dyn SelfIdentity, route: &Address) -> bool {
    let id = identity.unique_id();
    if route.param_value(PROXY_ID_PARAM) == Some(id) || route.uri.param_value(PROXY_ID_PARAM) == Some(id) {
        return true;
    }
    identity.is_us(&route.uri, true)
}

/// The route set with leading entries identifying this instance removed.
/// Applying it to its own output changes nothing.
pub fn pop_self_routes<'a>(identity: &dyn SelfIdentity, route: &'a [Address]) -> &'a [Address] {
    let skip = route.iter().take_while(|entry| route_is_us(identity, entry)).count();
    for popped in &route[..skip] {
        debug!("Removing route to us {}", popped.uri);
    }
    &route[skip..]
}

/// Destination URI for a Route entry, with `fs-received`/`fs-rport`
/// substituted for host and port and both markers dropped
pub fn destination_from_route(route: &Address) -> Uri {
    let mut dest = route.uri.clone();
    if let Some(received) = dest.param_value(RECEIVED_PARAM).map(str::to_string) {
        debug!("Route header has {}={}, using it as destination host", RECEIVED_PARAM, received);
        dest.set_host(&received);
        dest.remove_param(RECEIVED_PARAM);
    }
    if let Some(rport) = dest.param_value(RPORT_PARAM).map(str::to_string) {
        debug!("Route header has {}={}, using it as destination port", RPORT_PARAM, rport);
        dest.port = rport.parse().ok().or(dest.port);
        dest.remove_param(RPORT_PARAM);
    }
    dest
}

/// A destination must be sip/sips with a non-empty host free of `@`
pub fn validate_destination(dest: &Uri) -> Result<(), Rejection> {
    if !dest.is_sip() {
        return Err(Rejection::BadDestination(format!("unsupported scheme in {}", dest)));
    }
    let host = dest.host.as_str();
    if host.is_empty() {
        return Err(Rejection::BadDestination(format!("no host in {}", dest)));
    }
    if host.contains('@') {
        return Err(Rejection::BadDestination(format!("invalid host '{}'", host)));
    }
    Ok(())
}

/// Remove `regid` from `uri`, returning its value when it parses as hex
pub fn take_reg_id(uri: &mut Uri) -> Option<u64> {
    let value = uri.param_value(REGID_PARAM).map(str::to_string);
    uri.remove_param(REGID_PARAM);
    value.as_deref().and_then(parse_reg_id)
}

/// Parse a `regid` value as hexadecimal, with or without `0x`
pub fn parse_reg_id(value: &str) -> Option<u64> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16).ok()
}

/// Parse a URI from configuration or registrar text, for callers outside the
/// request path
pub fn parse_destination(text: &str) -> Result<Uri, Rejection> {
    let uri = Uri::from_str(text).map_err(|e| Rejection::BadDestination(e.to_string()))?;
    validate_destination(&uri)?;
    Ok(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{ListenPoint, LocalIdentity};
    use crate::transport::TransportProtocol;
    use sipfwd_sip_core::Param;

    fn identity() -> LocalIdentity {
        LocalIdentity::new(ListenPoint::new("192.0.2.1", 5060, TransportProtocol::Udp)).with_unique_id("proxy-1")
    }

    fn route(text: &str) -> Address {
        Address::new(text.parse().unwrap())
    }

    fn via() -> Vec<Via> {
        vec![Via::new("UDP", "client.example.com", None).with_branch("z9hG4bK1")]
    }

    #[test]
    fn test_max_forwards() {
        assert_eq!(check_max_forwards(None, 3), Ok(None));
        assert_eq!(check_max_forwards(Some(70), 1), Ok(Some(69)));
        assert_eq!(check_max_forwards(Some(2), 1), Ok(Some(1)));
        assert!(matches!(check_max_forwards(Some(1), 1), Err(Rejection::TooManyHops { .. })));
        assert!(matches!(check_max_forwards(Some(0), 0), Err(Rejection::TooManyHops { .. })));
    }

    #[test]
    fn test_pops_by_proxy_id_then_uses_next_route() {
        let routes = vec![
            route("sip:p1.example.com;lr;fs-proxy-id=proxy-1"),
            route("sip:p2.example.com;lr"),
        ];
        let request_uri: Uri = "sip:bob@example.com".parse().unwrap();
        let resolved = resolve_next_hop(&identity(), Some(70), &via(), &routes, &request_uri).unwrap();
        assert_eq!(resolved.next_hop.to_string(), "sip:p2.example.com;lr");
        assert_eq!(resolved.remaining_route, vec![routes[1].clone()]);
        assert_eq!(resolved.max_forwards, Some(69));
    }

    #[test]
    fn test_pops_by_header_param_and_is_us() {
        let routes = vec![
            route("sip:anything.example.com;lr").with_param(Param::new(PROXY_ID_PARAM, "proxy-1")),
            route("sip:192.0.2.1;lr"),
        ];
        let popped = pop_self_routes(&identity(), &routes);
        assert!(popped.is_empty());

        let request_uri: Uri = "sip:bob@198.51.100.7".parse().unwrap();
        let resolved = resolve_next_hop(&identity(), None, &via(), &routes, &request_uri).unwrap();
        assert_eq!(resolved.next_hop, request_uri);
        assert!(resolved.remaining_route.is_empty());
        assert_eq!(resolved.max_forwards, None);
    }

    #[test]
    fn test_route_to_our_host_on_another_port_is_kept() {
        let routes = vec![route("sip:192.0.2.1:5080;lr")];
        assert_eq!(pop_self_routes(&identity(), &routes).len(), 1);

        let request_uri: Uri = "sip:bob@198.51.100.7".parse().unwrap();
        let resolved = resolve_next_hop(&identity(), Some(70), &via(), &routes, &request_uri).unwrap();
        assert_eq!(resolved.next_hop.to_string(), "sip:192.0.2.1:5080;lr");
        assert_eq!(resolved.remaining_route, routes);
    }

    #[test]
    fn test_pop_is_idempotent() {
        let routes = vec![
            route("sip:192.0.2.1;lr"),
            route("sip:p2.example.com;lr"),
            route("sip:192.0.2.1;lr"),
        ];
        let once = pop_self_routes(&identity(), &routes);
        let twice = pop_self_routes(&identity(), once);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn test_received_and_rport_override() {
        let front = route("sip:edge.example.com:5060;lr;fs-received=203.0.113.7;fs-rport=41234");
        let dest = destination_from_route(&front);
        assert_eq!(dest.to_string(), "sip:203.0.113.7:41234;lr");
        assert!(dest.host.is_ip());

        let only_port = route("sip:edge.example.com;fs-rport=41234;transport=tcp");
        assert_eq!(destination_from_route(&only_port).to_string(), "sip:edge.example.com:41234;transport=tcp");
    }

    #[test]
    fn test_bad_destinations() {
        for text in ["tel:+15551234", "sip:eve@bad@example.com"] {
            let uri: Uri = text.parse().unwrap();
            let result = resolve_next_hop(&identity(), Some(70), &via(), &[], &uri);
            assert!(matches!(result, Err(Rejection::BadDestination(_))), "{}", text);
        }
        assert!(parse_destination("sip:gw.example.com").is_ok());
        assert!(parse_destination("mailto:bob@example.com").is_err());
    }

    #[test]
    fn test_regid_stripped_and_kept() {
        let request_uri: Uri = "sip:bob@192.0.2.9;regid=1f;transport=tcp".parse().unwrap();
        let resolved = resolve_next_hop(&identity(), None, &via(), &[], &request_uri).unwrap();
        assert_eq!(resolved.next_hop.to_string(), "sip:bob@192.0.2.9;transport=tcp");
        assert_eq!(resolved.reg_id, Some(0x1f));

        let mut garbage: Uri = "sip:bob@192.0.2.9;regid=zz".parse().unwrap();
        assert_eq!(take_reg_id(&mut garbage), None);
        assert!(!garbage.has_param(REGID_PARAM));
    }
}
