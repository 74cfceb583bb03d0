//! Routing primitives: URI helpers, next hop resolution, branch computation
//! and loop detection. Everything here is synchronous and free of I/O.

pub mod branch;
pub mod loop_detection;
pub mod next_hop;
pub mod uri_utils;

pub use branch::{compute_branch, BranchInput, BranchToken, BRANCH_PREFIX, MAGIC_COOKIE, TOKEN_LEN};
pub use loop_detection::is_looping;
pub use next_hop::{
    check_max_forwards, destination_from_route, parse_destination, parse_reg_id, pop_self_routes,
    resolve_next_hop, route_is_us, take_reg_id, validate_destination, ResolvedRoute, PROXY_ID_PARAM,
    RECEIVED_PARAM, REGID_PARAM, RPORT_PARAM,
};
pub use uri_utils::{
    add_param_if_absent, strip_contact_params, strip_params, uri_transport, url_is_resolved, url_via_match,
};
