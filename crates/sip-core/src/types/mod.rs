//! SIP value types handed between the parser, the proxy core and the transport

pub mod address;
pub mod method;
pub mod param;
pub mod sip_request;
pub mod sip_response;
pub mod status;
pub mod uri;
pub mod via;

pub use address::Address;
pub use method::Method;
pub use param::{Param, ParamList};
pub use sip_request::{CSeq, Request};
pub use sip_response::Response;
pub use status::StatusCode;
pub use uri::{Host, Scheme, Uri};
pub use via::Via;
