//! Outbound side of the forwarding module

use async_trait::async_trait;
use sipfwd_sip_core::{Request, Response, StatusCode, Uri};

use crate::errors::ForwardResult;
use crate::routing::BranchToken;
use crate::transport::TransportHandle;

/// Where forwarded messages and locally generated replies go.
///
/// Dropping a request is expressed by not calling the sink at all.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Send `request` to `destination`, adding a Via with `branch`. When
    /// `transport` is set the request must leave through it.
    async fn send_request(
        &self,
        request: Request,
        destination: Uri,
        branch: BranchToken,
        transport: Option<TransportHandle>,
    ) -> ForwardResult<()>;

    /// Relay a response upstream as is
    async fn send_response(&self, response: Response) -> ForwardResult<()>;

    /// Answer `request` with a final response carrying a Server header
    async fn reply(&self, request: &Request, status: StatusCode, server: &str) -> ForwardResult<()>;
}

/// Final response for `request` as a sink would build it
pub fn build_reply(request: &Request, status: StatusCode, server: &str) -> Response {
    Response::for_request(request, status).with_header("Server", server)
}
