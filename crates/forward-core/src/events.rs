//! Messages in flight through the forwarding module
//!
//! An event owns its message and the per-message state that earlier stages
//! of the pipeline left behind. Whoever holds the event may edit the message.

use sipfwd_sip_core::{Request, Response};

use crate::transaction::{IncomingTransaction, OutgoingTransaction, TransactionLayer};

/// How the request arrived
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingAgent {
    Stateless,
    Transaction(IncomingTransaction),
}

/// How the request will leave
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingAgent {
    Stateless,
    Transaction(OutgoingTransaction),
}

/// A request plus its processing state
#[derive(Debug, Clone)]
pub struct RequestEvent {
    request: Request,
    /// Set once a Record-Route for this proxy has been inserted
    pub record_route_added: bool,
    incoming: Option<IncomingAgent>,
    outgoing: Option<OutgoingAgent>,
}

impl RequestEvent {
    /// A request received and forwarded statelessly
    pub fn new(request: Request) -> Self {
        RequestEvent {
            request,
            record_route_added: false,
            incoming: Some(IncomingAgent::Stateless),
            outgoing: Some(OutgoingAgent::Stateless),
        }
    }

    /// A request generated locally, with nothing to forward it through
    pub fn local(request: Request) -> Self {
        RequestEvent {
            request,
            record_route_added: false,
            incoming: None,
            outgoing: None,
        }
    }

    pub fn with_incoming_transaction(mut self, transaction: IncomingTransaction) -> Self {
        self.incoming = Some(IncomingAgent::Transaction(transaction));
        self
    }

    pub fn with_outgoing_transaction(mut self, transaction: OutgoingTransaction) -> Self {
        self.outgoing = Some(OutgoingAgent::Transaction(transaction));
        self
    }

    pub fn with_record_route_added(mut self) -> Self {
        self.record_route_added = true;
        self
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    pub fn into_request(self) -> Request {
        self.request
    }

    pub fn incoming(&self) -> Option<&IncomingAgent> {
        self.incoming.as_ref()
    }

    pub fn outgoing(&self) -> Option<&OutgoingAgent> {
        self.outgoing.as_ref()
    }

    /// Whether the request is being forwarded (it has an outbound agent)
    pub fn is_forwarded(&self) -> bool {
        self.outgoing.is_some()
    }

    pub fn incoming_transaction(&self) -> Option<&IncomingTransaction> {
        match &self.incoming {
            Some(IncomingAgent::Transaction(transaction)) => Some(transaction),
            _ => None,
        }
    }

    pub fn outgoing_transaction(&self) -> Option<&OutgoingTransaction> {
        match &self.outgoing {
            Some(OutgoingAgent::Transaction(transaction)) => Some(transaction),
            _ => None,
        }
    }

    /// Create a client transaction bound to the server transaction the
    /// request came through. Does nothing without one.
    pub fn create_outgoing_transaction(&mut self, layer: &dyn TransactionLayer) -> Option<&OutgoingTransaction> {
        let outgoing = layer.create_outgoing(self.incoming_transaction()?);
        self.outgoing = Some(OutgoingAgent::Transaction(outgoing));
        self.outgoing_transaction()
    }
}

/// A response on its way back
#[derive(Debug, Clone)]
pub struct ResponseEvent {
    response: Response,
}

impl ResponseEvent {
    pub fn new(response: Response) -> Self {
        ResponseEvent { response }
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::LocalTransactionLayer;
    use sipfwd_sip_core::{Method, Uri};

    fn request() -> Request {
        Request::new(Method::Invite, Uri::sip("example.com"))
    }

    #[test]
    fn test_agents() {
        let event = RequestEvent::new(request());
        assert!(event.is_forwarded());
        assert_eq!(event.incoming(), Some(&IncomingAgent::Stateless));
        assert!(event.incoming_transaction().is_none());

        let event = RequestEvent::local(request());
        assert!(!event.is_forwarded());
        assert!(event.outgoing().is_none());
    }

    #[test]
    fn test_create_outgoing_transaction() {
        let layer = LocalTransactionLayer::new();

        let mut stateless = RequestEvent::new(request());
        assert!(stateless.create_outgoing_transaction(&layer).is_none());
        assert_eq!(stateless.outgoing(), Some(&OutgoingAgent::Stateless));

        let mut event = RequestEvent::new(request()).with_incoming_transaction(IncomingTransaction::new("srv-9"));
        let created = event.create_outgoing_transaction(&layer).cloned().unwrap();
        assert_eq!(created.incoming_id(), Some("srv-9"));
        assert_eq!(event.outgoing_transaction(), Some(&created));
    }
}
