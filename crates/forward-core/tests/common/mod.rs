//! Shared fixtures for the forwarding integration tests

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sipfwd_forward_core::prelude::*;
use sipfwd_forward_core::sink::build_reply;

/// Unique id of the proxy under test
pub const PROXY_ID: &str = "proxy-1";

/// A request as the sink received it
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub request: Request,
    pub destination: Uri,
    pub branch: BranchToken,
    pub transport: Option<TransportHandle>,
}

/// Sink remembering everything it was asked to send
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<SentRequest>>,
    pub replies: Mutex<Vec<(Request, Response)>>,
    pub responses: Mutex<Vec<Response>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().clone()
    }

    pub fn replies(&self) -> Vec<(Request, Response)> {
        self.replies.lock().clone()
    }

    pub fn only_sent(&self) -> SentRequest {
        let sent = self.sent();
        assert_eq!(sent.len(), 1, "expected exactly one forwarded request");
        assert!(self.replies().is_empty(), "expected no local reply");
        sent[0].clone()
    }

    pub fn only_reply(&self) -> (Request, Response) {
        let replies = self.replies();
        assert_eq!(replies.len(), 1, "expected exactly one local reply");
        assert!(self.sent().is_empty(), "expected nothing forwarded");
        replies[0].clone()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_request(
        &self,
        request: Request,
        destination: Uri,
        branch: BranchToken,
        transport: Option<TransportHandle>,
    ) -> ForwardResult<()> {
        self.sent.lock().push(SentRequest {
            request,
            destination,
            branch,
            transport,
        });
        Ok(())
    }

    async fn send_response(&self, response: Response) -> ForwardResult<()> {
        self.responses.lock().push(response);
        Ok(())
    }

    async fn reply(&self, request: &Request, status: StatusCode, server: &str) -> ForwardResult<()> {
        self.replies
            .lock()
            .push((request.clone(), build_reply(request, status, server)));
        Ok(())
    }
}

/// Transport registry that records every lookup
#[derive(Default)]
pub struct RecordingTransports {
    pub inner: MemoryTransportRegistry,
    pub lookups: Mutex<Vec<TransportName>>,
}

impl TransportRegistry for RecordingTransports {
    fn find_transport(&self, name: &TransportName) -> Option<TransportHandle> {
        self.lookups.lock().push(name.clone());
        self.inner.find_transport(name)
    }
}

pub struct Harness {
    pub module: ForwardModule,
    pub sink: Arc<RecordingSink>,
    pub registrar: Arc<MemoryRegistrar>,
    pub transports: Arc<RecordingTransports>,
}

pub fn identity() -> LocalIdentity {
    LocalIdentity::new(ListenPoint::new("192.0.2.1", 5060, TransportProtocol::Udp))
        .with_alias("proxy.example.com")
        .with_unique_id(PROXY_ID)
        .with_server_string("sipfwd-test")
}

pub fn harness(settings: ForwardSettings) -> Harness {
    harness_with_hosts(settings, "")
}

pub fn harness_with_hosts(settings: ForwardSettings, hosts: &str) -> Harness {
    let sink = Arc::new(RecordingSink::default());
    let registrar = Arc::new(MemoryRegistrar::new());
    let transports = Arc::new(RecordingTransports::default());

    let module = ForwardModule::builder()
        .with_settings(settings)
        .with_identity(Arc::new(identity()))
        .with_sink(sink.clone())
        .with_registrar(registrar.clone())
        .with_transports(transports.clone())
        .with_hosts(Arc::new(EtcHostsResolver::parse(hosts)))
        .build()
        .expect("harness wiring");

    Harness {
        module,
        sink,
        registrar,
        transports,
    }
}

pub fn uri(text: &str) -> Uri {
    text.parse().expect("test URI")
}

/// Request from a single upstream client, Max-Forwards 70
pub fn request(method: Method, request_uri: &str) -> Request {
    Request::new(method, uri(request_uri))
        .with_via(Via::new("UDP", "198.51.100.10", Some(5060)).with_branch("z9hG4bKclient1"))
        .with_max_forwards(70)
        .with_from(Address::new(uri("sip:alice@atlanta.example.com")).with_tag("9fxced76sl"))
        .with_to(Address::new(uri("sip:bob@biloxi.example.com")))
        .with_call_id("3848276298220188511@atlanta.example.com")
        .with_cseq(1)
}

pub fn invite(request_uri: &str) -> Request {
    request(Method::Invite, request_uri)
}

/// Same request with a To tag, as sent inside a dialog
pub fn in_dialog(mut request: Request) -> Request {
    request.to = request.to.map(|to| to.with_tag("314159"));
    request
}
