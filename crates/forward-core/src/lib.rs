//! # sipfwd-forward-core
//!
//! Request forwarding for a SIP proxy. Given a request that earlier stages
//! have accepted, the [`ForwardModule`] works out its next hop following the
//! RFC 3261 §16 routing rules, stamps Record-Route or Path when the proxy has
//! to stay on the signalling path, derives a loop-safe Via branch and hands
//! the request to a [`MessageSink`].
//!
//! Proxy extensions on top of plain RFC 3261:
//!
//! - in-dialog requests addressed to a GRUU are sent to the one contact the
//!   registrar holds for it
//! - `fs-received`/`fs-rport` markers in Route entries reach clients behind NAT
//! - push notification parameters are stripped before sending
//! - a `regid` on the destination pins the request to the matching flow
//! - static overrides from a hosts file
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sipfwd_forward_core::prelude::*;
//! # use async_trait::async_trait;
//! # struct Wire;
//! # #[async_trait]
//! # impl MessageSink for Wire {
//! #     async fn send_request(&self, _: Request, _: Uri, _: BranchToken, _: Option<TransportHandle>) -> ForwardResult<()> { Ok(()) }
//! #     async fn send_response(&self, _: Response) -> ForwardResult<()> { Ok(()) }
//! #     async fn reply(&self, _: &Request, _: StatusCode, _: &str) -> ForwardResult<()> { Ok(()) }
//! # }
//!
//! # async fn run(request: Request) -> ForwardResult<()> {
//! let settings = ForwardConfig::from_toml_str(r#"route = "sip:gw.example.com""#)?.validate()?;
//! let identity = LocalIdentity::new(ListenPoint::new("192.0.2.1", 5060, TransportProtocol::Udp));
//!
//! let module = ForwardModule::builder()
//!     .with_settings(settings)
//!     .with_identity(Arc::new(identity))
//!     .with_sink(Arc::new(Wire))
//!     .build()?;
//!
//! match module.on_request(RequestEvent::new(request)).await {
//!     ForwardOutcome::Sent { destination, .. } => println!("sent to {}", destination),
//!     other => println!("not forwarded: {:?}", other),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod events;
pub mod forward;
pub mod gruu;
pub mod hosts;
pub mod identity;
pub mod logging;
pub mod registrar;
pub mod routing;
pub mod sink;
pub mod transaction;
pub mod transport;

pub use config::{ForwardConfig, ForwardSettings};
pub use errors::{ForwardError, ForwardResult, RegistrarError, Rejection};
pub use events::{RequestEvent, ResponseEvent};
pub use forward::{Destination, DropReason, ForwardModule, ForwardModuleBuilder, ForwardOutcome};
pub use sink::MessageSink;

pub mod prelude {
    pub use crate::config::{ForwardConfig, ForwardSettings};
    pub use crate::errors::{ForwardError, ForwardResult, RegistrarError, Rejection};
    pub use crate::events::{IncomingAgent, OutgoingAgent, RequestEvent, ResponseEvent};
    pub use crate::forward::{Destination, DropReason, ForwardModule, ForwardOutcome};
    pub use crate::gruu::GruuResolution;
    pub use crate::hosts::{EtcHostsResolver, HostsResolver};
    pub use crate::identity::{ListenPoint, LocalIdentity, SelfIdentity};
    pub use crate::registrar::{Binding, MemoryRegistrar, Record, Registrar};
    pub use crate::routing::BranchToken;
    pub use crate::sink::MessageSink;
    pub use crate::transaction::{IncomingTransaction, LocalTransactionLayer, OutgoingTransaction, TransactionLayer};
    pub use crate::transport::{
        MemoryTransportRegistry, TransportHandle, TransportName, TransportProtocol, TransportRegistry,
    };
    pub use sipfwd_sip_core::{
        Address, CSeq, Host, Method, Param, ParamList, Request, Response, Scheme, StatusCode, Uri, Via,
    };
}
