//! The forwarding module
//!
//! [`ForwardModule`] is the last stage of the proxy's request pipeline. It
//! takes a request event, decides where the request goes next and hands it
//! to the [`MessageSink`], or answers it locally when it cannot be forwarded.
//!
//! ```text
//! on_request
//!   ├─ route_request      Max-Forwards, Route popping, next hop, static route
//!   ├─ GRUU lookup        only for in-dialog requests to a GRUU (async)
//!   └─ send_request       hosts override, self check, transport, Record-Route,
//!                         Path, push params, branch, loop check, send
//! ```
//!
//! Protocol failures end in exactly one reply (400, 482, 483 or 500).
//! Nothing is returned as an error: the caller gets a [`ForwardOutcome`].

mod builder;
mod outcome;

pub use builder::ForwardModuleBuilder;
pub use outcome::{DropReason, ForwardOutcome};

use std::sync::Arc;

use sipfwd_sip_core::{Address, Host, Method, Param, Request, Scheme, Uri};
use tracing::{debug, error, info, instrument, warn};

use crate::config::ForwardSettings;
use crate::errors::{ForwardResult, Rejection};
use crate::events::{RequestEvent, ResponseEvent};
use crate::gruu::{needs_gruu_resolution, resolve_gruu};
use crate::hosts::HostsResolver;
use crate::identity::SelfIdentity;
use crate::registrar::{contact_reg_id, Registrar, GRUU_PARAM};
use crate::routing::{
    add_param_if_absent, compute_branch, is_looping, resolve_next_hop, strip_contact_params, strip_params,
    url_is_resolved, url_via_match, BranchInput, PROXY_ID_PARAM, REGID_PARAM,
};
use crate::sink::MessageSink;
use crate::transaction::TransactionLayer;
use crate::transport::{TransportHandle, TransportName, TransportRegistry};

/// Where a request is about to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub uri: Uri,
    /// Registration id the outgoing transport must carry, when known
    pub reg_id: Option<u64>,
}

/// Request forwarding stage
#[derive(Clone)]
pub struct ForwardModule {
    settings: ForwardSettings,
    identity: Arc<dyn SelfIdentity>,
    registrar: Arc<dyn Registrar>,
    transports: Arc<dyn TransportRegistry>,
    hosts: Arc<dyn HostsResolver>,
    transactions: Arc<dyn TransactionLayer>,
    sink: Arc<dyn MessageSink>,
}

impl std::fmt::Debug for ForwardModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardModule")
            .field("settings", &self.settings)
            .field("unique_id", &self.identity.unique_id())
            .finish_non_exhaustive()
    }
}

impl ForwardModule {
    pub fn builder() -> ForwardModuleBuilder {
        ForwardModuleBuilder::new()
    }

    pub fn settings(&self) -> &ForwardSettings {
        &self.settings
    }

    /// Forward one request
    #[instrument(level = "debug", skip_all, fields(method = %event.request().method))]
    pub async fn on_request(&self, mut event: RequestEvent) -> ForwardOutcome {
        let destination = match self.route_request(&mut event) {
            Ok(destination) => destination,
            Err(rejection) => return self.reject(&event, rejection).await,
        };

        let destination = if needs_gruu_resolution(&destination.uri, event.request()) {
            match self.resolve_gruu_destination(&mut event, &destination.uri).await {
                Ok(destination) => destination,
                Err(rejection) => return self.reject(&event, rejection).await,
            }
        } else {
            destination
        };

        self.send_request(event, destination).await
    }

    /// Relay a response unchanged
    pub async fn on_response(&self, event: ResponseEvent) -> ForwardResult<()> {
        self.sink.send_response(event.into_response()).await
    }

    /// Check Max-Forwards, pop our Route entries and pick the destination,
    /// applying the static route and default transport.
    ///
    /// On success the decremented Max-Forwards and the remaining Route set
    /// are written into the request. On rejection the request is untouched.
    pub fn route_request(&self, event: &mut RequestEvent) -> Result<Destination, Rejection> {
        let request = event.request();
        let resolved = resolve_next_hop(
            self.identity.as_ref(),
            request.max_forwards,
            &request.via,
            &request.route,
            &request.uri,
        )?;

        let request = event.request_mut();
        request.max_forwards = resolved.max_forwards;
        request.route = resolved.remaining_route;

        let uri = self.override_destination(request, resolved.next_hop);
        Ok(Destination {
            uri,
            reg_id: resolved.reg_id,
        })
    }

    fn override_destination(&self, request: &mut Request, mut dest: Uri) -> Uri {
        if let Some(route) = &self.settings.route {
            if url_via_match(route, &request.via, false) {
                debug!("Found forced outgoing route {} in via, skipping", route);
                return dest;
            }
            if !url_is_resolved(&request.uri) {
                dest = route.clone();
                if self.settings.rewrite_req_uri {
                    request.uri.host = route.host.clone();
                    request.uri.port = route.port;
                }
            }
        }

        if let Some(transport) = &self.settings.default_transport {
            if dest.scheme == Scheme::Sip && dest.transport().is_none() {
                add_param_if_absent(&mut dest, transport);
            }
        }
        dest
    }

    async fn resolve_gruu_destination(&self, event: &mut RequestEvent, gruu: &Uri) -> Result<Destination, Rejection> {
        let contact = resolve_gruu(self.registrar.as_ref(), gruu).await.into_contact()?;
        let reg_id = contact_reg_id(&contact);
        let target = strip_params(&contact, &[GRUU_PARAM, REGID_PARAM]);
        debug!("GRUU {} resolved to {}", gruu, target);

        event.request_mut().uri = target.clone();
        Ok(Destination { uri: target, reg_id })
    }

    /// Send a routed request to `destination`
    pub async fn send_request(&self, mut event: RequestEvent, destination: Destination) -> ForwardOutcome {
        let Destination { uri: mut dest, reg_id } = destination;

        if let Host::Domain(name) = &dest.host {
            if let Some(address) = self.hosts.resolve(name) {
                debug!("Found {} in hosts file, sending to {}", name, address);
                dest.host = Host::Address(address);
            }
        }

        if event.is_forwarded() && self.identity.is_us(&dest, true) {
            debug!("Stopping request to us: {}", dest);
            return ForwardOutcome::Dropped(DropReason::SelfForward);
        }

        let transport = if event.is_forwarded() {
            match self.select_transport(&dest, reg_id) {
                Ok(transport) => transport,
                Err(reason) => return ForwardOutcome::Dropped(reason),
            }
        } else {
            None
        };

        let method = event.request().method.clone();

        if !event.record_route_added && matches!(method, Method::Invite | Method::Subscribe) {
            let record_route = Address::new(self.identity.local_uri(transport.as_ref()).with_parameter(Param::lr()));
            event.request_mut().record_route.insert(0, record_route);
            event.record_route_added = true;
        }

        if self.settings.add_path && method == Method::Register {
            let path = self
                .identity
                .local_uri(transport.as_ref())
                .with_parameter(Param::new(PROXY_ID_PARAM, self.identity.unique_id()))
                .with_parameter(Param::lr());
            event.request_mut().path.insert(0, Address::new(path));
        }

        self.strip_push_params(event.request_mut());

        if event.is_forwarded() && event.outgoing_transaction().is_none() && event.incoming_transaction().is_some() {
            event.create_outgoing_transaction(self.transactions.as_ref());
        }

        let branch = compute_branch(
            &BranchInput::from_request(self.identity.unique_id(), event.request()),
            event.outgoing_transaction(),
        );
        if is_looping(&event.request().via, branch.as_str()) {
            warn!("Loop detected on branch {}", branch);
            return self.reject(&event, Rejection::LoopDetected(branch.into_string())).await;
        }

        let transport_id = transport.as_ref().map(|t| t.id);
        debug!("Forwarding {} to {} (branch {})", method, dest, branch);
        match self
            .sink
            .send_request(event.into_request(), dest.clone(), branch.clone(), transport)
            .await
        {
            Ok(()) => ForwardOutcome::Sent {
                destination: dest,
                branch,
                transport: transport_id,
            },
            Err(e) => {
                error!("Failed to send request to {}: {}", dest, e);
                ForwardOutcome::SendFailed(e.to_string())
            }
        }
    }

    fn select_transport(&self, dest: &Uri, reg_id: Option<u64>) -> Result<Option<TransportHandle>, DropReason> {
        let name = match TransportName::from_uri(dest) {
            Ok(name) => name,
            Err(e) => {
                warn!("Cannot build transport name for {}: {}", dest, e);
                return Ok(None);
            }
        };

        let Some(handle) = self.transports.find_transport(&name) else {
            warn!("Could not find transport to {}, sending unpinned", name);
            return Ok(None);
        };

        if let (Some(expected), Some(found)) = (reg_id, handle.reg_id) {
            if expected != found {
                debug!("Stopping request: regid {:x} does not match transport regid {:x}", expected, found);
                return Err(DropReason::RegIdMismatch { expected, found });
            }
        }
        Ok(Some(handle))
    }

    fn strip_push_params(&self, request: &mut Request) {
        let names = self.settings.params_to_remove.as_slice();
        if names.is_empty() {
            return;
        }
        if request.method != Method::Register && strip_contact_params(&mut request.contact, names) {
            debug!("Removed push params from contact");
        }
        request.uri = strip_params(&request.uri, names);
    }

    async fn reject(&self, event: &RequestEvent, rejection: Rejection) -> ForwardOutcome {
        let status = rejection.status_code();
        info!("Rejecting request with {}: {}", status, rejection);
        if let Err(e) = self
            .sink
            .reply(event.request(), status, self.identity.server_string())
            .await
        {
            error!("Failed to send {} reply: {}", status, e);
        }
        ForwardOutcome::Rejected(rejection)
    }
}
