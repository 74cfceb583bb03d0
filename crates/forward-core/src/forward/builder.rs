//! Builder wiring a [`ForwardModule`] to its collaborators

use std::sync::Arc;

use crate::config::ForwardSettings;
use crate::errors::{ForwardError, ForwardResult};
use crate::hosts::{EtcHostsResolver, HostsResolver};
use crate::identity::SelfIdentity;
use crate::registrar::{MemoryRegistrar, Registrar};
use crate::sink::MessageSink;
use crate::transaction::{LocalTransactionLayer, TransactionLayer};
use crate::transport::{MemoryTransportRegistry, TransportRegistry};

use super::ForwardModule;

/// Builder for [`ForwardModule`].
///
/// Identity and sink are required. The other collaborators default to the
/// in-memory implementations and an empty hosts table.
#[derive(Default)]
pub struct ForwardModuleBuilder {
    settings: ForwardSettings,
    identity: Option<Arc<dyn SelfIdentity>>,
    sink: Option<Arc<dyn MessageSink>>,
    registrar: Option<Arc<dyn Registrar>>,
    transports: Option<Arc<dyn TransportRegistry>>,
    hosts: Option<Arc<dyn HostsResolver>>,
    transactions: Option<Arc<dyn TransactionLayer>>,
}

impl ForwardModuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: ForwardSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_identity(mut self, identity: Arc<dyn SelfIdentity>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn MessageSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_registrar(mut self, registrar: Arc<dyn Registrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    pub fn with_transports(mut self, transports: Arc<dyn TransportRegistry>) -> Self {
        self.transports = Some(transports);
        self
    }

    pub fn with_hosts(mut self, hosts: Arc<dyn HostsResolver>) -> Self {
        self.hosts = Some(hosts);
        self
    }

    pub fn with_transaction_layer(mut self, transactions: Arc<dyn TransactionLayer>) -> Self {
        self.transactions = Some(transactions);
        self
    }

    pub fn build(self) -> ForwardResult<ForwardModule> {
        let identity = self
            .identity
            .ok_or_else(|| ForwardError::Config("forward module needs a self identity".to_string()))?;
        let sink = self
            .sink
            .ok_or_else(|| ForwardError::Config("forward module needs a message sink".to_string()))?;

        Ok(ForwardModule {
            settings: self.settings,
            identity,
            sink,
            registrar: self.registrar.unwrap_or_else(|| Arc::new(MemoryRegistrar::new())),
            transports: self
                .transports
                .unwrap_or_else(|| Arc::new(MemoryTransportRegistry::new())),
            hosts: self.hosts.unwrap_or_else(|| Arc::new(EtcHostsResolver::empty())),
            transactions: self
                .transactions
                .unwrap_or_else(|| Arc::new(LocalTransactionLayer::new())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{ListenPoint, LocalIdentity};
    use crate::transport::TransportProtocol;

    #[test]
    fn test_build_requires_identity_and_sink() {
        let result = ForwardModuleBuilder::new().build();
        assert!(matches!(result, Err(ForwardError::Config(_))));

        let identity = LocalIdentity::new(ListenPoint::new("192.0.2.1", 5060, TransportProtocol::Udp));
        let result = ForwardModule::builder().with_identity(Arc::new(identity)).build();
        assert!(matches!(result, Err(ForwardError::Config(ref msg)) if msg.contains("sink")));
    }
}
