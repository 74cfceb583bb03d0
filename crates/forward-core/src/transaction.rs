//! Transaction handles
//!
//! The transaction state machine lives outside this crate. The dispatcher
//! only needs to know whether a request arrived through a server
//! transaction, to read the branch id of an existing client transaction, and
//! to ask for a client transaction bound to a server one.

use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use crate::routing::TOKEN_LEN;

/// Handle on a server transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IncomingTransaction {
    id: String,
}

impl IncomingTransaction {
    pub fn new(id: impl Into<String>) -> Self {
        IncomingTransaction { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Handle on a client transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutgoingTransaction {
    id: Uuid,
    branch_id: String,
    incoming: Option<String>,
}

impl OutgoingTransaction {
    pub fn new(branch_id: impl Into<String>) -> Self {
        OutgoingTransaction {
            id: Uuid::new_v4(),
            branch_id: branch_id.into(),
            incoming: None,
        }
    }

    /// Client transaction forwarding on behalf of `incoming`
    pub fn bound_to(branch_id: impl Into<String>, incoming: &IncomingTransaction) -> Self {
        OutgoingTransaction {
            incoming: Some(incoming.id().to_string()),
            ..OutgoingTransaction::new(branch_id)
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Branch id, without the magic cookie
    pub fn branch_id(&self) -> &str {
        &self.branch_id
    }

    /// Id of the server transaction this one forwards for
    pub fn incoming_id(&self) -> Option<&str> {
        self.incoming.as_deref()
    }
}

/// Creation of client transactions
pub trait TransactionLayer: Send + Sync {
    fn create_outgoing(&self, incoming: &IncomingTransaction) -> OutgoingTransaction;
}

/// Transaction layer handing out random branch ids
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTransactionLayer;

impl LocalTransactionLayer {
    pub fn new() -> Self {
        LocalTransactionLayer
    }
}

impl TransactionLayer for LocalTransactionLayer {
    fn create_outgoing(&self, incoming: &IncomingTransaction) -> OutgoingTransaction {
        let branch_id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        OutgoingTransaction::bound_to(branch_id, incoming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_layer_binds_and_randomises() {
        let layer = LocalTransactionLayer::new();
        let incoming = IncomingTransaction::new("srv-1");
        let a = layer.create_outgoing(&incoming);
        let b = layer.create_outgoing(&incoming);

        assert_eq!(a.incoming_id(), Some("srv-1"));
        assert_eq!(a.branch_id().len(), TOKEN_LEN);
        assert!(a.branch_id().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a.branch_id(), b.branch_id());
        assert_ne!(a.id(), b.id());
    }
}
