//! In-crate client double for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::client::{LedgerClient, Status, TransactionReceipt, TransactionResponse};
use crate::error::Result;
use crate::identity::Identity;
use crate::ids::{AccountId, TransactionId};
use crate::keys::{KeyCurve, PrivateKey};
use crate::transaction::FrozenTransaction;

pub(crate) fn operator() -> Identity {
    Identity::new(
        AccountId::new(0, 0, 1001),
        PrivateKey::generate(KeyCurve::Ed25519).unwrap(),
    )
}

/// Records every submission and answers receipts from `receipt`.
pub(crate) struct RecordingClient {
    pub operator: Option<Identity>,
    pub nodes: Vec<AccountId>,
    pub receipt: TransactionReceipt,
    pub submitted: Mutex<Vec<FrozenTransaction>>,
}

impl RecordingClient {
    pub fn new(operator: Identity) -> Self {
        Self {
            operator: Some(operator),
            nodes: vec![AccountId::new(0, 0, 3)],
            receipt: TransactionReceipt::with_status(Status::Success),
            submitted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LedgerClient for RecordingClient {
    fn operator(&self) -> Option<&Identity> {
        self.operator.as_ref()
    }

    fn node_account_ids(&self) -> Vec<AccountId> {
        self.nodes.clone()
    }

    async fn submit(&self, transaction: &FrozenTransaction) -> Result<TransactionResponse> {
        self.submitted.lock().push(transaction.clone());
        Ok(TransactionResponse {
            transaction_id: transaction.transaction_id(),
            node_account_id: transaction.body().node_account_ids[0],
            transaction_hash: transaction.hash(),
        })
    }

    async fn receipt(&self, _transaction_id: &TransactionId) -> Result<TransactionReceipt> {
        Ok(self.receipt.clone())
    }
}
