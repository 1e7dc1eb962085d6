use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::identity::Identity;
use crate::ids::{AccountId, TokenId, TransactionId};
use crate::transaction::FrozenTransaction;

/// Outcome code reported by the ledger for a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    Success,
    InvalidSignature,
    InvalidTokenId,
    InvalidAccountId,
    InsufficientPayerBalance,
    TokenAlreadyAssociatedToAccount,
    TokenHasNoSupplyKey,
    TokenMaxSupplyReached,
    DuplicateTransaction,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Other(code) => f.write_str(code),
            known => {
                let rendered = serde_json::to_string(known).map_err(|_| fmt::Error)?;
                f.write_str(rendered.trim_matches('"'))
            }
        }
    }
}

/// Confirmation record produced once a transaction reaches finality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub status: Status,
    pub token_id: Option<TokenId>,
    pub account_id: Option<AccountId>,
    /// Serial numbers assigned by a non-fungible mint.
    #[serde(default)]
    pub serial_numbers: Vec<i64>,
    /// Supply after a mint.
    pub total_supply: Option<u64>,
}

impl TransactionReceipt {
    pub fn with_status(status: Status) -> Self {
        Self {
            status,
            token_id: None,
            account_id: None,
            serial_numbers: Vec::new(),
            total_supply: None,
        }
    }
}

/// Acknowledgement that a node accepted a transaction for consensus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub transaction_id: TransactionId,
    pub node_account_id: AccountId,
    /// Hex SHA-256 of the signed transaction.
    pub transaction_hash: String,
}

impl TransactionResponse {
    /// Wait for the receipt. Any status other than `SUCCESS` is an error.
    pub async fn get_receipt<C>(&self, client: &C) -> Result<TransactionReceipt>
    where
        C: LedgerClient + ?Sized,
    {
        let receipt = client.receipt(&self.transaction_id).await?;
        debug!(transaction_id = %self.transaction_id, status = %receipt.status, "receipt obtained");
        if receipt.status != Status::Success {
            return Err(LedgerError::ReceiptStatus {
                transaction_id: self.transaction_id,
                status: receipt.status,
            });
        }
        Ok(receipt)
    }
}

/// Connection to a ledger network.
///
/// Implementations own transport, node selection, timeouts and polling for
/// finality. Token operations only borrow a client for the duration of a call
/// and never retry.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Account and key paying for (and co-signing) transactions.
    fn operator(&self) -> Option<&Identity>;

    /// Nodes a frozen transaction may be submitted to.
    fn node_account_ids(&self) -> Vec<AccountId>;

    /// Submit a frozen, signed transaction.
    async fn submit(&self, transaction: &FrozenTransaction) -> Result<TransactionResponse>;

    /// Block until the receipt for `transaction_id` is available.
    async fn receipt(&self, transaction_id: &TransactionId) -> Result<TransactionReceipt>;
}
