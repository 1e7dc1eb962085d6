use thiserror::Error;

use crate::client::Status;
use crate::ids::TransactionId;

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;

/// Failures surfaced by token operations.
///
/// Errors raised by the ledger client or the key resolver pass through
/// unchanged; the operations themselves add no recovery.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid key: {0}")]
    KeyParse(String),

    #[error("key reference could not be resolved: {0}")]
    KeyResolution(String),

    #[error("invalid identifier `{input}`: {reason}")]
    IdParse { input: String, reason: String },

    #[error("client has no operator configured")]
    NoOperator,

    #[error("client has no nodes to submit to")]
    NoNodes,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("transaction {transaction_id} failed precheck with status {status}")]
    Precheck {
        transaction_id: TransactionId,
        status: Status,
    },

    #[error("receipt for transaction {transaction_id} contained status {status}")]
    ReceiptStatus {
        transaction_id: TransactionId,
        status: Status,
    },

    #[error("receipt is missing `{0}`")]
    MissingReceiptField(&'static str),

    #[error("token association requires at least one token id")]
    EmptyTokenList,

    #[error("invalid custom fee: {0}")]
    FeeDecode(String),

    #[error("invalid timestamp `{0}`")]
    InvalidTimestamp(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("key store error: {0}")]
    KeyStore(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
