//! Token create, mint and associate operations over a ledger client.

pub mod client;
pub mod error;
pub mod fees;
pub mod identity;
pub mod ids;
pub mod key_store;
pub mod keys;
pub mod properties;
pub mod resolver;
pub mod service;
pub mod transaction;

#[cfg(test)]
mod testing;

pub use client::{LedgerClient, Status, TransactionReceipt, TransactionResponse};
pub use error::{LedgerError, Result};
pub use fees::{CustomFee, Fee, FixedFee, FractionalFee, RoyaltyFee, decode_custom_fees};
pub use identity::Identity;
pub use ids::{AccountId, TokenId, TransactionId};
pub use key_store::{KeyEntry, KeyStore};
pub use keys::{KeyCurve, PrivateKey, PublicKey};
pub use properties::TokenProperties;
pub use resolver::{InlineKeyResolver, KeyRef, KeyResolver, KeyStoreResolver};
pub use service::TokenService;
pub use transaction::{
    AnyTransactionData, FrozenTransaction, TokenAssociateTransaction, TokenCreateTransaction,
    TokenMintTransaction, TokenSupplyType, TokenType, Transaction,
};
