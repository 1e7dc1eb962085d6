//! Transaction descriptors.
//!
//! A [`Transaction`] is a mutable builder. [`Transaction::freeze_with`]
//! consumes it and returns a [`FrozenTransaction`]: the body is fixed, bound
//! to the client's operator and nodes, and can only be signed and executed.
//! Mutating a frozen transaction is therefore a compile error rather than a
//! runtime check.

mod token_associate;
mod token_create;
mod token_mint;

pub use token_associate::{TokenAssociateData, TokenAssociateTransaction};
pub use token_create::{TokenCreateData, TokenCreateTransaction, TokenSupplyType, TokenType};
pub use token_mint::{TokenMintData, TokenMintTransaction};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::client::{LedgerClient, TransactionResponse};
use crate::error::{LedgerError, Result};
use crate::ids::{AccountId, TransactionId};
use crate::keys::{PrivateKey, PublicKey};

/// Body of any transaction this crate can build.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnyTransactionData {
    TokenCreate(TokenCreateData),
    TokenMint(TokenMintData),
    TokenAssociate(TokenAssociateData),
}

impl AnyTransactionData {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TokenCreate(_) => "token_create",
            Self::TokenMint(_) => "token_mint",
            Self::TokenAssociate(_) => "token_associate",
        }
    }
}

/// A transaction still being populated.
#[derive(Debug, Clone, Default)]
pub struct Transaction<D> {
    data: D,
    node_account_ids: Option<Vec<AccountId>>,
}

impl<D: Default> Transaction<D> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D> Transaction<D>
where
    D: Into<AnyTransactionData>,
{
    pub(crate) fn data(&self) -> &D {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    /// Restrict submission to these nodes instead of the client's full list.
    pub fn node_account_ids(&mut self, ids: impl IntoIterator<Item = AccountId>) -> &mut Self {
        self.node_account_ids = Some(ids.into_iter().collect());
        self
    }

    /// Fix the body and bind it to `client`: the transaction id is generated
    /// for the client's operator account and the node list is resolved.
    pub fn freeze_with<C>(self, client: &C) -> Result<FrozenTransaction>
    where
        C: LedgerClient + ?Sized,
    {
        let operator = client.operator().ok_or(LedgerError::NoOperator)?;
        let node_account_ids = match self.node_account_ids {
            Some(ids) => ids,
            None => client.node_account_ids(),
        };
        if node_account_ids.is_empty() {
            return Err(LedgerError::NoNodes);
        }

        let body = TransactionBody {
            transaction_id: TransactionId::generate(operator.account_id),
            node_account_ids,
            data: self.data.into(),
        };
        let body_bytes = serde_json::to_vec(&body)?;

        Ok(FrozenTransaction {
            body,
            body_bytes,
            signatures: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionBody {
    pub transaction_id: TransactionId,
    pub node_account_ids: Vec<AccountId>,
    pub data: AnyTransactionData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignaturePair {
    pub public_key: PublicKey,
    pub signature: Vec<u8>,
}

/// An immutable transaction body plus the signatures collected over it.
#[derive(Debug, Clone)]
pub struct FrozenTransaction {
    body: TransactionBody,
    body_bytes: Vec<u8>,
    signatures: Vec<SignaturePair>,
}

impl FrozenTransaction {
    pub fn transaction_id(&self) -> TransactionId {
        self.body.transaction_id
    }

    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    /// The exact bytes every signature covers.
    pub fn body_bytes(&self) -> &[u8] {
        &self.body_bytes
    }

    pub fn signatures(&self) -> &[SignaturePair] {
        &self.signatures
    }

    pub fn signers(&self) -> Vec<PublicKey> {
        self.signatures.iter().map(|pair| pair.public_key).collect()
    }

    pub fn is_signed_by(&self, public_key: &PublicKey) -> bool {
        self.signatures.iter().any(|pair| &pair.public_key == public_key)
    }

    /// Add a signature. Signing twice with the same key is a no-op.
    pub fn sign(&mut self, key: &PrivateKey) -> &mut Self {
        let public_key = key.public_key();
        if !self.is_signed_by(&public_key) {
            let signature = key.sign(&self.body_bytes);
            self.signatures.push(SignaturePair {
                public_key,
                signature,
            });
        }
        self
    }

    /// Sign with the key of the client's operator.
    pub fn sign_with_operator<C>(&mut self, client: &C) -> Result<&mut Self>
    where
        C: LedgerClient + ?Sized,
    {
        let operator = client.operator().ok_or(LedgerError::NoOperator)?;
        Ok(self.sign(&operator.private_key))
    }

    /// Whether every collected signature verifies against the body bytes.
    pub fn verify_signatures(&self) -> bool {
        self.signatures
            .iter()
            .all(|pair| pair.public_key.verify(&self.body_bytes, &pair.signature))
    }

    /// Hex SHA-256 over the body and its signatures.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.body_bytes);
        for pair in &self.signatures {
            hasher.update(&pair.signature);
        }
        hex::encode(hasher.finalize())
    }

    /// Submit to the network, adding the operator's signature if it is not
    /// already present. The receipt is fetched separately through
    /// [`TransactionResponse::get_receipt`].
    pub async fn execute<C>(&mut self, client: &C) -> Result<TransactionResponse>
    where
        C: LedgerClient + ?Sized,
    {
        if let Some(operator) = client.operator() {
            self.sign(&operator.private_key);
        }
        info!(
            transaction_id = %self.body.transaction_id,
            kind = self.body.data.kind(),
            signatures = self.signatures.len(),
            "submitting transaction"
        );
        client.submit(self).await
    }
}
