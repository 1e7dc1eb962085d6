use serde::Serialize;

use super::{AnyTransactionData, Transaction};
use crate::ids::TokenId;

/// Mints NFTs, one serial per metadata entry.
pub type TokenMintTransaction = Transaction<TokenMintData>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenMintData {
    token_id: Option<TokenId>,
    metadata: Vec<Vec<u8>>,
}

impl From<TokenMintData> for AnyTransactionData {
    fn from(data: TokenMintData) -> Self {
        Self::TokenMint(data)
    }
}

impl TokenMintTransaction {
    pub fn token_id(&mut self, id: TokenId) -> &mut Self {
        self.data_mut().token_id = Some(id);
        self
    }

    /// Replace all metadata entries.
    pub fn metadata(&mut self, entries: impl IntoIterator<Item = Vec<u8>>) -> &mut Self {
        self.data_mut().metadata = entries.into_iter().collect();
        self
    }
}

impl TokenMintData {
    pub fn token_id(&self) -> Option<TokenId> {
        self.token_id
    }

    pub fn metadata(&self) -> &[Vec<u8>] {
        &self.metadata
    }
}
