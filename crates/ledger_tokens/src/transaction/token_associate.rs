use serde::Serialize;

use super::{AnyTransactionData, Transaction};
use crate::ids::{AccountId, TokenId};

/// Associates an account with tokens so it can hold them. Must be signed by
/// the account's key.
pub type TokenAssociateTransaction = Transaction<TokenAssociateData>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenAssociateData {
    account_id: Option<AccountId>,
    token_ids: Vec<TokenId>,
}

impl From<TokenAssociateData> for AnyTransactionData {
    fn from(data: TokenAssociateData) -> Self {
        Self::TokenAssociate(data)
    }
}

impl TokenAssociateTransaction {
    pub fn account_id(&mut self, id: AccountId) -> &mut Self {
        self.data_mut().account_id = Some(id);
        self
    }

    pub fn token_ids(&mut self, ids: impl IntoIterator<Item = TokenId>) -> &mut Self {
        self.data_mut().token_ids = ids.into_iter().collect();
        self
    }
}

impl TokenAssociateData {
    pub fn account_id(&self) -> Option<AccountId> {
        self.account_id
    }

    pub fn token_ids(&self) -> &[TokenId] {
        &self.token_ids
    }
}
