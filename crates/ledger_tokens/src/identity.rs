use ledger_core::LedgerConfig;

use crate::error::{LedgerError, Result};
use crate::ids::AccountId;
use crate::keys::{KeyCurve, PrivateKey, PublicKey};

/// An account together with the key that controls it.
///
/// Used both as a client's operator and as the default identity a
/// [`TokenService`](crate::service::TokenService) falls back to for treasury
/// and supply roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: AccountId,
    pub private_key: PrivateKey,
}

impl Identity {
    pub fn new(account_id: AccountId, private_key: PrivateKey) -> Self {
        Self {
            account_id,
            private_key,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.private_key.public_key()
    }

    /// Build the operator identity from process configuration.
    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        let account_id: AccountId = config
            .operator_id
            .as_deref()
            .ok_or_else(|| LedgerError::Config("operator account id is not set".into()))?
            .parse()?;
        let raw_key = config
            .operator_key
            .as_deref()
            .ok_or_else(|| LedgerError::Config("operator key is not set".into()))?;
        let curve: KeyCurve = config.key_curve.parse()?;
        let private_key = PrivateKey::from_str_with_curve(raw_key, curve)?;

        Ok(Self::new(account_id, private_key))
    }
}
