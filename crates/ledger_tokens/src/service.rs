//! Token operations: associate, mint and create.
//!
//! Each operation builds one transaction, freezes it against the caller's
//! client, signs, submits and waits for the receipt. Nothing is retried and
//! client or resolver failures are returned as-is.
//!
//! Token creation populates its descriptor in three phases:
//!
//! 1. required properties: name, symbol, treasury, supply key, token type and
//!    supply type, with the default identity standing in for a missing
//!    treasury or supply key;
//! 2. key properties: admin, KYC, freeze, pause, wipe and fee-schedule keys,
//!    set only when configured;
//! 3. optional properties, set only when configured.

use std::sync::Arc;
use std::time::Duration;

use ledger_core::LedgerConfig;
use tracing::{debug, info};

use crate::client::{LedgerClient, TransactionReceipt};
use crate::error::{LedgerError, Result};
use crate::fees::decode_custom_fees;
use crate::identity::Identity;
use crate::ids::{AccountId, TokenId};
use crate::key_store::KeyStore;
use crate::keys::{KeyCurve, PrivateKey, PublicKey};
use crate::properties::{TokenProperties, parse_expiration};
use crate::resolver::{InlineKeyResolver, KeyRef, KeyResolver, KeyStoreResolver};
use crate::transaction::{
    TokenAssociateTransaction, TokenCreateTransaction, TokenMintTransaction, TokenSupplyType,
    TokenType,
};

/// Inline admin keys are always read on this curve.
const ADMIN_KEY_CURVE: KeyCurve = KeyCurve::EcdsaSecp256k1;

type KeySetter = fn(&mut TokenCreateTransaction, PublicKey) -> &mut TokenCreateTransaction;

/// Apply `set` to the value if there is one.
fn set_if_present<T>(value: Option<T>, set: impl FnOnce(T)) {
    if let Some(value) = value {
        set(value);
    }
}

/// Stateless apart from its injected collaborators; safe to share between
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct TokenService<R> {
    default_identity: Identity,
    resolver: R,
    default_curve: KeyCurve,
}

impl TokenService<Arc<dyn KeyResolver>> {
    /// Build a service from process configuration. References resolve through
    /// the configured key store, which then requires `key_store_password`;
    /// without a store only inline keys are accepted.
    pub fn from_config(config: &LedgerConfig, key_store_password: Option<&str>) -> Result<Self> {
        let identity = Identity::from_config(config)?;
        let curve: KeyCurve = config.key_curve.parse()?;
        let resolver: Arc<dyn KeyResolver> = match (&config.key_store_path, key_store_password) {
            (Some(path), Some(password)) => Arc::new(KeyStoreResolver::new(
                KeyStore::load_from_file(path)?,
                password,
            )),
            (Some(path), None) => {
                return Err(LedgerError::Config(format!(
                    "key store {} needs a password",
                    path.display()
                )));
            }
            (None, _) => Arc::new(InlineKeyResolver),
        };
        Ok(Self::new(identity, resolver).with_default_curve(curve))
    }
}

impl<R: KeyResolver> TokenService<R> {
    pub fn new(default_identity: Identity, resolver: R) -> Self {
        Self {
            default_identity,
            resolver,
            default_curve: KeyCurve::Ed25519,
        }
    }

    /// Curve used for inline raw keys other than the admin key.
    pub fn with_default_curve(mut self, curve: KeyCurve) -> Self {
        self.default_curve = curve;
        self
    }

    pub fn default_identity(&self) -> &Identity {
        &self.default_identity
    }

    /// Associate `account_id` with every token in `token_ids`, signing with the
    /// account's key. An empty token list is rejected before anything is
    /// submitted.
    pub async fn associate_tokens<C>(
        &self,
        account_id: AccountId,
        token_ids: &[TokenId],
        account_key: &PrivateKey,
        client: &C,
    ) -> Result<()>
    where
        C: LedgerClient + ?Sized,
    {
        if token_ids.is_empty() {
            return Err(LedgerError::EmptyTokenList);
        }

        let mut tx = TokenAssociateTransaction::new();
        tx.account_id(account_id).token_ids(token_ids.iter().copied());

        let mut frozen = tx.freeze_with(client)?;
        frozen.sign(account_key);
        frozen.execute(client).await?.get_receipt(client).await?;

        info!(account_id = %account_id, tokens = token_ids.len(), "account associated with tokens");
        Ok(())
    }

    /// Mint one unit carrying `metadata` (as UTF-8 bytes) and return the
    /// receipt, which holds any assigned serial numbers.
    pub async fn mint_token<C>(
        &self,
        token_id: TokenId,
        metadata: &str,
        supply_key: &PrivateKey,
        client: &C,
    ) -> Result<TransactionReceipt>
    where
        C: LedgerClient + ?Sized,
    {
        let mut tx = TokenMintTransaction::new();
        tx.token_id(token_id).metadata([metadata.as_bytes().to_vec()]);

        let mut frozen = tx.freeze_with(client)?;
        frozen.sign(supply_key);
        let receipt = frozen.execute(client).await?.get_receipt(client).await?;

        info!(token_id = %token_id, serials = ?receipt.serial_numbers, "token minted");
        Ok(receipt)
    }

    /// Create a token from `properties` and return its new identifier.
    ///
    /// With an admin key configured the transaction is signed by the admin key
    /// and then by the client's operator; otherwise by the operator alone.
    pub async fn create_token<C>(&self, properties: &TokenProperties, client: &C) -> Result<TokenId>
    where
        C: LedgerClient + ?Sized,
    {
        let (tx, admin_key) = self.build_create_transaction(properties).await?;

        let mut frozen = tx.freeze_with(client)?;
        if let Some(admin_key) = &admin_key {
            frozen.sign(admin_key);
        }
        frozen.sign_with_operator(client)?;

        let receipt = frozen.execute(client).await?.get_receipt(client).await?;
        let token_id = receipt
            .token_id
            .ok_or(LedgerError::MissingReceiptField("token_id"))?;

        info!(
            token_id = %token_id,
            name = %properties.token_name,
            symbol = %properties.token_symbol,
            "token created"
        );
        Ok(token_id)
    }

    /// Populate a create descriptor. Also returns the resolved admin key, if
    /// any, so it is resolved only once.
    pub(crate) async fn build_create_transaction(
        &self,
        properties: &TokenProperties,
    ) -> Result<(TokenCreateTransaction, Option<PrivateKey>)> {
        let mut tx = TokenCreateTransaction::new();
        self.apply_required_properties(&mut tx, properties).await?;
        let admin_key = self.apply_key_properties(&mut tx, properties).await?;
        apply_optional_properties(&mut tx, properties)?;
        Ok((tx, admin_key))
    }

    async fn resolve(&self, key: &KeyRef) -> Result<PrivateKey> {
        self.resolver.resolve(key, self.default_curve).await
    }

    async fn apply_required_properties(
        &self,
        tx: &mut TokenCreateTransaction,
        properties: &TokenProperties,
    ) -> Result<()> {
        let default_account = self.default_identity.account_id;

        let treasury = match &properties.treasury_key {
            Some(key) => self
                .resolve(key)
                .await?
                .public_key()
                .to_account_id(default_account.shard, default_account.realm),
            None => default_account,
        };
        let supply_key = match &properties.supply_key {
            Some(key) => self.resolve(key).await?.public_key(),
            None => self.default_identity.public_key(),
        };

        tx.token_name(properties.token_name.as_str())
            .token_symbol(properties.token_symbol.as_str())
            .treasury_account_id(treasury)
            .supply_key(supply_key);

        let non_fungible = properties
            .token_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(TokenType::NonFungibleUnique.as_str()));
        if non_fungible {
            // NFTs are minted individually after creation.
            tx.token_type(TokenType::NonFungibleUnique).initial_supply(0);
        } else {
            tx.token_type(TokenType::FungibleCommon)
                .initial_supply(properties.initial_supply.unwrap_or(0));
        }

        let finite = properties
            .supply_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(TokenSupplyType::Finite.as_str()));
        tx.token_supply_type(if finite {
            TokenSupplyType::Finite
        } else {
            TokenSupplyType::Infinite
        });

        debug!(
            treasury = %treasury,
            token_type = tx.get_token_type().as_str(),
            supply_type = tx.get_token_supply_type().as_str(),
            initial_supply = tx.get_initial_supply(),
            "required token properties applied"
        );
        Ok(())
    }

    async fn apply_key_properties(
        &self,
        tx: &mut TokenCreateTransaction,
        properties: &TokenProperties,
    ) -> Result<Option<PrivateKey>> {
        let admin_key = match &properties.admin_key {
            Some(key) => {
                let admin = self.resolver.resolve(key, ADMIN_KEY_CURVE).await?;
                tx.admin_key(admin.public_key());
                Some(admin)
            }
            None => None,
        };

        let capability_keys: [(Option<&KeyRef>, KeySetter); 5] = [
            (properties.kyc_key.as_ref(), TokenCreateTransaction::kyc_key),
            (properties.freeze_key.as_ref(), TokenCreateTransaction::freeze_key),
            (properties.pause_key.as_ref(), TokenCreateTransaction::pause_key),
            (properties.wipe_key.as_ref(), TokenCreateTransaction::wipe_key),
            (
                properties.fee_schedule_key.as_ref(),
                TokenCreateTransaction::fee_schedule_key,
            ),
        ];
        for (key, set) in capability_keys {
            if let Some(key) = key {
                set(tx, self.resolve(key).await?.public_key());
            }
        }

        Ok(admin_key)
    }
}

fn apply_optional_properties(
    tx: &mut TokenCreateTransaction,
    properties: &TokenProperties,
) -> Result<()> {
    let expiration = properties
        .expiration_time
        .as_deref()
        .map(parse_expiration)
        .transpose()?;
    let custom_fees = properties
        .custom_fees
        .as_deref()
        .map(decode_custom_fees)
        .transpose()?;

    set_if_present(properties.max_supply, |max| {
        tx.max_supply(max);
    });
    set_if_present(properties.decimals, |decimals| {
        tx.decimals(decimals);
    });
    set_if_present(properties.freeze_default, |frozen| {
        tx.freeze_default(frozen);
    });
    set_if_present(properties.auto_renew_account_id, |account| {
        tx.auto_renew_account_id(account);
    });
    set_if_present(expiration, |at| {
        tx.expiration_time(at);
    });
    set_if_present(properties.auto_renew_period, |secs| {
        tx.auto_renew_period(Duration::from_secs(secs));
    });
    set_if_present(properties.token_memo.as_deref(), |memo| {
        tx.token_memo(memo);
    });
    set_if_present(custom_fees, |fees| {
        tx.custom_fees(fees);
    });
    Ok(())
}
