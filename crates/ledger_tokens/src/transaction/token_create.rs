use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AnyTransactionData, Transaction};
use crate::fees::CustomFee;
use crate::ids::AccountId;
use crate::keys::PublicKey;

/// Whether units of a token are interchangeable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    #[default]
    FungibleCommon,
    NonFungibleUnique,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::FungibleCommon => "FUNGIBLE_COMMON",
            TokenType::NonFungibleUnique => "NON_FUNGIBLE_UNIQUE",
        }
    }
}

/// Whether total supply is capped by `max_supply`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenSupplyType {
    #[default]
    Infinite,
    Finite,
}

impl TokenSupplyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSupplyType::Infinite => "INFINITE",
            TokenSupplyType::Finite => "FINITE",
        }
    }
}

/// Creates a new token. Keys left unset disable the matching capability
/// for the lifetime of the token.
pub type TokenCreateTransaction = Transaction<TokenCreateData>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenCreateData {
    name: String,
    symbol: String,
    decimals: Option<u32>,
    initial_supply: u64,
    treasury_account_id: Option<AccountId>,
    admin_key: Option<PublicKey>,
    kyc_key: Option<PublicKey>,
    freeze_key: Option<PublicKey>,
    wipe_key: Option<PublicKey>,
    supply_key: Option<PublicKey>,
    fee_schedule_key: Option<PublicKey>,
    pause_key: Option<PublicKey>,
    freeze_default: Option<bool>,
    expiration_time: Option<DateTime<Utc>>,
    auto_renew_account_id: Option<AccountId>,
    auto_renew_period: Option<Duration>,
    token_memo: Option<String>,
    token_type: TokenType,
    token_supply_type: TokenSupplyType,
    max_supply: Option<u64>,
    custom_fees: Option<Vec<CustomFee>>,
}

impl From<TokenCreateData> for AnyTransactionData {
    fn from(data: TokenCreateData) -> Self {
        Self::TokenCreate(data)
    }
}

impl TokenCreateTransaction {
    pub fn get_token_name(&self) -> &str {
        &self.data().name
    }

    pub fn token_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.data_mut().name = name.into();
        self
    }

    pub fn get_token_symbol(&self) -> &str {
        &self.data().symbol
    }

    pub fn token_symbol(&mut self, symbol: impl Into<String>) -> &mut Self {
        self.data_mut().symbol = symbol.into();
        self
    }

    pub fn get_decimals(&self) -> Option<u32> {
        self.data().decimals
    }

    pub fn decimals(&mut self, decimals: u32) -> &mut Self {
        self.data_mut().decimals = Some(decimals);
        self
    }

    pub fn get_initial_supply(&self) -> u64 {
        self.data().initial_supply
    }

    pub fn initial_supply(&mut self, supply: u64) -> &mut Self {
        self.data_mut().initial_supply = supply;
        self
    }

    pub fn get_treasury_account_id(&self) -> Option<AccountId> {
        self.data().treasury_account_id
    }

    pub fn treasury_account_id(&mut self, id: AccountId) -> &mut Self {
        self.data_mut().treasury_account_id = Some(id);
        self
    }

    pub fn get_admin_key(&self) -> Option<PublicKey> {
        self.data().admin_key
    }

    pub fn admin_key(&mut self, key: PublicKey) -> &mut Self {
        self.data_mut().admin_key = Some(key);
        self
    }

    pub fn get_kyc_key(&self) -> Option<PublicKey> {
        self.data().kyc_key
    }

    pub fn kyc_key(&mut self, key: PublicKey) -> &mut Self {
        self.data_mut().kyc_key = Some(key);
        self
    }

    pub fn get_freeze_key(&self) -> Option<PublicKey> {
        self.data().freeze_key
    }

    pub fn freeze_key(&mut self, key: PublicKey) -> &mut Self {
        self.data_mut().freeze_key = Some(key);
        self
    }

    pub fn get_wipe_key(&self) -> Option<PublicKey> {
        self.data().wipe_key
    }

    pub fn wipe_key(&mut self, key: PublicKey) -> &mut Self {
        self.data_mut().wipe_key = Some(key);
        self
    }

    pub fn get_supply_key(&self) -> Option<PublicKey> {
        self.data().supply_key
    }

    pub fn supply_key(&mut self, key: PublicKey) -> &mut Self {
        self.data_mut().supply_key = Some(key);
        self
    }

    pub fn get_fee_schedule_key(&self) -> Option<PublicKey> {
        self.data().fee_schedule_key
    }

    pub fn fee_schedule_key(&mut self, key: PublicKey) -> &mut Self {
        self.data_mut().fee_schedule_key = Some(key);
        self
    }

    pub fn get_pause_key(&self) -> Option<PublicKey> {
        self.data().pause_key
    }

    pub fn pause_key(&mut self, key: PublicKey) -> &mut Self {
        self.data_mut().pause_key = Some(key);
        self
    }

    pub fn get_freeze_default(&self) -> Option<bool> {
        self.data().freeze_default
    }

    pub fn freeze_default(&mut self, frozen: bool) -> &mut Self {
        self.data_mut().freeze_default = Some(frozen);
        self
    }

    pub fn get_expiration_time(&self) -> Option<DateTime<Utc>> {
        self.data().expiration_time
    }

    pub fn expiration_time(&mut self, at: DateTime<Utc>) -> &mut Self {
        self.data_mut().expiration_time = Some(at);
        self
    }

    pub fn get_auto_renew_account_id(&self) -> Option<AccountId> {
        self.data().auto_renew_account_id
    }

    pub fn auto_renew_account_id(&mut self, id: AccountId) -> &mut Self {
        self.data_mut().auto_renew_account_id = Some(id);
        self
    }

    pub fn get_auto_renew_period(&self) -> Option<Duration> {
        self.data().auto_renew_period
    }

    pub fn auto_renew_period(&mut self, period: Duration) -> &mut Self {
        self.data_mut().auto_renew_period = Some(period);
        self
    }

    pub fn get_token_memo(&self) -> Option<&str> {
        self.data().token_memo.as_deref()
    }

    pub fn token_memo(&mut self, memo: impl Into<String>) -> &mut Self {
        self.data_mut().token_memo = Some(memo.into());
        self
    }

    pub fn get_token_type(&self) -> TokenType {
        self.data().token_type
    }

    pub fn token_type(&mut self, token_type: TokenType) -> &mut Self {
        self.data_mut().token_type = token_type;
        self
    }

    pub fn get_token_supply_type(&self) -> TokenSupplyType {
        self.data().token_supply_type
    }

    pub fn token_supply_type(&mut self, supply_type: TokenSupplyType) -> &mut Self {
        self.data_mut().token_supply_type = supply_type;
        self
    }

    pub fn get_max_supply(&self) -> Option<u64> {
        self.data().max_supply
    }

    pub fn max_supply(&mut self, max: u64) -> &mut Self {
        self.data_mut().max_supply = Some(max);
        self
    }

    pub fn get_custom_fees(&self) -> Option<&[CustomFee]> {
        self.data().custom_fees.as_deref()
    }

    pub fn custom_fees(&mut self, fees: impl IntoIterator<Item = CustomFee>) -> &mut Self {
        self.data_mut().custom_fees = Some(fees.into_iter().collect());
        self
    }
}

impl TokenCreateData {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn initial_supply(&self) -> u64 {
        self.initial_supply
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn token_supply_type(&self) -> TokenSupplyType {
        self.token_supply_type
    }

    pub fn treasury_account_id(&self) -> Option<AccountId> {
        self.treasury_account_id
    }

    pub fn admin_key(&self) -> Option<PublicKey> {
        self.admin_key
    }

    pub fn supply_key(&self) -> Option<PublicKey> {
        self.supply_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transaction_has_ledger_defaults() {
        let tx = TokenCreateTransaction::new();
        assert_eq!(tx.get_token_type(), TokenType::FungibleCommon);
        assert_eq!(tx.get_token_supply_type(), TokenSupplyType::Infinite);
        assert_eq!(tx.get_initial_supply(), 0);
        assert!(tx.get_treasury_account_id().is_none());
        assert!(tx.get_custom_fees().is_none());
    }

    #[test]
    fn setters_chain() {
        let mut tx = TokenCreateTransaction::new();
        tx.token_name("Foo")
            .token_symbol("FOO")
            .decimals(2)
            .max_supply(1_000)
            .token_supply_type(TokenSupplyType::Finite);

        assert_eq!(tx.get_token_name(), "Foo");
        assert_eq!(tx.get_token_symbol(), "FOO");
        assert_eq!(tx.get_decimals(), Some(2));
        assert_eq!(tx.get_max_supply(), Some(1_000));
        assert_eq!(tx.get_token_supply_type(), TokenSupplyType::Finite);
    }

    #[test]
    fn token_type_serializes_as_ledger_name() {
        let json = serde_json::to_string(&TokenType::NonFungibleUnique).unwrap();
        assert_eq!(json, format!("\"{}\"", TokenType::NonFungibleUnique.as_str()));
    }
}
