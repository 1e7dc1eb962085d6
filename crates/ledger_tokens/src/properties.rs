use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LedgerError, Result};
use crate::ids::AccountId;
use crate::resolver::KeyRef;

/// Description of a token to create, as read from configuration.
///
/// Only `tokenName` and `tokenSymbol` are required. Absent keys leave the
/// matching capability disabled; absent optional fields are not set on the
/// transaction at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenProperties {
    pub token_name: String,
    pub token_symbol: String,
    /// `FUNGIBLE_COMMON` (default) or `NON_FUNGIBLE_UNIQUE`.
    pub token_type: Option<String>,
    /// `FINITE`, anything else (or nothing) means infinite.
    pub supply_type: Option<String>,
    pub initial_supply: Option<u64>,
    pub decimals: Option<u32>,
    pub max_supply: Option<u64>,

    pub treasury_key: Option<KeyRef>,
    pub supply_key: Option<KeyRef>,
    pub admin_key: Option<KeyRef>,
    pub kyc_key: Option<KeyRef>,
    pub freeze_key: Option<KeyRef>,
    pub pause_key: Option<KeyRef>,
    pub wipe_key: Option<KeyRef>,
    pub fee_schedule_key: Option<KeyRef>,

    pub freeze_default: Option<bool>,
    pub auto_renew_account_id: Option<AccountId>,
    /// RFC 3339 timestamp or `YYYY-MM-DD` (midnight UTC).
    pub expiration_time: Option<String>,
    /// Seconds.
    pub auto_renew_period: Option<u64>,
    pub token_memo: Option<String>,
    /// Wire-encoded custom fees, see [`crate::fees`].
    pub custom_fees: Option<Vec<Value>>,
}

impl TokenProperties {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            token_name: name.into(),
            token_symbol: symbol.into(),
            ..Default::default()
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Parse a configured expiration date.
pub fn parse_expiration(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .ok_or_else(|| LedgerError::InvalidTimestamp(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_scenario() {
        let props: TokenProperties = serde_json::from_str(
            r#"{
                "tokenName": "Foo",
                "tokenSymbol": "FOO",
                "tokenType": "FUNGIBLE_COMMON",
                "initialSupply": 100
            }"#,
        )
        .unwrap();

        assert_eq!(props.token_name, "Foo");
        assert_eq!(props.initial_supply, Some(100));
        assert!(props.supply_type.is_none());
        assert!(props.admin_key.is_none());
        assert!(props.custom_fees.is_none());
    }

    #[test]
    fn deserializes_keys_and_optionals() {
        let props: TokenProperties = serde_json::from_str(
            r#"{
                "tokenName": "Bar",
                "tokenSymbol": "BAR",
                "adminKey": { "ref": "admin" },
                "kycKey": "0xabcdef",
                "autoRenewAccountId": "0.0.1234",
                "autoRenewPeriod": 7776000,
                "customFees": [{ "fixedFee": { "amount": "1" } }]
            }"#,
        )
        .unwrap();

        assert_eq!(props.admin_key, Some(KeyRef::named("admin")));
        assert_eq!(props.kyc_key, Some(KeyRef::Inline("0xabcdef".into())));
        assert_eq!(props.auto_renew_account_id, Some(AccountId::new(0, 0, 1234)));
        assert_eq!(props.auto_renew_period, Some(7_776_000));
        assert_eq!(props.custom_fees.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn missing_name_is_rejected() {
        assert!(serde_json::from_str::<TokenProperties>(r#"{ "tokenSymbol": "X" }"#).is_err());
    }

    #[test]
    fn load_from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, r#"{ "tokenName": "Foo", "tokenSymbol": "FOO" }"#).unwrap();

        let props = TokenProperties::load_from_file(&path).unwrap();
        assert_eq!(props, TokenProperties::new("Foo", "FOO"));
    }

    #[test]
    fn parses_expiration_formats() {
        let rfc = parse_expiration("2030-01-02T03:04:05Z").unwrap();
        assert_eq!(rfc.timestamp(), 1_893_553_445);

        let offset = parse_expiration("2030-01-02T05:04:05+02:00").unwrap();
        assert_eq!(offset, rfc);

        let date = parse_expiration("2030-01-02").unwrap();
        assert_eq!(date.to_rfc3339(), "2030-01-02T00:00:00+00:00");

        assert!(matches!(
            parse_expiration("next tuesday"),
            Err(LedgerError::InvalidTimestamp(_))
        ));
    }
}
