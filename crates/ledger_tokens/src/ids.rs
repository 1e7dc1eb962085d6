use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{LedgerError, Result};
use crate::keys::PublicKey;

fn id_error(input: &str, reason: impl Into<String>) -> LedgerError {
    LedgerError::IdParse {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Split `shard.realm.rest` into its three components.
fn split_entity(s: &str) -> Result<(u64, u64, &str)> {
    let mut parts = s.trim().splitn(3, '.');
    let (Some(shard), Some(realm), Some(rest)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(id_error(s, "expected `shard.realm.num`"));
    };
    let shard = shard.parse().map_err(|_| id_error(s, "shard is not a number"))?;
    let realm = realm.parse().map_err(|_| id_error(s, "realm is not a number"))?;
    Ok((shard, realm, rest))
}

/// Implements string-based serde for a type with `Display` + `FromStr`.
macro_rules! serde_as_string {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// A ledger account: either numbered (`0.0.1001`) or a public-key alias
/// (`0.0.302a30...`) that the ledger maps to an account on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
    pub alias: Option<PublicKey>,
}

impl AccountId {
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self {
            shard,
            realm,
            num,
            alias: None,
        }
    }

    pub fn from_alias(shard: u64, realm: u64, alias: PublicKey) -> Self {
        Self {
            shard,
            realm,
            num: 0,
            alias: Some(alias),
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{}.{}.{}", self.shard, self.realm, alias),
            None => write!(f, "{}.{}.{}", self.shard, self.realm, self.num),
        }
    }
}

impl FromStr for AccountId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let (shard, realm, rest) = split_entity(s)?;
        if let Ok(num) = rest.parse::<u64>() {
            return Ok(Self::new(shard, realm, num));
        }
        let alias: PublicKey = rest
            .parse()
            .map_err(|_| id_error(s, "neither an account number nor a key alias"))?;
        Ok(Self::from_alias(shard, realm, alias))
    }
}

serde_as_string!(AccountId);

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl TokenId {
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for TokenId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let (shard, realm, rest) = split_entity(s)?;
        let num = rest
            .parse()
            .map_err(|_| id_error(s, "token number is not a number"))?;
        Ok(Self::new(shard, realm, num))
    }
}

serde_as_string!(TokenId);

// ---------------------------------------------------------------------------
// TransactionId
// ---------------------------------------------------------------------------

/// Payer account plus the instant the transaction becomes valid,
/// rendered as `0.0.1001@1700000000.000000042`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId {
    pub account_id: AccountId,
    pub valid_start: DateTime<Utc>,
}

impl TransactionId {
    /// A new id for `account_id`, valid from now.
    pub fn generate(account_id: AccountId) -> Self {
        Self {
            account_id,
            valid_start: Utc::now(),
        }
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}.{:09}",
            self.account_id,
            self.valid_start.timestamp(),
            self.valid_start.timestamp_subsec_nanos()
        )
    }
}

impl FromStr for TransactionId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let (account, timestamp) = s
            .split_once('@')
            .ok_or_else(|| id_error(s, "expected `account@seconds.nanos`"))?;
        let (secs, nanos) = timestamp
            .split_once('.')
            .ok_or_else(|| id_error(s, "expected `seconds.nanos`"))?;
        let secs: i64 = secs.parse().map_err(|_| id_error(s, "invalid seconds"))?;
        let nanos = parse_fraction_nanos(nanos).ok_or_else(|| id_error(s, "invalid nanos"))?;
        let valid_start = DateTime::from_timestamp(secs, nanos)
            .ok_or_else(|| id_error(s, "timestamp out of range"))?;

        Ok(Self {
            account_id: account.parse()?,
            valid_start,
        })
    }
}

serde_as_string!(TransactionId);

/// Reads the digits after the decimal point as a fraction of a second, so
/// `5` is half a second and `000000005` is five nanoseconds.
fn parse_fraction_nanos(fraction: &str) -> Option<u32> {
    let digits_ok = !fraction.is_empty() && fraction.bytes().all(|b| b.is_ascii_digit());
    if !digits_ok || fraction.len() > 9 {
        return None;
    }
    format!("{fraction:0<9}").parse().ok()
}
