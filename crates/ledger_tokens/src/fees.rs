//! Custom token fees and their wire encoding.
//!
//! On the wire a fee is a protobuf-JSON shaped object carrying exactly one of
//! `fixedFee`, `fractionalFee` or `royaltyFee`, plus the collector account:
//!
//! ```json
//! {
//!   "fixedFee": { "amount": "5", "denominatingTokenId": "0.0.4001" },
//!   "feeCollectorAccountId": "0.0.98",
//!   "allCollectorsAreExempt": false
//! }
//! ```
//!
//! 64-bit integers are written as strings and accepted as either strings or
//! numbers.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{LedgerError, Result};
use crate::ids::{AccountId, TokenId};

/// A flat amount, in hbar-like base units or in units of another token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixedFee {
    pub amount: u64,
    pub denominating_token_id: Option<TokenId>,
}

/// A fraction of each transferred amount, clamped to `[minimum, maximum]`.
/// A maximum of zero means no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FractionalFee {
    pub numerator: u64,
    pub denominator: u64,
    pub minimum_amount: u64,
    pub maximum_amount: u64,
    pub net_of_transfers: bool,
}

/// A fraction of the value exchanged for an NFT, with an optional fixed fee
/// charged when nothing of value is exchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoyaltyFee {
    pub numerator: u64,
    pub denominator: u64,
    pub fallback_fee: Option<FixedFee>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Fee {
    Fixed(FixedFee),
    Fractional(FractionalFee),
    Royalty(RoyaltyFee),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomFee {
    pub fee: Fee,
    pub fee_collector_account_id: Option<AccountId>,
    pub all_collectors_are_exempt: bool,
}

impl CustomFee {
    /// Decode a single wire-encoded fee.
    pub fn from_wire(value: &Value) -> Result<Self> {
        let wire: CustomFeeWire = serde_json::from_value(value.clone())
            .map_err(|e| LedgerError::FeeDecode(e.to_string()))?;
        wire.try_into()
    }

    /// Encode into the wire form accepted by [`CustomFee::from_wire`].
    pub fn to_wire(&self) -> Result<Value> {
        Ok(serde_json::to_value(CustomFeeWire::from(self))?)
    }
}

/// Decode a fee schedule element-wise, failing on the first bad entry.
pub fn decode_custom_fees(values: &[Value]) -> Result<Vec<CustomFee>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            CustomFee::from_wire(value).map_err(|e| match e {
                LedgerError::FeeDecode(msg) => LedgerError::FeeDecode(format!("fee #{index}: {msg}")),
                other => other,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

fn de_int64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(u64),
        Str(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Num(n) => Ok(n),
        Repr::Str(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

fn ser_int64<S: Serializer>(value: &u64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomFeeWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fixed_fee: Option<FixedFeeWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fractional_fee: Option<FractionalFeeWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    royalty_fee: Option<RoyaltyFeeWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fee_collector_account_id: Option<AccountId>,
    #[serde(default)]
    all_collectors_are_exempt: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixedFeeWire {
    #[serde(deserialize_with = "de_int64", serialize_with = "ser_int64")]
    amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    denominating_token_id: Option<TokenId>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FractionWire {
    #[serde(deserialize_with = "de_int64", serialize_with = "ser_int64")]
    numerator: u64,
    #[serde(deserialize_with = "de_int64", serialize_with = "ser_int64")]
    denominator: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FractionalFeeWire {
    fractional_amount: FractionWire,
    #[serde(default, deserialize_with = "de_int64", serialize_with = "ser_int64")]
    minimum_amount: u64,
    #[serde(default, deserialize_with = "de_int64", serialize_with = "ser_int64")]
    maximum_amount: u64,
    #[serde(default)]
    net_of_transfers: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoyaltyFeeWire {
    exchange_value_fraction: FractionWire,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fallback_fee: Option<FixedFeeWire>,
}

fn check_fraction(fraction: &FractionWire) -> Result<()> {
    if fraction.denominator == 0 {
        return Err(LedgerError::FeeDecode("fraction denominator is zero".into()));
    }
    Ok(())
}

impl From<FixedFeeWire> for FixedFee {
    fn from(wire: FixedFeeWire) -> Self {
        Self {
            amount: wire.amount,
            denominating_token_id: wire.denominating_token_id,
        }
    }
}

impl From<&FixedFee> for FixedFeeWire {
    fn from(fee: &FixedFee) -> Self {
        Self {
            amount: fee.amount,
            denominating_token_id: fee.denominating_token_id,
        }
    }
}

impl TryFrom<CustomFeeWire> for CustomFee {
    type Error = LedgerError;

    fn try_from(wire: CustomFeeWire) -> Result<Self> {
        let fee = match (wire.fixed_fee, wire.fractional_fee, wire.royalty_fee) {
            (Some(fixed), None, None) => Fee::Fixed(fixed.into()),
            (None, Some(fractional), None) => {
                check_fraction(&fractional.fractional_amount)?;
                if fractional.maximum_amount != 0
                    && fractional.minimum_amount > fractional.maximum_amount
                {
                    return Err(LedgerError::FeeDecode(
                        "fractional fee minimum exceeds maximum".into(),
                    ));
                }
                Fee::Fractional(FractionalFee {
                    numerator: fractional.fractional_amount.numerator,
                    denominator: fractional.fractional_amount.denominator,
                    minimum_amount: fractional.minimum_amount,
                    maximum_amount: fractional.maximum_amount,
                    net_of_transfers: fractional.net_of_transfers,
                })
            }
            (None, None, Some(royalty)) => {
                check_fraction(&royalty.exchange_value_fraction)?;
                Fee::Royalty(RoyaltyFee {
                    numerator: royalty.exchange_value_fraction.numerator,
                    denominator: royalty.exchange_value_fraction.denominator,
                    fallback_fee: royalty.fallback_fee.map(FixedFee::from),
                })
            }
            (None, None, None) => {
                return Err(LedgerError::FeeDecode("no fee kind present".into()));
            }
            _ => {
                return Err(LedgerError::FeeDecode("more than one fee kind present".into()));
            }
        };

        Ok(Self {
            fee,
            fee_collector_account_id: wire.fee_collector_account_id,
            all_collectors_are_exempt: wire.all_collectors_are_exempt,
        })
    }
}

impl From<&CustomFee> for CustomFeeWire {
    fn from(custom: &CustomFee) -> Self {
        let mut wire = Self {
            fixed_fee: None,
            fractional_fee: None,
            royalty_fee: None,
            fee_collector_account_id: custom.fee_collector_account_id,
            all_collectors_are_exempt: custom.all_collectors_are_exempt,
        };
        match &custom.fee {
            Fee::Fixed(fixed) => wire.fixed_fee = Some(fixed.into()),
            Fee::Fractional(fractional) => {
                wire.fractional_fee = Some(FractionalFeeWire {
                    fractional_amount: FractionWire {
                        numerator: fractional.numerator,
                        denominator: fractional.denominator,
                    },
                    minimum_amount: fractional.minimum_amount,
                    maximum_amount: fractional.maximum_amount,
                    net_of_transfers: fractional.net_of_transfers,
                })
            }
            Fee::Royalty(royalty) => {
                wire.royalty_fee = Some(RoyaltyFeeWire {
                    exchange_value_fraction: FractionWire {
                        numerator: royalty.numerator,
                        denominator: royalty.denominator,
                    },
                    fallback_fee: royalty.fallback_fee.as_ref().map(FixedFeeWire::from),
                })
            }
        }
        wire
    }
}
