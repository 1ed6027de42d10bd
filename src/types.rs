use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::SummaryError;

// Amounts cross the serialization boundary as decimal strings, never as
// JSON numbers, so arbitrary-precision values survive untouched.
pub fn serialize_bigint<S>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

/// One participant's effect in a transaction
///
/// Several entries may share an address (multi-input/multi-output UTXO
/// transactions); aggregation happens in the composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressAmount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(serialize_with = "serialize_bigint")]
    pub amount: BigInt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utxo: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elementary_units: Option<u32>,
}

impl AddressAmount {
    pub fn new(address: Option<String>, amount: BigInt) -> Self {
        Self {
            address,
            amount,
            utxo: None,
            elementary_units: None,
        }
    }

    pub fn with_utxo(mut self, utxo: u32) -> Self {
        self.utxo = Some(utxo);
        self
    }

    pub fn with_elementary_units(mut self, decimals: u32) -> Self {
        self.elementary_units = Some(decimals);
        self
    }

    pub fn zero_for(address: Option<String>) -> Self {
        Self::new(address, BigInt::zero())
    }

    pub fn has_address(&self, address: &str) -> bool {
        self.address.as_deref() == Some(address)
    }
}

/// Sum of all entries belonging to `address`
pub fn total_for_address(entries: &[AddressAmount], address: &str) -> BigInt {
    entries
        .iter()
        .filter(|e| e.has_address(address))
        .fold(BigInt::zero(), |acc, e| acc + &e.amount)
}

pub fn total_amount(entries: &[AddressAmount]) -> BigInt {
    entries.iter().fold(BigInt::zero(), |acc, e| acc + &e.amount)
}

/// Outcome of a transaction on-chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionSuccessStatus {
    Success,
    SenderFailure,
    ReceiverFailure,
}

impl TransactionSuccessStatus {
    /// Numeric code used in attestation responses
    pub fn code(&self) -> u8 {
        match self {
            TransactionSuccessStatus::Success => 0,
            TransactionSuccessStatus::SenderFailure => 1,
            TransactionSuccessStatus::ReceiverFailure => 2,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransactionSuccessStatus::Success)
    }
}

/// Reconciliation family of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFamily {
    /// vin/vout model: BTC, DOGE, LTC
    Utxo,
    /// Account ledger with before/after balance diffs: XRP
    LedgerDiff,
    /// Account chain with one sender and one receiver per payment: ALGO
    AccountSingle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChainType {
    Btc,
    Doge,
    Ltc,
    Xrp,
    Algo,
}

impl ChainType {
    pub fn family(&self) -> ChainFamily {
        match self {
            ChainType::Btc | ChainType::Doge | ChainType::Ltc => ChainFamily::Utxo,
            ChainType::Xrp => ChainFamily::LedgerDiff,
            ChainType::Algo => ChainFamily::AccountSingle,
        }
    }

    /// Decimal places between the display unit and the elementary unit
    pub fn elementary_unit_exponent(&self) -> u32 {
        match self {
            ChainType::Btc | ChainType::Doge | ChainType::Ltc => 8,
            ChainType::Xrp | ChainType::Algo => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainType::Btc => "BTC",
            ChainType::Doge => "DOGE",
            ChainType::Ltc => "LTC",
            ChainType::Xrp => "XRP",
            ChainType::Algo => "ALGO",
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChainType {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BTC" => Ok(ChainType::Btc),
            "DOGE" => Ok(ChainType::Doge),
            "LTC" => Ok(ChainType::Ltc),
            "XRP" => Ok(ChainType::Xrp),
            "ALGO" => Ok(ChainType::Algo),
            other => Err(SummaryError::UnsupportedChain(other.to_string())),
        }
    }
}
