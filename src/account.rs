/// Account-Single Reconciliation (ALGO)
///
/// Indexer transaction records. A payment moves funds from exactly one
/// sender to one receiver; closing an account adds a second receiver for the
/// remainder. Only confirmed transactions are served by the indexer, so the
/// outcome is always success and intended amounts equal actual ones.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SummaryError};
use crate::hashing::{standardize_reference, Bytes32};
use crate::transaction::Transaction;
use crate::types::{AddressAmount, ChainType, TransactionSuccessStatus};
use crate::units::json_to_integer_amount;

const PAY: &str = "pay";

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentFields {
    pub receiver: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(rename = "close-remainder-to", default)]
    pub close_remainder_to: Option<String>,
    #[serde(rename = "close-amount", default)]
    pub close_amount: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    pub sender: Option<String>,
    pub fee: Value,
    #[serde(rename = "tx-type", default)]
    pub tx_type: String,
    #[serde(rename = "round-time", default)]
    pub round_time: Option<u64>,
    /// Base64 encoded note field
    #[serde(default)]
    pub note: Option<String>,
    #[serde(rename = "payment-transaction", default)]
    pub payment: Option<PaymentFields>,
}

#[derive(Debug, Clone)]
pub struct AccountTransaction {
    chain: ChainType,
    data: AccountRecord,
}

impl AccountTransaction {
    /// Accepts the bare record or the indexer's `{ "transaction": ... }` envelope
    pub fn from_value(chain: ChainType, value: Value) -> Result<Self> {
        let value = match value {
            Value::Object(mut map) if map.contains_key("transaction") && !map.contains_key("id") => {
                map.remove("transaction").unwrap_or(Value::Null)
            }
            other => other,
        };
        let data: AccountRecord = serde_json::from_value(value)?;
        Ok(Self { chain, data })
    }

    fn decimals(&self) -> u32 {
        self.chain.elementary_unit_exponent()
    }

    fn payment(&self) -> Option<&PaymentFields> {
        if self.data.tx_type == PAY {
            self.data.payment.as_ref()
        } else {
            None
        }
    }

    fn optional_amount(value: Option<&Value>) -> Result<BigInt> {
        match value {
            Some(v) => json_to_integer_amount(v),
            None => Ok(BigInt::zero()),
        }
    }

    fn payment_amount(&self) -> Result<BigInt> {
        match self.payment() {
            Some(p) => Self::optional_amount(p.amount.as_ref()),
            None => Ok(BigInt::zero()),
        }
    }

    fn close_amount(&self) -> Result<BigInt> {
        match self.payment() {
            Some(p) => Self::optional_amount(p.close_amount.as_ref()),
            None => Ok(BigInt::zero()),
        }
    }

    fn note_bytes(&self) -> Option<Vec<u8>> {
        let note = self.data.note.as_deref()?;
        base64::decode(note).ok()
    }
}

impl Transaction for AccountTransaction {
    fn chain(&self) -> ChainType {
        self.chain
    }

    fn tx_id(&self) -> &str {
        &self.data.id
    }

    fn timestamp(&self) -> u64 {
        self.data.round_time.unwrap_or(0)
    }

    fn tx_type(&self) -> &str {
        &self.data.tx_type
    }

    fn is_native_payment(&self) -> bool {
        self.payment().is_some()
    }

    fn source_addresses(&self) -> Vec<Option<String>> {
        vec![self.data.sender.clone()]
    }

    fn receiving_addresses(&self) -> Vec<Option<String>> {
        let mut out = Vec::new();
        if let Some(p) = self.payment() {
            out.push(p.receiver.clone());
            if p.close_remainder_to.is_some() {
                out.push(p.close_remainder_to.clone());
            }
        }
        out
    }

    fn spent_amounts(&self) -> Result<Vec<AddressAmount>> {
        let total = self.fee()? + self.payment_amount()? + self.close_amount()?;
        Ok(vec![AddressAmount::new(self.data.sender.clone(), total)
            .with_elementary_units(self.decimals())])
    }

    fn received_amounts(&self) -> Result<Vec<AddressAmount>> {
        let mut received = Vec::new();
        if let Some(p) = self.payment() {
            received.push(
                AddressAmount::new(p.receiver.clone(), self.payment_amount()?)
                    .with_elementary_units(self.decimals()),
            );
            let close = self.close_amount()?;
            if p.close_remainder_to.is_some() && close.is_positive() {
                received.push(
                    AddressAmount::new(p.close_remainder_to.clone(), close)
                        .with_elementary_units(self.decimals()),
                );
            }
        }
        Ok(received)
    }

    fn fee(&self) -> Result<BigInt> {
        let fee = json_to_integer_amount(&self.data.fee)?;
        if fee.is_negative() {
            return Err(SummaryError::InvalidAmount(self.data.fee.to_string()));
        }
        Ok(fee)
    }

    fn fee_signer_total_amount(&self) -> Result<AddressAmount> {
        let mut spent = self.spent_amounts()?;
        Ok(spent.remove(0))
    }

    fn references(&self) -> Vec<String> {
        match self.note_bytes() {
            Some(bytes) if !bytes.is_empty() => vec![hex::encode(bytes)],
            _ => Vec::new(),
        }
    }

    fn standardized_payment_reference(&self) -> Bytes32 {
        standardize_reference(&self.references())
    }

    fn success_status(&self) -> Result<TransactionSuccessStatus> {
        Ok(TransactionSuccessStatus::Success)
    }
}
