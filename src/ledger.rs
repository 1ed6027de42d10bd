/// Ledger-Diff Amount Reconciliation (XRP)
///
/// The ledger does not list inputs and outputs. What a transaction did to
/// each account is recovered from the `AffectedNodes` attached to its
/// metadata: every `AccountRoot` entry carries the balance before and after
/// the transaction.
///
/// Failed transactions (`tec*` results) still burn the fee, so the diff only
/// shows the fee debit. Intended amounts are then rebuilt from the declared
/// `Account`, `Destination` and `Amount` fields.

use num_bigint::BigInt;
use num_traits::Signed;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, SummaryError};
use crate::hashing::{standardize_reference, unprefix_0x, Bytes32};
use crate::transaction::Transaction;
use crate::types::{AddressAmount, ChainType, TransactionSuccessStatus};
use crate::units::json_to_integer_amount;

/// Seconds between the Unix epoch and the Ripple epoch (2000-01-01)
pub const RIPPLE_EPOCH_OFFSET: u64 = 946_684_800;

const ACCOUNT_ROOT: &str = "AccountRoot";
const PAYMENT: &str = "Payment";
const TES_SUCCESS: &str = "tesSUCCESS";

/// `tec` results caused by the destination rather than the sender
const RECEIVER_FAILURES: &[&str] = &[
    "tecDST_TAG_NEEDED",
    "tecNO_DST",
    "tecNO_DST_INSUF_XRP",
    "tecNO_PERMISSION",
];

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerNode {
    #[serde(rename = "LedgerEntryType", default)]
    pub ledger_entry_type: String,
    #[serde(rename = "FinalFields", default)]
    pub final_fields: Option<Value>,
    #[serde(rename = "PreviousFields", default)]
    pub previous_fields: Option<Value>,
    #[serde(rename = "NewFields", default)]
    pub new_fields: Option<Value>,
}

impl LedgerNode {
    fn is_account_root(&self) -> bool {
        self.ledger_entry_type == ACCOUNT_ROOT
    }
}

#[derive(Debug, Clone, Deserialize)]
pub enum AffectedNode {
    ModifiedNode(LedgerNode),
    CreatedNode(LedgerNode),
    DeletedNode(LedgerNode),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerMeta {
    #[serde(rename = "TransactionResult")]
    pub transaction_result: String,
    #[serde(rename = "AffectedNodes", default)]
    pub affected_nodes: Vec<AffectedNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Memo {
    #[serde(rename = "MemoData", default)]
    pub memo_data: Option<String>,
    #[serde(rename = "MemoType", default)]
    pub memo_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoWrapper {
    #[serde(rename = "Memo")]
    pub memo: Memo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerRecord {
    pub hash: String,
    #[serde(rename = "Account", default)]
    pub account: Option<String>,
    #[serde(rename = "Destination", default)]
    pub destination: Option<String>,
    #[serde(rename = "Amount", default)]
    pub amount: Option<Value>,
    #[serde(rename = "Fee", default)]
    pub fee: Option<Value>,
    #[serde(rename = "TransactionType", default)]
    pub transaction_type: String,
    #[serde(default)]
    pub date: Option<u64>,
    #[serde(rename = "Memos", default)]
    pub memos: Vec<MemoWrapper>,
    #[serde(default)]
    pub meta: Option<LedgerMeta>,
}

#[derive(Debug, Clone)]
pub struct LedgerTransaction {
    chain: ChainType,
    data: LedgerRecord,
}

fn field_str(fields: Option<&Value>, name: &str) -> Option<String> {
    fields?.get(name)?.as_str().map(str::to_string)
}

fn field_amount(fields: Option<&Value>, name: &str) -> Result<Option<BigInt>> {
    match fields.and_then(|f| f.get(name)) {
        Some(v) => Ok(Some(json_to_integer_amount(v)?)),
        None => Ok(None),
    }
}

impl LedgerTransaction {
    /// Accepts either the bare transaction object or a `{ "result": ... }` RPC envelope
    pub fn from_value(chain: ChainType, value: Value) -> Result<Self> {
        let value = match value {
            Value::Object(mut map) if map.contains_key("result") && !map.contains_key("hash") => {
                map.remove("result").unwrap_or(Value::Null)
            }
            other => other,
        };
        let data: LedgerRecord = serde_json::from_value(value)?;
        Ok(Self { chain, data })
    }

    pub fn record(&self) -> &LedgerRecord {
        &self.data
    }

    fn meta(&self) -> Result<&LedgerMeta> {
        self.data.meta.as_ref().ok_or_else(|| SummaryError::MissingMetadata {
            tx_id: self.data.hash.clone(),
            what: "meta".to_string(),
        })
    }

    /// Declared amount in drops; `None` for issued-currency amounts
    fn declared_native_amount(&self) -> Result<Option<BigInt>> {
        match &self.data.amount {
            Some(v @ Value::String(_)) | Some(v @ Value::Number(_)) => {
                Ok(Some(json_to_integer_amount(v)?))
            }
            _ => Ok(None),
        }
    }

    fn declared_fee(&self) -> Result<BigInt> {
        match &self.data.fee {
            Some(v) => json_to_integer_amount(v),
            None => Err(SummaryError::InvalidRecord(format!(
                "transaction {} has no Fee field",
                self.data.hash
            ))),
        }
    }

    /// Spent and received vectors recovered from balance diffs, in node order
    fn balance_changes(&self) -> Result<(Vec<AddressAmount>, Vec<AddressAmount>)> {
        let meta = self.meta()?;
        let decimals = self.chain.elementary_unit_exponent();
        let mut spent = Vec::new();
        let mut received = Vec::new();

        let mut record = |address: Option<String>, diff: BigInt| {
            if diff.is_negative() {
                spent.push(AddressAmount::new(address, -diff).with_elementary_units(decimals));
            } else if diff.is_positive() {
                received.push(AddressAmount::new(address, diff).with_elementary_units(decimals));
            }
        };

        for node in &meta.affected_nodes {
            match node {
                AffectedNode::ModifiedNode(n) if n.is_account_root() => {
                    let previous = field_amount(n.previous_fields.as_ref(), "Balance")?;
                    let current = field_amount(n.final_fields.as_ref(), "Balance")?;
                    // No PreviousFields.Balance means the balance did not change
                    if let (Some(previous), Some(current)) = (previous, current) {
                        let address = field_str(n.final_fields.as_ref(), "Account");
                        record(address, current - previous);
                    }
                }
                AffectedNode::CreatedNode(n) if n.is_account_root() => {
                    if let Some(opening) = field_amount(n.new_fields.as_ref(), "Balance")? {
                        let address = field_str(n.new_fields.as_ref(), "Account");
                        // Opening balance is never a debit
                        if opening.is_positive() {
                            record(address, opening);
                        }
                    }
                }
                AffectedNode::DeletedNode(n) if n.is_account_root() => {
                    let address = field_str(n.final_fields.as_ref(), "Account");
                    let previous = field_amount(n.previous_fields.as_ref(), "Balance")?;
                    let last = field_amount(n.final_fields.as_ref(), "Balance")?;
                    match (previous, last) {
                        (Some(previous), Some(last)) => record(address, last - previous),
                        _ => warn!(
                            tx_id = %self.data.hash,
                            account = ?address,
                            "Deleted account entry without previous balance, treating as zero effect"
                        ),
                    }
                }
                _ => {}
            }
        }

        Ok((spent, received))
    }
}

impl Transaction for LedgerTransaction {
    fn chain(&self) -> ChainType {
        self.chain
    }

    fn tx_id(&self) -> &str {
        &self.data.hash
    }

    fn timestamp(&self) -> u64 {
        self.data.date.map_or(0, |d| d + RIPPLE_EPOCH_OFFSET)
    }

    fn tx_type(&self) -> &str {
        &self.data.transaction_type
    }

    fn is_native_payment(&self) -> bool {
        self.data.transaction_type == PAYMENT
            && matches!(self.data.amount, Some(Value::String(_)) | Some(Value::Number(_)))
    }

    fn source_addresses(&self) -> Vec<Option<String>> {
        vec![self.data.account.clone()]
    }

    fn receiving_addresses(&self) -> Vec<Option<String>> {
        if self.data.transaction_type == PAYMENT {
            vec![self.data.destination.clone()]
        } else {
            Vec::new()
        }
    }

    fn spent_amounts(&self) -> Result<Vec<AddressAmount>> {
        Ok(self.balance_changes()?.0)
    }

    fn received_amounts(&self) -> Result<Vec<AddressAmount>> {
        Ok(self.balance_changes()?.1)
    }

    fn intended_spent_amounts(&self) -> Result<Vec<AddressAmount>> {
        if self.success_status()?.is_success() {
            return self.spent_amounts();
        }
        let decimals = self.chain.elementary_unit_exponent();
        let fee = self.declared_fee()?;
        let total = match self.declared_native_amount()? {
            Some(amount) if self.data.transaction_type == PAYMENT => amount + fee,
            _ => fee,
        };
        Ok(vec![AddressAmount::new(self.data.account.clone(), total).with_elementary_units(decimals)])
    }

    fn intended_received_amounts(&self) -> Result<Vec<AddressAmount>> {
        if self.success_status()?.is_success() {
            return self.received_amounts();
        }
        let decimals = self.chain.elementary_unit_exponent();
        match self.declared_native_amount()? {
            Some(amount) if self.data.transaction_type == PAYMENT => Ok(vec![AddressAmount::new(
                self.data.destination.clone(),
                amount,
            )
            .with_elementary_units(decimals)]),
            _ => Ok(Vec::new()),
        }
    }

    fn fee(&self) -> Result<BigInt> {
        self.declared_fee()
    }

    /// Net effect on the fee-paying account
    fn fee_signer_total_amount(&self) -> Result<AddressAmount> {
        let signer = self.data.account.clone();
        let (spent, received) = self.balance_changes()?;

        if let Some(entry) = spent.iter().find(|e| e.address == signer) {
            return Ok(entry.clone());
        }
        if let Some(entry) = received.iter().find(|e| e.address == signer) {
            let mut negated = entry.clone();
            negated.amount = -negated.amount;
            return Ok(negated);
        }
        // Fee covered exactly, no net balance change
        Ok(AddressAmount::zero_for(signer)
            .with_elementary_units(self.chain.elementary_unit_exponent()))
    }

    fn references(&self) -> Vec<String> {
        self.data
            .memos
            .iter()
            .filter_map(|m| m.memo.memo_data.as_deref())
            .map(|data| unprefix_0x(data).to_ascii_lowercase())
            .collect()
    }

    fn standardized_payment_reference(&self) -> Bytes32 {
        standardize_reference(&self.references())
    }

    fn success_status(&self) -> Result<TransactionSuccessStatus> {
        let result = &self.meta()?.transaction_result;
        if result == TES_SUCCESS {
            return Ok(TransactionSuccessStatus::Success);
        }
        if RECEIVER_FAILURES.contains(&result.as_str()) {
            return Ok(TransactionSuccessStatus::ReceiverFailure);
        }
        Ok(TransactionSuccessStatus::SenderFailure)
    }
}
