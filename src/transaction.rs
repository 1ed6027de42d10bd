/// Uniform transaction view over the chain families
///
/// Each family adapter implements [`Transaction`]; [`AnyTransaction`] is the
/// closed set of adapters, picked once from the chain type when the raw
/// JSON is parsed.

use num_bigint::BigInt;
use serde_json::Value;

use crate::account::AccountTransaction;
use crate::error::Result;
use crate::hashing::Bytes32;
use crate::ledger::LedgerTransaction;
use crate::types::{AddressAmount, ChainFamily, ChainType, TransactionSuccessStatus};
use crate::utxo::UtxoTransaction;

pub trait Transaction {
    fn chain(&self) -> ChainType;

    fn family(&self) -> ChainFamily {
        self.chain().family()
    }

    fn tx_id(&self) -> &str;

    /// Unix seconds of the containing block
    fn timestamp(&self) -> u64;

    /// Chain-specific type tag ("payment", "coinbase", "Payment", "pay"...)
    fn tx_type(&self) -> &str;

    fn is_coinbase(&self) -> bool {
        false
    }

    /// Transfer of the chain's own currency
    fn is_native_payment(&self) -> bool;

    /// All data needed to compute every input amount is present
    fn is_full(&self) -> bool {
        true
    }

    fn is_input_resolved(&self, _index: usize) -> bool {
        true
    }

    fn source_addresses(&self) -> Vec<Option<String>>;

    fn receiving_addresses(&self) -> Vec<Option<String>>;

    /// Actual debits
    fn spent_amounts(&self) -> Result<Vec<AddressAmount>>;

    /// Actual credits
    fn received_amounts(&self) -> Result<Vec<AddressAmount>>;

    /// Declared debits; equal to [`Transaction::spent_amounts`] on success
    fn intended_spent_amounts(&self) -> Result<Vec<AddressAmount>> {
        self.spent_amounts()
    }

    /// Declared credits; equal to [`Transaction::received_amounts`] on success
    fn intended_received_amounts(&self) -> Result<Vec<AddressAmount>> {
        self.received_amounts()
    }

    fn fee(&self) -> Result<BigInt>;

    fn fee_signer_total_amount(&self) -> Result<AddressAmount>;

    fn references(&self) -> Vec<String>;

    fn standardized_payment_reference(&self) -> Bytes32;

    fn success_status(&self) -> Result<TransactionSuccessStatus>;
}

#[derive(Debug, Clone)]
pub enum AnyTransaction {
    Utxo(UtxoTransaction),
    LedgerDiff(LedgerTransaction),
    AccountSingle(AccountTransaction),
}

impl AnyTransaction {
    pub fn from_json(chain: ChainType, value: Value) -> Result<Self> {
        Ok(match chain.family() {
            ChainFamily::Utxo => AnyTransaction::Utxo(UtxoTransaction::from_value(chain, value)?),
            ChainFamily::LedgerDiff => {
                AnyTransaction::LedgerDiff(LedgerTransaction::from_value(chain, value)?)
            }
            ChainFamily::AccountSingle => {
                AnyTransaction::AccountSingle(AccountTransaction::from_value(chain, value)?)
            }
        })
    }

    pub fn from_raw(chain: ChainType, raw: &str) -> Result<Self> {
        Self::from_json(chain, serde_json::from_str(raw)?)
    }
}

macro_rules! dispatch {
    ($self:ident, $tx:ident => $body:expr) => {
        match $self {
            AnyTransaction::Utxo($tx) => $body,
            AnyTransaction::LedgerDiff($tx) => $body,
            AnyTransaction::AccountSingle($tx) => $body,
        }
    };
}

impl Transaction for AnyTransaction {
    fn chain(&self) -> ChainType {
        dispatch!(self, tx => tx.chain())
    }

    fn tx_id(&self) -> &str {
        dispatch!(self, tx => tx.tx_id())
    }

    fn timestamp(&self) -> u64 {
        dispatch!(self, tx => tx.timestamp())
    }

    fn tx_type(&self) -> &str {
        dispatch!(self, tx => tx.tx_type())
    }

    fn is_coinbase(&self) -> bool {
        dispatch!(self, tx => tx.is_coinbase())
    }

    fn is_native_payment(&self) -> bool {
        dispatch!(self, tx => tx.is_native_payment())
    }

    fn is_full(&self) -> bool {
        dispatch!(self, tx => tx.is_full())
    }

    fn is_input_resolved(&self, index: usize) -> bool {
        dispatch!(self, tx => tx.is_input_resolved(index))
    }

    fn source_addresses(&self) -> Vec<Option<String>> {
        dispatch!(self, tx => tx.source_addresses())
    }

    fn receiving_addresses(&self) -> Vec<Option<String>> {
        dispatch!(self, tx => tx.receiving_addresses())
    }

    fn spent_amounts(&self) -> Result<Vec<AddressAmount>> {
        dispatch!(self, tx => tx.spent_amounts())
    }

    fn received_amounts(&self) -> Result<Vec<AddressAmount>> {
        dispatch!(self, tx => tx.received_amounts())
    }

    fn intended_spent_amounts(&self) -> Result<Vec<AddressAmount>> {
        dispatch!(self, tx => tx.intended_spent_amounts())
    }

    fn intended_received_amounts(&self) -> Result<Vec<AddressAmount>> {
        dispatch!(self, tx => tx.intended_received_amounts())
    }

    fn fee(&self) -> Result<BigInt> {
        dispatch!(self, tx => tx.fee())
    }

    fn fee_signer_total_amount(&self) -> Result<AddressAmount> {
        dispatch!(self, tx => tx.fee_signer_total_amount())
    }

    fn references(&self) -> Vec<String> {
        dispatch!(self, tx => tx.references())
    }

    fn standardized_payment_reference(&self) -> Bytes32 {
        dispatch!(self, tx => tx.standardized_payment_reference())
    }

    fn success_status(&self) -> Result<TransactionSuccessStatus> {
        dispatch!(self, tx => tx.success_status())
    }
}
