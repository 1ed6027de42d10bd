/// Summary Composer
///
/// Turns the reconciled amount vectors of one transaction into the three
/// attestation summaries. Anticipated edge cases come back as a status with
/// no response; only corrupted input (missing metadata, unparsable amounts)
/// surfaces as `Err`.
///
/// Participant selection per family:
/// - UTXO: the caller picks an input and an output by index
/// - Ledger-diff: the declared `Account` and `Destination`
/// - Account-single: the only spent and the only received entry
///
/// Once participants are known the amounts are netted the same way for
/// every family, so change returned to the sender and self-funding by the
/// receiver cancel out.

use num_bigint::BigInt;
use std::fmt::Debug;
use tracing::debug;

use crate::config::SummarySettings;
use crate::error::Result;
use crate::hashing::{standard_address_hash, Bytes32};
use crate::merkle::MerkleTree;
use crate::summary::{
    BalanceDecreasingSummary, BalanceDecreasingSummaryResponse, BalanceDecreasingSummaryStatus,
    PaymentNonexistenceSummary, PaymentNonexistenceSummaryResponse,
    PaymentNonexistenceSummaryStatus, PaymentSummary, PaymentSummaryResponse,
    PaymentSummaryStatus,
};
use crate::telemetry::truncate_hex;
use crate::transaction::Transaction;
use crate::types::{total_for_address, AddressAmount, ChainFamily};

/// `Σ(primary, address) − Σ(counter, address)`
pub fn net_amount(primary: &[AddressAmount], counter: &[AddressAmount], address: &str) -> BigInt {
    total_for_address(primary, address) - total_for_address(counter, address)
}

/// Funds move only between `source` and `receiving`
///
/// Address-less outputs with a negative amount never occur on-chain and are
/// ignored; any other address-less or third-party entry breaks the relation.
pub fn is_one_to_one(
    spent: &[AddressAmount],
    received: &[AddressAmount],
    source: &str,
    receiving: &str,
) -> bool {
    let is_party = |entry: &AddressAmount| entry.has_address(source) || entry.has_address(receiving);

    let spent_ok = spent.iter().all(is_party);
    let received_ok = received.iter().all(|entry| match &entry.address {
        None => entry.amount < BigInt::from(0),
        Some(_) => is_party(entry),
    });
    spent_ok && received_ok
}

/// Index into a vector of `len` entries; negative or too large gives `None`
fn checked_index(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|i| *i < len)
}

/// Decode a UTXO source indicator as a vin index
///
/// Only values below 2^32 are indexes; anything larger is an address hash.
fn indicator_as_vin_index(indicator: &Bytes32) -> Option<usize> {
    let bytes = indicator.as_bytes();
    if bytes[..28].iter().any(|b| *b != 0) {
        return None;
    }
    let index = u32::from_be_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]);
    Some(index as usize)
}

fn first_address(addresses: Vec<Option<String>>) -> Option<String> {
    addresses.into_iter().next().flatten()
}

fn mentions(entries: &[AddressAmount], address: &str) -> bool {
    entries.iter().any(|e| e.has_address(address))
}

/// Composer bound to one transaction
pub struct SummaryComposer<'a, T: Transaction> {
    tx: &'a T,
    trace_calls: bool,
}

impl<'a, T: Transaction> SummaryComposer<'a, T> {
    pub fn new(tx: &'a T, settings: &SummarySettings) -> Self {
        Self {
            tx,
            trace_calls: settings.trace_calls,
        }
    }

    fn trace<S: Debug>(&self, operation: &str, status: &S) {
        if self.trace_calls {
            debug!(
                chain = %self.tx.chain(),
                tx_id = %truncate_hex(self.tx.tx_id(), 16),
                operation,
                status = ?status,
                "Summary computed"
            );
        }
    }

    /// Commitment root over the distinct source addresses
    pub fn source_addresses_root(&self) -> Option<Bytes32> {
        let addresses: Vec<String> = self.tx.source_addresses().into_iter().flatten().collect();
        MerkleTree::from_addresses(&addresses).root()
    }

    // ========== Payment ==========

    pub fn payment_summary(&self, in_utxo: i64, out_utxo: i64) -> Result<PaymentSummary> {
        let summary = match self.tx.family() {
            ChainFamily::Utxo => self.utxo_payment(in_utxo, out_utxo)?,
            ChainFamily::LedgerDiff => self.declared_payment()?,
            ChainFamily::AccountSingle => self.single_party_payment()?,
        };
        self.trace("payment", &summary.status);
        Ok(summary)
    }

    fn utxo_payment(&self, in_utxo: i64, out_utxo: i64) -> Result<PaymentSummary> {
        if self.tx.is_coinbase() {
            return Ok(PaymentSummary::failed(PaymentSummaryStatus::Coinbase));
        }

        let spent = self.tx.spent_amounts()?;
        let received = self.tx.received_amounts()?;

        let in_index = match checked_index(in_utxo, spent.len()) {
            Some(i) => i,
            None => return Ok(PaymentSummary::failed(PaymentSummaryStatus::InvalidInUtxo)),
        };
        let out_index = match checked_index(out_utxo, received.len()) {
            Some(i) => i,
            None => return Ok(PaymentSummary::failed(PaymentSummaryStatus::InvalidOutUtxo)),
        };

        let source = match &spent[in_index].address {
            Some(a) => a.clone(),
            None => return Ok(PaymentSummary::failed(PaymentSummaryStatus::NoSpentAmountAddress)),
        };
        let receiving = match &received[out_index].address {
            Some(a) => a.clone(),
            None => return Ok(PaymentSummary::failed(PaymentSummaryStatus::NoReceiveAmountAddress)),
        };

        self.compose_payment(source, receiving, &spent, &received, self.source_addresses_root())
    }

    fn declared_payment(&self) -> Result<PaymentSummary> {
        if !self.tx.is_native_payment() {
            return Ok(PaymentSummary::failed(PaymentSummaryStatus::NotNativePayment));
        }

        let source = match first_address(self.tx.source_addresses()) {
            Some(a) => a,
            None => return Ok(PaymentSummary::failed(PaymentSummaryStatus::NoSpentAmountAddress)),
        };
        let receiving = match first_address(self.tx.receiving_addresses()) {
            Some(a) => a,
            None => return Ok(PaymentSummary::failed(PaymentSummaryStatus::NoReceiveAmountAddress)),
        };

        let spent = self.tx.spent_amounts()?;
        let received = self.tx.received_amounts()?;
        self.compose_payment(source, receiving, &spent, &received, None)
    }

    fn single_party_payment(&self) -> Result<PaymentSummary> {
        if !self.tx.is_native_payment() {
            return Ok(PaymentSummary::failed(PaymentSummaryStatus::NotNativePayment));
        }

        let spent = self.tx.spent_amounts()?;
        let received = self.tx.received_amounts()?;
        if spent.len() != 1 || received.len() != 1 {
            return Ok(PaymentSummary::failed(
                PaymentSummaryStatus::UnexpectedNumberOfParticipants,
            ));
        }

        let source = match &spent[0].address {
            Some(a) => a.clone(),
            None => return Ok(PaymentSummary::failed(PaymentSummaryStatus::NoSpentAmountAddress)),
        };
        let receiving = match &received[0].address {
            Some(a) => a.clone(),
            None => return Ok(PaymentSummary::failed(PaymentSummaryStatus::NoReceiveAmountAddress)),
        };

        self.compose_payment(source, receiving, &spent, &received, None)
    }

    fn compose_payment(
        &self,
        source: String,
        receiving: String,
        spent: &[AddressAmount],
        received: &[AddressAmount],
        source_addresses_root: Option<Bytes32>,
    ) -> Result<PaymentSummary> {
        let intended_spent = self.tx.intended_spent_amounts()?;
        let intended_received = self.tx.intended_received_amounts()?;

        if !mentions(&intended_spent, &source) {
            return Ok(PaymentSummary::failed(
                PaymentSummaryStatus::NoIntendedSpentAmountAddress,
            ));
        }
        if !mentions(&intended_received, &receiving) {
            return Ok(PaymentSummary::failed(
                PaymentSummaryStatus::NoIntendedReceiveAmountAddress,
            ));
        }

        let response = PaymentSummaryResponse {
            block_timestamp: self.tx.timestamp(),
            transaction_id: self.tx.tx_id().to_string(),
            source_address_hash: standard_address_hash(&source),
            receiving_address_hash: standard_address_hash(&receiving),
            spent_amount: net_amount(spent, received, &source),
            intended_spent_amount: net_amount(&intended_spent, &intended_received, &source),
            received_amount: net_amount(received, spent, &receiving),
            intended_received_amount: net_amount(&intended_received, &intended_spent, &receiving),
            payment_reference: self.tx.standardized_payment_reference(),
            one_to_one: is_one_to_one(spent, received, &source, &receiving),
            transaction_status: self.tx.success_status()?,
            source_addresses_root,
            source_address: source,
            receiving_address: receiving,
        };
        Ok(PaymentSummary::success(response))
    }

    // ========== Balance decreasing ==========

    /// `indicator` is a 32-byte hex value: a vin index on UTXO chains, an
    /// address hash everywhere else
    pub fn balance_decreasing_summary(&self, indicator: &str) -> Result<BalanceDecreasingSummary> {
        let summary = match Bytes32::from_hex(indicator) {
            None => BalanceDecreasingSummary::failed(
                BalanceDecreasingSummaryStatus::NotValidSourceAddressFormat,
            ),
            Some(indicator) => match self.tx.family() {
                ChainFamily::Utxo => self.utxo_balance_decreasing(indicator)?,
                ChainFamily::LedgerDiff | ChainFamily::AccountSingle => {
                    self.hashed_balance_decreasing(indicator)?
                }
            },
        };
        self.trace("balance_decreasing", &summary.status);
        Ok(summary)
    }

    fn utxo_balance_decreasing(&self, indicator: Bytes32) -> Result<BalanceDecreasingSummary> {
        if self.tx.is_coinbase() {
            return Ok(BalanceDecreasingSummary::failed(
                BalanceDecreasingSummaryStatus::Coinbase,
            ));
        }

        let spent = self.tx.spent_amounts()?;
        let received = self.tx.received_amounts()?;

        let source = match indicator_as_vin_index(&indicator) {
            Some(index) => {
                if index >= spent.len() {
                    return Ok(BalanceDecreasingSummary::failed(
                        BalanceDecreasingSummaryStatus::InvalidInUtxo,
                    ));
                }
                if !self.tx.is_input_resolved(index) {
                    return Ok(BalanceDecreasingSummary::failed(
                        BalanceDecreasingSummaryStatus::InvalidTransactionDataObject,
                    ));
                }
                spent[index].address.clone()
            }
            None => spent
                .iter()
                .filter_map(|e| e.address.as_ref())
                .find(|a| standard_address_hash(a) == indicator)
                .cloned(),
        };

        let source = match source {
            Some(a) => a,
            None => {
                return Ok(BalanceDecreasingSummary::failed(
                    BalanceDecreasingSummaryStatus::NoSourceAddress,
                ))
            }
        };

        let spent_amount = net_amount(&spent, &received, &source);
        self.compose_balance_decreasing(indicator, source, spent_amount)
    }

    fn hashed_balance_decreasing(&self, indicator: Bytes32) -> Result<BalanceDecreasingSummary> {
        let spent = self.tx.spent_amounts()?;
        let received = self.tx.received_amounts()?;

        let matched = spent
            .iter()
            .filter_map(|e| e.address.as_ref())
            .find(|a| standard_address_hash(a) == indicator)
            .cloned();

        if let Some(source) = matched {
            let spent_amount = net_amount(&spent, &received, &source);
            return self.compose_balance_decreasing(indicator, source, spent_amount);
        }

        let signer = self.tx.fee_signer_total_amount()?;
        match signer.address {
            Some(address) if standard_address_hash(&address) == indicator => {
                self.compose_balance_decreasing(indicator, address, signer.amount)
            }
            _ => Ok(BalanceDecreasingSummary::failed(
                BalanceDecreasingSummaryStatus::NoSourceAddress,
            )),
        }
    }

    fn compose_balance_decreasing(
        &self,
        indicator: Bytes32,
        source: String,
        spent_amount: BigInt,
    ) -> Result<BalanceDecreasingSummary> {
        Ok(BalanceDecreasingSummary::success(BalanceDecreasingSummaryResponse {
            block_timestamp: self.tx.timestamp(),
            transaction_id: self.tx.tx_id().to_string(),
            source_address_indicator: indicator,
            source_address_hash: standard_address_hash(&source),
            source_address: source,
            spent_amount,
            payment_reference: self.tx.standardized_payment_reference(),
            transaction_status: self.tx.success_status()?,
            is_full: self.tx.is_full(),
        }))
    }

    // ========== Payment nonexistence ==========

    pub fn payment_nonexistence_summary(&self, out_utxo: i64) -> Result<PaymentNonexistenceSummary> {
        let summary = match self.tx.family() {
            ChainFamily::Utxo => self.utxo_nonexistence(out_utxo)?,
            ChainFamily::LedgerDiff => self.declared_nonexistence()?,
            ChainFamily::AccountSingle => self.single_party_nonexistence()?,
        };
        self.trace("payment_nonexistence", &summary.status);
        Ok(summary)
    }

    fn utxo_nonexistence(&self, out_utxo: i64) -> Result<PaymentNonexistenceSummary> {
        if self.tx.is_coinbase() {
            return Ok(PaymentNonexistenceSummary::failed(
                PaymentNonexistenceSummaryStatus::Coinbase,
            ));
        }

        let received = self.tx.received_amounts()?;
        let out_index = match checked_index(out_utxo, received.len()) {
            Some(i) => i,
            None => {
                return Ok(PaymentNonexistenceSummary::failed(
                    PaymentNonexistenceSummaryStatus::InvalidOutUtxo,
                ))
            }
        };
        match &received[out_index].address {
            Some(a) => self.compose_nonexistence(a.clone()),
            None => Ok(PaymentNonexistenceSummary::failed(
                PaymentNonexistenceSummaryStatus::NoReceiveAmountAddress,
            )),
        }
    }

    fn declared_nonexistence(&self) -> Result<PaymentNonexistenceSummary> {
        if !self.tx.is_native_payment() {
            return Ok(PaymentNonexistenceSummary::failed(
                PaymentNonexistenceSummaryStatus::NotNativePayment,
            ));
        }
        match first_address(self.tx.receiving_addresses()) {
            Some(a) => self.compose_nonexistence(a),
            None => Ok(PaymentNonexistenceSummary::failed(
                PaymentNonexistenceSummaryStatus::NoReceiveAmountAddress,
            )),
        }
    }

    fn single_party_nonexistence(&self) -> Result<PaymentNonexistenceSummary> {
        if !self.tx.is_native_payment() {
            return Ok(PaymentNonexistenceSummary::failed(
                PaymentNonexistenceSummaryStatus::NotNativePayment,
            ));
        }
        let received = self.tx.received_amounts()?;
        if received.len() != 1 {
            return Ok(PaymentNonexistenceSummary::failed(
                PaymentNonexistenceSummaryStatus::UnexpectedNumberOfParticipants,
            ));
        }
        match &received[0].address {
            Some(a) => self.compose_nonexistence(a.clone()),
            None => Ok(PaymentNonexistenceSummary::failed(
                PaymentNonexistenceSummaryStatus::NoReceiveAmountAddress,
            )),
        }
    }

    fn compose_nonexistence(&self, receiving: String) -> Result<PaymentNonexistenceSummary> {
        let spent = self.tx.spent_amounts()?;
        let received = self.tx.received_amounts()?;
        let intended_spent = self.tx.intended_spent_amounts()?;
        let intended_received = self.tx.intended_received_amounts()?;

        if !mentions(&intended_received, &receiving) {
            return Ok(PaymentNonexistenceSummary::failed(
                PaymentNonexistenceSummaryStatus::NoIntendedReceiveAmountAddress,
            ));
        }

        Ok(PaymentNonexistenceSummary::success(PaymentNonexistenceSummaryResponse {
            block_timestamp: self.tx.timestamp(),
            transaction_id: self.tx.tx_id().to_string(),
            receiving_address_hash: standard_address_hash(&receiving),
            received_amount: net_amount(&received, &spent, &receiving),
            intended_received_amount: net_amount(&intended_received, &intended_spent, &receiving),
            receiving_address: receiving,
            payment_reference: self.tx.standardized_payment_reference(),
            transaction_status: self.tx.success_status()?,
        }))
    }
}
