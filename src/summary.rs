// Summary Type Definitions
//
// The three canonical summaries handed to the attestation layer. A summary
// is a status plus a response; the response exists only for `Success`.
// All amounts serialize as decimal strings.

use num_bigint::BigInt;
use serde::Serialize;

use crate::hashing::Bytes32;
use crate::types::{serialize_bigint, TransactionSuccessStatus};

// ========== Payment ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentSummaryStatus {
    Success,
    Coinbase,
    NotNativePayment,
    UnexpectedNumberOfParticipants,
    InvalidInUtxo,
    InvalidOutUtxo,
    NoSpentAmountAddress,
    NoReceiveAmountAddress,
    NoIntendedSpentAmountAddress,
    NoIntendedReceiveAmountAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummaryResponse {
    pub block_timestamp: u64,
    pub transaction_id: String,
    pub source_address: String,
    pub source_address_hash: Bytes32,
    pub receiving_address: String,
    pub receiving_address_hash: Bytes32,
    #[serde(serialize_with = "serialize_bigint")]
    pub spent_amount: BigInt,
    #[serde(serialize_with = "serialize_bigint")]
    pub intended_spent_amount: BigInt,
    #[serde(serialize_with = "serialize_bigint")]
    pub received_amount: BigInt,
    #[serde(serialize_with = "serialize_bigint")]
    pub intended_received_amount: BigInt,
    pub payment_reference: Bytes32,
    pub one_to_one: bool,
    pub transaction_status: TransactionSuccessStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_addresses_root: Option<Bytes32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    pub status: PaymentSummaryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<PaymentSummaryResponse>,
}

impl PaymentSummary {
    pub fn failed(status: PaymentSummaryStatus) -> Self {
        Self { status, response: None }
    }

    pub fn success(response: PaymentSummaryResponse) -> Self {
        Self {
            status: PaymentSummaryStatus::Success,
            response: Some(response),
        }
    }
}

// ========== Balance decreasing ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BalanceDecreasingSummaryStatus {
    Success,
    Coinbase,
    NoSourceAddress,
    NotValidSourceAddressFormat,
    InvalidInUtxo,
    InvalidTransactionDataObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDecreasingSummaryResponse {
    pub block_timestamp: u64,
    pub transaction_id: String,
    pub source_address_indicator: Bytes32,
    pub source_address: String,
    pub source_address_hash: Bytes32,
    #[serde(serialize_with = "serialize_bigint")]
    pub spent_amount: BigInt,
    pub payment_reference: Bytes32,
    pub transaction_status: TransactionSuccessStatus,
    pub is_full: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceDecreasingSummary {
    pub status: BalanceDecreasingSummaryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<BalanceDecreasingSummaryResponse>,
}

impl BalanceDecreasingSummary {
    pub fn failed(status: BalanceDecreasingSummaryStatus) -> Self {
        Self { status, response: None }
    }

    pub fn success(response: BalanceDecreasingSummaryResponse) -> Self {
        Self {
            status: BalanceDecreasingSummaryStatus::Success,
            response: Some(response),
        }
    }
}

// ========== Payment nonexistence ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentNonexistenceSummaryStatus {
    Success,
    Coinbase,
    NotNativePayment,
    UnexpectedNumberOfParticipants,
    NoReceiveAmountAddress,
    NoIntendedReceiveAmountAddress,
    InvalidOutUtxo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNonexistenceSummaryResponse {
    pub block_timestamp: u64,
    pub transaction_id: String,
    pub receiving_address: String,
    pub receiving_address_hash: Bytes32,
    #[serde(serialize_with = "serialize_bigint")]
    pub received_amount: BigInt,
    #[serde(serialize_with = "serialize_bigint")]
    pub intended_received_amount: BigInt,
    pub payment_reference: Bytes32,
    pub transaction_status: TransactionSuccessStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentNonexistenceSummary {
    pub status: PaymentNonexistenceSummaryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<PaymentNonexistenceSummaryResponse>,
}

impl PaymentNonexistenceSummary {
    pub fn failed(status: PaymentNonexistenceSummaryStatus) -> Self {
        Self { status, response: None }
    }

    pub fn success(response: PaymentNonexistenceSummaryResponse) -> Self {
        Self {
            status: PaymentNonexistenceSummaryStatus::Success,
            response: Some(response),
        }
    }
}
