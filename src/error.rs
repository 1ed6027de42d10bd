/// Error Module
///
/// Exceptional failures only. Anticipated edge cases (bad index, missing
/// address, coinbase, wrong cardinality) are reported through the summary
/// status enums in `summary.rs` and never reach this type.
///
/// Every variant maps to a stable kind tag via [`SummaryError::kind`] so that
/// callers can branch on it without matching display strings.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SummaryError>;

#[derive(Debug, Error)]
pub enum SummaryError {
    /// Transaction metadata required for amount reconciliation is absent
    #[error("Missing transaction metadata for {tx_id}: {what}")]
    MissingMetadata { tx_id: String, what: String },

    /// An amount field could not be parsed as a decimal number
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    /// An amount has more fractional digits than the chain's elementary unit allows
    #[error("Amount '{value}' exceeds {decimals} decimal places")]
    AmountPrecision { value: String, decimals: u32 },

    /// The raw record does not have the shape the adapter expects
    #[error("Invalid transaction record: {0}")]
    InvalidRecord(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl SummaryError {
    /// Stable tag identifying the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            SummaryError::MissingMetadata { .. } => "missing_metadata",
            SummaryError::InvalidAmount(_) => "invalid_amount",
            SummaryError::AmountPrecision { .. } => "amount_precision",
            SummaryError::InvalidRecord(_) => "invalid_record",
            SummaryError::UnsupportedChain(_) => "unsupported_chain",
            SummaryError::Json(_) => "json",
            SummaryError::Rpc(_) => "rpc",
            SummaryError::Config(_) => "config",
        }
    }
}

impl From<reqwest::Error> for SummaryError {
    fn from(err: reqwest::Error) -> Self {
        SummaryError::Rpc(err.to_string())
    }
}
