pub mod account;
pub mod composer;
pub mod config;
pub mod error;
pub mod hashing;
pub mod ledger;
pub mod merkle;
pub mod rpc;
pub mod summary;
pub mod telemetry;
pub mod transaction;
pub mod types;
pub mod units;
pub mod utxo;

pub use composer::SummaryComposer;
pub use error::{Result, SummaryError};
pub use transaction::{AnyTransaction, Transaction};
