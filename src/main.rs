//! Summary tool
//!
//! Reads one transaction (from a JSON file or from a node) and prints the
//! requested attestation summary as pretty JSON.
//!
//! ```bash
//! mcc-summary --chain doge --file tx.json payment --in-utxo 0 --out-utxo 0
//! mcc-summary --chain xrp --txid C53E... balance-decreasing --indicator 0x...
//! mcc-summary --chain btc --file tx.json source-root
//! ```

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

use rustymcc::composer::SummaryComposer;
use rustymcc::config::Settings;
use rustymcc::rpc::RpcClient;
use rustymcc::telemetry::init_tracing;
use rustymcc::transaction::{AnyTransaction, Transaction};

#[derive(Parser, Debug)]
#[clap(name = "mcc-summary")]
#[clap(about = "Compute attestation summaries for a single transaction", long_about = None)]
struct Args {
    /// Settings file (defaults to ./config.toml when present)
    #[clap(long)]
    config: Option<String>,

    /// Chain type, overrides the configured one (btc, doge, ltc, xrp, algo)
    #[clap(long)]
    chain: Option<String>,

    /// Read the transaction JSON from this file
    #[clap(long, conflicts_with = "txid")]
    file: Option<String>,

    /// Fetch the transaction from the configured node
    #[clap(long)]
    txid: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Payment summary between one input and one output
    Payment {
        #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
        in_utxo: i64,
        #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
        out_utxo: i64,
    },
    /// Balance-decreasing summary for a 32-byte source indicator
    BalanceDecreasing {
        #[clap(long)]
        indicator: String,
    },
    /// Payment nonexistence summary for one output
    Nonexistence {
        #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
        out_utxo: i64,
    },
    /// Merkle root over the transaction's source addresses
    SourceRoot,
}

async fn load_transaction(args: &Args, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = &args.file {
        let path = shellexpand::tilde(path).to_string();
        let raw = std::fs::read_to_string(&path)?;
        return Ok(serde_json::from_str(&raw)?);
    }
    match &args.txid {
        Some(txid) => {
            let client = RpcClient::new(settings.rpc.clone())?;
            Ok(client.fetch_transaction(settings.chain_type()?, txid).await?)
        }
        None => Err("either --file or --txid is required".into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_path = args
        .config
        .as_ref()
        .map(|p| PathBuf::from(shellexpand::tilde(p).to_string()));
    let mut settings = Settings::load(config_path.as_deref())?;
    if let Some(chain) = &args.chain {
        settings.chain = chain.clone();
    }
    let _guard = init_tracing(&settings.telemetry)?;

    let chain = settings.chain_type()?;
    let value = load_transaction(&args, &settings).await?;
    let tx = AnyTransaction::from_json(chain, value)?;
    info!(chain = %chain, tx_id = %tx.tx_id(), "Loaded transaction");

    let composer = SummaryComposer::new(&tx, &settings.summary);
    let output = match &args.command {
        Command::Payment { in_utxo, out_utxo } => {
            serde_json::to_value(composer.payment_summary(*in_utxo, *out_utxo)?)?
        }
        Command::BalanceDecreasing { indicator } => {
            serde_json::to_value(composer.balance_decreasing_summary(indicator)?)?
        }
        Command::Nonexistence { out_utxo } => {
            serde_json::to_value(composer.payment_nonexistence_summary(*out_utxo)?)?
        }
        Command::SourceRoot => json!({
            "transactionId": tx.tx_id(),
            "sourceAddressesRoot": composer.source_addresses_root(),
        }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
