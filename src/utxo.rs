/// UTXO Amount Reconciliation (BTC, DOGE, LTC)
///
/// Works on the verbose transaction JSON a node returns when prevouts are
/// included (`getrawtransaction <txid> 2`). Every input carries the value
/// and script of the output it spends, so no follow-up lookups are needed.
///
/// Inputs whose prevout is missing are kept as address-less zero entries
/// and mark the transaction as not full; the fee is then undefined.

use num_bigint::BigInt;
use num_traits::Zero;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, SummaryError};
use crate::hashing::{standardize_reference, Bytes32};
use crate::transaction::Transaction;
use crate::types::{total_amount, AddressAmount, ChainType, TransactionSuccessStatus};
use crate::units::json_to_elementary_units;

const OP_RETURN: u8 = 0x6a;
const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub address: Option<String>,
    /// Older nodes (Dogecoin) report a list instead of a single address
    #[serde(default)]
    pub addresses: Option<Vec<String>>,
    #[serde(default)]
    pub asm: String,
    #[serde(default)]
    pub hex: String,
}

impl ScriptPubKey {
    pub fn address(&self) -> Option<String> {
        if let Some(addr) = &self.address {
            return Some(addr.clone());
        }
        match self.addresses.as_deref() {
            Some([single]) => Some(single.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prevout {
    pub value: Value,
    #[serde(rename = "scriptPubKey", default)]
    pub script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Vin {
    #[serde(default)]
    pub coinbase: Option<String>,
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub vout: Option<u32>,
    #[serde(default)]
    pub prevout: Option<Prevout>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Vout {
    pub n: u32,
    pub value: Value,
    #[serde(rename = "scriptPubKey", default)]
    pub script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UtxoRecord {
    pub txid: String,
    #[serde(default)]
    pub vin: Vec<Vin>,
    #[serde(default)]
    pub vout: Vec<Vout>,
    #[serde(default)]
    pub blocktime: Option<u64>,
    #[serde(default)]
    pub time: Option<u64>,
    #[serde(default)]
    pub confirmations: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct UtxoTransaction {
    chain: ChainType,
    data: UtxoRecord,
}

impl UtxoTransaction {
    pub fn from_value(chain: ChainType, value: Value) -> Result<Self> {
        let data: UtxoRecord = serde_json::from_value(value)?;
        Ok(Self { chain, data })
    }

    pub fn record(&self) -> &UtxoRecord {
        &self.data
    }

    fn decimals(&self) -> u32 {
        self.chain.elementary_unit_exponent()
    }

    pub fn input_count(&self) -> usize {
        self.data.vin.len()
    }
}

/// Data pushed right after an OP_RETURN opcode, as lowercase hex
///
/// Falls back to the `asm` rendering when the script hex is unavailable.
pub fn op_return_data(script: &ScriptPubKey) -> Option<String> {
    if let Ok(bytes) = hex::decode(&script.hex) {
        if bytes.first() == Some(&OP_RETURN) {
            return Some(hex::encode(read_push(&bytes[1..])?));
        }
        if !bytes.is_empty() {
            return None;
        }
    }

    let mut parts = script.asm.split_whitespace();
    if parts.next() != Some("OP_RETURN") {
        return None;
    }
    let data = parts.next()?;
    hex::decode(data).ok().map(|_| data.to_ascii_lowercase())
}

fn read_push(script: &[u8]) -> Option<&[u8]> {
    let (&opcode, rest) = script.split_first()?;
    let (len, rest) = match opcode {
        1..=0x4b => (opcode as usize, rest),
        OP_PUSHDATA1 => (*rest.first()? as usize, &rest[1..]),
        OP_PUSHDATA2 => {
            let raw = rest.get(..2)?;
            (u16::from_le_bytes([raw[0], raw[1]]) as usize, &rest[2..])
        }
        OP_PUSHDATA4 => {
            let raw = rest.get(..4)?;
            (u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize, &rest[4..])
        }
        _ => return None,
    };
    rest.get(..len)
}

impl Transaction for UtxoTransaction {
    fn chain(&self) -> ChainType {
        self.chain
    }

    fn tx_id(&self) -> &str {
        &self.data.txid
    }

    fn timestamp(&self) -> u64 {
        self.data.blocktime.or(self.data.time).unwrap_or(0)
    }

    fn tx_type(&self) -> &str {
        if self.is_coinbase() {
            "coinbase"
        } else {
            "payment"
        }
    }

    fn is_coinbase(&self) -> bool {
        self.data
            .vin
            .first()
            .map_or(false, |vin| vin.coinbase.is_some())
    }

    fn is_native_payment(&self) -> bool {
        true
    }

    fn is_full(&self) -> bool {
        self.is_coinbase() || self.data.vin.iter().all(|vin| vin.prevout.is_some())
    }

    fn is_input_resolved(&self, index: usize) -> bool {
        self.data
            .vin
            .get(index)
            .map_or(false, |vin| vin.prevout.is_some())
    }

    fn source_addresses(&self) -> Vec<Option<String>> {
        self.data
            .vin
            .iter()
            .map(|vin| vin.prevout.as_ref().and_then(|p| p.script_pub_key.address()))
            .collect()
    }

    fn receiving_addresses(&self) -> Vec<Option<String>> {
        self.data
            .vout
            .iter()
            .map(|vout| vout.script_pub_key.address())
            .collect()
    }

    fn spent_amounts(&self) -> Result<Vec<AddressAmount>> {
        if self.is_coinbase() {
            return Ok(vec![AddressAmount::zero_for(None).with_elementary_units(self.decimals())]);
        }

        let mut spent = Vec::with_capacity(self.data.vin.len());
        for (i, vin) in self.data.vin.iter().enumerate() {
            let entry = match &vin.prevout {
                Some(prevout) => AddressAmount::new(
                    prevout.script_pub_key.address(),
                    json_to_elementary_units(&prevout.value, self.decimals())?,
                ),
                None => {
                    warn!(tx_id = %self.data.txid, vin = i, "Input without prevout data");
                    AddressAmount::zero_for(None)
                }
            };
            spent.push(entry.with_utxo(i as u32).with_elementary_units(self.decimals()));
        }
        Ok(spent)
    }

    fn received_amounts(&self) -> Result<Vec<AddressAmount>> {
        self.data
            .vout
            .iter()
            .enumerate()
            .map(|(j, vout)| {
                Ok(AddressAmount::new(
                    vout.script_pub_key.address(),
                    json_to_elementary_units(&vout.value, self.decimals())?,
                )
                .with_utxo(j as u32)
                .with_elementary_units(self.decimals()))
            })
            .collect()
    }

    fn fee(&self) -> Result<BigInt> {
        if self.is_coinbase() {
            return Ok(BigInt::zero());
        }
        if !self.is_full() {
            return Err(SummaryError::MissingMetadata {
                tx_id: self.data.txid.clone(),
                what: "prevout data for every input".to_string(),
            });
        }
        Ok(total_amount(&self.spent_amounts()?) - total_amount(&self.received_amounts()?))
    }

    fn fee_signer_total_amount(&self) -> Result<AddressAmount> {
        Err(SummaryError::InvalidRecord(format!(
            "{} transaction {} has no single fee signer",
            self.chain, self.data.txid
        )))
    }

    fn references(&self) -> Vec<String> {
        self.data
            .vout
            .iter()
            .filter_map(|vout| op_return_data(&vout.script_pub_key))
            .collect()
    }

    fn standardized_payment_reference(&self) -> Bytes32 {
        standardize_reference(&self.references())
    }

    fn success_status(&self) -> Result<TransactionSuccessStatus> {
        Ok(TransactionSuccessStatus::Success)
    }
}
