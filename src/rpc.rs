/// Node transport
///
/// Fetches a single transaction record as raw JSON. The shape of the request
/// depends on the chain family:
/// - UTXO nodes: JSON-RPC 1.0 `getrawtransaction <txid> 2` (prevouts included)
/// - Ledger nodes: JSON-RPC `tx` with `binary: false`
/// - Account chains: indexer `GET /v2/transactions/<id>`
///
/// The returned value is handed untouched to `AnyTransaction::from_json`.

use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::RpcSettings;
use crate::error::{Result, SummaryError};
use crate::telemetry::truncate_hex;
use crate::types::{ChainFamily, ChainType};

const SLOW_CALL_SECS: f64 = 5.0;

pub struct RpcClient {
    client: reqwest::Client,
    settings: RpcSettings,
}

/// Pull `result` out of a JSON-RPC reply, surfacing a node-side `error`
fn rpc_result(mut reply: Value) -> Result<Value> {
    if let Some(error) = reply.get("error").filter(|e| !e.is_null()) {
        return Err(SummaryError::Rpc(error.to_string()));
    }
    let result = reply
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| SummaryError::Rpc("No result in RPC response".to_string()))?;

    // Ledger nodes report failures inside the result object
    if result.get("status").and_then(Value::as_str) == Some("error") {
        let message = result
            .get("error_message")
            .or_else(|| result.get("error"))
            .map(Value::to_string)
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(SummaryError::Rpc(message));
    }
    Ok(result)
}

impl RpcClient {
    pub fn new(settings: RpcSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("mcc-summary/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, settings })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.settings.username {
            Some(user) => request.basic_auth(user, self.settings.password.as_ref()),
            None => request,
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let request = self.client.post(&self.settings.url).json(&json!({
            "jsonrpc": "1.0",
            "id": "mcc-summary",
            "method": method,
            "params": params
        }));
        let response = self.authorize(request).send().await?;
        let reply: Value = response.json().await?;
        rpc_result(reply)
    }

    async fn indexer_get(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.settings.url.trim_end_matches('/'), path);
        let response = self.authorize(self.client.get(&url)).send().await?;
        if !response.status().is_success() {
            return Err(SummaryError::Rpc(format!(
                "Indexer returned status: {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    /// Fetch one transaction in the shape the chain's adapter parses
    pub async fn fetch_transaction(&self, chain: ChainType, tx_id: &str) -> Result<Value> {
        let started = Instant::now();

        let value = match chain.family() {
            ChainFamily::Utxo => self.call("getrawtransaction", json!([tx_id, 2])).await?,
            ChainFamily::LedgerDiff => {
                self.call("tx", json!([{ "transaction": tx_id, "binary": false }]))
                    .await?
            }
            ChainFamily::AccountSingle => {
                self.indexer_get(&format!("/v2/transactions/{}", tx_id)).await?
            }
        };

        let elapsed = started.elapsed().as_secs_f64();
        if elapsed > SLOW_CALL_SECS {
            warn!(
                chain = %chain,
                tx_id = %truncate_hex(tx_id, 16),
                duration_secs = elapsed,
                "Slow RPC call"
            );
        } else {
            debug!(chain = %chain, tx_id = %truncate_hex(tx_id, 16), "Fetched transaction");
        }
        Ok(value)
    }
}
