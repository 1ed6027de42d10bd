/// Settings
///
/// Layered with the `config` crate: built-in defaults, then an optional
/// TOML file, then `MCC__`-prefixed environment variables
/// (`MCC__CHAIN=doge`, `MCC__RPC__URL=...`, `MCC__SUMMARY__TRACE_CALLS=true`).
/// The loaded value is passed to whoever needs it; there is no global copy.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::Result;
use crate::telemetry::TelemetryConfig;
use crate::types::ChainType;

pub const ENV_PREFIX: &str = "MCC";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8332".to_string(),
            username: None,
            password: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Emit a debug event for every composed summary
    pub trace_calls: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chain: String,
    pub rpc: RpcSettings,
    pub telemetry: TelemetryConfig,
    pub summary: SummarySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chain: ChainType::Btc.as_str().to_string(),
            rpc: RpcSettings::default(),
            telemetry: TelemetryConfig::default(),
            summary: SummarySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings; a missing file is not an error
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        match path {
            Some(path) => builder = builder.add_source(File::from(path).required(false)),
            None => builder = builder.add_source(File::with_name("config").required(false)),
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn chain_type(&self) -> Result<ChainType> {
        self.chain.parse()
    }
}
