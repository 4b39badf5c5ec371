//! Network and client configuration
//!
//! Resolution order: built-in defaults, then a TOML file, then `BALLOT_*`
//! environment variables. The result is validated before use.
//!
//! ```toml
//! log_filter = "info"
//!
//! [network]
//! chain_id = 9000
//! name = "FHEVM Testnet"
//! rpc_url = "https://devnet.zama.ai"
//! explorer_url = "https://explorer.zama.ai"
//!
//! [network.native_currency]
//! name = "ETH"
//! symbol = "ETH"
//! decimals = 18
//!
//! [ledger]
//! address = "0x0000000000000000000000000000000000000000"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Address, ChainId, Result, VotingError};

/// File read when no config path is given, if present
pub const DEFAULT_CONFIG_FILE: &str = "ballot.toml";

/// Environment variable overriding `network.chain_id`
pub const ENV_CHAIN_ID: &str = "BALLOT_CHAIN_ID";
/// Environment variable overriding `network.rpc_url`
pub const ENV_RPC_URL: &str = "BALLOT_RPC_URL";
/// Environment variable overriding `network.explorer_url`
pub const ENV_EXPLORER_URL: &str = "BALLOT_EXPLORER_URL";
/// Environment variable overriding `ledger.address`
pub const ENV_LEDGER_ADDRESS: &str = "BALLOT_LEDGER_ADDRESS";

/// Trait for configuration validation
pub trait ConfigValidation {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;
}

/// Currency metadata a wallet needs to register a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Display name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
}

impl Default for NativeCurrency {
    fn default() -> Self {
        Self {
            name: "ETH".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

/// The network the ledger lives on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Required chain identifier
    pub chain_id: ChainId,
    /// Human-readable network name
    pub name: String,
    /// RPC endpoint
    pub rpc_url: String,
    /// Block explorer endpoint
    pub explorer_url: String,
    /// Currency metadata
    pub native_currency: NativeCurrency,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: ChainId(9000),
            name: "FHEVM Testnet".to_string(),
            rpc_url: "https://devnet.zama.ai".to_string(),
            explorer_url: "https://explorer.zama.ai".to_string(),
            native_currency: NativeCurrency::default(),
        }
    }
}

impl ConfigValidation for NetworkConfig {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(VotingError::configuration("network name cannot be empty"));
        }
        for (field, url) in [("rpc_url", &self.rpc_url), ("explorer_url", &self.explorer_url)] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(VotingError::configuration(format!(
                    "network.{field} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if self.native_currency.symbol.trim().is_empty() {
            return Err(VotingError::configuration(
                "native currency symbol cannot be empty",
            ));
        }
        Ok(())
    }
}

/// Where the deployed ledger lives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Deployed ledger address
    pub address: Address,
}

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Target network
    pub network: NetworkConfig,
    /// Deployed ledger
    pub ledger: LedgerConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            network: NetworkConfig::default(),
            ledger: LedgerConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| VotingError::configuration(format!("invalid config TOML: {e}")))
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VotingError::configuration(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| VotingError::serialization(format!("failed to render config: {e}")))
    }

    /// Apply `BALLOT_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_env_from(std::env::vars())
    }

    /// Apply `BALLOT_*` overrides from an explicit variable list
    pub fn merge_env_from<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                ENV_CHAIN_ID => {
                    let id = value.parse::<u64>().map_err(|e| {
                        VotingError::configuration(format!("{ENV_CHAIN_ID}={value:?}: {e}"))
                    })?;
                    self.network.chain_id = ChainId(id);
                }
                ENV_RPC_URL => self.network.rpc_url = value.to_string(),
                ENV_EXPLORER_URL => self.network.explorer_url = value.to_string(),
                ENV_LEDGER_ADDRESS => {
                    self.ledger.address = value.parse().map_err(|e: VotingError| {
                        VotingError::configuration(format!("{ENV_LEDGER_ADDRESS}: {e}"))
                    })?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Defaults, then the optional file, then the environment, then validation
    ///
    /// A given `path` must exist.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }
}

impl ConfigValidation for ClientConfig {
    fn validate(&self) -> Result<()> {
        self.network.validate()?;
        if self.log_filter.trim().is_empty() {
            return Err(VotingError::configuration("log_filter cannot be empty"));
        }
        Ok(())
    }
}
