//! Network parameters and node configuration

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    HALVING_INTERVAL, INITIAL_SUBSIDY, MAX_BLOCK_SIZE, MAX_FUTURE_BLOCK_TIME,
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The chain a block belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Main,
    Testnet,
    Regtest,
}

/// Consensus parameters of a network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    pub network: Network,
    /// Limit on both serialized block size and transaction count
    pub max_block_size: usize,
    /// Blocks between subsidy halvings
    pub halving_interval: i32,
    /// Subsidy at height 0, in base units
    pub initial_subsidy: i64,
    /// Easiest allowed proof-of-work target (compact form)
    pub pow_limit_bits: u32,
    /// Seconds a header timestamp may run ahead of the local clock
    pub max_future_drift: u32,
}

static MAIN_PARAMS: ChainParams = ChainParams {
    network: Network::Main,
    max_block_size: MAX_BLOCK_SIZE,
    halving_interval: HALVING_INTERVAL,
    initial_subsidy: INITIAL_SUBSIDY,
    pow_limit_bits: 0x1d00_ffff,
    max_future_drift: MAX_FUTURE_BLOCK_TIME,
};

static TESTNET_PARAMS: ChainParams = ChainParams {
    network: Network::Testnet,
    max_block_size: MAX_BLOCK_SIZE,
    halving_interval: HALVING_INTERVAL,
    initial_subsidy: INITIAL_SUBSIDY,
    pow_limit_bits: 0x1d00_ffff,
    max_future_drift: MAX_FUTURE_BLOCK_TIME,
};

static REGTEST_PARAMS: ChainParams = ChainParams {
    network: Network::Regtest,
    max_block_size: MAX_BLOCK_SIZE,
    halving_interval: 150,
    initial_subsidy: INITIAL_SUBSIDY,
    pow_limit_bits: 0x207f_ffff,
    max_future_drift: MAX_FUTURE_BLOCK_TIME,
};

impl Network {
    /// Consensus parameters for this network
    pub fn params(self) -> &'static ChainParams {
        match self {
            Network::Main => &MAIN_PARAMS,
            Network::Testnet => &TESTNET_PARAMS,
            Network::Regtest => &REGTEST_PARAMS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" | "mainnet" => Ok(Network::Main),
            "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Storage section of the node configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageConfig {
    /// Directory holding all database files
    pub prefix: PathBuf,
    /// Page cache size in bytes
    pub cache_size: u64,
    /// Background flush period; `None` disables periodic flushing
    pub flush_every_ms: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefix: PathBuf::from("./data"),
            cache_size: 8 << 20,
            flush_every_ms: Some(500),
        }
    }
}

/// Node configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: Network,
    pub storage: StorageConfig,
}

impl Config {
    /// Load a JSON configuration file; missing fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn params(&self) -> &'static ChainParams {
        self.network.params()
    }
}
