//! Configuration management for Oke
//!
//! One TOML file drives both the state driver (where drafts are stored)
//! and the deployment procedure (compiler profile, networks, explorer key).
//! Secrets are not stored here: the deployer key comes from `PRIVATE_KEY`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub solidity: SolidityConfig,
    #[serde(default = "default_networks")]
    pub networks: BTreeMap<String, NetworkConfig>,
    #[serde(default)]
    pub explorer: ExplorerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.local/share/oke".to_string(),
        }
    }
}

/// Compiler profile the artifacts were built with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidityConfig {
    pub version: String,
    pub optimizer: bool,
    pub optimizer_runs: u32,
    pub evm_version: String,
}

impl Default for SolidityConfig {
    fn default() -> Self {
        Self {
            version: "0.8.20".to_string(),
            optimizer: true,
            optimizer_runs: 200,
            evm_version: "paris".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub url: String,
    pub chain_id: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub http_headers: BTreeMap<String, String>,
    /// Block explorer key for this network; `[explorer] api_key` otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_api_key: Option<String>,
}

fn default_timeout_ms() -> u64 {
    300_000
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub artifacts: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            artifacts: "./artifacts".to_string(),
        }
    }
}

fn default_networks() -> BTreeMap<String, NetworkConfig> {
    let mut networks = BTreeMap::new();

    let mut sepolia_headers = BTreeMap::new();
    sepolia_headers.insert("Connection".to_string(), "keep-alive".to_string());
    sepolia_headers.insert("Accept".to_string(), "application/json".to_string());
    networks.insert(
        "sepolia".to_string(),
        NetworkConfig {
            url: "https://rpc.sepolia.org".to_string(),
            chain_id: 11_155_111,
            timeout_ms: 300_000,
            http_headers: sepolia_headers,
            explorer_api_key: None,
        },
    );

    networks.insert(
        "mumbai".to_string(),
        NetworkConfig {
            url: "https://rpc-mumbai.maticvigil.com".to_string(),
            chain_id: 80_001,
            timeout_ms: default_timeout_ms(),
            http_headers: BTreeMap::new(),
            explorer_api_key: None,
        },
    );

    networks.insert(
        "hardhat".to_string(),
        NetworkConfig {
            url: "http://127.0.0.1:8545".to_string(),
            chain_id: 31_337,
            timeout_ms: default_timeout_ms(),
            http_headers: BTreeMap::new(),
            explorer_api_key: None,
        },
    );

    networks
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            solidity: SolidityConfig::default(),
            networks: default_networks(),
            explorer: ExplorerConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Config {
    /// Load from the default location, falling back to built-in defaults
    /// when no file exists, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        let config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// Load configuration from a specific path (no environment overrides)
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Apply `OKE_DATA_DIR`, `<NETWORK>_RPC_URL`, `ETHERSCAN_API_KEY` and the
    /// per-network explorer keys (see [`explorer_key_var`]).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("OKE_DATA_DIR") {
            self.storage.data_dir = dir;
        }

        for (name, network) in self.networks.iter_mut() {
            let var = format!("{}_RPC_URL", name.to_uppercase());
            if let Ok(url) = std::env::var(&var) {
                if !url.is_empty() {
                    network.url = url;
                }
            }

            if let Ok(key) = std::env::var(explorer_key_var(name)) {
                if !key.is_empty() {
                    network.explorer_api_key = Some(key);
                }
            }
        }

        if let Ok(key) = std::env::var("ETHERSCAN_API_KEY") {
            self.explorer.api_key = key;
        }

        self
    }

    pub fn network(&self, name: &str) -> Result<&NetworkConfig> {
        self.networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()).into())
    }

    /// Explorer key for `network`, falling back to `[explorer] api_key`
    pub fn explorer_api_key(&self, network: &str) -> Option<&str> {
        self.networks
            .get(network)
            .and_then(|n| n.explorer_api_key.as_deref())
            .or(Some(self.explorer.api_key.as_str()))
            .filter(|key| !key.is_empty())
    }

    /// Data directory with `~` expanded
    pub fn data_dir(&self) -> PathBuf {
        expand_path(&self.storage.data_dir)
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        expand_path(&self.paths.artifacts)
    }
}

/// Environment variable holding the explorer key of `network`
pub fn explorer_key_var(network: &str) -> String {
    match network {
        "sepolia" => "ETHERSCAN_API_KEY".to_string(),
        "mumbai" => "POLYGONSCAN_API_KEY".to_string(),
        other => format!("{}_EXPLORER_API_KEY", other.to_uppercase()),
    }
}

/// Deployer key from `PRIVATE_KEY`, if set and non-empty
pub fn deployer_key_from_env() -> Option<SecretString> {
    std::env::var("PRIVATE_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
        .map(|key| SecretString::from(key.trim().to_string()))
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

/// Config file path: `$OKE_CONFIG`, else the XDG config directory
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("OKE_CONFIG") {
        return Ok(expand_path(&path));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("oke").join("config.toml"))
}
