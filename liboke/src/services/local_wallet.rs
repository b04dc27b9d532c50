//! Wallet backed by a local private key and a JSON-RPC endpoint

use async_trait::async_trait;
use secrecy::SecretString;

use super::WalletConnector;
use crate::config::NetworkConfig;
use crate::deploy::chain;
use crate::deploy::ChainClient;
use crate::error::{DeployError, WalletError};
use crate::types::{ProviderHandle, SignerHandle, Web3State};

/// Connects by asking the configured node for its chain id
pub struct LocalKeyWallet {
    network_name: String,
    network: NetworkConfig,
    key: SecretString,
}

impl LocalKeyWallet {
    pub fn new(network_name: &str, network: NetworkConfig, key: SecretString) -> Self {
        Self {
            network_name: network_name.to_string(),
            network,
            key,
        }
    }
}

impl std::fmt::Debug for LocalKeyWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyWallet")
            .field("network", &self.network_name)
            .field("url", &self.network.url)
            .finish_non_exhaustive()
    }
}

fn wallet_error(e: DeployError) -> WalletError {
    match e {
        DeployError::InvalidKey(reason) => WalletError::Unavailable(reason),
        other => WalletError::Network(other.to_string()),
    }
}

#[async_trait]
impl WalletConnector for LocalKeyWallet {
    async fn connect(&self) -> Result<Web3State, WalletError> {
        let client = chain::connect(&self.network, &self.key).map_err(wallet_error)?;
        let chain_id = client.chain_id().await.map_err(wallet_error)?;

        if chain_id != self.network.chain_id {
            return Err(WalletError::Network(format!(
                "{} expects chain {} but the node reports {}",
                self.network_name, self.network.chain_id, chain_id
            )));
        }

        Ok(Web3State::connected(
            chain_id,
            ProviderHandle {
                endpoint: self.network.url.clone(),
            },
            SignerHandle {
                address: client.deployer().to_string(),
            },
        ))
    }

    async fn disconnect(&self) -> Result<Web3State, WalletError> {
        Ok(Web3State::disconnected())
    }

    fn name(&self) -> &str {
        &self.network_name
    }
}
