//! alloy-backed [`ChainClient`]

use std::future::Future;
use std::time::Duration;

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, B256, U256},
    providers::{Provider, ProviderBuilder},
    rpc::{client::RpcClient, types::TransactionRequest},
    signers::local::PrivateKeySigner,
    sol,
    transports::http::{
        reqwest::{
            self,
            header::{HeaderMap, HeaderName, HeaderValue},
            Url,
        },
        Http,
    },
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::{ChainClient, Deployed};
use crate::config::NetworkConfig;
use crate::error::DeployError;

sol! {
    #[sol(rpc)]
    interface IMinterRoles {
        function MINTER_ROLE() external view returns (bytes32);
        function grantRole(bytes32 role, address account) external;
    }
}

pub type HttpTransport = Http<reqwest::Client>;

/// Signs with a local key and talks to one JSON-RPC endpoint
pub struct AlloyChainClient<P> {
    provider: P,
    deployer: Address,
    endpoint: String,
    timeout: Duration,
}

impl<P> std::fmt::Debug for AlloyChainClient<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloyChainClient")
            .field("deployer", &self.deployer)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub fn parse_signer(key: &SecretString) -> Result<PrivateKeySigner, DeployError> {
    key.expose_secret()
        .parse::<PrivateKeySigner>()
        .map_err(|e| DeployError::InvalidKey(e.to_string()))
}

fn rpc_err<E: std::fmt::Display>(step: &str) -> impl FnOnce(E) -> DeployError + '_ {
    move |e| DeployError::Rpc {
        step: step.to_string(),
        reason: e.to_string(),
    }
}

fn http_client(network: &NetworkConfig) -> Result<reqwest::Client, DeployError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &network.http_headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(rpc_err("configure headers"))?;
        let value = HeaderValue::from_str(value).map_err(rpc_err("configure headers"))?;
        headers.insert(name, value);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(rpc_err("build HTTP client"))
}

/// Build a signing client for `network`.
pub fn connect(
    network: &NetworkConfig,
    key: &SecretString,
) -> Result<AlloyChainClient<impl Provider<HttpTransport> + Clone + 'static>, DeployError> {
    let signer = parse_signer(key)?;
    let deployer = signer.address();

    let url: Url = network.url.parse().map_err(rpc_err("parse RPC URL"))?;
    let transport = Http::with_client(http_client(network)?, url);
    let rpc = RpcClient::new(transport, false);

    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::from(signer))
        .on_client(rpc);

    Ok(AlloyChainClient {
        provider,
        deployer,
        endpoint: network.url.clone(),
        timeout: Duration::from_millis(network.timeout_ms),
    })
}

impl<P> AlloyChainClient<P>
where
    P: Provider<HttpTransport> + Clone,
{
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn timed<T, F>(&self, step: &str, fut: F) -> Result<T, DeployError>
    where
        F: Future<Output = Result<T, DeployError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| DeployError::Timeout {
                step: step.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            })?
    }
}

#[async_trait]
impl<P> ChainClient for AlloyChainClient<P>
where
    P: Provider<HttpTransport> + Clone,
{
    fn deployer(&self) -> Address {
        self.deployer
    }

    async fn chain_id(&self) -> Result<u64, DeployError> {
        let step = "read chain id";
        self.timed(step, async {
            self.provider.get_chain_id().await.map_err(rpc_err(step))
        })
        .await
    }

    async fn balance(&self, account: Address) -> Result<U256, DeployError> {
        let step = "read balance";
        self.timed(step, async {
            self.provider.get_balance(account).await.map_err(rpc_err(step))
        })
        .await
    }

    async fn deploy(&self, contract: &str, init_code: Bytes) -> Result<Deployed, DeployError> {
        let step = format!("deploy {}", contract);
        self.timed(&step, async {
            let tx = TransactionRequest::default().with_deploy_code(init_code);
            let pending = self
                .provider
                .send_transaction(tx)
                .await
                .map_err(rpc_err(&step))?;
            let receipt = pending.get_receipt().await.map_err(rpc_err(&step))?;

            if !receipt.status() {
                return Err(DeployError::Reverted {
                    step: step.clone(),
                    tx_hash: receipt.transaction_hash.to_string(),
                });
            }

            let address = receipt
                .contract_address
                .ok_or_else(|| DeployError::MissingContractAddress(contract.to_string()))?;

            Ok(Deployed {
                address,
                tx_hash: receipt.transaction_hash,
            })
        })
        .await
    }

    async fn minter_role(&self, label: &str, contract: Address) -> Result<B256, DeployError> {
        let step = format!("read {} MINTER_ROLE", label);
        self.timed(&step, async {
            let instance = IMinterRoles::new(contract, self.provider.clone());
            let role = instance
                .MINTER_ROLE()
                .call()
                .await
                .map_err(rpc_err(&step))?
                ._0;
            Ok(role)
        })
        .await
    }

    async fn grant_role(
        &self,
        label: &str,
        contract: Address,
        role: B256,
        account: Address,
    ) -> Result<B256, DeployError> {
        let step = format!("grant {} MINTER_ROLE", label);
        self.timed(&step, async {
            let instance = IMinterRoles::new(contract, self.provider.clone());
            let pending = instance
                .grantRole(role, account)
                .send()
                .await
                .map_err(rpc_err(&step))?;
            let receipt = pending.get_receipt().await.map_err(rpc_err(&step))?;

            if !receipt.status() {
                return Err(DeployError::Reverted {
                    step: step.clone(),
                    tx_hash: receipt.transaction_hash.to_string(),
                });
            }
            Ok(receipt.transaction_hash)
        })
        .await
    }
}
