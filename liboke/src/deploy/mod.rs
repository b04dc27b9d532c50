//! Contract deployment
//!
//! Deploys the three Oke contracts in order and wires them together:
//!
//! 1. `OkeNFT(name, symbol, admin, erc6551Registry, erc6551Implementation)`
//! 2. `OkeSBT(admin)`
//! 3. `Minter(nft, sbt, admin, feeRecipient, mintFee)`
//! 4. grant `MINTER_ROLE` on both token contracts to the minter
//!
//! Any failing step aborts the run; nothing is retried.

use std::fmt;

use alloy::primitives::{address, Address, Bytes, B256, U256};
use alloy::sol_types::SolValue;
use async_trait::async_trait;

use crate::error::DeployError;

pub mod artifacts;
pub mod chain;
pub mod mock;

pub use artifacts::ArtifactStore;

pub const OKE_NFT: &str = "OkeNFT";
pub const OKE_SBT: &str = "OkeSBT";
pub const MINTER: &str = "Minter";

/// Canonical ERC-6551 registry, same address on every chain
pub const ERC6551_REGISTRY: Address = address!("000000006551c19487814612e58FE06813775758");
pub const ERC6551_ACCOUNT_IMPLEMENTATION: Address =
    address!("5126D4c4f332477655B519695a4152759234B137");

/// 0.01 ether
pub const DEFAULT_MINT_FEE_WEI: u128 = 10_000_000_000_000_000;

/// Constructor parameters of one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    pub nft_name: String,
    pub nft_symbol: String,
    pub erc6551_registry: Address,
    pub erc6551_implementation: Address,
    pub mint_fee: U256,
    /// Defaults to the deployer
    pub admin: Option<Address>,
    /// Defaults to the deployer
    pub fee_recipient: Option<Address>,
    /// Refuse to deploy when the node reports a different chain
    pub expected_chain_id: Option<u64>,
}

impl Default for DeployPlan {
    fn default() -> Self {
        Self {
            nft_name: "Oke NFT".to_string(),
            nft_symbol: "OKE".to_string(),
            erc6551_registry: ERC6551_REGISTRY,
            erc6551_implementation: ERC6551_ACCOUNT_IMPLEMENTATION,
            mint_fee: U256::from(DEFAULT_MINT_FEE_WEI),
            admin: None,
            fee_recipient: None,
            expected_chain_id: None,
        }
    }
}

/// A mined contract creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployed {
    pub address: Address,
    pub tx_hash: B256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReport {
    pub chain_id: u64,
    pub deployer: Address,
    pub deployer_balance: U256,
    pub oke_nft: Deployed,
    pub oke_sbt: Deployed,
    pub minter: Deployed,
    pub nft_grant_tx: B256,
    pub sbt_grant_tx: B256,
}

impl fmt::Display for DeploymentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deployment Summary:")?;
        writeln!(f, "OkeNFT: {}", self.oke_nft.address)?;
        writeln!(f, "OkeSBT: {}", self.oke_sbt.address)?;
        write!(f, "Minter: {}", self.minter.address)
    }
}

/// What the deployment procedure needs from a chain
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Account paying for and signing every transaction
    fn deployer(&self) -> Address;

    /// Chain id reported by the node
    async fn chain_id(&self) -> Result<u64, DeployError>;

    async fn balance(&self, account: Address) -> Result<U256, DeployError>;

    /// Send a contract creation and wait for its receipt.
    async fn deploy(&self, contract: &str, init_code: Bytes) -> Result<Deployed, DeployError>;

    async fn minter_role(&self, label: &str, contract: Address) -> Result<B256, DeployError>;

    /// Returns the hash of the mined grant transaction.
    async fn grant_role(
        &self,
        label: &str,
        contract: Address,
        role: B256,
        account: Address,
    ) -> Result<B256, DeployError>;
}

/// Run the whole deployment against `client`.
pub async fn run_deployment(
    client: &dyn ChainClient,
    artifacts: &ArtifactStore,
    plan: &DeployPlan,
) -> Result<DeploymentReport, DeployError> {
    let deployer = client.deployer();
    let admin = plan.admin.unwrap_or(deployer);
    let fee_recipient = plan.fee_recipient.unwrap_or(deployer);

    // Load every artifact before touching the chain
    let nft_args = (
        plan.nft_name.clone(),
        plan.nft_symbol.clone(),
        admin,
        plan.erc6551_registry,
        plan.erc6551_implementation,
    )
        .abi_encode_params();
    let nft_code = artifacts.init_code(OKE_NFT, &nft_args)?;
    let sbt_code = artifacts.init_code(OKE_SBT, &(admin,).abi_encode_params())?;
    artifacts.load(MINTER)?.creation_code()?;

    let chain_id = client.chain_id().await?;
    if let Some(expected) = plan.expected_chain_id {
        if chain_id != expected {
            return Err(DeployError::ChainMismatch {
                expected,
                found: chain_id,
            });
        }
    }
    tracing::info!(chain_id, "connected to chain");

    let deployer_balance = client.balance(deployer).await?;
    tracing::info!(%deployer, balance = %deployer_balance, "deploying contracts");

    let oke_nft = client.deploy(OKE_NFT, nft_code).await?;
    tracing::info!(address = %oke_nft.address, tx = %oke_nft.tx_hash, "OkeNFT deployed");

    let oke_sbt = client.deploy(OKE_SBT, sbt_code).await?;
    tracing::info!(address = %oke_sbt.address, tx = %oke_sbt.tx_hash, "OkeSBT deployed");

    let minter_args = (
        oke_nft.address,
        oke_sbt.address,
        admin,
        fee_recipient,
        plan.mint_fee,
    )
        .abi_encode_params();
    let minter = client
        .deploy(MINTER, artifacts.init_code(MINTER, &minter_args)?)
        .await?;
    tracing::info!(address = %minter.address, tx = %minter.tx_hash, "Minter deployed");

    let nft_role = client.minter_role(OKE_NFT, oke_nft.address).await?;
    let nft_grant_tx = client
        .grant_role(OKE_NFT, oke_nft.address, nft_role, minter.address)
        .await?;
    tracing::info!(tx = %nft_grant_tx, "granted OkeNFT MINTER_ROLE to Minter");

    let sbt_role = client.minter_role(OKE_SBT, oke_sbt.address).await?;
    let sbt_grant_tx = client
        .grant_role(OKE_SBT, oke_sbt.address, sbt_role, minter.address)
        .await?;
    tracing::info!(tx = %sbt_grant_tx, "granted OkeSBT MINTER_ROLE to Minter");

    Ok(DeploymentReport {
        chain_id,
        deployer,
        deployer_balance,
        oke_nft,
        oke_sbt,
        minter,
        nft_grant_tx,
        sbt_grant_tx,
    })
}
