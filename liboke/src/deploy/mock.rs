//! In-memory chain for exercising the deployment procedure

use std::sync::Mutex;

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use async_trait::async_trait;

use super::{ChainClient, Deployed};
use crate::error::DeployError;

/// One call made against a [`RecordingChain`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCall {
    ChainId,
    Balance(Address),
    Deploy { contract: String, init_code: Bytes },
    MinterRole { label: String, contract: Address },
    GrantRole { label: String, contract: Address, role: B256, account: Address },
}

/// Assigns sequential addresses to deployments and records every call.
///
/// `revert_step` makes the step with that label revert, e.g. `"deploy Minter"`
/// or `"grant OkeSBT MINTER_ROLE"`.
#[derive(Debug)]
pub struct RecordingChain {
    deployer: Address,
    chain_id: u64,
    balance: U256,
    revert_step: Option<String>,
    calls: Mutex<Vec<ChainCall>>,
}

impl RecordingChain {
    pub fn new(deployer: Address) -> Self {
        Self {
            deployer,
            chain_id: 31_337,
            balance: U256::from(10u64).pow(U256::from(18u64)),
            revert_step: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn reverting_at(mut self, step: &str) -> Self {
        self.revert_step = Some(step.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ChainCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// `keccak256("MINTER_ROLE")`, as OpenZeppelin defines it
    pub fn minter_role_id() -> B256 {
        keccak256("MINTER_ROLE")
    }

    fn record(&self, call: ChainCall) -> usize {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.push(call);
        calls.len()
    }

    fn check(&self, step: String, seq: usize) -> Result<(), DeployError> {
        if self.revert_step.as_deref() == Some(step.as_str()) {
            return Err(DeployError::Reverted {
                step,
                tx_hash: B256::with_last_byte(seq as u8).to_string(),
            });
        }
        Ok(())
    }

    fn deployed_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|call| matches!(call, ChainCall::Deploy { .. }))
            .count()
    }
}

#[async_trait]
impl ChainClient for RecordingChain {
    fn deployer(&self) -> Address {
        self.deployer
    }

    async fn chain_id(&self) -> Result<u64, DeployError> {
        self.record(ChainCall::ChainId);
        Ok(self.chain_id)
    }

    async fn balance(&self, account: Address) -> Result<U256, DeployError> {
        self.record(ChainCall::Balance(account));
        Ok(self.balance)
    }

    async fn deploy(&self, contract: &str, init_code: Bytes) -> Result<Deployed, DeployError> {
        let seq = self.record(ChainCall::Deploy {
            contract: contract.to_string(),
            init_code,
        });
        self.check(format!("deploy {}", contract), seq)?;

        Ok(Deployed {
            address: Address::with_last_byte(0x10 + self.deployed_count() as u8),
            tx_hash: B256::with_last_byte(seq as u8),
        })
    }

    async fn minter_role(&self, label: &str, contract: Address) -> Result<B256, DeployError> {
        let seq = self.record(ChainCall::MinterRole {
            label: label.to_string(),
            contract,
        });
        self.check(format!("read {} MINTER_ROLE", label), seq)?;
        Ok(Self::minter_role_id())
    }

    async fn grant_role(
        &self,
        label: &str,
        contract: Address,
        role: B256,
        account: Address,
    ) -> Result<B256, DeployError> {
        let seq = self.record(ChainCall::GrantRole {
            label: label.to_string(),
            contract,
            role,
            account,
        });
        self.check(format!("grant {} MINTER_ROLE", label), seq)?;
        Ok(B256::with_last_byte(seq as u8))
    }
}
