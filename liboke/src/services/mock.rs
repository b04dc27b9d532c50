//! Mock collaborators for testing
//!
//! Configurable stand-ins for the wallet, item source and mint backend
//! that can simulate successes, failures and latency without a browser
//! wallet or network access.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::{ItemSource, MintBackend, MintReceipt, MintRequest, WalletConnector};
use crate::error::{OkeError, Result, WalletError};
use crate::types::{Item, ProviderHandle, SignerHandle, Web3State};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// One scripted reply of a [`MockItemSource`]
#[derive(Debug, Clone)]
pub struct ScriptedFetch {
    pub delay: Duration,
    pub result: std::result::Result<Vec<Item>, String>,
}

/// Item source returning fixed or scripted results
#[derive(Debug, Clone)]
pub struct MockItemSource {
    fallback: ScriptedFetch,
    script: Arc<Mutex<VecDeque<ScriptedFetch>>>,
    calls: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockItemSource {
    /// Always returns `items`
    pub fn new(items: Vec<Item>) -> Self {
        Self::with_fallback(ScriptedFetch {
            delay: Duration::ZERO,
            result: Ok(items),
        })
    }

    /// Always fails with a network error
    pub fn failing(error: &str) -> Self {
        Self::with_fallback(ScriptedFetch {
            delay: Duration::ZERO,
            result: Err(error.to_string()),
        })
    }

    fn with_fallback(fallback: ScriptedFetch) -> Self {
        Self {
            fallback,
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a reply; queued replies are used before the fallback.
    pub fn push(&self, fetch: ScriptedFetch) {
        lock(&self.script).push_back(fetch);
    }

    /// Owners passed to each call, in call order
    pub fn calls(&self) -> Vec<Option<String>> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ItemSource for MockItemSource {
    async fn fetch_items(&self, owner: Option<&str>) -> Result<Vec<Item>> {
        lock(&self.calls).push(owner.map(str::to_string));

        let fetch = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        if !fetch.delay.is_zero() {
            sleep(fetch.delay).await;
        }
        fetch.result.map_err(OkeError::Network)
    }
}

/// Wallet that connects to a fixed account or fails
#[derive(Debug, Clone)]
pub struct MockWallet {
    outcome: std::result::Result<Web3State, WalletError>,
    connects: Arc<Mutex<usize>>,
}

impl MockWallet {
    pub fn connected(address: &str, chain_id: u64) -> Self {
        let state = Web3State::connected(
            chain_id,
            ProviderHandle {
                endpoint: "mock://provider".to_string(),
            },
            SignerHandle {
                address: address.to_string(),
            },
        );
        Self {
            outcome: Ok(state),
            connects: Arc::new(Mutex::new(0)),
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            outcome: Err(WalletError::Rejected(reason.to_string())),
            connects: Arc::new(Mutex::new(0)),
        }
    }

    pub fn connect_count(&self) -> usize {
        *lock(&self.connects)
    }
}

#[async_trait]
impl WalletConnector for MockWallet {
    async fn connect(&self) -> std::result::Result<Web3State, WalletError> {
        *lock(&self.connects) += 1;
        self.outcome.clone()
    }

    async fn disconnect(&self) -> std::result::Result<Web3State, WalletError> {
        Ok(Web3State::disconnected())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mint backend that records requests
#[derive(Debug, Clone)]
pub struct MockMintBackend {
    error: Option<String>,
    requests: Arc<Mutex<Vec<MintRequest>>>,
}

impl MockMintBackend {
    pub fn success() -> Self {
        Self {
            error: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failure(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<MintRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl MintBackend for MockMintBackend {
    async fn mint(&self, request: MintRequest) -> Result<MintReceipt> {
        let mut requests = lock(&self.requests);
        requests.push(request.clone());

        match &self.error {
            Some(error) => Err(OkeError::Network(error.clone())),
            None => Ok(MintReceipt {
                request_id: request.request_id,
                token_id: Some(requests.len() as u64),
                tx_hash: None,
            }),
        }
    }
}
