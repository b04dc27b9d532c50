//! Collaborators the state store depends on
//!
//! Each trait is an async boundary to the outside world (a wallet, an
//! indexer, the minting backend). The store never calls them itself; the
//! functions in [`effects`] run them and dispatch the outcome as actions.
//!
//! # Example
//!
//! ```no_run
//! use liboke::app::Store;
//! use liboke::services::effects::{connect_wallet, CollectionLoader};
//! use liboke::services::mock::{MockItemSource, MockWallet};
//!
//! # async fn example() -> liboke::Result<()> {
//! let mut store = Store::default();
//! let dispatcher = store.dispatcher();
//!
//! connect_wallet(&dispatcher, &MockWallet::connected("0xabc", 31337)).await;
//! CollectionLoader::new()
//!     .load(&dispatcher, &MockItemSource::new(Vec::new()), Some("0xabc"))
//!     .await;
//!
//! store.drain()?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};
use crate::types::{AssetFile, Item, Web3State};

pub mod effects;
pub mod local_wallet;

// Available outside tests so integration tests and the CLI can use them
pub mod mock;

/// Where the user's collection comes from
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Items owned by `owner` (or the public collection when `None`), in
    /// display order.
    async fn fetch_items(&self, owner: Option<&str>) -> Result<Vec<Item>>;
}

/// Browser-wallet style connection
#[async_trait]
pub trait WalletConnector: Send + Sync {
    async fn connect(&self) -> std::result::Result<Web3State, WalletError>;

    async fn disconnect(&self) -> std::result::Result<Web3State, WalletError>;

    fn name(&self) -> &str;
}

/// Issues new NFT/SBT tokens
#[async_trait]
pub trait MintBackend: Send + Sync {
    async fn mint(&self, request: MintRequest) -> Result<MintReceipt>;
}

/// Everything needed to mint, taken from the frozen modal snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub request_id: String,
    pub file: Option<AssetFile>,
    pub transcript: String,
    /// Email delivery when no wallet is connected
    pub email: Option<String>,
    /// Connected wallet address, if any
    pub recipient: Option<String>,
    pub chain_id: Option<u64>,
}

impl MintRequest {
    /// Minted on the user's behalf and delivered by email
    pub fn is_email_mint(&self) -> bool {
        self.recipient.is_none() && self.email.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub request_id: String,
    pub token_id: Option<u64>,
    pub tx_hash: Option<String>,
}
