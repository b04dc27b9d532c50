//! Oke - application state and contract tooling for the Oke minting app
//!
//! The core is a single [`app::Store`] holding [`AppState`]. Every change
//! goes through [`app::reduce`]; async collaborators (wallet, collection
//! indexer, mint backend) report back by dispatching actions.

pub mod app;
pub mod config;
pub mod deploy;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use app::{reduce, Action, AppState, Dispatcher, Store};
pub use config::Config;
pub use error::{OkeError, Result};
pub use persistence::{CreatorStore, FileCreatorStore, MemoryCreatorStore};
pub use types::{
    AssetFile, CreatorState, CreatorStatePatch, Item, MintingData, MintingStatus, View, Web3State,
};
