//! Application state
//!
//! All state transitions happen through the reducer (see `reducer.rs`).

use serde::{Deserialize, Serialize};

use crate::types::{CreatorState, Item, MintingData, MintingStatus, View, Web3State};

/// Root application state
///
/// The single source of truth for the application. Created once with
/// empty defaults and only replaced through [`super::reduce`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub view: View,

    pub web3_state: Web3State,

    /// Set once the user authenticates through the email flow
    pub email: Option<String>,

    /// Fetch order
    pub items: Vec<Item>,

    pub is_loading_collection: bool,

    /// Always one of `items` at the time it was selected
    pub selected_item: Option<Item>,

    pub creator_state: CreatorState,

    pub minting_status: Option<MintingStatus>,

    pub network_error: Option<String>,

    pub minting_data: MintingData,

    pub is_connection_choice_modal_open: bool,

    pub is_share_modal_open: bool,

    pub is_cross_chain_modal_open: bool,

    pub item_to_transfer: Option<Item>,
}

impl AppState {
    /// Create new application state with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Is a mint modal currently showing?
    pub fn is_minting(&self) -> bool {
        self.minting_data.is_open
    }
}
