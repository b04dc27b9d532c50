//! Pure reducer function for state transitions
//!
//! `(State, Action) -> State`. No I/O, no logging, no clock: wallet
//! connections, fetches and mints run elsewhere and report back by
//! dispatching more actions.

use super::actions::Action;
use super::state::AppState;
use crate::types::{MintingData, MintingStatus};

pub const EMAIL_MINT_MESSAGE: &str =
    "Mint accepted! Your token will be delivered to your email address.";
pub const WALLET_MINT_MESSAGE: &str = "Mint successful! Your token is now in your wallet.";

/// Pure reducer function
///
/// Takes current state and an action, returns new state. Deterministic and
/// total: every action yields a state.
pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        // === Navigation ===
        Action::SetView(view) => AppState { view, ..state },

        Action::SetViewAndEmail { view, email } => AppState {
            view,
            email: Some(email),
            ..state
        },

        // === Wallet ===
        Action::SetWeb3State(web3_state) => AppState { web3_state, ..state },

        Action::SetNetworkError(network_error) => AppState {
            network_error,
            ..state
        },

        // === Collection ===
        Action::SetSelectedItem(item) => {
            // Store the collection's own copy; unknown ids leave the selection alone.
            let selected = state.find_item(&item.id).cloned();
            match selected {
                Some(selected) => AppState {
                    selected_item: Some(selected),
                    ..state
                },
                None => state,
            }
        }

        Action::FetchItemsStart => AppState {
            is_loading_collection: true,
            ..state
        },

        Action::FetchItemsSuccess(items) => {
            // The selection must stay a member of the loaded collection
            let selected_item = state
                .selected_item
                .as_ref()
                .and_then(|selected| items.iter().find(|item| item.id == selected.id))
                .cloned();
            AppState {
                items,
                selected_item,
                is_loading_collection: false,
                ..state
            }
        }

        Action::FetchItemsFailure => AppState {
            is_loading_collection: false,
            ..state
        },

        // === Creator / minting ===
        Action::UpdateCreatorState(patch) => AppState {
            creator_state: state.creator_state.merged(patch),
            ..state
        },

        Action::ClearMintIntent => AppState {
            minting_data: MintingData::default(),
            ..state
        },

        Action::StartMint(resume) => {
            let creator_state = resume.unwrap_or(state.creator_state);
            let minting_data = MintingData {
                is_open: true,
                file: creator_state.file.clone(),
                transcript: creator_state.transcript.clone(),
                email: state.email.clone(),
                web3_state: state.web3_state.clone(),
            };
            AppState {
                creator_state,
                minting_data,
                ..state
            }
        }

        Action::CloseMintModal => AppState {
            minting_data: MintingData {
                is_open: false,
                ..state.minting_data
            },
            ..state
        },

        Action::MintSuccess { is_email_mint } => {
            let message = if is_email_mint {
                EMAIL_MINT_MESSAGE
            } else {
                WALLET_MINT_MESSAGE
            };
            AppState {
                minting_status: Some(MintingStatus::success(message)),
                ..state
            }
        }

        Action::ClearStateForViewChange => AppState {
            creator_state: Default::default(),
            minting_status: None,
            network_error: None,
            minting_data: MintingData::default(),
            ..state
        },

        // === Modals ===
        Action::OpenConnectionChoiceModal => AppState {
            is_connection_choice_modal_open: true,
            ..state
        },

        Action::CloseConnectionChoiceModal => AppState {
            is_connection_choice_modal_open: false,
            ..state
        },

        Action::OpenShareModal => AppState {
            is_share_modal_open: true,
            ..state
        },

        Action::CloseShareModal => AppState {
            is_share_modal_open: false,
            ..state
        },

        Action::OpenCrossChainModal(item) => AppState {
            item_to_transfer: Some(item),
            is_cross_chain_modal_open: true,
            ..state
        },

        Action::CloseCrossChainModal => AppState {
            item_to_transfer: None,
            is_cross_chain_modal_open: false,
            ..state
        },
    }
}
