//! Actions for the reducer pattern
//!
//! Every state transition is described by one [`Action`]. On the wire an
//! action is `{"type": "SET_VIEW", "payload": ...}`, matching the web front
//! end's action objects.

use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::types::{CreatorState, CreatorStatePatch, Item, View, Web3State};

/// Actions that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    // === Navigation ===
    SetView(View),

    /// Sets both fields or neither
    SetViewAndEmail { view: View, email: String },

    // === Wallet ===
    SetWeb3State(Web3State),

    SetNetworkError(Option<String>),

    // === Collection ===
    /// Must name an item present in the loaded collection
    SetSelectedItem(Item),

    FetchItemsStart,

    FetchItemsSuccess(Vec<Item>),

    /// Keeps the previously loaded items
    FetchItemsFailure,

    // === Creator / minting ===
    UpdateCreatorState(CreatorStatePatch),

    ClearMintIntent,

    /// Opens the mint modal; a payload resumes a persisted draft
    StartMint(Option<CreatorState>),

    CloseMintModal,

    MintSuccess {
        #[serde(rename = "isEmailMint")]
        is_email_mint: bool,
    },

    ClearStateForViewChange,

    // === Modals ===
    OpenConnectionChoiceModal,
    CloseConnectionChoiceModal,
    OpenShareModal,
    CloseShareModal,
    OpenCrossChainModal(Item),
    CloseCrossChainModal,
}

impl Action {
    /// Every wire name, in declaration order
    pub const KINDS: [&'static str; 20] = [
        "SET_VIEW",
        "SET_VIEW_AND_EMAIL",
        "SET_WEB3_STATE",
        "SET_NETWORK_ERROR",
        "SET_SELECTED_ITEM",
        "FETCH_ITEMS_START",
        "FETCH_ITEMS_SUCCESS",
        "FETCH_ITEMS_FAILURE",
        "UPDATE_CREATOR_STATE",
        "CLEAR_MINT_INTENT",
        "START_MINT",
        "CLOSE_MINT_MODAL",
        "MINT_SUCCESS",
        "CLEAR_STATE_FOR_VIEW_CHANGE",
        "OPEN_CONNECTION_CHOICE_MODAL",
        "CLOSE_CONNECTION_CHOICE_MODAL",
        "OPEN_SHARE_MODAL",
        "CLOSE_SHARE_MODAL",
        "OPEN_CROSS_CHAIN_MODAL",
        "CLOSE_CROSS_CHAIN_MODAL",
    ];

    /// Wire name of this action
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SetView(_) => "SET_VIEW",
            Action::SetViewAndEmail { .. } => "SET_VIEW_AND_EMAIL",
            Action::SetWeb3State(_) => "SET_WEB3_STATE",
            Action::SetNetworkError(_) => "SET_NETWORK_ERROR",
            Action::SetSelectedItem(_) => "SET_SELECTED_ITEM",
            Action::FetchItemsStart => "FETCH_ITEMS_START",
            Action::FetchItemsSuccess(_) => "FETCH_ITEMS_SUCCESS",
            Action::FetchItemsFailure => "FETCH_ITEMS_FAILURE",
            Action::UpdateCreatorState(_) => "UPDATE_CREATOR_STATE",
            Action::ClearMintIntent => "CLEAR_MINT_INTENT",
            Action::StartMint(_) => "START_MINT",
            Action::CloseMintModal => "CLOSE_MINT_MODAL",
            Action::MintSuccess { .. } => "MINT_SUCCESS",
            Action::ClearStateForViewChange => "CLEAR_STATE_FOR_VIEW_CHANGE",
            Action::OpenConnectionChoiceModal => "OPEN_CONNECTION_CHOICE_MODAL",
            Action::CloseConnectionChoiceModal => "CLOSE_CONNECTION_CHOICE_MODAL",
            Action::OpenShareModal => "OPEN_SHARE_MODAL",
            Action::CloseShareModal => "CLOSE_SHARE_MODAL",
            Action::OpenCrossChainModal(_) => "OPEN_CROSS_CHAIN_MODAL",
            Action::CloseCrossChainModal => "CLOSE_CROSS_CHAIN_MODAL",
        }
    }

    /// Decode one action from JSON.
    ///
    /// An unrecognized `type` is reported as [`StateError::UnknownAction`];
    /// a known type with a bad payload as [`StateError::MalformedAction`].
    pub fn from_json(input: &str) -> Result<Self, StateError> {
        let value: serde_json::Value = serde_json::from_str(input)
            .map_err(|e| StateError::MalformedAction(e.to_string()))?;

        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| StateError::MalformedAction("missing string field 'type'".to_string()))?
            .to_string();

        serde_json::from_value(value).map_err(|e| {
            if Self::is_known_kind(&kind) {
                StateError::MalformedAction(format!("{}: {}", kind, e))
            } else {
                StateError::UnknownAction {
                    kind,
                    detail: e.to_string(),
                }
            }
        })
    }

    fn is_known_kind(kind: &str) -> bool {
        Self::KINDS.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_payload_less_action() {
        let action = Action::from_json(r#"{"type":"FETCH_ITEMS_START"}"#).unwrap();
        assert_eq!(action, Action::FetchItemsStart);
    }

    #[test]
    fn test_decode_set_view() {
        let action = Action::from_json(r#"{"type":"SET_VIEW","payload":"midori_card"}"#).unwrap();
        assert_eq!(action, Action::SetView(View::MidoriCard));
    }

    #[test]
    fn test_decode_set_view_and_email() {
        let action = Action::from_json(
            r#"{"type":"SET_VIEW_AND_EMAIL","payload":{"view":"creator","email":"a@b.c"}}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            Action::SetViewAndEmail {
                view: View::Creator,
                email: "a@b.c".to_string()
            }
        );
    }

    #[test]
    fn test_decode_mint_success_flag() {
        let action =
            Action::from_json(r#"{"type":"MINT_SUCCESS","payload":{"isEmailMint":true}}"#).unwrap();
        assert_eq!(action, Action::MintSuccess { is_email_mint: true });
    }

    #[test]
    fn test_unknown_kind_is_rejected_by_name() {
        let err = Action::from_json(r#"{"type":"SELF_DESTRUCT"}"#).unwrap_err();
        match err {
            StateError::UnknownAction { kind, .. } => assert_eq!(kind, "SELF_DESTRUCT"),
            other => panic!("Expected UnknownAction, got {:?}", other),
        }
    }

    #[test]
    fn test_known_kind_with_bad_payload_is_malformed() {
        let err = Action::from_json(r#"{"type":"SET_VIEW","payload":"settings"}"#).unwrap_err();
        assert!(matches!(err, StateError::MalformedAction(_)));
    }

    #[test]
    fn test_missing_type_is_malformed() {
        let err = Action::from_json(r#"{"payload":1}"#).unwrap_err();
        assert!(matches!(err, StateError::MalformedAction(_)));
    }

    #[test]
    fn test_kind_matches_serialized_tag() {
        let actions = vec![
            Action::CloseMintModal,
            Action::SetNetworkError(None),
            Action::MintSuccess { is_email_mint: false },
            Action::UpdateCreatorState(CreatorStatePatch::transcript("x")),
        ];
        for action in actions {
            let value = serde_json::to_value(&action).unwrap();
            assert_eq!(value["type"], action.kind());
            assert!(Action::is_known_kind(action.kind()));
        }
    }
}
