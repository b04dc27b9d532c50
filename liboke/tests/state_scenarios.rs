//! End-to-end state transitions through the store
//!
//! Drives the store the way the UI does: actions arrive as JSON objects,
//! observers watch the result.

use std::sync::{Arc, Mutex};

use liboke::app::{Action, AppState, Store};
use liboke::error::StateError;
use liboke::types::{
    AssetFile, CreatorState, CreatorStatePatch, Item, ProviderHandle, SignerHandle, View,
    Web3State,
};

fn item(id: &str) -> Item {
    Item {
        id: id.to_string(),
        image: format!("ipfs://{}/image.png", id),
        name: format!("Oke #{}", id),
        description: "A recorded moment".to_string(),
        transcript: "la la la".to_string(),
        token_id: id.parse().unwrap_or(0),
        contract_address: "0x1111111111111111111111111111111111111111".to_string(),
        is_sbt: false,
        external_url: format!("https://oke.example/items/{}", id),
    }
}

fn loaded_store(ids: &[&str]) -> Store {
    let mut store = Store::default();
    store
        .dispatch(Action::FetchItemsSuccess(ids.iter().map(|id| item(id)).collect()))
        .unwrap();
    store
}

#[test]
fn test_failed_fetch_keeps_previous_items() {
    let mut store = loaded_store(&["1", "2"]);
    let before = store.state().items.clone();

    store.dispatch(Action::FetchItemsStart).unwrap();
    assert!(store.state().is_loading_collection);

    store.dispatch(Action::FetchItemsFailure).unwrap();
    assert!(!store.state().is_loading_collection);
    assert_eq!(store.state().items, before);
    // Failure alone does not invent an error message
    assert_eq!(store.state().network_error, None);
}

#[test]
fn test_transcript_patch_from_json() {
    let mut store = Store::default();
    let action =
        Action::from_json(r#"{"type":"UPDATE_CREATOR_STATE","payload":{"transcript":"hello"}}"#)
            .unwrap();

    store.dispatch(action).unwrap();

    assert_eq!(
        store.state().creator_state,
        CreatorState {
            file: None,
            transcript: "hello".to_string(),
            options_checked: false,
        }
    );
}

#[test]
fn test_cross_chain_modal_round_trip() {
    let mut store = Store::default();

    store.dispatch(Action::OpenCrossChainModal(item("1"))).unwrap();
    assert!(store.state().is_cross_chain_modal_open);
    assert_eq!(store.state().item_to_transfer.as_ref().map(|i| i.id.as_str()), Some("1"));

    store.dispatch(Action::CloseCrossChainModal).unwrap();
    assert!(!store.state().is_cross_chain_modal_open);
    assert_eq!(store.state().item_to_transfer, None);
}

#[test]
fn test_start_mint_resumes_draft_exactly() {
    let mut store = Store::default();
    store
        .dispatch(Action::UpdateCreatorState(CreatorStatePatch::transcript("stale")))
        .unwrap();

    let draft = CreatorState {
        file: Some(AssetFile::new("take1.wav", "audio/wav", vec![82, 73, 70, 70])),
        transcript: "T".to_string(),
        options_checked: true,
    };
    store.dispatch(Action::StartMint(Some(draft.clone()))).unwrap();

    assert_eq!(store.state().creator_state, draft);
    assert!(store.state().minting_data.is_open);
    assert_eq!(store.state().minting_data.file, draft.file);
    assert_eq!(store.state().minting_data.transcript, "T");
}

#[test]
fn test_close_mint_modal_is_idempotent() {
    let mut store = Store::default();
    store.dispatch(Action::StartMint(None)).unwrap();

    let once = store.dispatch(Action::CloseMintModal).unwrap().clone();
    let twice = store.dispatch(Action::CloseMintModal).unwrap().clone();
    assert_eq!(once, twice);
    assert!(!twice.minting_data.is_open);
}

#[test]
fn test_web3_state_from_json_keeps_address_and_signer_paired() {
    let mut store = Store::default();
    let connect = r#"{"type":"SET_WEB3_STATE","payload":{
        "address":"0xabc","chainId":11155111,
        "provider":{"endpoint":"injected"},"signer":{"address":"0xabc"}}}"#;
    store.dispatch(Action::from_json(connect).unwrap()).unwrap();
    assert!(store.state().web3_state.is_connected());

    // Address without a signer is not a representable state
    let broken = r#"{"type":"SET_WEB3_STATE","payload":{
        "address":"0xabc","chainId":1,"provider":null,"signer":null}}"#;
    assert!(matches!(
        Action::from_json(broken),
        Err(StateError::MalformedAction(_))
    ));

    store
        .dispatch(Action::SetWeb3State(Web3State::disconnected()))
        .unwrap();
    let web3 = &store.state().web3_state;
    assert_eq!(web3.address().is_none(), web3.signer().is_none());
}

#[test]
fn test_unknown_action_is_rejected() {
    let err = Action::from_json(r#"{"type":"SELF_DESTRUCT"}"#).unwrap_err();
    assert!(matches!(err, StateError::UnknownAction { .. }));
}

#[test]
fn test_selected_item_must_be_loaded() {
    let mut store = loaded_store(&["1", "2"]);
    store.dispatch(Action::SetSelectedItem(item("2"))).unwrap();

    let err = store.dispatch(Action::SetSelectedItem(item("9"))).unwrap_err();
    assert!(matches!(err, StateError::UnknownItem(_)));
    assert_eq!(store.state().selected_item.as_ref().map(|i| i.id.as_str()), Some("2"));
}

#[test]
fn test_observers_see_every_state_in_order() {
    let mut store = Store::default();
    let seen: Arc<Mutex<Vec<View>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    store.subscribe(Box::new(move |state: &AppState| {
        sink.lock().unwrap().push(state.view);
    }));

    for view in [View::Collection, View::Creator, View::Detail] {
        store.dispatch(Action::SetView(view)).unwrap();
    }

    assert_eq!(
        *seen.lock().unwrap(),
        vec![View::Collection, View::Creator, View::Detail]
    );
}

#[test]
fn test_view_change_flow_resets_mint_session() {
    let mut store = Store::default();
    store
        .dispatch(Action::SetWeb3State(Web3State::connected(
            11_155_111,
            ProviderHandle {
                endpoint: "injected".to_string(),
            },
            SignerHandle {
                address: "0xabc".to_string(),
            },
        )))
        .unwrap();
    store
        .dispatch(Action::UpdateCreatorState(CreatorStatePatch::transcript("verse")))
        .unwrap();
    store.dispatch(Action::StartMint(None)).unwrap();
    store
        .dispatch(Action::MintSuccess {
            is_email_mint: false,
        })
        .unwrap();
    store.dispatch(Action::ClearStateForViewChange).unwrap();
    store.dispatch(Action::SetView(View::Collection)).unwrap();

    let state = store.state();
    assert_eq!(state.view, View::Collection);
    assert_eq!(state.creator_state, CreatorState::default());
    assert_eq!(state.minting_status, None);
    assert!(!state.minting_data.is_open);
    // The wallet survives navigation
    assert!(state.web3_state.is_connected());
}
