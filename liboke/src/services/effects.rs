//! Async effects that report back through the dispatch queue
//!
//! None of these touch the store directly. They enqueue actions on a
//! [`Dispatcher`]; the store's owner applies them with `Store::drain`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{ItemSource, MintBackend, MintRequest, WalletConnector};
use crate::app::{Action, Dispatcher};
use crate::error::{OkeError, Result};
use crate::types::MintingData;

/// Loads the collection, dropping results of superseded fetches
///
/// Every [`CollectionLoader::load`] takes a new generation number before it
/// dispatches `FETCH_ITEMS_START`. When the fetch completes, its outcome is
/// only dispatched if no newer load has started in the meantime.
#[derive(Debug, Clone, Default)]
pub struct CollectionLoader {
    generation: Arc<AtomicU64>,
}

/// What happened to one load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Failed,
    Superseded,
}

impl CollectionLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(
        &self,
        dispatcher: &Dispatcher,
        source: &dyn ItemSource,
        owner: Option<&str>,
    ) -> LoadOutcome {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        dispatcher.dispatch(Action::FetchItemsStart);

        let result = source.fetch_items(owner).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::debug!(ticket, "collection fetch superseded, dropping result");
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(items) => {
                let count = items.len();
                tracing::info!(count, "collection loaded");
                dispatcher.dispatch(Action::FetchItemsSuccess(items));
                LoadOutcome::Loaded(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "collection fetch failed");
                dispatcher.dispatch(Action::SetNetworkError(Some(e.to_string())));
                dispatcher.dispatch(Action::FetchItemsFailure);
                LoadOutcome::Failed
            }
        }
    }
}

/// Connect a wallet; success clears any previous network error.
pub async fn connect_wallet(dispatcher: &Dispatcher, connector: &dyn WalletConnector) -> bool {
    match connector.connect().await {
        Ok(web3_state) => {
            tracing::info!(
                wallet = connector.name(),
                address = web3_state.address().unwrap_or("-"),
                chain_id = ?web3_state.chain_id(),
                "wallet connected"
            );
            dispatcher.dispatch(Action::SetNetworkError(None));
            dispatcher.dispatch(Action::SetWeb3State(web3_state));
            true
        }
        Err(e) => {
            tracing::warn!(wallet = connector.name(), error = %e, "wallet connection failed");
            dispatcher.dispatch(Action::SetNetworkError(Some(e.to_string())));
            false
        }
    }
}

pub async fn disconnect_wallet(dispatcher: &Dispatcher, connector: &dyn WalletConnector) -> bool {
    match connector.disconnect().await {
        Ok(web3_state) => {
            tracing::info!(wallet = connector.name(), "wallet disconnected");
            dispatcher.dispatch(Action::SetWeb3State(web3_state));
            true
        }
        Err(e) => {
            tracing::warn!(wallet = connector.name(), error = %e, "wallet disconnect failed");
            dispatcher.dispatch(Action::SetNetworkError(Some(e.to_string())));
            false
        }
    }
}

/// Build a mint request from the modal snapshot.
///
/// # Errors
///
/// `InvalidInput` when the snapshot has neither a connected wallet nor an
/// email to deliver to, or nothing to mint.
pub fn mint_request_from(snapshot: &MintingData) -> Result<MintRequest> {
    if snapshot.file.is_none() && snapshot.transcript.trim().is_empty() {
        return Err(OkeError::InvalidInput(
            "Nothing to mint: attach a file or write a transcript".to_string(),
        ));
    }

    let recipient = snapshot.web3_state.address().map(str::to_string);
    if recipient.is_none() && snapshot.email.is_none() {
        return Err(OkeError::InvalidInput(
            "Connect a wallet or sign in with email before minting".to_string(),
        ));
    }

    Ok(MintRequest {
        request_id: uuid::Uuid::new_v4().to_string(),
        file: snapshot.file.clone(),
        transcript: snapshot.transcript.clone(),
        email: snapshot.email.clone(),
        recipient,
        chain_id: snapshot.web3_state.chain_id(),
    })
}

/// Submit the mint captured in `snapshot`.
///
/// On success dispatches `MINT_SUCCESS` then `CLEAR_MINT_INTENT`; on
/// failure records the error as the network error.
pub async fn submit_mint(
    dispatcher: &Dispatcher,
    backend: &dyn MintBackend,
    snapshot: &MintingData,
) -> Result<()> {
    let request = match mint_request_from(snapshot) {
        Ok(request) => request,
        Err(e) => {
            dispatcher.dispatch(Action::SetNetworkError(Some(e.to_string())));
            return Err(e);
        }
    };

    let is_email_mint = request.is_email_mint();
    let request_id = request.request_id.clone();
    tracing::info!(request_id = %request_id, is_email_mint, "submitting mint");

    match backend.mint(request).await {
        Ok(receipt) => {
            tracing::info!(
                request_id = %receipt.request_id,
                token_id = ?receipt.token_id,
                tx_hash = ?receipt.tx_hash,
                "mint succeeded"
            );
            dispatcher.dispatch(Action::MintSuccess { is_email_mint });
            dispatcher.dispatch(Action::ClearMintIntent);
            Ok(())
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "mint failed");
            dispatcher.dispatch(Action::SetNetworkError(Some(e.to_string())));
            Err(e)
        }
    }
}
