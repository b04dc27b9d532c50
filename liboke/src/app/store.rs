//! Store: owns the state and applies actions one at a time
//!
//! `Store::dispatch` takes `&mut self`, so two dispatches can never
//! interleave. Async work holds a [`Dispatcher`] instead of the store and
//! enqueues follow-up actions, which the owner applies with
//! [`Store::drain`] from its event loop.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::actions::Action;
use super::reducer::reduce;
use super::state::AppState;
use crate::error::StateError;

/// Callback notified with the new state after every dispatch
pub type Observer = Box<dyn FnMut(&AppState) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Cloneable handle for enqueueing actions from async tasks
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: Sender<Action>,
}

impl Dispatcher {
    /// Queue an action; it is applied on the next [`Store::drain`].
    pub fn dispatch(&self, action: Action) {
        let kind = action.kind();
        if self.tx.send(action).is_err() {
            // Store dropped, nobody left to apply it
            tracing::warn!(action = kind, "store is gone, dropping action");
        }
    }
}

pub struct Store {
    state: AppState,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
    queue_tx: Sender<Action>,
    queue_rx: Receiver<Action>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .field("queued", &self.queue_rx.len())
            .finish()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::new())
    }
}

impl Store {
    pub fn new(initial: AppState) -> Self {
        let (queue_tx, queue_rx) = unbounded();
        Self {
            state: initial,
            observers: Vec::new(),
            next_observer: 0,
            queue_tx,
            queue_rx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher {
            tx: self.queue_tx.clone(),
        }
    }

    /// Register an observer; observers run in subscription order.
    pub fn subscribe(&mut self, observer: Observer) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Apply one action to completion and notify observers.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownItem`] when selecting an item that is
    /// not in the loaded collection. The state is left untouched and no
    /// observer runs.
    pub fn dispatch(&mut self, action: Action) -> Result<&AppState, StateError> {
        self.check(&action)?;

        let kind = action.kind();
        let previous = std::mem::take(&mut self.state);
        self.state = reduce(previous, action);
        tracing::debug!(action = kind, view = %self.state.view, "dispatched");

        for (_, observer) in self.observers.iter_mut() {
            observer(&self.state);
        }

        Ok(&self.state)
    }

    /// Apply every queued action in FIFO order.
    ///
    /// Stops at the first rejected action; actions queued behind it stay
    /// queued.
    pub fn drain(&mut self) -> Result<usize, StateError> {
        let mut applied = 0;
        while let Ok(action) = self.queue_rx.try_recv() {
            self.dispatch(action)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Number of actions waiting for [`Store::drain`]
    pub fn pending(&self) -> usize {
        self.queue_rx.len()
    }

    fn check(&self, action: &Action) -> Result<(), StateError> {
        match action {
            Action::SetSelectedItem(item) if self.state.find_item(&item.id).is_none() => {
                Err(StateError::UnknownItem(item.id.clone()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::View;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_dispatch_updates_state() {
        let mut store = Store::default();
        store.dispatch(Action::SetView(View::Detail)).unwrap();
        assert_eq!(store.state().view, View::Detail);
    }

    #[test]
    fn test_observers_run_in_order_and_see_new_state() {
        let mut store = Store::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            store.subscribe(Box::new(move |state: &AppState| {
                seen.lock().unwrap().push((tag, state.view));
            }));
        }

        store.dispatch(Action::SetView(View::Collection)).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", View::Collection), ("second", View::Collection)]
        );
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = Store::default();
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let id = store.subscribe(Box::new(move |_: &AppState| {
            *counter.lock().unwrap() += 1;
        }));

        store.dispatch(Action::OpenShareModal).unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(Action::CloseShareModal).unwrap();

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_drain_applies_queued_actions_in_order() {
        let mut store = Store::default();
        let dispatcher = store.dispatcher();

        dispatcher.dispatch(Action::FetchItemsStart);
        dispatcher.dispatch(Action::FetchItemsSuccess(Vec::new()));
        assert_eq!(store.pending(), 2);
        assert!(!store.state().is_loading_collection);

        assert_eq!(store.drain().unwrap(), 2);
        assert!(!store.state().is_loading_collection);
        assert_eq!(store.pending(), 0);
    }
}
