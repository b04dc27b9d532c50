//! Application state model
//!
//! - Actions: what can happen
//! - State: what is true right now
//! - Reducer: pure function (State, Action) -> State
//! - Store: owns the state and serializes dispatches

pub mod actions;
pub mod reducer;
pub mod state;
pub mod store;

pub use actions::Action;
pub use reducer::reduce;
pub use state::AppState;
pub use store::{Dispatcher, Observer, ObserverId, Store};
