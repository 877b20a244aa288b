//! Core phase types shared by the coordinator.
//!
//! This module contains the pure building blocks of the state machine:
//! - Phase definitions via the `State` trait
//! - Guard predicates for transition gating
//! - Immutable history tracking
//!
//! Nothing in here touches timers, the network or the renderer.

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_CAPACITY};
pub use state::State;
