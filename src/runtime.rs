//! Runtime for executing conversation turns
//!
//! The executor drives the pure state machine, performing its effects
//! against the chat model and the tool executor one at a time.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;
pub use traits::*;

use crate::llm::LlmError;
use crate::state_machine::TransitionError;
use thiserror::Error;

/// Why a turn ended without an answer
#[derive(Debug, Error)]
pub enum TurnError {
    /// The model call failed; the turn is abandoned
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),
    /// The state machine rejected an event
    #[error(transparent)]
    Transition(#[from] TransitionError),
    /// The effects ran out before an answer was produced
    #[error("Turn ended without an answer")]
    NoAnswer,
}
