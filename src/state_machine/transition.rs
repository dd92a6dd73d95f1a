//! Pure state transition function
//!
//! One turn: user message, model call, at most `max_tool_rounds` rounds of
//! serial tool execution each followed by another model call, then the
//! answer.

use super::{Effect, Event, TurnContext, TurnState};
use crate::llm::{ChatMessage, LlmResponse};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Agent is busy, cannot accept message until the current turn finishes")]
    AgentBusy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &TurnState,
    context: &TurnContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // User Message Handling
        // ============================================================
        (TurnState::Idle, Event::UserMessage { text }) => {
            Ok(TransitionResult::new(TurnState::LlmRequesting { tool_rounds: 0 })
                .with_effect(Effect::append(ChatMessage::user(text)))
                .with_effect(Effect::RequestLlm))
        }

        (TurnState::LlmRequesting { .. } | TurnState::ToolExecuting { .. }, Event::UserMessage { .. }) => {
            Err(TransitionError::AgentBusy)
        }

        // ============================================================
        // LLM Response Processing
        // ============================================================

        // Tool calls within the round budget -> execute the first one
        (TurnState::LlmRequesting { tool_rounds }, Event::LlmResponse(response))
            if response.has_tool_calls() && *tool_rounds < context.max_tool_rounds =>
        {
            let mut calls = response.tool_calls.into_iter();
            let Some(first) = calls.next() else {
                return Err(TransitionError::InvalidTransition(
                    "tool round started without tool calls".to_string(),
                ));
            };

            Ok(TransitionResult::new(TurnState::ToolExecuting {
                current: first.clone(),
                remaining: calls.collect(),
                tool_rounds: *tool_rounds,
            })
            .with_effect(Effect::execute_tool(first)))
        }

        // No tool calls, or the round budget is spent -> final answer
        (TurnState::LlmRequesting { .. }, Event::LlmResponse(response)) => {
            Ok(finish_turn(&response))
        }

        // Model call failed -> abandon the turn
        (TurnState::LlmRequesting { .. }, Event::LlmError(error)) => {
            Ok(TransitionResult::new(TurnState::Idle).with_effect(Effect::AbandonTurn(error)))
        }

        // ============================================================
        // Tool Execution
        // ============================================================
        (
            TurnState::ToolExecuting {
                current,
                remaining,
                tool_rounds,
            },
            Event::ToolComplete { name, result },
        ) if name == current.name => {
            let append = Effect::append(ChatMessage::tool(name, result.into_string()));

            match remaining.split_first() {
                // More tools -> next one
                Some((next, rest)) => Ok(TransitionResult::new(TurnState::ToolExecuting {
                    current: next.clone(),
                    remaining: rest.to_vec(),
                    tool_rounds: *tool_rounds,
                })
                .with_effect(append)
                .with_effect(Effect::execute_tool(next.clone()))),

                // Last tool -> all results are in history, call the model again
                None => Ok(TransitionResult::new(TurnState::LlmRequesting {
                    tool_rounds: tool_rounds + 1,
                })
                .with_effect(append)
                .with_effect(Effect::RequestLlm)),
            }
        }

        (TurnState::ToolExecuting { current, .. }, Event::ToolComplete { name, .. }) => {
            Err(TransitionError::InvalidTransition(format!(
                "result for tool {name} while executing {}",
                current.name
            )))
        }

        // ============================================================
        // Everything else
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{state:?} cannot handle {event:?}"
        ))),
    }
}

fn finish_turn(response: &LlmResponse) -> TransitionResult {
    let text = response.text().to_string();
    TransitionResult::new(TurnState::Idle)
        .with_effect(Effect::append(ChatMessage::assistant(text.clone())))
        .with_effect(Effect::Answer {
            text,
            ignored_tool_calls: response.tool_calls.len(),
        })
}
