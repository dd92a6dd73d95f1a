//! Turn state types

use crate::llm::ToolCallRequest;

/// Where the current turn stands
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TurnState {
    /// Ready for user input, no pending operations
    #[default]
    Idle,

    /// Model call in flight
    LlmRequesting {
        /// Tool rounds already completed in this turn
        tool_rounds: u32,
    },

    /// Executing the model's tool calls serially, in the order requested
    ToolExecuting {
        /// The tool call being executed
        current: ToolCallRequest,
        /// Calls to execute after the current one completes
        remaining: Vec<ToolCallRequest>,
        /// Tool rounds completed before this one
        tool_rounds: u32,
    },
}

impl TurnState {
    pub fn is_idle(&self) -> bool {
        matches!(self, TurnState::Idle)
    }
}

/// Context for a conversation (immutable configuration)
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub model_id: String,
    /// Tool rounds allowed per turn before the model's answer is taken as final
    pub max_tool_rounds: u32,
}

impl TurnContext {
    pub fn new(model_id: impl Into<String>, max_tool_rounds: u32) -> Self {
        Self {
            model_id: model_id.into(),
            max_tool_rounds,
        }
    }
}
