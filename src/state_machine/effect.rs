//! Effects produced by state transitions

use crate::llm::{ChatMessage, LlmError, ToolCallRequest};

/// Effects to be executed after state transition, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the conversation history
    AppendMessage(ChatMessage),

    /// Call the model with the full history and the tool catalog
    RequestLlm,

    /// Execute one tool call
    ExecuteTool { call: ToolCallRequest },

    /// Surface the final answer of the turn
    Answer {
        text: String,
        /// Tool calls in the final response that were not executed because
        /// the round limit was reached
        ignored_tool_calls: usize,
    },

    /// Give up on the turn and report the error
    AbandonTurn(LlmError),
}

impl Effect {
    pub fn append(message: ChatMessage) -> Self {
        Effect::AppendMessage(message)
    }

    pub fn execute_tool(call: ToolCallRequest) -> Self {
        Effect::ExecuteTool { call }
    }
}
