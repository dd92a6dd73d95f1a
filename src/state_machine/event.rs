//! Events that can occur during a turn

use crate::llm::{LlmError, LlmResponse};
use crate::tools::ToolResult;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserMessage { text: String },

    // LLM events
    LlmResponse(LlmResponse),
    LlmError(LlmError),

    // Tool events
    ToolComplete { name: String, result: ToolResult },
}
