//! Tools the model can call
//!
//! Each tool decodes its own typed input from the model's argument object
//! and reports failure through `ToolError`. The registry is the only place
//! where outcomes are collapsed into the string that goes back to the model.

mod stock_price;

pub use stock_price::StockPriceTool;

use crate::config::Config;
use crate::llm::ToolDefinition;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result text used when the model asks for a tool that is not registered
pub const TOOL_NOT_FOUND: &str = "Tool not found";

/// Failure of a single tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// The arguments did not decode into the tool's input type
    #[error("Invalid arguments: {0}")]
    BadArguments(String),
    /// The upstream data source failed (network, HTTP status, unparseable body)
    #[error("{0}")]
    Source(String),
    /// The data source answered but has nothing for this input
    #[error("{0}")]
    NotFound(String),
}

/// Decode the model's argument object into a tool's input struct
pub fn decode_input<T: DeserializeOwned>(input: Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::BadArguments(e.to_string()))
}

/// Outcome of a tool call as the model sees it: always a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult(String);

impl ToolResult {
    pub fn not_found() -> Self {
        Self(TOOL_NOT_FOUND.to_string())
    }

    #[allow(dead_code)] // Used by tests
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<Result<String, ToolError>> for ToolResult {
    fn from(outcome: Result<String, ToolError>) -> Self {
        match outcome {
            Ok(output) => Self(output),
            Err(e) => Self(e.to_string()),
        }
    }
}

impl From<&str> for ToolResult {
    fn from(output: &str) -> Self {
        Self(output.to_string())
    }
}

impl fmt::Display for ToolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for tools that can be executed by the agent
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool with the model-supplied arguments
    async fn run(&self, input: Value) -> Result<String, ToolError>;
}

/// Collection of tools available to the conversation
///
/// Built once at startup and read-only afterwards.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create the standard tool registry
    pub fn standard(config: &Config) -> Self {
        Self::new(vec![Arc::new(StockPriceTool::new(
            &config.quote_base_url,
            config.quote_timeout,
        ))])
    }

    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Find a tool by name
    pub fn lookup(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| &**t)
    }

    /// Get all tool definitions for LLM, in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool by name. Never fails: unknown tools and tool errors
    /// both come back as result text.
    pub async fn invoke(&self, name: &str, input: Value) -> ToolResult {
        let Some(tool) = self.lookup(name) else {
            tracing::warn!(tool = %name, "Model requested unknown tool");
            return ToolResult::not_found();
        };

        let outcome = tool.run(input).await;
        if let Err(e) = &outcome {
            tracing::warn!(tool = %name, error = %e, "Tool execution failed");
        } else {
            tracing::debug!(tool = %name, "Tool execution succeeded");
        }
        ToolResult::from(outcome)
    }
}
