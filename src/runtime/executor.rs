//! Conversation runtime executor

use super::traits::{LlmClient, ToolExecutor};
use super::TurnError;

use crate::conversation::Conversation;
use crate::llm::{LlmRequest, ToolDefinition};
use crate::state_machine::{transition, Effect, Event, TurnContext, TurnState};
use crate::tools::{ToolError, ToolResult};
use std::collections::VecDeque;
use std::sync::Arc;

/// Generic conversation runtime that can work with any LLM and tool implementations
///
/// Owns the conversation history. Turns run strictly one after another:
/// `run_turn` takes `&mut self` and only returns once the turn is over.
pub struct ConversationRuntime<L, T>
where
    L: LlmClient,
    T: ToolExecutor + 'static,
{
    context: TurnContext,
    state: TurnState,
    conversation: Conversation,
    llm_client: L,
    tool_executor: Arc<T>,
    /// Tool catalog, fixed for the lifetime of the runtime
    tool_definitions: Vec<ToolDefinition>,
    /// Answer surfaced by the current turn
    answer: Option<String>,
}

impl<L, T> ConversationRuntime<L, T>
where
    L: LlmClient,
    T: ToolExecutor + 'static,
{
    pub fn new(context: TurnContext, llm_client: L, tool_executor: T) -> Self {
        let tool_definitions = tool_executor.definitions();
        tracing::info!(
            model = %llm_client.model_id(),
            tools = tool_definitions.len(),
            max_tool_rounds = context.max_tool_rounds,
            "Conversation runtime ready"
        );
        Self {
            context,
            state: TurnState::Idle,
            conversation: Conversation::new(),
            llm_client,
            tool_executor: Arc::new(tool_executor),
            tool_definitions,
            answer: None,
        }
    }

    pub fn context(&self) -> &TurnContext {
        &self.context
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[allow(dead_code)] // State query utility
    pub fn state(&self) -> &TurnState {
        &self.state
    }

    /// Run one full turn and return the answer to show the user.
    ///
    /// On error the turn is abandoned and the runtime is ready for the next
    /// one. Messages appended before the failure stay in the history.
    pub async fn run_turn(&mut self, text: &str) -> Result<String, TurnError> {
        tracing::debug!(
            model = %self.context.model_id,
            history = self.conversation.len(),
            "Starting turn"
        );

        let result = self
            .process_event(Event::UserMessage {
                text: text.to_string(),
            })
            .await;

        if result.is_err() && !self.state.is_idle() {
            tracing::warn!(state = ?self.state, "Resetting state after failed turn");
            self.state = TurnState::Idle;
        }
        self.answer = None;

        result
    }

    async fn process_event(&mut self, event: Event) -> Result<String, TurnError> {
        // Each transition yields at most one follow-up event
        let mut events_to_process = VecDeque::from([event]);

        while let Some(current_event) = events_to_process.pop_front() {
            // Pure state transition
            let result = transition(&self.state, &self.context, current_event)?;
            self.state = result.new_state;

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect).await? {
                    events_to_process.push_back(generated_event);
                }
            }
        }

        self.answer.take().ok_or(TurnError::NoAnswer)
    }

    /// Run one tool on its own task so a panicking tool becomes a fault
    /// result instead of taking the session down.
    async fn run_tool(&self, name: &str, input: serde_json::Value) -> ToolResult {
        let tool_executor = Arc::clone(&self.tool_executor);
        let tool_name = name.to_string();
        let handle =
            tokio::spawn(async move { tool_executor.execute(&tool_name, input).await });

        match handle.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(tool = %name, error = %e, "Tool task failed");
                ToolResult::from(Err(ToolError::Source(format!("Tool {name} failed: {e}"))))
            }
        }
    }

    async fn execute_effect(&mut self, effect: Effect) -> Result<Option<Event>, TurnError> {
        match effect {
            Effect::AppendMessage(message) => {
                self.conversation.append(message);
                Ok(None)
            }

            Effect::RequestLlm => {
                let request = LlmRequest {
                    model: self.context.model_id.clone(),
                    messages: self.conversation.all().to_vec(),
                    tools: self.tool_definitions.clone(),
                };

                let event = match self.llm_client.complete(&request).await {
                    Ok(response) => Event::LlmResponse(response),
                    Err(e) => Event::LlmError(e),
                };
                Ok(Some(event))
            }

            Effect::ExecuteTool { call } => {
                tracing::info!(tool = %call.name, arguments = %call.arguments, "Executing tool");
                let result = self.run_tool(&call.name, call.arguments).await;
                tracing::debug!(tool = %call.name, %result, "Tool finished");

                Ok(Some(Event::ToolComplete {
                    name: call.name,
                    result,
                }))
            }

            Effect::Answer {
                text,
                ignored_tool_calls,
            } => {
                if ignored_tool_calls > 0 {
                    tracing::warn!(
                        ignored_tool_calls,
                        max_tool_rounds = self.context.max_tool_rounds,
                        "Tool round limit reached, treating response as final"
                    );
                }
                self.answer = Some(text);
                Ok(None)
            }

            Effect::AbandonTurn(error) => Err(TurnError::Llm(error)),
        }
    }
}
