//! Property-based tests for the state machine
//!
//! A pure driver plays whole turns through `transition`, answering every
//! `RequestLlm` from a scripted response queue and every `ExecuteTool` with a
//! result derived from the call, so the invariants can be checked without
//! any I/O.

use super::*;
use crate::llm::{ChatMessage, LlmError, LlmResponse, MessageRole, ToolCallRequest};
use crate::tools::ToolResult;
use proptest::prelude::*;
use serde_json::json;
use std::collections::VecDeque;

// ============================================================================
// Test Driver
// ============================================================================

/// Outcome of one simulated turn
#[derive(Debug, Default)]
struct TurnTrace {
    llm_calls: usize,
    tools_executed: Vec<String>,
    answer: Option<String>,
    abandoned: bool,
}

fn result_for(call: &ToolCallRequest) -> ToolResult {
    ToolResult::from(format!("{}:{}", call.name, call.arguments["symbol"]).as_str())
}

fn run_turn(
    state: &mut TurnState,
    context: &TurnContext,
    history: &mut Vec<ChatMessage>,
    responses: &mut VecDeque<Result<LlmResponse, LlmError>>,
    text: &str,
) -> TurnTrace {
    let mut trace = TurnTrace::default();
    let mut events = VecDeque::from([Event::UserMessage {
        text: text.to_string(),
    }]);

    while let Some(event) = events.pop_front() {
        let result = transition(state, context, event).expect("transition must succeed");
        *state = result.new_state;

        for effect in result.effects {
            match effect {
                Effect::AppendMessage(msg) => history.push(msg),
                Effect::RequestLlm => {
                    trace.llm_calls += 1;
                    let event = match responses
                        .pop_front()
                        .unwrap_or_else(|| Ok(LlmResponse::answer("done")))
                    {
                        Ok(resp) => Event::LlmResponse(resp),
                        Err(e) => Event::LlmError(e),
                    };
                    events.push_back(event);
                }
                Effect::ExecuteTool { call } => {
                    trace.tools_executed.push(call.name.clone());
                    events.push_back(Event::ToolComplete {
                        name: call.name.clone(),
                        result: result_for(&call),
                    });
                }
                Effect::Answer { text, .. } => trace.answer = Some(text),
                Effect::AbandonTurn(_) => trace.abandoned = true,
            }
        }
    }

    trace
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_tool_call() -> impl Strategy<Value = ToolCallRequest> {
    (
        prop_oneof![
            Just("get_stock_price".to_string()),
            Just("delete_universe".to_string()),
            "[a-z_]{3,12}",
        ],
        "[A-Z]{1,5}",
    )
        .prop_map(|(name, symbol)| ToolCallRequest::new(name, json!({ "symbol": symbol })))
}

fn arb_response() -> impl Strategy<Value = LlmResponse> {
    (
        proptest::option::of("[a-zA-Z0-9 .$]{0,40}"),
        proptest::collection::vec(arb_tool_call(), 0..5),
    )
        .prop_map(|(content, tool_calls)| LlmResponse {
            content,
            tool_calls,
            ..LlmResponse::default()
        })
}

fn arb_scripted() -> impl Strategy<Value = Result<LlmResponse, LlmError>> {
    prop_oneof![
        6 => arb_response().prop_map(Ok::<LlmResponse, LlmError>),
        1 => "[a-z ]{1,20}".prop_map(|m| Err(LlmError::network(m))),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Tool results are appended in the order the model requested them,
    /// each carrying the requested tool's name.
    #[test]
    fn prop_tool_results_preserve_request_order(
        calls in proptest::collection::vec(arb_tool_call(), 1..8),
        final_answer in "[a-zA-Z ]{0,30}",
    ) {
        let context = TurnContext::new("test-model", 1);
        let mut state = TurnState::Idle;
        let mut history = Vec::new();
        let mut responses = VecDeque::from([
            Ok(LlmResponse::tool_calls(calls.clone())),
            Ok(LlmResponse::answer(final_answer.clone())),
        ]);

        let trace = run_turn(&mut state, &context, &mut history, &mut responses, "quote?");

        let tool_messages: Vec<&ChatMessage> = history
            .iter()
            .filter(|m| m.role() == MessageRole::Tool)
            .collect();
        prop_assert_eq!(tool_messages.len(), calls.len());
        for (msg, call) in tool_messages.iter().zip(&calls) {
            prop_assert_eq!(msg.tool_name(), Some(call.name.as_str()));
            let expected = result_for(call);
            prop_assert_eq!(msg.content(), expected.as_str());
        }
        prop_assert_eq!(trace.answer, Some(final_answer));
        prop_assert_eq!(trace.llm_calls, 2);
    }

    /// At most `max_tool_rounds` rounds of tools and `max_tool_rounds + 1`
    /// model calls per turn, whatever the model asks for.
    #[test]
    fn prop_bounded_rounds(
        script in proptest::collection::vec(arb_scripted(), 1..6),
        max_tool_rounds in 0u32..3,
    ) {
        let context = TurnContext::new("test-model", max_tool_rounds);
        let mut state = TurnState::Idle;
        let mut history = Vec::new();
        let mut responses: VecDeque<_> = script.into_iter().collect();

        let trace = run_turn(&mut state, &context, &mut history, &mut responses, "go");

        prop_assert!(trace.llm_calls >= 1);
        prop_assert!(trace.llm_calls <= max_tool_rounds as usize + 1);
        prop_assert!(state.is_idle());
        prop_assert!(trace.answer.is_some() != trace.abandoned);
    }

    /// History only grows, and earlier messages never change.
    #[test]
    fn prop_history_is_append_only(
        turns in proptest::collection::vec(
            ("[a-z ]{1,20}", proptest::collection::vec(arb_scripted(), 0..4)),
            1..5,
        ),
    ) {
        let context = TurnContext::new("test-model", 1);
        let mut state = TurnState::Idle;
        let mut history: Vec<ChatMessage> = Vec::new();

        for (text, script) in turns {
            let before = history.clone();
            let mut responses: VecDeque<_> = script.into_iter().collect();

            run_turn(&mut state, &context, &mut history, &mut responses, &text);

            prop_assert!(history.len() > before.len());
            prop_assert_eq!(&history[..before.len()], &before[..]);
            prop_assert_eq!(&history[before.len()], &ChatMessage::user(text));
        }
    }

    /// A plain answer costs one model call and appends no tool messages.
    #[test]
    fn prop_plain_answer_passthrough(answer in "[a-zA-Z0-9 .!]{0,40}") {
        let context = TurnContext::new("test-model", 1);
        let mut state = TurnState::Idle;
        let mut history = Vec::new();
        let mut responses = VecDeque::from([Ok(LlmResponse::answer(answer.clone()))]);

        let trace = run_turn(&mut state, &context, &mut history, &mut responses, "hi");

        prop_assert_eq!(trace.llm_calls, 1);
        prop_assert!(trace.tools_executed.is_empty());
        prop_assert_eq!(history, vec![ChatMessage::user("hi"), ChatMessage::assistant(answer)]);
    }
}
