//! Ollama provider implementation (`POST /api/chat`, non-streaming)

use super::types::{ChatMessage, LlmRequest, LlmResponse, ToolCallRequest, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Ollama chat service
pub struct OllamaService {
    client: Client,
    chat_url: String,
    model_id: String,
}

impl OllamaService {
    pub fn new(host: &str, model: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            chat_url: format!("{}/api/chat", host.trim_end_matches('/')),
            model_id: model.into(),
        })
    }

    fn translate_request(request: &LlmRequest) -> OllamaRequest {
        let messages = request
            .messages
            .iter()
            .map(Self::translate_message)
            .collect();

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|t| OllamaTool {
                        r#type: "function".to_string(),
                        function: OllamaFunction {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: t.input_schema.clone(),
                        },
                    })
                    .collect(),
            )
        };

        OllamaRequest {
            model: request.model.clone(),
            messages,
            tools,
            stream: false,
        }
    }

    /// Tool results keep the name of the tool that produced them so the
    /// model can pair them with its request.
    fn translate_message(msg: &ChatMessage) -> OllamaMessage {
        OllamaMessage {
            role: msg.role().as_str().to_string(),
            content: msg.content().to_string(),
            tool_name: msg.tool_name().map(str::to_string),
        }
    }

    fn normalize_response(resp: OllamaResponse) -> LlmResponse {
        let tool_calls = resp
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCallRequest {
                name: tc.function.name,
                arguments: normalize_arguments(tc.function.arguments),
            })
            .collect();

        LlmResponse {
            content: resp.message.content,
            tool_calls,
            usage: Usage {
                input_tokens: resp.prompt_eval_count.unwrap_or(0),
                output_tokens: resp.eval_count.unwrap_or(0),
            },
        }
    }
}

/// Ollama sends arguments as an object, but some OpenAI-style proxies in
/// front of it send a JSON-encoded string. Anything that is not an object
/// after decoding becomes `{}`.
fn normalize_arguments(arguments: Value) -> Value {
    let decoded = match arguments {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, arguments = %raw, "Failed to parse tool call arguments");
            Value::Null
        }),
        other => other,
    };

    match decoded {
        Value::Object(_) => decoded,
        _ => Value::Object(serde_json::Map::new()),
    }
}

#[async_trait]
impl LlmService for OllamaService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let ollama_request = Self::translate_request(request);

        let response = self
            .client
            .post(&self.chat_url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OllamaErrorResponse>(&body)
                .map_or(body, |err| err.error);
            return Err(match status.as_u16() {
                404 => LlmError::model_not_found(format!("Model not found: {message}")),
                400 => LlmError::invalid_request(format!("Invalid request: {message}")),
                500..=599 => LlmError::server_error(format!("Server error: {message}")),
                _ => LlmError::unknown(format!("HTTP {status}: {message}")),
            });
        }

        let ollama_response: OllamaResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::malformed_response(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Ok(Self::normalize_response(ollama_response))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Ollama API types

#[derive(Debug, Serialize)]
pub(super) struct OllamaRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OllamaTool>>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct OllamaMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct OllamaTool {
    pub r#type: String,
    pub function: OllamaFunction,
}

#[derive(Debug, Serialize)]
pub(super) struct OllamaFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
pub(super) struct OllamaToolCall {
    pub function: OllamaFunctionCall,
}

#[derive(Debug, Deserialize)]
pub(super) struct OllamaFunctionCall {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Deserialize)]
pub(super) struct OllamaResponse {
    pub message: OllamaResponseMessage,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Assistant message as returned by the server. Content is optional here,
/// unlike on the request side, so "no content" survives normalisation.
#[derive(Debug, Deserialize)]
pub(super) struct OllamaResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<OllamaToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorResponse {
    error: String,
}
