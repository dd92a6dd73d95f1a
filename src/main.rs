//! tickerchat - terminal chat with a local Ollama model that can look up
//! stock prices
//!
//! A pure state machine drives each turn; the runtime performs its effects
//! against the model and the tool registry.

mod config;
mod conversation;
mod llm;
mod runtime;
mod session;
mod state_machine;
mod tools;

use config::Config;
use llm::{LoggingService, OllamaService};
use runtime::{ConversationRuntime, ServiceLlmClient};
use state_machine::TurnContext;
use std::sync::Arc;
use tools::ToolRegistry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the conversation
    let json_logs = std::env::var("TICKERCHAT_LOG_JSON").is_ok_and(|v| v == "1");
    let fmt_layer = if json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "tickerchat=warn".into()))
        .with(fmt_layer)
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        model = %config.model,
        host = %config.ollama_host,
        max_tool_rounds = config.max_tool_rounds,
        "Configuration loaded"
    );

    let ollama = OllamaService::new(&config.ollama_host, config.model.clone(), config.llm_timeout)?;
    let llm_client = ServiceLlmClient::new(Arc::new(LoggingService::new(Arc::new(ollama))));
    let tools = ToolRegistry::standard(&config);
    let context = TurnContext::new(config.model, config.max_tool_rounds);

    let mut runtime = ConversationRuntime::new(context, llm_client, tools);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();
    session::run_session(&mut runtime, stdin, &mut stdout, &mut stderr).await?;

    Ok(())
}
