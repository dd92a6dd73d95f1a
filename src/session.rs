//! Interactive session loop
//!
//! Reads one line per turn, runs it through the conversation runtime and
//! prints the answer. A failed turn is reported and the session goes on.

use crate::runtime::{ConversationRuntime, LlmClient, ToolExecutor, TurnError};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const PROMPT: &str = ">> ";

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    /// Any line starting with `/` ends the session
    Quit,
    Message(String),
}

pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.starts_with('/') {
        Input::Quit
    } else {
        Input::Message(line.to_string())
    }
}

fn describe_error(error: &TurnError) -> String {
    match error {
        TurnError::Llm(e) if e.kind.is_retryable() => {
            format!("error: {error} (the model server may be busy or down, try again)")
        }
        _ => format!("error: {error}"),
    }
}

/// Run the read-eval-print loop until a quit command or end of input.
///
/// Answers go to `out`; turn failures go to `err`.
pub async fn run_session<L, T, R, W, E>(
    runtime: &mut ConversationRuntime<L, T>,
    input: R,
    out: &mut W,
    err: &mut E,
) -> io::Result<()>
where
    L: LlmClient,
    T: ToolExecutor + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let banner = format!(
        "Running with model={}. Type \"/quit\" to exit.\n",
        runtime.context().model_id
    );
    out.write_all(banner.as_bytes()).await?;

    let mut lines = input.lines();
    loop {
        out.write_all(PROMPT.as_bytes()).await?;
        out.flush().await?;

        let Some(line) = lines.next_line().await? else {
            tracing::debug!("End of input");
            break;
        };

        let text = match parse_line(&line) {
            Input::Quit => break,
            Input::Message(text) => text,
        };

        match runtime.run_turn(&text).await {
            Ok(answer) => {
                out.write_all(answer.as_bytes()).await?;
                out.write_all(b"\n").await?;
            }
            Err(e) => {
                tracing::error!(error = %e, "Turn failed");
                err.write_all(describe_error(&e).as_bytes()).await?;
                err.write_all(b"\n").await?;
                err.flush().await?;
            }
        }
    }

    out.write_all(b"Quit.\n").await?;
    out.flush().await
}
