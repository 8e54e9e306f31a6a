//! Line-delimited JSON session over stdin/stdout.
//!
//! Each input line is one form submission:
//!
//! ```text
//! {"action":"analyze","rawIdentifier":"...?user=ABC&hl=en","careerStage":"lektor"}
//! ```
//!
//! `action` is `analyze` (default), `profile`, or `reset`. Every line gets
//! exactly one JSON line back. All requests share one session cache.

use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::{render_analysis, render_error, render_profile};
use crate::advisor::Advisor;
use crate::fetcher::CancelSignal;
use crate::models::AdvisorRequest;
use crate::session::SessionCache;

/// What to do with a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Analyze,
    Profile,
    Reset,
}

/// One input line.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionCommand {
    #[serde(default)]
    pub action: Action,
    #[serde(flatten)]
    pub request: AdvisorRequest,
}

/// Run the session on the process's stdin/stdout.
///
/// # Errors
///
/// Returns error on I/O failure.
pub async fn run_stdio(advisor: Advisor) -> anyhow::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    run_session(&advisor, reader, stdout).await
}

/// Run the session over arbitrary streams until the input closes.
///
/// # Errors
///
/// Returns error on I/O failure.
pub async fn run_session<R, W>(advisor: &Advisor, mut reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = SessionCache::new();
    let mut line = String::new();

    tracing::info!("Advisor session ready, waiting for requests...");

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // EOF
            tracing::info!("Input closed, ending session");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<SessionCommand>(trimmed) {
            Ok(command) => handle_command(advisor, &command, &mut session).await,
            Err(e) => json!({
                "status": "error",
                "kind": "parse",
                "message": format!("Parse error: {e}"),
            }),
        };

        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

async fn handle_command(
    advisor: &Advisor,
    command: &SessionCommand,
    session: &mut SessionCache,
) -> Value {
    let request = &command.request;
    tracing::debug!(action = ?command.action, "Received request");

    match command.action {
        Action::Reset => {
            session.clear();
            json!({ "status": "ok", "reset": true })
        }
        Action::Profile => match advisor.profile(request, session, CancelSignal::never()).await {
            Ok(lookup) => render_profile(&lookup, request.response_format),
            Err(e) => render_error(&e, request.response_format),
        },
        Action::Analyze => match advisor.analyze(request, session, CancelSignal::never()).await {
            Ok(analysis) => render_analysis(&analysis, request.response_format),
            Err(e) => render_error(&e, request.response_format),
        },
    }
}
