//! Front ends for the advisor.
//!
//! - Line-delimited JSON over stdin/stdout, one session per process
//! - HTTP API with per-client sessions

pub mod http;
pub mod stdio;

use std::net::SocketAddr;

use serde_json::{Value, json};

use crate::advisor::{Advisor, Analysis, ProfileLookup};
use crate::error::AdvisorError;
use crate::formatters;
use crate::models::ResponseFormat;

/// Advisor front-end runner.
#[derive(Debug, Clone)]
pub struct AdvisorServer {
    advisor: Advisor,
}

impl AdvisorServer {
    #[must_use]
    pub const fn new(advisor: Advisor) -> Self {
        Self { advisor }
    }

    /// Serve line-delimited requests over stdio.
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        tracing::info!("Starting advisor session on stdio");
        stdio::run_stdio(self.advisor).await
    }

    /// Serve the HTTP API.
    ///
    /// # Errors
    ///
    /// Returns error on server failure.
    pub async fn run_http(self, port: u16) -> anyhow::Result<()> {
        let router = http::create_router(self.advisor);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        tracing::info!("HTTP server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

/// Render a profile lookup in the requested format.
#[must_use]
pub fn render_profile(lookup: &ProfileLookup, format: ResponseFormat) -> Value {
    if format.is_json() {
        return formatters::lookup_json(lookup);
    }
    json!({
        "status": "ok",
        "cached": lookup.cached,
        "markdown": formatters::format_profile_markdown(&lookup.record),
    })
}

/// Render an analysis in the requested format.
#[must_use]
pub fn render_analysis(analysis: &Analysis, format: ResponseFormat) -> Value {
    if format.is_json() {
        return formatters::analysis_json(analysis);
    }
    json!({
        "status": "ok",
        "cached": analysis.lookup.cached,
        "markdown": formatters::format_analysis_markdown(analysis),
    })
}

/// Render a pipeline error; Markdown requests also get the rendered text.
#[must_use]
pub fn render_error(err: &AdvisorError, format: ResponseFormat) -> Value {
    let mut value = formatters::error_json(err);
    if !format.is_json() {
        value["markdown"] = Value::String(formatters::format_error_markdown(err));
    }
    value
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
