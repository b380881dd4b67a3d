//! Math tool server over MCP stdio.
//!
//! Stdout carries the protocol; logs go to stderr.

use math::MathServer;
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("starting math MCP server");
    let service = MathServer::new()
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!(error = %e, "failed to start"))?;
    service.waiting().await?;
    Ok(())
}
