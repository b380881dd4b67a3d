use std::net::SocketAddr;

use clap::Parser;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use tracing_subscriber::EnvFilter;
use weather::{WeatherClient, WeatherServer};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "weather-server")]
#[command(about = "MCP weather tool over streamable HTTP", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to listen on. The MCP endpoint is served at /mcp.
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = WeatherClient::from_env()?;
    tracing::info!(api = %client.base_url(), "weather client ready");

    let service = StreamableHttpService::new(
        move || Ok(WeatherServer::new(client.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let app = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    tracing::info!("weather MCP server listening on http://{}/mcp", cli.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
