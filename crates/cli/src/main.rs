mod config;
mod error;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use runtime::{
    Ask, ChatSession, Connect, DEFAULT_RECURSION_LIMIT, McpConnector, Message,
    Orchestrator, Role, TranscriptEntry,
};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::Result;

const CHAT_RECURSION_LIMIT: usize = 50;
const MATH_QUERY: &str = "what's (3 + 5) x 12?";
const WEATHER_QUERY: &str = "what is the weather in California?";
const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(2);

const EXAMPLES: [&str; 4] = [
    "What's (3 + 5) x 12?",
    "What's the weather in London?",
    "Get weather for New York",
    "Multiply 7 by 6, then add 10",
];

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Chat with a tool-calling agent backed by MCP servers", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to relay.toml (overrides RELAY_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// Ask one math and one weather question, then exit
    Demo,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::locate(cli.config)?;

    match cli.command {
        Some(Commands::Chat) | None => cmd_chat(config).await,
        Some(Commands::Demo) => cmd_demo(config).await,
    }
}

async fn cmd_demo(config: Config) -> Result<()> {
    let backend = config.provider.backend_from_env()?;
    let orchestrator = Orchestrator::connect(
        backend,
        &config.orchestrator(None, DEFAULT_RECURSION_LIMIT),
    )
    .await;

    let answers = async {
        let math = orchestrator.ask(vec![Message::user(MATH_QUERY)]).await?;
        println!("Math response: {math}");
        let weather = orchestrator.ask(vec![Message::user(WEATHER_QUERY)]).await?;
        println!("Weather response: {weather}");
        Ok::<_, runtime::Error>(())
    }
    .await;

    orchestrator.shutdown().await;
    answers?;
    Ok(())
}

async fn cmd_chat(config: Config) -> Result<()> {
    // Fail before the banner if the credential is missing.
    let backend = config.provider.backend_from_env()?;
    let weather_url = config.weather_url().to_string();

    println!("relay v{}", env!("CARGO_PKG_VERSION"));
    println!("Model: {backend}");
    print_banner();

    let connector = McpConnector::new(backend, config.chat_orchestrator(CHAT_RECURSION_LIMIT));
    let mut session = ChatSession::new(connector);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "quit" | "exit" => break,
            "/help" => print_help(),
            "/reset" => {
                session.reset().await;
                println!("Conversation cleared. The agent reconnects on the next message.\n");
            }
            "/status" => print_status(&session, &weather_url).await,
            "/tools" => match session.tool_names().await {
                Some(tools) if tools.is_empty() => println!("No tools loaded.\n"),
                Some(tools) => println!("Loaded tools: {}\n", tools.join(", ")),
                None => println!("Agent not initialized yet; send a message first.\n"),
            },
            "/history" => print_history(session.transcript()),
            command if command.starts_with('/') => {
                println!("Unknown command {command}. Type /help for the list.\n");
            }
            message => {
                if !session.is_ready().await {
                    println!("Initializing agent and connecting to MCP servers...");
                }
                let entry = session.send(message).await;
                println!("\n{}\n", render_entry(entry));
            }
        }
    }

    println!("\nGoodbye.");
    Ok(())
}

fn print_banner() {
    println!("Tools: add, multiply (math server), get_weather (weather server)");
    println!("Try:");
    for example in EXAMPLES {
        println!("  {example}");
    }
    println!("Type /help for commands, /quit or Ctrl+D to exit.\n");
}

fn print_help() {
    println!("Commands:");
    println!("  /reset    clear the conversation and reconnect the agent");
    println!("  /status   agent, tools and weather server status");
    println!("  /tools    list loaded tools");
    println!("  /history  show the conversation so far");
    println!("  /quit     exit (also 'quit', 'exit', Ctrl+D)\n");
}

async fn print_status<C: Connect>(session: &ChatSession<C>, weather_url: &str) {
    let ready = session.is_ready().await;
    println!("Agent: {}", if ready { "ready" } else { "not initialized" });

    match session.tool_names().await {
        Some(tools) => println!("Tools: {} loaded ({})", tools.len(), tools.join(", ")),
        None => println!("Tools: unknown until the agent connects"),
    }

    let reachable = weather_reachable(weather_url).await;
    println!(
        "Weather server ({weather_url}): {}",
        if reachable { "reachable" } else { "unreachable" }
    );
    println!("Messages: {}\n", session.transcript().len());
}

/// Any HTTP response, whatever its status, counts as reachable.
async fn weather_reachable(url: &str) -> bool {
    let client = match reqwest::Client::builder().timeout(REACHABILITY_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::debug!(error = %e, "failed to build http client");
            return false;
        }
    };
    client.get(url).send().await.is_ok()
}

fn print_history(transcript: &[TranscriptEntry]) {
    if transcript.is_empty() {
        println!("No messages yet.\n");
        return;
    }
    for entry in transcript {
        println!("{}", render_entry(entry));
    }
    println!();
}

fn render_entry(entry: &TranscriptEntry) -> String {
    let time = entry.timestamp.format("%H:%M:%S");
    let speaker = match entry.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
        Role::System => "System",
    };
    format!("[{time}] {speaker}: {}", entry.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn entry(role: Role, content: &str, is_error: bool) -> TranscriptEntry {
        TranscriptEntry {
            role,
            content: content.into(),
            timestamp: Local.with_ymd_and_hms(2025, 10, 26, 14, 5, 9).unwrap(),
            is_error,
        }
    }

    #[test]
    fn renders_speaker_and_time() {
        assert_eq!(
            render_entry(&entry(Role::User, "hi", false)),
            "[14:05:09] You: hi"
        );
        assert_eq!(
            render_entry(&entry(Role::Assistant, "Error: boom", true)),
            "[14:05:09] Assistant: Error: boom"
        );
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        assert!(!weather_reachable("http://127.0.0.1:1/mcp").await);
    }

    #[test]
    fn chat_is_the_default_command() {
        let cli = Cli::parse_from(["relay"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["relay", "demo", "--config", "custom.toml"]);
        assert!(matches!(cli.command, Some(Commands::Demo)));
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }
}
