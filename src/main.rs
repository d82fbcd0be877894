mod api;
mod config;
mod host;
mod tools;

use anyhow::{Context, Result};
use api::SessionClient;
use config::Config;
use host::Host;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::load("config.toml")?;

    // Initialize logging (stderr; stdout carries responses)
    init_logging(&config.logging.level);
    log::info!("Starting Dock agent tool host...");
    if std::env::var("API_BASE_URL").is_err() {
        log::warn!("API_BASE_URL not set in environment. Using: {}", config.api.base_url);
    }

    let client = SessionClient::new(&config.api)?;
    let mut host = Host::new(client, config.quote.clone());
    log::info!("Ready. Reading one JSON request per line on stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let response = host.handle_line(&line).await;
        let mut rendered = serde_json::to_string(&response).context("Failed to encode response")?;
        rendered.push('\n');
        stdout.write_all(rendered.as_bytes()).await.context("Failed to write stdout")?;
        stdout.flush().await?;
    }

    log::info!("stdin closed, {} session(s) served", host.session_count());
    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(default_level: &str) {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.parse_filters(default_level),
    };
    builder.init();
}
