//! AstraSync - universal AI agent registration CLI
//!
//! ## Commands
//!
//! - `detect`: Report which framework an agent definition is written for
//! - `normalize`: Print the canonical record for a definition
//! - `register`: Register a definition with AstraSync
//! - `verify`: Check whether an agent id is registered
//! - `health`: Check the registration service

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::Level;

use astrasync_core::{
    candidates, estimate, ingest, LogFormat, NormalizeOptions, RawInput,
};
use astrasync_gateway::{
    AstraSyncClient, GatewayConfig, HttpGateway, MemoryGateway, RegistrationGateway,
    RegistrationOutcome, METRICS,
};

#[derive(Parser)]
#[command(name = "astrasync")]
#[command(author = "AstraSync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AstraSync AI - Universal AI Agent Registration", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON log lines and machine-readable command output
    #[arg(long, global = true)]
    json: bool,

    /// Registration API base URL
    #[arg(long, global = true, env = "ASTRASYNC_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the framework an agent definition is written for
    Detect {
        /// Path to a JSON/TOML file, inline JSON/TOML text, or `-` for stdin
        input: String,

        /// List every matching format, highest priority first
        #[arg(long)]
        candidates: bool,
    },

    /// Print the canonical record for an agent definition
    Normalize {
        /// Path to a JSON/TOML file, inline JSON/TOML text, or `-` for stdin
        input: String,

        /// Owner to record instead of the one in the definition
        #[arg(long)]
        owner: Option<String>,
    },

    /// Register an agent definition with AstraSync
    Register {
        /// Path to a JSON/TOML file, inline JSON/TOML text, or `-` for stdin
        input: String,

        /// Developer email
        #[arg(short, long, env = "ASTRASYNC_EMAIL")]
        email: Option<String>,

        /// Owner to record instead of the one in the definition
        #[arg(long)]
        owner: Option<String>,

        /// Write the service response to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use the in-memory preview registry instead of the API
        #[arg(long)]
        offline: bool,
    },

    /// Check whether an agent id is registered
    Verify {
        /// Agent id (`TEMP-…` or `ASTRAS-…`)
        agent_id: String,
    },

    /// Check registration service health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let log_format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    astrasync_core::init_tracing(log_format, level);

    let mut config = GatewayConfig::from_env();
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url.clone());
    }

    let result = match cli.command {
        Commands::Detect { input, candidates } => cmd_detect(&input, candidates, cli.json),
        Commands::Normalize { input, owner } => cmd_normalize(&input, owner),
        Commands::Register {
            input,
            email,
            owner,
            output,
            offline,
        } => {
            if let Some(email) = email {
                config = config.with_email(email);
            }
            cmd_register(
                config,
                &input,
                owner.as_deref(),
                output.as_deref(),
                offline,
                cli.json,
            )
            .await
        }
        Commands::Verify { agent_id } => cmd_verify(config, &agent_id, cli.json).await,
        Commands::Health => cmd_health(config, cli.json).await,
    };

    METRICS.flush();
    result
}

/// `-` reads stdin; anything else is a path if it exists, otherwise text.
fn read_input(input: &str) -> Result<RawInput> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read agent definition from stdin")?;
        return Ok(RawInput::Text(text));
    }
    Ok(RawInput::infer(input))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

fn cmd_detect(input: &str, list_candidates: bool, json: bool) -> Result<()> {
    let raw = astrasync_core::load(read_input(input)?).context("Failed to load agent definition")?;
    let format = astrasync_core::detect(&raw);
    let matches = candidates(&raw);

    if json {
        return print_json(&json!({
            "format": format,
            "label": format.label(),
            "candidates": matches,
        }));
    }

    println!("{} ({})", format, format.label());
    if list_candidates {
        if matches.is_empty() {
            println!("No format-specific rule matched; using generic.");
        }
        for (rank, candidate) in matches.iter().enumerate() {
            println!("  {}. {}", rank + 1, candidate);
        }
    }
    Ok(())
}

fn cmd_normalize(input: &str, owner: Option<String>) -> Result<()> {
    let options = NormalizeOptions::default().with_owner_override(owner);
    let (format, record) =
        ingest(read_input(input)?, &options).context("Failed to load agent definition")?;
    let score = estimate(&record, format);

    print_json(&json!({
        "format": format,
        "agent": record,
        "estimatedTrustScore": score.to_string(),
    }))
}

async fn cmd_register(
    config: GatewayConfig,
    input: &str,
    owner: Option<&str>,
    output: Option<&Path>,
    offline: bool,
    json: bool,
) -> Result<()> {
    let email = config.email.clone();
    let gateway: Arc<dyn RegistrationGateway> = if offline {
        Arc::new(MemoryGateway::new())
    } else {
        Arc::new(HttpGateway::new(config).context("Failed to create HTTP client")?)
    };
    let mut client = AstraSyncClient::new(gateway);
    if let Some(email) = email {
        client = client.with_email(email);
    }

    let outcome = client
        .register(read_input(input)?, owner)
        .await
        .context("Registration failed")?;

    if json {
        print_json(&outcome.response)?;
    } else {
        print_outcome(&outcome);
    }

    if let Some(path) = output {
        let text = serde_json::to_string_pretty(&outcome.response)
            .context("Failed to serialize registration response")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write credentials to {}", path.display()))?;
        if !json {
            println!();
            println!("Credentials saved to {}", path.display());
        }
    }
    Ok(())
}

fn print_outcome(outcome: &RegistrationOutcome) {
    println!("Registration successful");
    println!("  Agent ID:    {}", outcome.agent_id());
    println!("  Name:        {}", outcome.record.name());
    println!("  Format:      {} ({})", outcome.format, outcome.format.label());
    println!("  Status:      {}", outcome.response.status);
    println!("  Trust Score: {}", outcome.effective_trust_score());
    if let Some(chain) = &outcome.response.blockchain {
        println!("  Blockchain:  {}", chain.status);
    }
    if outcome.response.is_preview() {
        println!();
        println!("Preview registration. Create an account at https://astrasync.ai to finalize it.");
    }
}

async fn cmd_verify(config: GatewayConfig, agent_id: &str, json: bool) -> Result<()> {
    let client = AstraSyncClient::new(HttpGateway::new(config).context("Failed to create HTTP client")?);
    let response = client
        .verify(agent_id)
        .await
        .with_context(|| format!("Failed to verify {}", agent_id))?;

    if json {
        return print_json(&response);
    }
    if response.exists {
        println!("{} is registered", agent_id);
        for (key, value) in &response.extra {
            println!("  {}: {}", key, value);
        }
    } else {
        println!("{} was not found", agent_id);
    }
    Ok(())
}

async fn cmd_health(config: GatewayConfig, json: bool) -> Result<()> {
    let endpoint = config.api_url.clone();
    let client = AstraSyncClient::new(HttpGateway::new(config).context("Failed to create HTTP client")?);
    let health = client
        .health()
        .await
        .with_context(|| format!("API health check failed for {}", endpoint))?;

    if json {
        return print_json(&health);
    }
    println!("API is healthy ({})", health.status);
    println!("Endpoint: {}", endpoint);
    Ok(())
}
