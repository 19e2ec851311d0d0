//! notifyhook CLI: run the relay, or push a notification straight from the terminal.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

use notifyhook_core::config::RelayConfig;
use notifyhook_core::message::NotificationRequest;
use notifyhook_hub::Dispatcher;
use notifyhook_hub::api::{ApiState, start_server};

// ─── CLI Definition ────────────────────────────────────────

/// notifyhook: relay one notification to every channel you care about
#[derive(Parser)]
#[command(name = "notifyhook", version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/notifyhook/config.toml)
    #[arg(long, global = true, env = "NOTIFYHOOK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP relay
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send a notification once and print the report
    Send {
        /// The message to send
        message: String,

        /// Only this channel (default: every enabled channel)
        #[arg(short, long)]
        channel: Option<String>,

        /// Print the raw JSON report
        #[arg(long)]
        json: bool,
    },

    /// List enabled channels
    Channels,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Load and validate the config file
    Check,
}

// ─── Main ──────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,notifyhook_core=debug,notifyhook_hub=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(RelayConfig::default_path);

    match cli.command {
        Commands::Serve { host, port } => {
            let config = load_config(&config_path)?;
            run_serve(config, host, port).await?;
        }
        Commands::Send {
            message,
            channel,
            json,
        } => {
            let config = load_config(&config_path)?;
            run_send(&config, message, channel, json).await?;
        }
        Commands::Channels => {
            let config = load_config(&config_path)?;
            for name in config.channels.enabled_names() {
                println!("{}", name);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => {
                RelayConfig::write_template(&config_path, force)?;
                println!(
                    "{} Wrote {}",
                    "✓".green().bold(),
                    config_path.display().to_string().cyan()
                );
                println!("  Set api_key and enable at least one channel.");
            }
            ConfigAction::Check => {
                let config = load_config(&config_path)?;
                print_config_summary(&config_path, &config);
            }
        },
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<RelayConfig> {
    let config = RelayConfig::load(path)
        .with_context(|| format!("loading {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

// ─── Commands ──────────────────────────────────────────────

async fn run_serve(mut config: RelayConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let enabled = config.channels.enabled_names();
    println!("{}", "notifyhook relay".bold());
    println!(
        "  {} {}",
        "Endpoint:".dimmed(),
        format!("http://{}:{}", config.server.host, config.server.port)
            .green()
            .bold()
    );
    if enabled.is_empty() {
        println!("  {} {}", "Channels:".dimmed(), "none enabled".yellow());
    } else {
        println!("  {} {}", "Channels:".dimmed(), enabled.join(", ").cyan());
    }
    println!();

    let state = ApiState::from_config(&config)?;
    start_server(state, &config.server.host, config.server.port).await
}

async fn run_send(
    config: &RelayConfig,
    message: String,
    channel: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::from_config(config)?;
    let request = NotificationRequest { message, channel };
    let report = dispatcher.dispatch(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for name in report.sent() {
            println!("  {} {}", "✓".green().bold(), name);
        }
        for (name, reason) in report.errors() {
            println!("  {} {} {}", "✗".red().bold(), name, reason.dimmed());
        }
    }

    if !report.is_success() {
        anyhow::bail!("no channel accepted the notification");
    }
    Ok(())
}

fn print_config_summary(path: &Path, config: &RelayConfig) {
    println!("{} {} is valid", "✓".green().bold(), path.display());
    println!(
        "  {} {}:{}",
        "Listen:".dimmed(),
        config.server.host,
        config.server.port
    );
    for (name, channel) in config.channels.iter() {
        let kind = channel
            .settings
            .kind()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let state = if channel.enabled {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        println!("  {:<16} {:<10} {}", name, kind, state);
    }
}
