use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gifthunt::config::Config;

mod cli;

#[derive(Parser)]
#[command(name = "gifthunt")]
#[command(about = "Birthday treasure hunt server - puzzle steps, points and prizes")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.gifthunt/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Check whether a server is running
    Status,

    /// Create an admin account directly in the database
    CreateAdmin {
        /// Display name
        #[arg(long)]
        name: String,
        /// Login email
        #[arg(long)]
        email: String,
        /// Password (at least 6 characters)
        #[arg(long)]
        password: String,
        /// Explicit username (generated from the name if omitted)
        #[arg(long)]
        username: Option<String>,
    },

    /// Wipe a player's progression back to the first step
    ResetPlayer {
        /// Username of the player to reset
        username: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Some(Commands::Init { force }) => {
            cli::init::init_command(cli.config.as_deref(), force)?;
        }
        Some(Commands::Status) => {
            let config = Config::load(cli.config.as_deref())?;
            cli::status::status_command(&config)?;
        }
        Some(Commands::CreateAdmin {
            name,
            email,
            password,
            username,
        }) => {
            let config = Config::load(cli.config.as_deref())?;
            cli::admin::create_admin_command(&config, &name, &email, &password, username.as_deref())?;
        }
        Some(Commands::ResetPlayer { username }) => {
            let config = Config::load(cli.config.as_deref())?;
            cli::admin::reset_player_command(&config, &username)?;
        }
        // Default: run the server
        Some(Commands::Serve) | None => {
            let config = Config::load(cli.config.as_deref())?;
            cli::serve::serve_command(&config)?;
        }
    }

    Ok(())
}
