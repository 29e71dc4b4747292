mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{health, restaurant};

#[derive(Parser)]
#[command(name = "bistro")]
#[command(about = "Bistro CLI - Interact with the restaurant onboarding service")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "API server URL")]
    server: Option<String>,

    #[arg(long, global = true, help = "Output format", default_value = "table")]
    format: output::Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure CLI settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Manage restaurants
    #[command(alias = "rest")]
    Restaurant {
        #[command(subcommand)]
        command: restaurant::Commands,
    },
    /// Check that the server is reachable
    Health,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration values
    Set {
        #[arg(long)]
        server: Option<String>,
    },
    /// Show current configuration
    Show,
    /// Get config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::Config::load()?;

    if let Some(server) = &cli.server {
        cfg.server = server.clone();
    }

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Set { server } => {
                if let Some(s) = server {
                    cfg.server = s;
                }
                cfg.save()?;
                println!("Configuration saved");
            }
            ConfigCommands::Show => {
                println!("Server: {}", cfg.server);
            }
            ConfigCommands::Path => {
                println!("{}", config::config_path()?.display());
            }
        },
        Commands::Restaurant { command } => {
            restaurant::run(command, &cfg, cli.format).await?;
        }
        Commands::Health => {
            health::run(&cfg).await?;
        }
    }

    Ok(())
}
