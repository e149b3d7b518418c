use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trellis::Config;
use trellis_cli::commands::render::RenderOptions;
use trellis_cli::{commands, demo};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(version, about = "Trellis CLI - nested layouts and async pages for the demo app", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "trellis.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the demo app's routes, most specific first
    Routes {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a URL and print the HTML of every frame
    Render {
        /// URL to render, query string included
        href: String,

        /// Retry an errored render this many times
        #[arg(short, long, default_value = "0")]
        retry: u32,

        /// Also print the loading frame
        #[arg(long)]
        show_loading: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = demo::app(&config)?;

    match cli.command {
        Commands::Routes { json } => {
            commands::routes::execute(&app, json)?;
        }
        Commands::Render {
            href,
            retry,
            show_loading,
        } => {
            let options = RenderOptions {
                retries: retry,
                show_loading,
            };
            commands::render::execute(&app, &href, options).await?;
        }
    }

    Ok(())
}
