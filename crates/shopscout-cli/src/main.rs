mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shopscout")]
#[command(about = "Scrape simple products from e-commerce sites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover and scrape every simple product on a site
    Scrape {
        /// Site URL; `https://` is assumed when no scheme is given
        url: String,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
        /// Write the JSON output to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the built-in heuristic tables as YAML
    Heuristics,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            url,
            pretty,
            output,
        } => {
            let config = shopscout_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            scrape::run_scrape(&config, &url, pretty, output.as_deref()).await?;
        }
        Commands::Heuristics => {
            print!("{}", shopscout_core::HeuristicTables::default().to_yaml()?);
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout carries only the JSON result.
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
