mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "siteflow")]
#[command(about = "Static website hosting, declared in KDL.", long_about = None)]
struct Cli {
    /// Site file to use instead of discovering site.kdl
    #[arg(short, long, global = true, env = "SITEFLOW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what `up` would change
    Preview {
        /// Refresh recorded state from the engine before planning
        #[arg(long)]
        refresh: bool,
    },
    /// Provision the site through the configured engine
    Up {
        /// Apply without stopping at the preview
        #[arg(short, long)]
        yes: bool,
        /// Refresh recorded state from the engine before planning
        #[arg(long)]
        refresh: bool,
    },
    /// Delete every recorded resource
    Destroy {
        /// Apply without stopping at the preview
        #[arg(short, long)]
        yes: bool,
    },
    /// Show exported values from the recorded state
    Outputs,
    /// Print the declared resource graph as JSON
    Graph {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate the site file
    Validate,
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries command output (graph JSON), logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let load = || siteflow_site::load_site(config);

    match cli.command {
        Commands::Preview { refresh } => commands::preview::handle(&load()?, refresh).await?,
        Commands::Up { yes, refresh } => commands::up::handle(&load()?, yes, refresh).await?,
        Commands::Destroy { yes } => commands::destroy::handle(&load()?, yes).await?,
        Commands::Outputs => commands::outputs::handle(&load()?).await?,
        Commands::Graph { output } => commands::graph::handle(&load()?, output.as_deref())?,
        Commands::Validate => commands::validate::handle(config)?,
        Commands::Version => {
            println!("siteflow {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
