//! Lattice CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "lattice")]
#[command(about = "Structural intelligence reports for PHP codebases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the analysis API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "7890")]
        port: u16,

        /// SQLite database path (falls back to DATABASE_URL)
        #[arg(long)]
        database: Option<PathBuf>,

        /// Directory for graph JSON artifacts (falls back to LATTICE_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Analyze one source tree and print the run summary
    Analyze {
        /// Root of the source tree
        path: PathBuf,

        /// Project name the run is recorded under
        #[arg(long, default_value = "default_project")]
        project: String,

        /// SQLite database path (falls back to DATABASE_URL)
        #[arg(long)]
        database: Option<PathBuf>,

        /// Directory for graph JSON artifacts (falls back to LATTICE_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("lattice v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve {
            host,
            port,
            database,
            data_dir,
        } => commands::serve(host, port, database, data_dir).await,
        Commands::Analyze {
            path,
            project,
            database,
            data_dir,
        } => commands::analyze(path, project, database, data_dir),
        Commands::Version => {
            println!("lattice v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
