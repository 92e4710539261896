//! CLI command implementations

use std::path::PathBuf;

use anyhow::Context;
use lattice_server::{LatticeServer, ServerConfig, service::AnalysisService};
use lattice_store::Store;

const DEFAULT_DATABASE: &str = "./data/lattice.db";
const DEFAULT_DATA_DIR: &str = "./data";

fn resolve_database(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| {
        std::env::var("DATABASE_URL")
            .ok()
            .map(|url| PathBuf::from(url.trim_start_matches("sqlite://").to_string()))
    })
    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("LATTICE_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn open_store(database: Option<PathBuf>, data_dir: Option<PathBuf>) -> anyhow::Result<Store> {
    let database = resolve_database(database);
    if let Some(parent) = database.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {}", parent.display()))?;
        }
    }
    let store = Store::open(&database, resolve_data_dir(data_dir))
        .with_context(|| format!("opening database at {}", database.display()))?;
    tracing::info!(database = %database.display(), "database ready");
    Ok(store)
}

pub async fn serve(
    host: String,
    port: u16,
    database: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let store = open_store(database, data_dir)?;
    let server = LatticeServer::new(store, ServerConfig { host, port });
    server.start().await
}

pub fn analyze(
    path: PathBuf,
    project: String,
    database: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut store = open_store(database, data_dir)?;
    let project_id = store.get_or_create_project(&project)?;
    let summary = AnalysisService::new(&mut store).run_analysis(project_id, &path)?;
    println!(
        "run {}: {} files, {} classes, {} edges",
        summary.run_id, summary.files, summary.classes, summary.edges
    );
    Ok(())
}
