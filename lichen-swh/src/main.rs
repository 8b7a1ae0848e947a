//! lichen-swh - Software Heritage license lookup agent
//!
//! Batch agent: given an upload id, queries the heritage archive for the
//! known license facts of every distinct file content in the upload and
//! records the findings, skipping files already covered by a previous run.

use anyhow::Result;
use clap::Parser;
use lichen_common::events::EventBus;
use lichen_swh::services::{BackoffPolicy, BatchProcessor, Heartbeat, HeritageClient};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "lichen-swh", version, about = "Heritage archive license lookup agent")]
struct Cli {
    /// Upload to process
    #[arg(long)]
    upload_id: i64,

    /// Database path (default: platform data dir, or LICHEN_DATABASE)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Config file path (default: platform config dir, or LICHEN_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting lichen-swh (heritage license lookup agent)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = lichen_common::config::load_config(cli.config.as_deref())?;
    info!("Heritage API: {}", config.base_url);

    let db_path = lichen_common::config::resolve_database_path(cli.database.as_deref());
    info!("Database: {}", db_path.display());
    let db_pool = lichen_common::db::init_database(&db_path).await?;

    let agent_id =
        lichen_swh::db::current_agent_id(&db_pool, lichen_swh::AGENT_NAME, env!("CARGO_PKG_VERSION"))
            .await?;

    let event_bus = EventBus::new(100);
    let heartbeat = Heartbeat::new(event_bus);
    let client = HeritageClient::new(&config)?;
    let backoff = BackoffPolicy::new(Duration::from_secs(config.max_sleep_secs));

    let processor = BatchProcessor::new(db_pool, client, backoff, heartbeat, agent_id);
    let summary = processor.process_upload(cli.upload_id).await?;

    info!(
        found = summary.files_found,
        not_found = summary.files_not_found,
        skipped = summary.files_skipped,
        "lichen-swh finished"
    );

    Ok(())
}
