use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{error, info, warn};

use catalog_indexer::telemetry::init_tracing;
use catalog_indexer::{Dependencies, IndexingError, JsonFileSource, Settings};
use catalog_indexer_pipeline::CatalogSource;
use catalog_indexer_shared::SyncSummary;

#[derive(Parser)]
#[command(name = "catalog-indexer")]
#[command(about = "Keeps the catalog search index in step with the item store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync catalog records from a JSON export into the index
    Sync {
        /// JSON array of catalog records
        #[arg(long)]
        input: PathBuf,

        /// Only sync these ids (comma separated); defaults to every record in the file
        #[arg(long, value_delimiter = ',')]
        ids: Vec<i64>,
    },
    /// Print the indexed document with the given id
    Get {
        id: String,
    },
    /// Create the index with its mappings if it does not exist
    EnsureIndex,
    /// Check that the search cluster is healthy
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenv().ok();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(settings.log_format);

    match run(cli.command, &settings).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Catalog indexer failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, settings: &Settings) -> Result<ExitCode, IndexingError> {
    match command {
        Commands::Sync { input, ids } => {
            let source = Arc::new(JsonFileSource::open(&input).await?);
            let catalog: Arc<dyn CatalogSource> = source.clone();
            let deps = Dependencies::new(settings, Some(catalog)).await?;

            deps.index.ensure_index_exists().await?;

            let cancel = deps.coordinator.cancel_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Received shutdown signal, finishing in-flight batches");
                    cancel.cancel();
                }
            });

            let outcomes = if ids.is_empty() {
                deps.coordinator.sync(source.records()).await?
            } else {
                deps.coordinator.sync_ids(&ids).await?
            };

            for outcome in &outcomes {
                println!("{}", serde_json::to_string(outcome)?);
            }

            let summary = SyncSummary::from_outcomes(&outcomes);
            if summary.failed > 0 {
                warn!(failed = summary.failed, "Some records failed to sync");
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Get { id } => {
            let deps = Dependencies::new(settings, None).await?;

            match deps.index.get(&id).await? {
                Some(document) => {
                    println!("{}", serde_json::to_string_pretty(&document)?);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    info!(id = %id, "Document not found");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::EnsureIndex => {
            let deps = Dependencies::new(settings, None).await?;
            deps.index.ensure_index_exists().await?;
            info!(index = %settings.index.index_name(), "Index ready");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Health => {
            // Dependencies::new verifies cluster health.
            Dependencies::new(settings, None).await?;
            info!("OpenSearch cluster is healthy");
            Ok(ExitCode::SUCCESS)
        }
    }
}
