//! Job market ingestion tool

use anyhow::Result;
use clap::Parser;
use jobmarket_common::logging::{init_logging, LogConfig, LogLevel};
use jobmarket_ingest::config::IngestConfig;
use jobmarket_ingest::db;
use jobmarket_ingest::francetravail::SearchFilters;
use jobmarket_ingest::pipeline::IngestPipeline;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "jobmarket-ingest")]
#[command(author, version, about = "France Travail job offer ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Fetch, normalize and store job offers
    Ingest {
        /// Keyword query
        #[arg(short, long)]
        keywords: String,

        /// Workplace filter (INSEE commune or department code)
        #[arg(short, long)]
        location: Option<String>,

        /// Contract type filter (CDI, CDD, MIS, ...)
        #[arg(short, long)]
        contract_type: Option<String>,

        /// Override the per-run result cap
        #[arg(long)]
        max_results: Option<u32>,
    },

    /// Check database connectivity and run pending migrations
    CheckDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::from_env()
        .unwrap_or_default()
        .with_level(log_level)
        .with_file_prefix("jobmarket-ingest");

    init_logging(&log_config)?;

    match cli.command {
        Command::Ingest {
            keywords,
            location,
            contract_type,
            max_results,
        } => {
            let mut config = IngestConfig::load()?;
            if let Some(max_results) = max_results {
                config.api.max_results = max_results;
            }

            let pool = db::create_pool(&config.database).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;

            let filters = SearchFilters {
                keywords,
                location,
                contract_type,
            };

            let pipeline = IngestPipeline::new(config, pool)?;
            let result = pipeline.run(&filters).await?;

            info!("Done: {}", result.summary());
        },
        Command::CheckDb => {
            dotenvy::dotenv().ok();
            let database = db::DbConfig::from_env()?;
            let pool = db::create_pool(&database).await?;
            db::health_check(&pool).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database connection and schema OK");
        },
    }

    Ok(())
}
