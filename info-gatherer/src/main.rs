use clap::Parser;
use info_gatherer::{GathererConfig, InfoGatherer};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "info-gatherer", about = "Collect FPGA vendor documents and arXiv papers")]
struct Args {
    /// JSON configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated source names to run, in order
    #[arg(short, long, value_delimiter = ',')]
    sources: Option<Vec<String>>,

    /// Skip summarization and notification
    #[arg(long)]
    no_notify: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            GathererConfig::from_file(path)?
        }
        None => {
            let mut config = GathererConfig::default();
            config.apply_env_overrides();
            config
        }
    };

    info!("Starting InfoGatherer");
    let mut gatherer = InfoGatherer::from_config(&config)?;

    match gatherer.run(args.sources.as_deref(), !args.no_notify).await {
        Ok(outcome) => {
            info!(
                "Finished run {}: {} documents from {} sources",
                outcome.report.run_id, outcome.report.total_documents, outcome.report.total_sources
            );
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
