use anyhow::{Result, bail};
use clap::Parser;
use shelf_common::observability::{LogConfig, init_logging};
use shelf_config::{ShelfConfig, ShelfConfigLoader};
use shelf_web::browser::FantocciniSession;
use shelf_web::{CsvSink, Harvester};
use std::path::PathBuf;
use tracing::{info, warn};

/// Harvest "load more" product catalogs into one CSV file per category.
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    /// Configuration file; skipped when it does not exist.
    #[arg(long, short, env = "SHELF_CONFIG", default_value = "shelf.yaml")]
    config: PathBuf,

    /// Only harvest these categories (repeatable).
    #[arg(long = "category", short = 'C', value_name = "NAME")]
    categories: Vec<String>,

    /// Directory receiving the CSV files.
    #[arg(long, short)]
    output_dir: Option<PathBuf>,

    /// Show the browser window.
    #[arg(long)]
    headful: bool,
}

impl Cli {
    fn apply(&self, cfg: &mut ShelfConfig) -> Result<()> {
        cfg.retain_categories(&self.categories)?;
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = dir.clone();
        }
        if self.headful {
            cfg.browser.headless = false;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins), then CLI overrides
    let mut cfg = ShelfConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;
    cli.apply(&mut cfg)?;

    let log_path = init_logging(LogConfig {
        app_name: "shelf",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;
    info!(log = %log_path.display(), categories = cfg.categories.len(), "starting harvest");

    // 2) Build the pipeline before touching the browser so bad selectors fail fast
    let harvester = Harvester::from_config(&cfg)?;
    let mut sink = CsvSink::new(&cfg.output_dir);

    // 3) One session for every category
    let session = FantocciniSession::connect(&cfg.browser, cfg.expansion.poll_interval()).await?;
    let outcome = harvester.run(&session, &mut sink, &cfg.categories).await;
    if let Err(e) = session.close().await {
        warn!(error = %e, "failed to close browser session");
    }

    let summary = outcome?;
    for report in &summary.completed {
        info!(
            category = %report.category,
            records = report.records,
            skipped = report.diagnostics.len(),
            loads = report.expansion.activations,
            "category done"
        );
    }
    if !summary.is_success() {
        let failed: Vec<_> = summary.failed.iter().map(|(name, _)| name.as_str()).collect();
        bail!(
            "{} of {} categories failed: {}",
            failed.len(),
            cfg.categories.len(),
            failed.join(", ")
        );
    }
    Ok(())
}
