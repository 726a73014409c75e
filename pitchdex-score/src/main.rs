//! Pitchdex scorer (pitchdex-score) - Main entry point
//!
//! Imports review dumps into the store, scores every review still missing a
//! score, recomputes the composite and author rollups, and optionally writes
//! the JSON tables the web UI can serve statically.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use pitchdex_common::config::{resolve_database_path, resolve_dictionary_path, TomlConfig};
use pitchdex_common::db::Store;
use pitchdex_common::Metric;
use pitchdex_score::aggregate::{author_aggregates_concurrent, metric_by_author, top_n};
use pitchdex_score::{export, import, pipeline, Dictionary, MetricRegistry};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Authors listed per metric in the run summary
const LEADERS: usize = 5;

/// Command-line arguments for pitchdex-score
#[derive(Parser, Debug)]
#[command(name = "pitchdex-score")]
#[command(about = "Score music reviews for triteness")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "PITCHDEX_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides config)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// JSON review dump to import before scoring
    #[arg(short, long)]
    import: Option<PathBuf>,

    /// Replace reviews that are already stored when importing
    #[arg(long)]
    overwrite: bool,

    /// Recompute every score, not just missing ones
    #[arg(long)]
    rescore: bool,

    /// Word list for the "Words invented" metric (overrides config)
    #[arg(long)]
    dict: Option<PathBuf>,

    /// Write the author table as JSON
    #[arg(long)]
    authors_out: Option<PathBuf>,

    /// Write the review table as JSON
    #[arg(long)]
    reviews_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("pitchdex_score={0},pitchdex_common={0}", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pitchdex scorer v{}", env!("CARGO_PKG_VERSION"));

    let registry = match config.selected_metrics()? {
        Some(metrics) => MetricRegistry::with_metrics(&metrics)?,
        None => MetricRegistry::standard(),
    };
    if let Err(e) = registry.validate() {
        warn!("Composite scores will not be computed: {}", e);
    }
    info!("Metrics: {:?}", registry);

    let dict_path = resolve_dictionary_path(args.dict.as_deref(), &config);
    let dict = Dictionary::load(&dict_path);

    let db_path = resolve_database_path(args.database.as_deref(), &config);
    info!("Database: {}", db_path.display());
    let store = Store::open(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    if let Some(path) = &args.import {
        let report = import::import_file(path)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        let inserted = store.insert_reviews(&report.reviews, args.overwrite).await;
        info!(
            "{}: inserted {}, skipped {} existing, {} failed, {} rejected",
            path.display(),
            inserted.inserted,
            inserted.skipped,
            inserted.failed,
            report.rejected.len()
        );
    }

    let stored = store.review_count().await.context("Failed to count reviews")?;
    if stored == 0 {
        bail!("No reviews in {}; import a dump with --import", db_path.display());
    }
    let authors = store.author_count().await.context("Failed to count authors")?;
    info!("Store holds {} reviews by {} authors", stored, authors);

    let mut reviews = store
        .select_all_reviews()
        .await
        .context("Failed to load reviews")?;

    let report = pipeline::run(&mut reviews, &registry, &dict, args.rescore);
    let persisted = pipeline::persist(&store, &reviews, &report.changed, args.rescore).await;
    info!(
        "Stored scores for {} reviews ({} failed)",
        persisted.written, persisted.failed
    );

    let mut metrics = registry.metrics();
    metrics.push(Metric::BullshitScore);

    let reviews = Arc::new(reviews);
    let aggregates = author_aggregates_concurrent(Arc::clone(&reviews), metrics.clone())
        .await
        .context("Failed to aggregate authors")?;
    store
        .replace_author_scores(&aggregates)
        .await
        .context("Failed to store author scores")?;

    for &metric in &metrics {
        let leaders = top_n(&metric_by_author(&aggregates, metric), LEADERS);
        if leaders.is_empty() {
            continue;
        }
        let listed: Vec<String> = leaders
            .iter()
            .map(|(author, score)| format!("{} ({})", author, score))
            .collect();
        info!("Top {}: {}", metric, listed.join(", "));
    }

    if let Some(path) = &args.authors_out {
        export::write_json(&export::authors_table(&aggregates), path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if let Some(path) = &args.reviews_out {
        export::write_json(&export::reviews_table(&reviews), path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    info!("Done");
    Ok(())
}
