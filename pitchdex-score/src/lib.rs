//! pitchdex-score library - review scoring engine
//!
//! Turns review text into per-review metric scores, population statistics,
//! the weighted "Overall Bullshit Score" composite, and per-author rollups.
//!
//! Pipeline order:
//! 1. [`metrics`]: every registered metric for every review missing it
//! 2. [`statistics`]: one population pass per metric
//! 3. [`composite`]: deviation bands combined with fixed weights
//! 4. [`aggregate`]: per-author averages

pub mod aggregate;
pub mod composite;
pub mod export;
pub mod import;
pub mod lexicon;
pub mod metrics;
pub mod pipeline;
pub mod statistics;
pub mod text;

pub use composite::{bullshit_score, deviation_band};
pub use lexicon::Dictionary;
pub use metrics::MetricRegistry;
pub use statistics::{gather, gather_all, AllStatistics, StatisticalData};
pub use text::{strip_markup, tokenize, TextMetrics};
