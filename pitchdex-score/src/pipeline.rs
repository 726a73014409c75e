//! Scoring pipeline
//!
//! Phases run strictly in sequence: the scoring pass holds the collection
//! mutably, statistics are then gathered over the fully scored snapshot,
//! and the composite pass reads those statistics.

use std::collections::BTreeSet;

use pitchdex_common::db::Store;
use pitchdex_common::{Metric, ReviewCollection};
use tracing::{debug, info, warn};

use crate::composite::bullshit_score;
use crate::lexicon::Dictionary;
use crate::metrics::MetricRegistry;
use crate::statistics::{gather_all, AllStatistics};
use crate::text::TextMetrics;

/// Outcome of [`run`]
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Individual metric scores written
    pub scores_computed: usize,
    /// Composite scores written
    pub composites_computed: usize,
    pub statistics: AllStatistics,
    /// Ids of reviews whose scores changed
    pub changed: BTreeSet<i64>,
}

/// Outcome of [`persist`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub written: usize,
    pub failed: usize,
}

/// Compute every registered metric each review is missing
///
/// With `rescore`, existing scores are recomputed too, and a score that is
/// no longer computable is removed. A review's body is stripped and
/// tokenized at most once. Returns the ids of reviews that got
/// at least one new or different score, and the number of scores written.
pub fn score_reviews(
    reviews: &mut ReviewCollection,
    registry: &MetricRegistry,
    dict: &Dictionary,
    rescore: bool,
) -> (BTreeSet<i64>, usize) {
    let mut changed = BTreeSet::new();
    let mut computed = 0;

    for review in reviews.iter_mut() {
        let mut analyzed: Option<TextMetrics> = None;

        for (metric, f) in registry.iter() {
            if !rescore && review.has_score(metric) {
                continue;
            }
            let text = analyzed.get_or_insert_with(|| TextMetrics::analyze(&review.body));
            let Some(score) = f(text, dict) else {
                debug!("Review {}: {} not computable", review.id, metric);
                if review.scores.remove(&metric).is_some() {
                    changed.insert(review.id);
                }
                continue;
            };
            computed += 1;
            if review.scores.insert(metric, score) != Some(score) {
                changed.insert(review.id);
            }
        }
    }

    (changed, computed)
}

/// Compute the composite for reviews missing it (all with `rescore`)
///
/// On a rescore, a review whose composite can no longer be computed loses
/// the old one.
/// Returns the ids of reviews whose composite changed, and the number of
/// composites written.
pub fn apply_composite(
    reviews: &mut ReviewCollection,
    stats: &AllStatistics,
    rescore: bool,
) -> (BTreeSet<i64>, usize) {
    let mut changed = BTreeSet::new();
    let mut computed = 0;

    for review in reviews.iter_mut() {
        if !rescore && review.has_score(Metric::BullshitScore) {
            continue;
        }
        let Some(score) = bullshit_score(review, stats) else {
            debug!("Review {}: composite not computable", review.id);
            // a rescore must not leave a composite from earlier statistics
            if review.scores.remove(&Metric::BullshitScore).is_some() {
                changed.insert(review.id);
            }
            continue;
        };
        computed += 1;
        if review.scores.insert(Metric::BullshitScore, score) != Some(score) {
            changed.insert(review.id);
        }
    }

    (changed, computed)
}

/// Score, gather statistics, then apply the composite
pub fn run(
    reviews: &mut ReviewCollection,
    registry: &MetricRegistry,
    dict: &Dictionary,
    rescore: bool,
) -> PipelineReport {
    let (mut changed, scores_computed) = score_reviews(reviews, registry, dict, rescore);
    info!(
        "Computed {} scores across {} reviews",
        scores_computed,
        changed.len()
    );

    let statistics = gather_all(reviews, registry.iter().map(|(m, _)| m));
    for stats in statistics.values() {
        debug!(
            "{}: n={} min={} mean={} max={} stdev={}",
            stats.metric, stats.instances, stats.minimum, stats.mean, stats.maximum, stats.standard_deviation
        );
    }

    let (composite_changed, composites_computed) = apply_composite(reviews, &statistics, rescore);
    info!("Computed {} composite scores", composites_computed);
    changed.extend(composite_changed);

    PipelineReport {
        scores_computed,
        composites_computed,
        statistics,
        changed,
    }
}

/// Write the scores of `ids` back to the store
///
/// With `overwrite`, each review's stored scores are made to match its
/// in-memory ones, so removed scores are deleted. A failing review is logged and skipped; the others are still written.
pub async fn persist(
    store: &Store,
    reviews: &ReviewCollection,
    ids: &BTreeSet<i64>,
    overwrite: bool,
) -> PersistReport {
    let mut report = PersistReport::default();
    for &id in ids {
        let Some(review) = reviews.get(id) else {
            continue;
        };
        match store.insert_review_scores(id, &review.scores, overwrite).await {
            Ok(()) => report.written += 1,
            Err(e) => {
                warn!("Storing scores for review {} ({}): {}", id, review.permalink, e);
                report.failed += 1;
            }
        }
    }
    report
}
