//! Per-author rollups
//!
//! Authors are grouped by exact name; "Ned Raggett" and "ned raggett" are
//! two authors.

use std::collections::BTreeMap;
use std::sync::Arc;

use pitchdex_common::{AuthorAggregate, Error, Metric, Result, Review, ReviewCollection, ScoreMap};
use tokio::task::JoinSet;
use tracing::debug;

use crate::statistics::truncating_div;

/// Mean of `metric` over `ids`, truncated
///
/// Reviews lacking the score count as 0. `None` for an empty id list.
pub fn average_score(reviews: &ReviewCollection, ids: &[i64], metric: Metric) -> Option<i64> {
    truncating_div(reviews.total_score(ids, metric), ids.len() as i64)
}

/// Rollup of one author's reviews
///
/// The `Reviews` entry holds the review count rather than an average.
/// Metrics with no computable average are left out.
pub fn author_aggregate(
    reviews: &ReviewCollection,
    author: &str,
    metrics: &[Metric],
) -> AuthorAggregate {
    let ids = reviews.by_author(author);
    let mut scores = ScoreMap::new();
    for &metric in metrics {
        let value = if metric == Metric::Reviews {
            Some(ids.len() as i64)
        } else {
            average_score(reviews, &ids, metric)
        };
        if let Some(value) = value {
            scores.insert(metric, value);
        }
    }
    AuthorAggregate {
        name: author.to_string(),
        review_count: ids.len(),
        scores,
    }
}

/// Rollups for every author, sorted by name
pub fn author_aggregates(reviews: &ReviewCollection, metrics: &[Metric]) -> Vec<AuthorAggregate> {
    reviews
        .author_count()
        .into_keys()
        .map(|author| author_aggregate(reviews, &author, metrics))
        .collect()
}

/// Same as [`author_aggregates`], one task per author
///
/// Each task reads the shared collection; results are sorted by name after
/// every task has joined, so the output does not depend on scheduling.
pub async fn author_aggregates_concurrent(
    reviews: Arc<ReviewCollection>,
    metrics: Vec<Metric>,
) -> Result<Vec<AuthorAggregate>> {
    let metrics: Arc<[Metric]> = metrics.into();
    let mut join_set = JoinSet::new();

    for author in reviews.author_count().into_keys() {
        let reviews = Arc::clone(&reviews);
        let metrics = Arc::clone(&metrics);
        join_set.spawn(async move { author_aggregate(&reviews, &author, &metrics) });
    }

    let mut aggregates = Vec::with_capacity(join_set.len());
    while let Some(result) = join_set.join_next().await {
        let aggregate =
            result.map_err(|e| Error::Internal(format!("Author aggregation task failed: {}", e)))?;
        aggregates.push(aggregate);
    }

    aggregates.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Aggregated {} authors", aggregates.len());
    Ok(aggregates)
}

/// Sum of an arbitrary per-review function for each author
pub fn total_by_author<F>(reviews: &ReviewCollection, f: F) -> BTreeMap<String, i64>
where
    F: Fn(&Review) -> i64,
{
    let mut totals = BTreeMap::new();
    for review in reviews.iter() {
        *totals.entry(review.author.clone()).or_insert(0) += f(review);
    }
    totals
}

/// Highest `n` values, descending; ties broken by name
pub fn top_n(values: &BTreeMap<String, i64>, n: usize) -> Vec<(String, i64)> {
    let mut ranked: Vec<(String, i64)> = values.iter().map(|(k, v)| (k.clone(), *v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

/// One metric out of a set of aggregates, keyed by author
pub fn metric_by_author(aggregates: &[AuthorAggregate], metric: Metric) -> BTreeMap<String, i64> {
    aggregates
        .iter()
        .filter_map(|a| a.scores.get(&metric).map(|s| (a.name.clone(), *s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> ReviewCollection {
        let bodies = [
            ("Lindsay Zoladz", r#"Last year, a video made the rounds of St. Vincent covering Big Black's "Kerosene" with a thrashing, punk intensity unlike what we'd come to expect from Annie Clark."#),
            ("Lindsay Zoladz", "The gods of power pop are perennially unkind. Sure, it's never been music's most commercially viable subgenre, but I suspect an element of cosmic doom, too."),
            ("Lindsay Zoladz", "With a frontman iconically haughty enough to be a feasible answer to a New York Times crossword puzzle clue (L.A.-by-way-of-East Village curmudgeon; 14 letters)-- it has been especially easy during this run of albums to dismiss the Magnetic Fields as Ivory Tower pop, wrapped up in the cleverness of their own ideas and out of touch with the world below."),
            ("Ned Raggett", "The Leeds, England-based Hood, now some years into a relaxed hiatus following 2005's Outside Closer, are one of many bands that should have been deservedly famous."),
            ("Ned Raggett", "Throughout all three albums, Opeth are about explicit formalism as stirring power via the rock gods-- the goal is far from new, but it's done so expertly that it's hard not to be impressed."),
            ("Ned Raggett", "Everything said is said with a sense of loss, and everything you hear on Where the Sands Turn to Gold is something that is heard two ways, as the expression of intense feeling thrillingly captured and as the mark of personal destruction."),
            ("Mark Richardson", r#""I hear a lot of music that's just lazy-- you know, people in their bedrooms singing some shit into the microphone." That's California singer and songwriter Julia Holter, talking to Pitchfork recently."#),
            ("Mark Richardson", "Beal's debut album, Acousmatic Sorcery, which consists of of home-recorded songs stretching back over the last few years, doesn't answer this question. But it does suggest that the answer, when it finally comes, may well be fascinating."),
            ("Mark Richardson", "Electronic music was once the domain of academics and researchers with access to vast rooms filled with pulsing tubes and clusters of snaking cables. Only those with a commission were allowed anywhere near the machinery."),
        ];
        bodies
            .into_iter()
            .enumerate()
            .map(|(i, (author, body))| Review::new(i as i64 + 1, author, body, format!("{}-review", i + 1)))
            .collect()
    }

    fn scored(scores: &[(&str, i64)]) -> ReviewCollection {
        scores
            .iter()
            .enumerate()
            .map(|(i, (author, words))| {
                let mut review = Review::new(i as i64, *author, "", "");
                review.scores.insert(Metric::WordCount, *words);
                review
            })
            .collect()
    }

    #[test]
    fn test_total_by_author_counts_music() {
        let totals = total_by_author(&corpus(), |r| r.body.to_lowercase().matches("music").count() as i64);
        assert_eq!(totals["Mark Richardson"], 2);
        assert_eq!(totals["Lindsay Zoladz"], 1);
        assert_eq!(totals["Ned Raggett"], 0);
        assert_eq!(totals.len(), 3);
    }

    #[test]
    fn test_average_score() {
        let reviews = scored(&[("a", 10), ("a", 15), ("b", 7)]);
        assert_eq!(average_score(&reviews, &[0, 1], Metric::WordCount), Some(12));
        assert_eq!(average_score(&reviews, &[2], Metric::WordCount), Some(7));
    }

    #[test]
    fn test_average_score_missing_counts_as_zero() {
        let mut reviews = scored(&[("a", 10)]);
        reviews.insert(Review::new(5, "a", "", ""));
        assert_eq!(average_score(&reviews, &[0, 5], Metric::WordCount), Some(5));
    }

    #[test]
    fn test_average_score_empty_subset_is_none() {
        let reviews = scored(&[("a", 10)]);
        assert_eq!(average_score(&reviews, &[], Metric::WordCount), None);
    }

    #[test]
    fn test_author_aggregates() {
        let reviews = scored(&[("b", 9), ("a", 10), ("a", 15), ("B", 1)]);
        let aggregates = author_aggregates(&reviews, &[Metric::Reviews, Metric::WordCount]);

        let names: Vec<&str> = aggregates.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["B", "a", "b"]);

        let a = &aggregates[1];
        assert_eq!(a.review_count, 2);
        assert_eq!(a.scores[&Metric::Reviews], 2);
        assert_eq!(a.scores[&Metric::WordCount], 12);
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let reviews = scored(&[("b", 9), ("a", 10), ("a", 15), ("c", 4), ("c", 5), ("c", 6)]);
        let metrics = vec![Metric::Reviews, Metric::WordCount, Metric::WordLength];

        let sequential = author_aggregates(&reviews, &metrics);
        let concurrent = author_aggregates_concurrent(Arc::new(reviews), metrics)
            .await
            .unwrap();
        assert_eq!(sequential, concurrent);
    }

    #[tokio::test]
    async fn test_concurrent_empty_collection() {
        let aggregates = author_aggregates_concurrent(Arc::new(ReviewCollection::new()), vec![Metric::Reviews])
            .await
            .unwrap();
        assert!(aggregates.is_empty());
    }

    #[test]
    fn test_top_n_orders_by_value_then_name() {
        let values: BTreeMap<String, i64> = [("c", 5), ("a", 5), ("b", 9), ("d", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let top = top_n(&values, 3);
        assert_eq!(
            top,
            vec![("b".to_string(), 9), ("a".to_string(), 5), ("c".to_string(), 5)]
        );
        assert_eq!(top_n(&values, 10).len(), 4);
    }

    #[test]
    fn test_metric_by_author() {
        let reviews = scored(&[("a", 10), ("b", 3)]);
        let aggregates = author_aggregates(&reviews, &[Metric::WordCount]);
        let words = metric_by_author(&aggregates, Metric::WordCount);
        assert_eq!(words["a"], 10);
        assert_eq!(words["b"], 3);
        assert!(metric_by_author(&aggregates, Metric::Pitchformulaity).is_empty());
    }
}
