//! Population statistics per metric
//!
//! Statistics are always recomputed from a full snapshot of the collection;
//! there is no incremental update.

use std::collections::BTreeMap;

use pitchdex_common::{Metric, ReviewCollection};
use serde::Serialize;

/// Integer division through floating point, truncated toward zero
///
/// Every averaging step in the engine goes through this helper. A zero
/// denominator means "not computable" and yields `None`.
pub fn truncating_div(numerator: i64, denominator: i64) -> Option<i64> {
    if denominator == 0 {
        return None;
    }
    Some((numerator as f64 / denominator as f64) as i64)
}

/// Distribution of one metric across the reviews that carry it
///
/// With zero instances every field is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatisticalData {
    pub metric: Metric,
    pub instances: usize,
    pub minimum: i64,
    pub mean: i64,
    pub maximum: i64,
    pub standard_deviation: i64,
}

impl StatisticalData {
    fn empty(metric: Metric) -> Self {
        Self {
            metric,
            instances: 0,
            minimum: 0,
            mean: 0,
            maximum: 0,
            standard_deviation: 0,
        }
    }
}

pub type AllStatistics = BTreeMap<Metric, StatisticalData>;

/// Gather statistics for `metric`
///
/// Reviews without the score are excluded rather than counted as zero. The
/// standard deviation is the population one, computed in a second pass
/// around the (truncated) mean.
pub fn gather(reviews: &ReviewCollection, metric: Metric) -> StatisticalData {
    let scores: Vec<i64> = reviews.iter().filter_map(|r| r.score(metric)).collect();

    let (Some(&minimum), Some(&maximum)) = (scores.iter().min(), scores.iter().max()) else {
        return StatisticalData::empty(metric);
    };

    let count = scores.len() as i64;
    let total: i64 = scores.iter().sum();
    let mean = truncating_div(total, count).unwrap_or(0);

    let squared_deviation: f64 = scores
        .iter()
        .map(|&x| ((x - mean) as f64).powi(2))
        .sum();
    let standard_deviation = (squared_deviation / count as f64).sqrt() as i64;

    StatisticalData {
        metric,
        instances: scores.len(),
        minimum,
        mean,
        maximum,
        standard_deviation,
    }
}

/// Gather statistics for each of `metrics`
pub fn gather_all<I>(reviews: &ReviewCollection, metrics: I) -> AllStatistics
where
    I: IntoIterator<Item = Metric>,
{
    metrics
        .into_iter()
        .map(|metric| (metric, gather(reviews, metric)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchdex_common::Review;

    fn collection(scores: &[Option<i64>]) -> ReviewCollection {
        scores
            .iter()
            .enumerate()
            .map(|(i, score)| {
                let mut review = Review::new(i as i64, "author", "", "");
                if let Some(score) = score {
                    review.scores.insert(Metric::WordCount, *score);
                }
                review
            })
            .collect()
    }

    #[test]
    fn test_truncating_div() {
        assert_eq!(truncating_div(7, 2), Some(3));
        assert_eq!(truncating_div(9, 3), Some(3));
        assert_eq!(truncating_div(2, 3), Some(0));
        assert_eq!(truncating_div(-7, 2), Some(-3));
        assert_eq!(truncating_div(5, 0), None);
        assert_eq!(truncating_div(0, 0), None);
    }

    #[test]
    fn test_gather_basic() {
        // mean 5, deviations 3,1,1,1,0,0,2,4 -> variance 32/8 = 4 -> stdev 2
        let reviews = collection(&[2, 4, 4, 4, 5, 5, 7, 9].map(Some));
        let stats = gather(&reviews, Metric::WordCount);
        assert_eq!(stats.metric, Metric::WordCount);
        assert_eq!(stats.instances, 8);
        assert_eq!(stats.minimum, 2);
        assert_eq!(stats.maximum, 9);
        assert_eq!(stats.mean, 5);
        assert_eq!(stats.standard_deviation, 2);
    }

    #[test]
    fn test_gather_excludes_unscored_reviews() {
        let reviews = collection(&[Some(10), None, Some(20), None]);
        let stats = gather(&reviews, Metric::WordCount);
        assert_eq!(stats.instances, 2);
        assert_eq!(stats.minimum, 10);
        assert_eq!(stats.mean, 15);
        assert_eq!(stats.standard_deviation, 5);
        assert!(stats.instances <= reviews.len());
    }

    #[test]
    fn test_gather_instances_equal_len_when_fully_scored() {
        let reviews = collection(&[3, 1, 4, 1, 5].map(Some));
        assert_eq!(gather(&reviews, Metric::WordCount).instances, reviews.len());
    }

    #[test]
    fn test_gather_zero_instances_is_all_zero() {
        let reviews = collection(&[None, None]);
        let stats = gather(&reviews, Metric::WordCount);
        assert_eq!(stats, StatisticalData::empty(Metric::WordCount));

        let stats = gather(&ReviewCollection::new(), Metric::Pitchformulaity);
        assert_eq!(stats.instances, 0);
        assert_eq!(stats.standard_deviation, 0);
    }

    #[test]
    fn test_gather_single_value() {
        let reviews = collection(&[Some(42)]);
        let stats = gather(&reviews, Metric::WordCount);
        assert_eq!(stats.minimum, 42);
        assert_eq!(stats.maximum, 42);
        assert_eq!(stats.mean, 42);
        assert_eq!(stats.standard_deviation, 0);
    }

    #[test]
    fn test_mean_and_stdev_truncate() {
        // total 10 / 3 = 3.33 -> 3; deviations -2,1,2 -> 9/3 = 3 -> sqrt 1.73 -> 1
        let reviews = collection(&[1, 4, 5].map(Some));
        let stats = gather(&reviews, Metric::WordCount);
        assert_eq!(stats.mean, 3);
        assert_eq!(stats.standard_deviation, 1);
    }

    #[test]
    fn test_gather_all_covers_each_metric() {
        let reviews = collection(&[Some(1)]);
        let all = gather_all(&reviews, [Metric::WordCount, Metric::Pitchformulaity]);
        assert_eq!(all.len(), 2);
        assert_eq!(all[&Metric::WordCount].instances, 1);
        assert_eq!(all[&Metric::Pitchformulaity].instances, 0);
    }
}
