//! Overall Bullshit Score
//!
//! Raw scores live on very different scales (word counts in the thousands,
//! trite weights in the tens), so each term is first converted to a
//! deviation band relative to its population and the bands are weighted.

use pitchdex_common::{Error, Metric, Result, Review};
use tracing::debug;

use crate::metrics::MetricRegistry;
use crate::statistics::{AllStatistics, StatisticalData};

/// Highest deviation band; larger deviations are clamped to it
pub const MAX_BAND: i64 = 10;

/// How a term's score enters the composite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    /// Deviation band of the score, 1..=10
    Band,
    /// The raw score, unscaled
    Raw,
}

/// One weighted term of a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeTerm {
    pub metric: Metric,
    pub weight: i64,
    pub contribution: Contribution,
}

impl CompositeTerm {
    pub const fn band(metric: Metric, weight: i64) -> Self {
        Self {
            metric,
            weight,
            contribution: Contribution::Band,
        }
    }

    pub const fn raw(metric: Metric, weight: i64) -> Self {
        Self {
            metric,
            weight,
            contribution: Contribution::Raw,
        }
    }
}

pub const BULLSHIT_TERMS: &[CompositeTerm] = &[
    CompositeTerm::band(Metric::Pitchformulaity, 10),
    CompositeTerm::band(Metric::NaiveSentenceLength, 5),
    CompositeTerm::band(Metric::WordCount, 2),
    CompositeTerm::band(Metric::WordsInvented, 1),
];

/// Number of standard deviations above the population minimum, in 1..=10
///
/// Returns the first `i` with `score <= minimum + i * standard_deviation`.
/// Scores more than ten deviations out are clamped to [`MAX_BAND`].
pub fn deviation_band(score: i64, stats: &StatisticalData) -> i64 {
    for i in 1..=MAX_BAND {
        if score <= stats.minimum + i * stats.standard_deviation {
            return i;
        }
    }
    debug!(
        "{} score {} beyond {} deviations (min {}, stdev {}), clamped",
        stats.metric, score, MAX_BAND, stats.minimum, stats.standard_deviation
    );
    MAX_BAND
}

/// Weighted sum of `terms` for one review
///
/// `None` when the review lacks a term's score, or when a term's metric has
/// no population to band against.
pub fn composite_score(
    review: &Review,
    stats: &AllStatistics,
    terms: &[CompositeTerm],
) -> Option<i64> {
    let mut total = 0;
    for term in terms {
        let score = review.score(term.metric)?;
        let value = match term.contribution {
            Contribution::Raw => score,
            Contribution::Band => {
                let term_stats = stats.get(&term.metric).filter(|s| s.instances > 0)?;
                deviation_band(score, term_stats)
            }
        };
        total += term.weight * value;
    }
    Some(total)
}

/// The Overall Bullshit Score of one review
pub fn bullshit_score(review: &Review, stats: &AllStatistics) -> Option<i64> {
    composite_score(review, stats, BULLSHIT_TERMS)
}

/// Reject composite terms the registry cannot compute
pub fn validate_terms(terms: &[CompositeTerm], registry: &MetricRegistry) -> Result<()> {
    let missing: Vec<&str> = terms
        .iter()
        .filter(|t| !registry.contains(t.metric))
        .map(|t| t.metric.name())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(Error::Config(format!(
        "Composite terms not registered: {}",
        missing.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(metric: Metric, minimum: i64, standard_deviation: i64) -> StatisticalData {
        StatisticalData {
            metric,
            instances: 10,
            minimum,
            mean: minimum + standard_deviation,
            maximum: minimum + 20 * standard_deviation,
            standard_deviation,
        }
    }

    fn review(scores: &[(Metric, i64)]) -> Review {
        let mut review = Review::new(1, "Ned Raggett", "", "1-x");
        review.scores.extend(scores.iter().copied());
        review
    }

    #[test]
    fn test_band_at_minimum_is_one() {
        let s = stats(Metric::WordCount, 100, 25);
        assert_eq!(deviation_band(100, &s), 1);
        assert_eq!(deviation_band(125, &s), 1);
        assert_eq!(deviation_band(126, &s), 2);
    }

    #[test]
    fn test_band_three_deviations() {
        let s = stats(Metric::WordCount, 100, 25);
        assert_eq!(deviation_band(100 + 3 * 25, &s), 3);
    }

    #[test]
    fn test_band_clamps_to_ten() {
        let s = stats(Metric::WordCount, 0, 1);
        assert_eq!(deviation_band(10, &s), 10);
        assert_eq!(deviation_band(11, &s), MAX_BAND);
        assert_eq!(deviation_band(1_000_000, &s), MAX_BAND);
    }

    #[test]
    fn test_band_is_monotonic_and_bounded() {
        let s = stats(Metric::Pitchformulaity, -5, 7);
        let mut previous = 1;
        for score in -50..200 {
            let band = deviation_band(score, &s);
            assert!((1..=MAX_BAND).contains(&band), "band {} for {}", band, score);
            assert!(band >= previous, "band decreased at {}", score);
            previous = band;
        }
    }

    #[test]
    fn test_band_with_zero_deviation() {
        let s = stats(Metric::WordCount, 40, 0);
        assert_eq!(deviation_band(40, &s), 1);
        assert_eq!(deviation_band(41, &s), MAX_BAND);
    }

    fn all_stats() -> AllStatistics {
        [
            stats(Metric::Pitchformulaity, 0, 10),
            stats(Metric::NaiveSentenceLength, 10, 5),
            stats(Metric::WordCount, 200, 100),
            stats(Metric::WordsInvented, 0, 4),
        ]
        .into_iter()
        .map(|s| (s.metric, s))
        .collect()
    }

    #[test]
    fn test_bullshit_score_weights() {
        let r = review(&[
            (Metric::Pitchformulaity, 25),     // band 3
            (Metric::NaiveSentenceLength, 14), // band 1
            (Metric::WordCount, 450),          // band 3
            (Metric::WordsInvented, 9),        // band 3
        ]);
        assert_eq!(bullshit_score(&r, &all_stats()), Some(10 * 3 + 5 + 2 * 3 + 3));
    }

    #[test]
    fn test_bullshit_score_needs_every_term() {
        let r = review(&[
            (Metric::Pitchformulaity, 25),
            (Metric::WordCount, 450),
            (Metric::WordsInvented, 9),
        ]);
        assert_eq!(bullshit_score(&r, &all_stats()), None);
    }

    #[test]
    fn test_bullshit_score_needs_population() {
        let r = review(&[
            (Metric::Pitchformulaity, 25),
            (Metric::NaiveSentenceLength, 14),
            (Metric::WordCount, 450),
            (Metric::WordsInvented, 9),
        ]);
        let mut stats = all_stats();
        if let Some(s) = stats.get_mut(&Metric::WordsInvented) {
            s.instances = 0;
        }
        assert_eq!(bullshit_score(&r, &stats), None);

        stats.remove(&Metric::WordsInvented);
        assert_eq!(bullshit_score(&r, &stats), None);
    }

    #[test]
    fn test_raw_contribution_skips_banding() {
        let terms = [
            CompositeTerm::band(Metric::Pitchformulaity, 10),
            CompositeTerm::raw(Metric::WordsInvented, 1),
        ];
        let r = review(&[(Metric::Pitchformulaity, 25), (Metric::WordsInvented, 9)]);
        let mut stats = all_stats();
        stats.remove(&Metric::WordsInvented);
        assert_eq!(composite_score(&r, &stats, &terms), Some(10 * 3 + 9));
    }

    #[test]
    fn test_validate_terms() {
        assert!(validate_terms(BULLSHIT_TERMS, &MetricRegistry::standard()).is_ok());

        let partial = MetricRegistry::with_metrics(&[Metric::Pitchformulaity, Metric::WordCount])
            .unwrap();
        match validate_terms(BULLSHIT_TERMS, &partial) {
            Err(Error::Config(msg)) => {
                assert!(msg.contains("Naïve sentence length"));
                assert!(msg.contains("Words invented"));
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }
}
