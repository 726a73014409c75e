//! Scoring functions and the metric registry
//!
//! Each scoring function is pure: it sees one analyzed review body and the
//! dictionary, and returns `None` when the score is not computable (zero
//! words, zero sentences). A `None` leaves the score absent on the review.

use pitchdex_common::{Error, Metric, Result, Review, ScoreMap};
use tracing::debug;

use crate::composite::{self, BULLSHIT_TERMS};
use crate::lexicon::{trite_weight, Dictionary};
use crate::statistics::truncating_div;
use crate::text::TextMetrics;

/// Signature shared by every scoring function
pub type ScoringFn = fn(&TextMetrics, &Dictionary) -> Option<i64>;

pub fn simple_count(_text: &TextMetrics, _dict: &Dictionary) -> Option<i64> {
    Some(1)
}

pub fn word_count(text: &TextMetrics, _dict: &Dictionary) -> Option<i64> {
    Some(text.word_count() as i64)
}

pub fn character_count(text: &TextMetrics, _dict: &Dictionary) -> Option<i64> {
    Some(text.character_count() as i64)
}

/// Characters per word
pub fn word_length(text: &TextMetrics, _dict: &Dictionary) -> Option<i64> {
    truncating_div(text.character_count() as i64, text.word_count() as i64)
}

/// Words per period
pub fn naive_sentence_length(text: &TextMetrics, _dict: &Dictionary) -> Option<i64> {
    truncating_div(text.word_count() as i64, text.sentence_count() as i64)
}

/// Sum of trite-table weights over all tokens
pub fn pitchformulaity(text: &TextMetrics, _dict: &Dictionary) -> Option<i64> {
    Some(text.tokens.iter().filter_map(|t| trite_weight(t)).sum())
}

/// Tokens the dictionary does not know
///
/// With an empty dictionary every token counts.
pub fn words_invented(text: &TextMetrics, dict: &Dictionary) -> Option<i64> {
    Some(text.tokens.iter().filter(|t| !dict.has(t)).count() as i64)
}

/// Scoring function for a directly scored metric
pub fn scoring_fn(metric: Metric) -> Option<ScoringFn> {
    let f: ScoringFn = match metric {
        Metric::Reviews => simple_count,
        Metric::Pitchformulaity => pitchformulaity,
        Metric::NaiveSentenceLength => naive_sentence_length,
        Metric::WordsInvented => words_invented,
        Metric::CharacterCount => character_count,
        Metric::WordCount => word_count,
        Metric::WordLength => word_length,
        Metric::BullshitScore => return None,
    };
    Some(f)
}

/// Ordered list of the metrics a run computes
#[derive(Clone)]
pub struct MetricRegistry {
    entries: Vec<(Metric, ScoringFn)>,
}

impl MetricRegistry {
    /// Every directly scored metric, in display order
    pub fn standard() -> Self {
        let entries = Metric::SCORED
            .into_iter()
            .filter_map(|m| scoring_fn(m).map(|f| (m, f)))
            .collect();
        Self { entries }
    }

    /// Registry restricted to `metrics`, in the order given
    ///
    /// The derived composite cannot be registered. Duplicates are ignored.
    pub fn with_metrics(metrics: &[Metric]) -> Result<Self> {
        let mut entries: Vec<(Metric, ScoringFn)> = Vec::with_capacity(metrics.len());
        for &metric in metrics {
            let f = scoring_fn(metric).ok_or_else(|| {
                Error::Config(format!("'{}' is derived and has no scoring function", metric))
            })?;
            if !entries.iter().any(|(m, _)| *m == metric) {
                entries.push((metric, f));
            }
        }
        Ok(Self { entries })
    }

    pub fn metrics(&self) -> Vec<Metric> {
        self.entries.iter().map(|(m, _)| *m).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, ScoringFn)> + '_ {
        self.entries.iter().copied()
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.entries.iter().any(|(m, _)| *m == metric)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Score one metric; `None` if unregistered or not computable
    pub fn score(&self, metric: Metric, text: &TextMetrics, dict: &Dictionary) -> Option<i64> {
        let (_, f) = self.entries.iter().find(|(m, _)| *m == metric)?;
        f(text, dict)
    }

    /// Every registered, computable score for `review`
    pub fn score_review(&self, review: &Review, dict: &Dictionary) -> ScoreMap {
        let text = TextMetrics::analyze(&review.body);
        let mut scores = ScoreMap::new();
        for (metric, f) in &self.entries {
            match f(&text, dict) {
                Some(score) => {
                    scores.insert(*metric, score);
                }
                None => debug!("Review {}: {} not computable", review.id, metric),
            }
        }
        scores
    }

    /// Check that every composite term can be computed by this registry
    pub fn validate(&self) -> Result<()> {
        composite::validate_terms(BULLSHIT_TERMS, self)
    }
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.metrics()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_dict() -> Dictionary {
        Dictionary::from_words(Vec::<String>::new())
    }

    #[test]
    fn test_easy_first_one() {
        let text = TextMetrics::analyze("<p>Easy <strong>first</strong> one.</p>");
        let dict = Dictionary::from_words(["easy", "first"]);
        assert_eq!(simple_count(&text, &dict), Some(1));
        assert_eq!(word_count(&text, &dict), Some(3));
        assert_eq!(character_count(&text, &dict), Some(15));
        assert_eq!(word_length(&text, &dict), Some(5));
        assert_eq!(naive_sentence_length(&text, &dict), Some(3));
        assert_eq!(words_invented(&text, &dict), Some(1));
        assert_eq!(pitchformulaity(&text, &dict), Some(0));
    }

    #[test]
    fn test_not_computable_without_words_or_periods() {
        let dict = empty_dict();
        let blank = TextMetrics::analyze("<p></p>");
        assert_eq!(word_length(&blank, &dict), None);
        assert_eq!(naive_sentence_length(&blank, &dict), None);
        assert_eq!(word_count(&blank, &dict), Some(0));

        let no_period = TextMetrics::analyze("no period here");
        assert_eq!(naive_sentence_length(&no_period, &dict), None);
        assert_eq!(word_length(&no_period, &dict), Some(4));
    }

    #[test]
    fn test_pitchformulaity_sums_weights() {
        let text = TextMetrics::analyze("A lush, <em>ethereal</em> record that croons. Lush!");
        assert_eq!(pitchformulaity(&text, &empty_dict()), Some(9 + 9 + 5 + 9));
    }

    #[test]
    fn test_words_invented_with_empty_dictionary_counts_everything() {
        let text = TextMetrics::analyze("three plain words");
        assert_eq!(words_invented(&text, &empty_dict()), Some(3));
    }

    #[test]
    fn test_standard_registry_order() {
        let registry = MetricRegistry::standard();
        assert_eq!(registry.metrics(), Metric::SCORED.to_vec());
        assert!(!registry.contains(Metric::BullshitScore));
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_with_metrics_rejects_composite() {
        let err = MetricRegistry::with_metrics(&[Metric::WordCount, Metric::BullshitScore]);
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn test_with_metrics_subset_fails_validation() {
        let registry = MetricRegistry::with_metrics(&[Metric::WordCount, Metric::WordCount]).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(matches!(registry.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_score_review_skips_uncomputable() {
        let registry = MetricRegistry::standard();
        let review = Review::new(1, "Lindsay Zoladz", "<p>lush music without an end</p>", "1-x");
        let scores = registry.score_review(&review, &Dictionary::from_words(["music"]));
        assert_eq!(scores.get(&Metric::Reviews), Some(&1));
        assert_eq!(scores.get(&Metric::WordCount), Some(&5));
        assert_eq!(scores.get(&Metric::Pitchformulaity), Some(&9));
        assert_eq!(scores.get(&Metric::WordsInvented), Some(&4));
        assert!(!scores.contains_key(&Metric::NaiveSentenceLength));
        assert!(!scores.contains_key(&Metric::BullshitScore));
    }

    #[test]
    fn test_registry_score_unregistered_is_none() {
        let registry = MetricRegistry::with_metrics(&[Metric::WordCount]).unwrap();
        let text = TextMetrics::analyze("two words.");
        assert_eq!(registry.score(Metric::WordCount, &text, &empty_dict()), Some(2));
        assert_eq!(registry.score(Metric::CharacterCount, &text, &empty_dict()), None);
    }
}
