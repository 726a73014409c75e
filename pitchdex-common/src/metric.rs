//! Metric names
//!
//! Every score stored, served, or exported is keyed by one of these names.
//! The wire name (`Metric::name`) is the exact string written to the
//! `review_scores.name` / `author_scores.name` columns and to JSON exports,
//! so the UI column list and the storage layer agree by construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A named per-review score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    /// Constant 1 per review, used as a counting placeholder
    #[serde(rename = "Reviews")]
    Reviews,
    /// Weighted sum of trite words
    #[serde(rename = "Pitchformulaity")]
    Pitchformulaity,
    /// Words per period
    #[serde(rename = "Naïve sentence length")]
    NaiveSentenceLength,
    /// Tokens missing from the dictionary
    #[serde(rename = "Words invented")]
    WordsInvented,
    /// Characters of the markup-stripped body
    #[serde(rename = "Character count")]
    CharacterCount,
    /// Normalized tokens
    #[serde(rename = "Word count")]
    WordCount,
    /// Characters per word
    #[serde(rename = "Word length")]
    WordLength,
    /// Weighted composite of deviation bands (derived, never scored directly)
    #[serde(rename = "Overall Bullshit Score")]
    BullshitScore,
}

impl Metric {
    /// All metrics, in display order
    pub const ALL: [Metric; 8] = [
        Metric::Reviews,
        Metric::Pitchformulaity,
        Metric::NaiveSentenceLength,
        Metric::WordsInvented,
        Metric::CharacterCount,
        Metric::WordCount,
        Metric::WordLength,
        Metric::BullshitScore,
    ];

    /// Metrics computed directly from review text
    pub const SCORED: [Metric; 7] = [
        Metric::Reviews,
        Metric::Pitchformulaity,
        Metric::NaiveSentenceLength,
        Metric::WordsInvented,
        Metric::CharacterCount,
        Metric::WordCount,
        Metric::WordLength,
    ];

    /// Wire name used as the storage and JSON key
    pub const fn name(self) -> &'static str {
        match self {
            Metric::Reviews => "Reviews",
            Metric::Pitchformulaity => "Pitchformulaity",
            Metric::NaiveSentenceLength => "Naïve sentence length",
            Metric::WordsInvented => "Words invented",
            Metric::CharacterCount => "Character count",
            Metric::WordCount => "Word count",
            Metric::WordLength => "Word length",
            Metric::BullshitScore => "Overall Bullshit Score",
        }
    }

    /// Look up a metric by exact wire name
    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.name() == name)
    }

    /// True for the composite, which is computed from other metrics' statistics
    pub const fn is_derived(self) -> bool {
        matches!(self, Metric::BullshitScore)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::from_name(s).ok_or_else(|| Error::InvalidInput(format!("unknown metric '{}'", s)))
    }
}
