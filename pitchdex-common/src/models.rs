//! Review and author models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Metric;

/// Scores keyed by metric
pub type ScoreMap = BTreeMap<Metric, i64>;

/// A single imported review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub author: String,
    /// Raw body, may contain markup
    pub body: String,
    pub permalink: String,
    #[serde(default)]
    pub scores: ScoreMap,
}

impl Review {
    /// Create an unscored review
    pub fn new(
        id: i64,
        author: impl Into<String>,
        body: impl Into<String>,
        permalink: impl Into<String>,
    ) -> Self {
        Self {
            id,
            author: author.into(),
            body: body.into(),
            permalink: permalink.into(),
            scores: ScoreMap::new(),
        }
    }

    pub fn score(&self, metric: Metric) -> Option<i64> {
        self.scores.get(&metric).copied()
    }

    pub fn has_score(&self, metric: Metric) -> bool {
        self.scores.contains_key(&metric)
    }
}

/// Owned, id-keyed review collection
///
/// Iteration is in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewCollection {
    reviews: BTreeMap<i64, Review>,
}

impl ReviewCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a review, returning the one it replaced
    pub fn insert(&mut self, review: Review) -> Option<Review> {
        self.reviews.insert(review.id, review)
    }

    pub fn get(&self, id: i64) -> Option<&Review> {
        self.reviews.get(&id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut Review> {
        self.reviews.get_mut(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.reviews.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.reviews.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Review> {
        self.reviews.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Review> {
        self.reviews.values_mut()
    }

    /// Ids of reviews matching `filter`, ascending
    pub fn by<F>(&self, filter: F) -> Vec<i64>
    where
        F: Fn(&Review) -> bool,
    {
        self.reviews
            .values()
            .filter(|r| filter(r))
            .map(|r| r.id)
            .collect()
    }

    /// Ids of reviews written by exactly `author`
    pub fn by_author(&self, author: &str) -> Vec<i64> {
        self.by(|r| r.author == author)
    }

    /// Review count per author
    ///
    /// Authors are grouped by exact string equality; no case or whitespace
    /// normalization is applied.
    pub fn author_count(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for review in self.reviews.values() {
            *counts.entry(review.author.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Sum of `metric` over `ids`; absent scores and unknown ids add 0
    pub fn total_score(&self, ids: &[i64], metric: Metric) -> i64 {
        ids.iter()
            .filter_map(|id| self.reviews.get(id))
            .filter_map(|r| r.score(metric))
            .sum()
    }
}

impl FromIterator<Review> for ReviewCollection {
    fn from_iter<I: IntoIterator<Item = Review>>(iter: I) -> Self {
        let mut collection = ReviewCollection::new();
        for review in iter {
            collection.insert(review);
        }
        collection
    }
}

impl Extend<Review> for ReviewCollection {
    fn extend<I: IntoIterator<Item = Review>>(&mut self, iter: I) {
        for review in iter {
            self.insert(review);
        }
    }
}

impl IntoIterator for ReviewCollection {
    type Item = Review;
    type IntoIter = std::collections::btree_map::IntoValues<i64, Review>;

    fn into_iter(self) -> Self::IntoIter {
        self.reviews.into_values()
    }
}

/// Per-author rollup of review scores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorAggregate {
    pub name: String,
    pub review_count: usize,
    pub scores: ScoreMap,
}
