//! Review store
//!
//! The four operations the scoring engine needs from persistence (store
//! review, fetch reviews by id, store score, fetch aggregates) plus the
//! counting and selection helpers the binaries use.

use std::collections::BTreeMap;
use std::path::Path;

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};

use crate::{AuthorAggregate, Metric, Result, Review, ReviewCollection, ScoreMap};

/// Upper bound on bound parameters per `IN (...)` query
const ID_CHUNK: usize = 500;

/// Outcome of a bulk review insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// SQLite-backed review store
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(super::init_database(db_path).await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Store a review with its author and any scores it already carries
    ///
    /// An existing review with the same id is left untouched unless
    /// `overwrite` is set, in which case its body, author and permalink are
    /// replaced and its stored scores are dropped. Returns whether anything
    /// was written.
    pub async fn insert_review(&self, review: &Review, overwrite: bool) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE id = ?)")
            .bind(review.id)
            .fetch_one(&mut *tx)
            .await?;
        if exists && !overwrite {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO reviews (id, permalink, body) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET permalink = excluded.permalink, body = excluded.body
            "#,
        )
        .bind(review.id)
        .bind(&review.permalink)
        .bind(&review.body)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT OR IGNORE INTO authors (name) VALUES (?)")
            .bind(&review.author)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO authorship (review_id, author_name) VALUES (?, ?)
            ON CONFLICT(review_id) DO UPDATE SET author_name = excluded.author_name
            "#,
        )
        .bind(review.id)
        .bind(&review.author)
        .execute(&mut *tx)
        .await?;

        if exists {
            sqlx::query("DELETE FROM review_scores WHERE review_id = ?")
                .bind(review.id)
                .execute(&mut *tx)
                .await?;
            // the previous author may have lost their last review
            prune_orphan_authors(&mut tx).await?;
        }

        for (metric, score) in &review.scores {
            sqlx::query("INSERT INTO review_scores (review_id, name, score) VALUES (?, ?, ?)")
                .bind(review.id)
                .bind(metric.name())
                .bind(score)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Store many reviews
    ///
    /// A failure on one review is logged and counted; the rest still go in.
    pub async fn insert_reviews<'a, I>(&self, reviews: I, overwrite: bool) -> InsertReport
    where
        I: IntoIterator<Item = &'a Review>,
    {
        let mut report = InsertReport::default();
        for review in reviews {
            match self.insert_review(review, overwrite).await {
                Ok(true) => report.inserted += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    warn!("Insert review {} ({}): {}", review.id, review.permalink, e);
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Fetch reviews (with their scores) by id; unknown ids are ignored
    pub async fn select_reviews(&self, ids: &[i64]) -> Result<ReviewCollection> {
        let mut reviews = ReviewCollection::new();

        for chunk in ids.chunks(ID_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");

            let sql = format!(
                r#"
                SELECT r.id, x.author_name, r.body, r.permalink
                FROM reviews r
                JOIN authorship x ON x.review_id = r.id
                WHERE r.id IN ({})
                "#,
                placeholders
            );
            let mut query = sqlx::query_as::<_, (i64, String, String, String)>(&sql);
            for id in chunk {
                query = query.bind(id);
            }
            for (id, author, body, permalink) in query.fetch_all(&self.pool).await? {
                reviews.insert(Review::new(id, author, body, permalink));
            }

            let sql = format!(
                "SELECT review_id, name, score FROM review_scores WHERE review_id IN ({})",
                placeholders
            );
            let mut query = sqlx::query_as::<_, (i64, String, i64)>(&sql);
            for id in chunk {
                query = query.bind(id);
            }
            for (id, name, score) in query.fetch_all(&self.pool).await? {
                let Some(metric) = Metric::from_name(&name) else {
                    warn!("Review {}: ignoring unknown score name '{}'", id, name);
                    continue;
                };
                if let Some(review) = reviews.get_mut(id) {
                    review.scores.insert(metric, score);
                }
            }
        }

        Ok(reviews)
    }

    /// Fetch every review
    pub async fn select_all_reviews(&self) -> Result<ReviewCollection> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM reviews ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        self.select_reviews(&ids).await
    }

    /// Store scores for one review
    ///
    /// Existing scores of the same name are replaced only when `overwrite`
    /// is set. Overwriting also deletes stored scores for known metrics
    /// missing from `scores`; rows with unrecognized names are left alone.
    pub async fn insert_review_scores(
        &self,
        review_id: i64,
        scores: &ScoreMap,
        overwrite: bool,
    ) -> Result<()> {
        let sql = if overwrite {
            "INSERT OR REPLACE INTO review_scores (review_id, name, score) VALUES (?, ?, ?)"
        } else {
            "INSERT OR IGNORE INTO review_scores (review_id, name, score) VALUES (?, ?, ?)"
        };

        let mut tx = self.pool.begin().await?;
        if overwrite {
            for metric in Metric::ALL.into_iter().filter(|m| !scores.contains_key(m)) {
                sqlx::query("DELETE FROM review_scores WHERE review_id = ? AND name = ?")
                    .bind(review_id)
                    .bind(metric.name())
                    .execute(&mut *tx)
                    .await?;
            }
        }
        for (metric, score) in scores {
            sqlx::query(sql)
                .bind(review_id)
                .bind(metric.name())
                .bind(score)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Replace all stored author aggregates
    pub async fn replace_author_scores(&self, aggregates: &[AuthorAggregate]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM author_scores")
            .execute(&mut *tx)
            .await?;
        prune_orphan_authors(&mut tx).await?;

        for aggregate in aggregates {
            sqlx::query("INSERT OR IGNORE INTO authors (name) VALUES (?)")
                .bind(&aggregate.name)
                .execute(&mut *tx)
                .await?;
            for (metric, score) in &aggregate.scores {
                sqlx::query("INSERT INTO author_scores (author_name, name, score) VALUES (?, ?, ?)")
                    .bind(&aggregate.name)
                    .bind(metric.name())
                    .bind(score)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        debug!("Stored aggregates for {} authors", aggregates.len());
        Ok(())
    }

    /// Fetch stored author aggregates, sorted by author name
    pub async fn select_author_aggregates(&self) -> Result<Vec<AuthorAggregate>> {
        let counts = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT a.name, COUNT(x.review_id)
            FROM authors a
            LEFT JOIN authorship x ON x.author_name = a.name
            GROUP BY a.name
            ORDER BY a.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut aggregates: BTreeMap<String, AuthorAggregate> = counts
            .into_iter()
            .map(|(name, count)| {
                let aggregate = AuthorAggregate {
                    name: name.clone(),
                    review_count: count.max(0) as usize,
                    scores: ScoreMap::new(),
                };
                (name, aggregate)
            })
            .collect();

        let rows = sqlx::query_as::<_, (String, String, i64)>(
            "SELECT author_name, name, score FROM author_scores",
        )
        .fetch_all(&self.pool)
        .await?;

        for (author, name, score) in rows {
            let Some(metric) = Metric::from_name(&name) else {
                warn!("Author {}: ignoring unknown score name '{}'", author, name);
                continue;
            };
            if let Some(aggregate) = aggregates.get_mut(&author) {
                aggregate.scores.insert(metric, score);
            }
        }

        Ok(aggregates.into_values().collect())
    }

    pub async fn review_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn author_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(DISTINCT author_name) FROM authorship")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Delete authors left without any review, along with their stored scores
async fn prune_orphan_authors(tx: &mut Transaction<'_, Sqlite>) -> Result<()> {
    sqlx::query(
        "DELETE FROM author_scores WHERE author_name NOT IN (SELECT author_name FROM authorship)",
    )
    .execute(&mut **tx)
    .await?;
    let pruned = sqlx::query("DELETE FROM authors WHERE name NOT IN (SELECT author_name FROM authorship)")
        .execute(&mut **tx)
        .await?
        .rows_affected();
    if pruned > 0 {
        debug!("Removed {} authors with no reviews", pruned);
    }
    Ok(())
}
