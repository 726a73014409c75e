//! Read-only database access for pitchdex-web
//!
//! All connections are opened with `mode=ro`. Sort columns and directions
//! come from [`crate::datatables`] enums and map to fixed SQL fragments;
//! search terms and score names are always bound.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use pitchdex_common::db::Store;
use pitchdex_common::{Metric, Review};
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use crate::datatables::{Column, TableParams};
use crate::error::ApiResult;

pub type Row = Map<String, Value>;

/// Connect to the database in read-only mode
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!(
            "Database not found: {}\nRun pitchdex-score --import <dump.json> first.",
            db_path.display()
        );
    }

    // No immutable=1: the scorer may write while the server runs
    let db_url = format!("sqlite://{}?mode=ro", db_path.display());

    SqlitePool::connect(&db_url)
        .await
        .context("Failed to connect to database in read-only mode")
}

/// One page of a table plus its counts
#[derive(Debug, Default)]
pub struct Page {
    pub total: i64,
    pub matching: i64,
    pub rows: Vec<Row>,
}

/// Sort expression for a review column; score columns sort on `s.score`
fn review_order(column: Column) -> &'static str {
    match column {
        Column::Id => "r.id",
        Column::Title => "r.permalink",
        Column::Author => "x.author_name",
        Column::Score(_) => "s.score",
    }
}

/// Score name bound into the sort join; empty when sorting on a fixed column
fn sort_score_name(column: Column) -> &'static str {
    match column {
        Column::Score(metric) => metric.name(),
        _ => "",
    }
}

fn insert_scores<'a>(row: &mut Row, scores: impl IntoIterator<Item = (&'a Metric, &'a i64)>) {
    for (metric, score) in scores {
        row.insert(metric.name().to_string(), Value::String(score.to_string()));
    }
}

fn review_row(review: &Review) -> Row {
    let mut row = Row::new();
    row.insert("ID".to_string(), Value::String(review.id.to_string()));
    row.insert("Title".to_string(), Value::String(review.permalink.clone()));
    row.insert("Author".to_string(), Value::String(review.author.clone()));
    insert_scores(&mut row, &review.scores);
    row
}

/// Reviews matching `params`, sorted and paged
///
/// The search term matches author name or permalink.
pub async fn query_reviews(pool: &SqlitePool, params: &TableParams) -> ApiResult<Page> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
        .fetch_one(pool)
        .await?;

    let pattern = params.like_pattern();
    let matching: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM reviews r
        JOIN authorship x ON x.review_id = r.id
        WHERE x.author_name LIKE ?1 ESCAPE '\' OR r.permalink LIKE ?1 ESCAPE '\'
        "#,
    )
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let sql = format!(
        r#"
        SELECT r.id
        FROM reviews r
        JOIN authorship x ON x.review_id = r.id
        LEFT JOIN review_scores s ON s.review_id = r.id AND s.name = ?1
        WHERE x.author_name LIKE ?2 ESCAPE '\' OR r.permalink LIKE ?2 ESCAPE '\'
        ORDER BY {} {}, r.id
        LIMIT ?3 OFFSET ?4
        "#,
        review_order(params.sort_column),
        params.sort_direction.sql()
    );
    let ids: Vec<i64> = sqlx::query_scalar(&sql)
        .bind(sort_score_name(params.sort_column))
        .bind(&pattern)
        .bind(params.count)
        .bind(params.offset)
        .fetch_all(pool)
        .await?;

    let reviews = Store::new(pool.clone()).select_reviews(&ids).await?;

    let rows = ids
        .iter()
        .filter_map(|id| reviews.get(*id))
        .map(review_row)
        .collect();

    Ok(Page {
        total,
        matching,
        rows,
    })
}

/// Authors matching `params`, sorted and paged
///
/// ID and Title are not author columns; [`TableParams`] never yields them
/// for the author table.
pub async fn query_authors(pool: &SqlitePool, params: &TableParams) -> ApiResult<Page> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
        .fetch_one(pool)
        .await?;

    let pattern = params.like_pattern();
    let matching: i64 =
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM authors WHERE name LIKE ?1 ESCAPE '\'"#)
            .bind(&pattern)
            .fetch_one(pool)
            .await?;

    let order = match params.sort_column {
        Column::Score(_) => "s.score",
        _ => "a.name",
    };
    let sql = format!(
        r#"
        SELECT a.name
        FROM authors a
        LEFT JOIN author_scores s ON s.author_name = a.name AND s.name = ?1
        WHERE a.name LIKE ?2 ESCAPE '\'
        ORDER BY {} {}, a.name
        LIMIT ?3 OFFSET ?4
        "#,
        order,
        params.sort_direction.sql()
    );
    let names: Vec<String> = sqlx::query_scalar(&sql)
        .bind(sort_score_name(params.sort_column))
        .bind(&pattern)
        .bind(params.count)
        .bind(params.offset)
        .fetch_all(pool)
        .await?;

    let mut scores: BTreeMap<String, BTreeMap<Metric, i64>> = BTreeMap::new();
    if !names.is_empty() {
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "SELECT author_name, name, score FROM author_scores WHERE author_name IN ({})",
            placeholders
        );
        let mut query = sqlx::query_as::<_, (String, String, i64)>(&sql);
        for name in &names {
            query = query.bind(name);
        }
        for (author, name, score) in query.fetch_all(pool).await? {
            if let Some(metric) = Metric::from_name(&name) {
                scores.entry(author).or_default().insert(metric, score);
            }
        }
    }

    let rows = names
        .into_iter()
        .map(|name| {
            let mut row = Row::new();
            if let Some(author_scores) = scores.get(&name) {
                insert_scores(&mut row, author_scores);
            }
            row.insert("Author".to_string(), Value::String(name));
            row
        })
        .collect();

    Ok(Page {
        total,
        matching,
        rows,
    })
}
