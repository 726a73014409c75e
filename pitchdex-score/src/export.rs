//! JSON table exports in the `{"aaData": [...]}` shape the table UI reads
//!
//! Every cell is a string; score cells are keyed by metric wire name.

use std::collections::BTreeMap;
use std::path::Path;

use pitchdex_common::{AuthorAggregate, Result, ReviewCollection, ScoreMap};
use serde::Serialize;
use tracing::info;

pub type Row = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableExport {
    #[serde(rename = "aaData")]
    pub rows: Vec<Row>,
}

fn score_cells(row: &mut Row, scores: &ScoreMap) {
    for (metric, score) in scores {
        row.insert(metric.name().to_string(), score.to_string());
    }
}

/// One row per author: `Author` plus every aggregated score
pub fn authors_table(aggregates: &[AuthorAggregate]) -> TableExport {
    let rows = aggregates
        .iter()
        .map(|aggregate| {
            let mut row = Row::new();
            row.insert("Author".to_string(), aggregate.name.clone());
            score_cells(&mut row, &aggregate.scores);
            row
        })
        .collect();
    TableExport { rows }
}

/// One row per review: `ID`, `Title` (the permalink), `Author` and scores
pub fn reviews_table(reviews: &ReviewCollection) -> TableExport {
    let rows = reviews
        .iter()
        .map(|review| {
            let mut row = Row::new();
            row.insert("ID".to_string(), review.id.to_string());
            row.insert("Title".to_string(), review.permalink.clone());
            row.insert("Author".to_string(), review.author.clone());
            score_cells(&mut row, &review.scores);
            row
        })
        .collect();
    TableExport { rows }
}

/// Write a table to `path`, replacing any existing file
pub fn write_json(table: &TableExport, path: &Path) -> Result<()> {
    let buf = serde_json::to_vec(table)?;
    std::fs::write(path, buf)?;
    info!("Wrote {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchdex_common::{Metric, Review};

    #[test]
    fn test_authors_table() {
        let mut scores = ScoreMap::new();
        scores.insert(Metric::Reviews, 3);
        scores.insert(Metric::NaiveSentenceLength, 21);
        let table = authors_table(&[AuthorAggregate {
            name: "Ned Raggett".to_string(),
            review_count: 3,
            scores,
        }]);

        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row["Author"], "Ned Raggett");
        assert_eq!(row["Reviews"], "3");
        assert_eq!(row["Naïve sentence length"], "21");
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_reviews_table_and_json_shape() {
        let mut review = Review::new(16573, "Lindsay Zoladz", "body", "16573-shields");
        review.scores.insert(Metric::BullshitScore, 44);
        let reviews: ReviewCollection = [review].into_iter().collect();

        let table = reviews_table(&reviews);
        let json = serde_json::to_value(&table).unwrap();
        let row = &json["aaData"][0];
        assert_eq!(row["ID"], "16573");
        assert_eq!(row["Title"], "16573-shields");
        assert_eq!(row["Author"], "Lindsay Zoladz");
        assert_eq!(row["Overall Bullshit Score"], "44");
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("authors.json");
        write_json(&authors_table(&[]), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"aaData":[]}"#);
    }
}
