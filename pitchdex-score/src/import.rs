//! JSON review dumps
//!
//! Two layouts are accepted:
//! - an array of `{"reviewers", "editorial", "key"}` records
//! - an object mapping each permalink key to `{"reviewers", "editorial"}`
//!
//! The review id is the integer prefix of the key, up to the first `-`.

use std::collections::BTreeMap;
use std::path::Path;

use pitchdex_common::{Error, Result, Review};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct ReviewRecord {
    #[serde(rename = "reviewers", default)]
    author: String,
    #[serde(rename = "editorial", default)]
    body: String,
    #[serde(rename = "key", default)]
    permalink: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReviewDump {
    List(Vec<ReviewRecord>),
    Keyed(BTreeMap<String, ReviewRecord>),
}

/// A record left out of an import, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRejection {
    pub permalink: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub reviews: Vec<Review>,
    pub rejected: Vec<ImportRejection>,
}

/// Parse the id prefix of a permalink key, e.g. `16573-shields` -> 16573
pub fn id_from_permalink(permalink: &str) -> Result<i64> {
    let prefix = permalink.split('-').next().unwrap_or_default();
    prefix
        .parse()
        .map_err(|e| Error::InvalidInput(format!("{}: bad id '{}': {}", permalink, prefix, e)))
}

fn into_review(record: ReviewRecord) -> std::result::Result<Review, ImportRejection> {
    let reject = |reason: String| ImportRejection {
        permalink: record.permalink.clone(),
        reason,
    };

    let id = id_from_permalink(&record.permalink).map_err(|e| reject(e.to_string()))?;
    if record.author.is_empty() || record.body.is_empty() {
        return Err(reject(format!(
            "empty field (author {} bytes, body {} bytes)",
            record.author.len(),
            record.body.len()
        )));
    }
    Ok(Review::new(id, record.author, record.body, record.permalink))
}

/// Parse a JSON dump
///
/// Invalid JSON is an error. Records with a bad id or an empty author or
/// body are reported in [`ImportReport::rejected`] and left out.
pub fn parse_reviews(json: &str) -> Result<ImportReport> {
    let records = match serde_json::from_str::<ReviewDump>(json)? {
        ReviewDump::List(records) => records,
        ReviewDump::Keyed(map) => map
            .into_iter()
            .map(|(key, mut record)| {
                record.permalink = key;
                record
            })
            .collect(),
    };

    let mut report = ImportReport::default();
    for record in records {
        match into_review(record) {
            Ok(review) => report.reviews.push(review),
            Err(rejection) => {
                warn!("Skipping {}: {}", rejection.permalink, rejection.reason);
                report.rejected.push(rejection);
            }
        }
    }
    Ok(report)
}

/// Read and parse a JSON dump from disk
pub fn import_file(path: &Path) -> Result<ImportReport> {
    let json = std::fs::read_to_string(path)?;
    let report = parse_reviews(&json)?;
    info!(
        "{}: {} reviews, {} rejected",
        path.display(),
        report.reviews.len(),
        report.rejected.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_id_from_permalink() {
        assert_eq!(id_from_permalink("16573-shields").unwrap(), 16573);
        assert_eq!(id_from_permalink("42").unwrap(), 42);
        assert!(matches!(id_from_permalink("shields-16573"), Err(Error::InvalidInput(_))));
        assert!(id_from_permalink("").is_err());
    }

    #[test]
    fn test_parse_list() {
        let json = r#"[
            {"reviewers": "Lindsay Zoladz", "editorial": "<p>Lush.</p>", "key": "16573-shields"},
            {"reviewers": "Ned Raggett", "editorial": "Gods.", "key": "16574-ghost-reveries"}
        ]"#;
        let report = parse_reviews(json).unwrap();
        assert!(report.rejected.is_empty());
        assert_eq!(report.reviews.len(), 2);
        assert_eq!(report.reviews[0].id, 16573);
        assert_eq!(report.reviews[0].author, "Lindsay Zoladz");
        assert_eq!(report.reviews[0].body, "<p>Lush.</p>");
        assert_eq!(report.reviews[1].permalink, "16574-ghost-reveries");
        assert!(report.reviews[1].scores.is_empty());
    }

    #[test]
    fn test_parse_keyed_object() {
        let json = r#"{
            "17000-acousmatic-sorcery": {"reviewers": "Mark Richardson", "editorial": "Beal's debut."}
        }"#;
        let report = parse_reviews(json).unwrap();
        assert_eq!(report.reviews.len(), 1);
        assert_eq!(report.reviews[0].id, 17000);
        assert_eq!(report.reviews[0].permalink, "17000-acousmatic-sorcery");
    }

    #[test]
    fn test_bad_records_are_rejected_not_fatal() {
        let json = r#"[
            {"reviewers": "", "editorial": "body", "key": "1-no-author"},
            {"reviewers": "A", "editorial": "", "key": "2-no-body"},
            {"reviewers": "A", "editorial": "body", "key": "three-bad-id"},
            {"reviewers": "A", "editorial": "body", "key": "4-good"}
        ]"#;
        let report = parse_reviews(json).unwrap();
        assert_eq!(report.reviews.len(), 1);
        assert_eq!(report.reviews[0].id, 4);

        let rejected: Vec<&str> = report.rejected.iter().map(|r| r.permalink.as_str()).collect();
        assert_eq!(rejected, vec!["1-no-author", "2-no-body", "three-bad-id"]);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(parse_reviews("{not json"), Err(Error::Json(_))));
        assert!(parse_reviews("42").is_err());
    }

    #[test]
    fn test_import_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"reviewers": "A", "editorial": "b.", "key": "9-x"}}]"#).unwrap();
        let report = import_file(file.path()).unwrap();
        assert_eq!(report.reviews.len(), 1);

        assert!(matches!(
            import_file(Path::new("/nonexistent/pitchdex/dump.json")),
            Err(Error::Io(_))
        ));
    }
}
