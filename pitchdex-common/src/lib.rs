//! # Pitchdex Common Library
//!
//! Shared code for the Pitchdex binaries including:
//! - Metric names (the closed set of score keys)
//! - Review and author models
//! - Configuration loading
//! - SQLite schema and store

pub mod config;
pub mod db;
pub mod error;
pub mod metric;
pub mod models;

pub use error::{Error, Result};
pub use metric::Metric;
pub use models::{AuthorAggregate, Review, ReviewCollection, ScoreMap};
