//! HTTP API handlers for pitchdex-web

pub mod health;
pub mod tables;
pub mod ui;

pub use health::health_routes;
pub use tables::{get_authors, get_reviews};
pub use ui::{serve_app_js, serve_index};
