//! Database schema and review store

pub mod init;
pub mod store;

pub use init::*;
pub use store::*;
