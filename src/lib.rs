//! Card Catalog - MTG card browsing service
//!
//! Imports a trading-card CSV export into SQLite and serves a paginated
//! browse/search JSON API with a static web client on top.

pub mod artists;
pub mod cards;
pub mod database;
pub mod error;
pub mod import;
pub mod models;
pub mod pagination;
pub mod web;

pub use database::{init_schema, open_database};
pub use error::{CatalogError, Result};
pub use import::{run_import, ImportSummary};
pub use pagination::Page;
