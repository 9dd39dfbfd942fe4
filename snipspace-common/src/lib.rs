//! # Snipspace Common Library
//!
//! Shared code for the Snipspace dashboard service:
//! - Entry data model and closed type tags
//! - Content-type classifier, day-grouping and filter/search engines
//! - Capture submission flow and its boundary contract
//! - Built-in sample timeline for degraded operation
//! - Password/session helpers, configuration, SQLite persistence

pub mod auth;
pub mod capture;
pub mod classify;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod filter;
pub mod fixtures;
pub mod group;
pub mod model;

pub use error::{Error, Result};
pub use model::{Entry, EntryType, GroupedEntries, View};
