//! SQLite persistence for seasons, fixtures, and the log catalog.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - Repository layer, including the conditional result write

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::{Repository, RoundIndex};
