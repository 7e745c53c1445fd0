//! A-Prime storage crate - SQLite persistence for sessions and messages.
//!
//! Provides a WAL-mode SQLite database with versioned migrations and the
//! `SqliteStore` implementation of the `SessionStore` contract.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::SqliteStore;
