//! SQLite persistence for submitted news.
//!
//! This crate provides:
//! - The `news` record table with an append-only id sequence
//! - Database migrations
//! - Model types for stored rows
//!
//! The store is the single source of truth for "needs forwarding": a record
//! whose published flag is still clear must eventually be delivered, and the
//! in-memory outbox is rebuilt from [`Database::list_unpublished`] on startup.
//!
//! ```ignore
//! let db = Database::open(Path::new("news.db"))?;
//! let record = db.append("BBC", "Some News")?;
//! db.mark_published(record.id)?;
//! ```

mod db;
mod error;
mod migrations;
mod models;

pub use db::Database;
pub use error::{DatabaseError, DatabaseResult};
pub use migrations::run_migrations;
pub use models::NewsRecord;
