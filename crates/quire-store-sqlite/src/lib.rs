//! SQLite backend for the Quire publishing platform.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each operation is a plain synchronous
//! function over a [`rusqlite::Connection`]; [`SqliteStore`] calls it inside
//! one transaction and commits only on success.

mod articles;
mod blocks;
mod bookmarks;
mod comments;
mod encode;
mod reactions;
mod schema;
mod search;
mod store;
mod tags;
mod users;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
