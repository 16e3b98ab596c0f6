//! SQLite-backed roster store.
//!
//! Queries and single-table mutations are free functions over a
//! [`Connection`]; a [`rusqlite::Transaction`] derefs to one, so callers
//! decide how much of a run is atomic.

pub mod mutations;
pub mod queries;
mod schema;

pub use schema::init_schema;

use itertools::Itertools;
use log::info;
use rusqlite::Connection;
use std::path::Path;

pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    info!("Opened roster store at {}", path.display());
    Ok(conn)
}

pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

/// `?, ?, ?` for an `IN (...)` list of `n` values.
pub(crate) fn placeholders(n: usize) -> String {
    std::iter::repeat_n("?", n).join(", ")
}
