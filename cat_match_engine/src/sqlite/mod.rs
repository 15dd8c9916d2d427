//! SQLite backend for the match lifecycle engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
