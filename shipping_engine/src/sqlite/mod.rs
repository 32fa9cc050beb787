//! SQLite backend for the shipping engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
