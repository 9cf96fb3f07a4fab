//! SQLite backend for the storefront fulfilment engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
