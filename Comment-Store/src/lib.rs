//! # Comment Store
//!
//! Append-only comment storage on embedded SQLite.
//!
//! - `init()` creates the table and is safe to repeat
//! - `insert()` validates before writing and returns the stored record
//! - `list()` returns every comment newest first, and an empty list when
//!   the database cannot be read
//!
//! Comments are never edited or deleted.

pub mod config;
pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use config::{StoreConfig, StoreConfigBuilder, DEFAULT_MAX_LENGTH};
pub use error::{CommentError, Result};
pub use store::CommentStore;
pub use types::Comment;
