use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    config::StoreConfig,
    db,
    error::{CommentError, Result},
    types::Comment,
};

/// Append-only comment storage backed by SQLite.
///
/// # Example
///
/// ```
/// use comment_store::{CommentStore, StoreConfig};
///
/// let store = CommentStore::new(StoreConfig::default()).unwrap();
/// store.init().unwrap();
/// let saved = store.insert("Looks great!").unwrap();
/// assert_eq!(store.list()[0].id, saved.id);
/// ```
#[derive(Clone)]
pub struct CommentStore {
    db: Arc<Mutex<Connection>>,
    max_length: usize,
}

impl CommentStore {
    /// Open the database named by `config`. Call [`init()`](Self::init)
    /// before the first insert.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let conn = db::open_database(config.db_path.as_deref())?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
            max_length: config.max_length,
        })
    }

    /// Open and initialize in one step.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let store = Self::new(config)?;
        store.init()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|e| CommentError::Other(e.to_string()))
    }

    /// Create the comments table if it is missing. Repeat calls are no-ops.
    pub fn init(&self) -> Result<()> {
        let conn = self.conn()?;
        db::init_schema(&conn)?;
        tracing::debug!("comment schema ready");
        Ok(())
    }

    /// Check `text` without touching the database.
    pub fn validate(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(CommentError::Validation("comment must not be empty".into()));
        }
        let len = text.chars().count();
        if len > self.max_length {
            return Err(CommentError::Validation(format!(
                "comment is {} characters, limit is {}",
                len, self.max_length
            )));
        }
        Ok(())
    }

    /// Store a comment and return it with its assigned id and timestamp.
    pub fn insert(&self, text: &str) -> Result<Comment> {
        self.validate(text)?;
        let conn = self.conn()?;
        let comment = db::insert_comment(&conn, text)?;
        tracing::info!(id = comment.id, "comment stored");
        Ok(comment)
    }

    pub fn get(&self, id: i64) -> Result<Comment> {
        let conn = self.conn()?;
        db::get_comment(&conn, id)?.ok_or(CommentError::NotFound(id))
    }

    /// Every comment, newest first. Read failures are logged and give an
    /// empty list.
    pub fn list(&self) -> Vec<Comment> {
        let result = self
            .conn()
            .and_then(|conn| db::list_comments(&conn).map_err(CommentError::from));
        match result {
            Ok(comments) => comments,
            Err(e) => {
                tracing::error!(error = %e, "failed to list comments");
                Vec::new()
            }
        }
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.conn()?;
        Ok(db::count_comments(&conn)?)
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}
