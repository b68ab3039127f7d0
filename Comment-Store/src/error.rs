use thiserror::Error;

/// Errors that can occur in the comment store.
#[derive(Error, Debug)]
pub enum CommentError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid comment: {0}")]
    Validation(String),

    #[error("Comment not found: {0}")]
    NotFound(i64),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for CommentError {
    fn from(err: anyhow::Error) -> Self {
        CommentError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CommentError>;
