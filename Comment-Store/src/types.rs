use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored comment. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Store-assigned, increases with every insert.
    pub id: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
