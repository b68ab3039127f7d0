use std::path::PathBuf;

/// Longest comment accepted by default, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 2000;

/// Configuration for the comment store.
///
/// Use [`StoreConfig::builder()`] for construction, or
/// [`StoreConfig::default()`] for an in-memory database with the default
/// length limit.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file. `None` = in-memory database.
    pub db_path: Option<PathBuf>,

    /// Maximum comment length in characters.
    pub max_length: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

/// Builder for [`StoreConfig`].
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Persist to a database file. Omit for in-memory.
    pub fn with_db_path(mut self, path: PathBuf) -> Self {
        self.config.db_path = Some(path);
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.config.max_length = max;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
