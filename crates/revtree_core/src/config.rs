//! Repository configuration.

/// Configuration for a [`Repository`](crate::Repository).
#[derive(Debug, Clone)]
pub struct Config {
    /// Identifier of the repository; becomes the first address component.
    pub repository_id: String,

    /// Actor recorded on events when the caller does not name one.
    pub default_actor: String,

    /// Whether rejected commands are logged at warning level.
    pub log_rejections: bool,

    /// Maximum number of sync log entries kept per model (None = unbounded).
    ///
    /// Older entries are dropped by moving the log's base revision forward.
    pub sync_log_retention: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository_id: "repo".to_string(),
            default_actor: "local".to_string(),
            log_rejections: true,
            sync_log_retention: None,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the repository identifier.
    #[must_use]
    pub fn repository_id(mut self, id: impl Into<String>) -> Self {
        self.repository_id = id.into();
        self
    }

    /// Sets the default actor.
    #[must_use]
    pub fn default_actor(mut self, actor: impl Into<String>) -> Self {
        self.default_actor = actor.into();
        self
    }

    /// Sets whether rejections are logged.
    #[must_use]
    pub const fn log_rejections(mut self, value: bool) -> Self {
        self.log_rejections = value;
        self
    }

    /// Sets the per-model sync log retention.
    #[must_use]
    pub const fn sync_log_retention(mut self, entries: Option<usize>) -> Self {
        self.sync_log_retention = entries;
        self
    }
}
