#![forbid(unsafe_code)]

//! Session configuration.
//!
//! # Defaults
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `autosave_delay` | 1000ms | Quiet period after the last edit before autosaving |
//! | `history_capacity` | unbounded | Maximum undo entries kept |
//!
//! # Environment Variables
//!
//! | Variable | Type | Description |
//! |----------|------|-------------|
//! | `FORMKIT_AUTOSAVE_MS` | u64 | Autosave quiet period |
//! | `FORMKIT_HISTORY_CAPACITY` | usize | History bound, `0` for unbounded |
//!
//! # TOML
//!
//! ```toml
//! autosave_ms = 750
//! history_capacity = 200
//! ```

use std::path::Path;

use formkit_history::HistoryConfig;
use serde::Deserialize;
use web_time::Duration;

/// Default autosave quiet period.
pub const DEFAULT_AUTOSAVE_MS: u64 = 1000;

/// Errors that can occur when loading a session configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Tunables for an [`EditingSession`](crate::EditingSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long edits must be quiet before the document is autosaved.
    pub autosave_delay: Duration,
    /// Maximum number of history entries; `None` keeps everything.
    pub history_capacity: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_delay: Duration::from_millis(DEFAULT_AUTOSAVE_MS),
            history_capacity: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    autosave_ms: Option<u64>,
    history_capacity: Option<usize>,
}

impl SessionConfig {
    #[must_use]
    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave_delay = delay;
        self
    }

    /// Bound the history; `0` means unbounded.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = (capacity > 0).then_some(capacity);
        self
    }

    /// Load config from environment variables.
    ///
    /// Unset or unparsable values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(ms) = lookup("FORMKIT_AUTOSAVE_MS").and_then(|v| v.trim().parse::<u64>().ok()) {
            config.autosave_delay = Duration::from_millis(ms);
        }
        if let Some(cap) =
            lookup("FORMKIT_HISTORY_CAPACITY").and_then(|v| v.trim().parse::<usize>().ok())
        {
            config = config.with_history_capacity(cap);
        }
        config
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(s)?;
        let mut config = Self::default();
        if let Some(ms) = raw.autosave_ms {
            config.autosave_delay = Duration::from_millis(ms);
        }
        if let Some(cap) = raw.history_capacity {
            config = config.with_history_capacity(cap);
        }
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// History configuration derived from these settings.
    #[must_use]
    pub fn history_config(&self) -> HistoryConfig {
        match self.history_capacity {
            Some(cap) => HistoryConfig::bounded(cap),
            None => HistoryConfig::unbounded(),
        }
    }
}
