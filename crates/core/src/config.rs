//! Cursor configuration via `shardcursor.toml`
//!
//! Holds the tunable constants of batch sizing. Every field
//! has a default, so an empty file is a valid configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "shardcursor.toml";

/// Batch size used when the caller gives no hint.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Extra hits fetched on top of a caller's document cap.
pub const DEFAULT_EXTRACTABLE_LIMIT_SLACK: usize = 2;

/// Cursor configuration loaded from `shardcursor.toml`.
///
/// # Example
///
/// ```toml
/// default_batch_size = 100
/// extractable_limit_slack = 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Batch size when no hint is given.
    pub default_batch_size: usize,
    /// Hits added to `docs_requested` by the extractable-limit optimization.
    pub extractable_limit_slack: usize,
    /// First advice of the exponentially increasing strategy.
    pub exponential_initial_batch_size: usize,
    /// Multiplier applied on every adjust of the exponential strategy.
    pub exponential_growth_factor: usize,
    /// Upper bound on any advised batch size.
    pub max_batch_size: usize,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            default_batch_size: DEFAULT_BATCH_SIZE,
            extractable_limit_slack: DEFAULT_EXTRACTABLE_LIMIT_SLACK,
            exponential_initial_batch_size: 10,
            exponential_growth_factor: 2,
            max_batch_size: 100_000,
        }
    }
}

impl CursorConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# shardcursor configuration
#
# Batch size used when the caller supplies neither docs_requested nor a
# batch size hint (default: 100)
default_batch_size = 100

# Extra hits fetched on top of docs_requested on the first batch, so that a
# few deleted or filtered documents do not force a second round trip
# (default: 2)
extractable_limit_slack = 2

# Exponentially increasing strategy: first advice and growth factor
exponential_initial_batch_size = 10
exponential_growth_factor = 2

# Upper bound on any advised batch size (default: 100000)
max_batch_size = 100000
"#
    }

    /// Parse and validate a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CursorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content).map_err(|e| {
            Error::Config(format!("Failed to load '{}': {}", path.display(), e))
        })?;
        info!(target: "shardcursor::config", path = %path.display(), "Loaded cursor config");
        Ok(config)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject configurations no strategy can run with.
    pub fn validate(&self) -> Result<()> {
        if self.default_batch_size == 0 {
            return Err(Error::Config("default_batch_size must be positive".into()));
        }
        if self.exponential_initial_batch_size == 0 {
            return Err(Error::Config(
                "exponential_initial_batch_size must be positive".into(),
            ));
        }
        if self.exponential_growth_factor < 2 {
            return Err(Error::Config(
                "exponential_growth_factor must be at least 2".into(),
            ));
        }
        if self.max_batch_size == 0 {
            return Err(Error::Config("max_batch_size must be positive".into()));
        }
        Ok(())
    }
}
