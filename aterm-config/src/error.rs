//! Typed error variants for the aterm-config crate.
//!
//! Config I/O and layout validation report through [`ConfigError`] so callers
//! can match on the failure mode. Application code that works in `anyhow`
//! gets these converted automatically through `?`.

use thiserror::Error;

/// Errors that can occur when loading, saving, or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file contained invalid YAML that could not be parsed.
    #[error("YAML parse error in config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A value failed semantic validation.
    ///
    /// The inner string names the offending project/layout and why it is invalid.
    #[error("Config validation error: {0}")]
    Validation(String),
}
