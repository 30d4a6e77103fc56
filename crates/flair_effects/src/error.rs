//! Error types for flair_effects
//!
//! Only setup paths (loading configuration, parsing colors and scroll
//! offsets from text) can fail. Pointer, scroll and frame handling never
//! return errors; they fall back to neutral output instead.

use std::path::PathBuf;

use flair_core::ParseColorError;
use thiserror::Error;

/// Errors that can occur while configuring effects
#[derive(Error, Debug)]
pub enum EffectsError {
    /// Failed to read a configuration file
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid TOML or has the wrong shape
    #[error("Config parse failed: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be written back out as TOML
    #[error("Config serialize failed: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// A color string could not be parsed
    #[error("Invalid color: {0}")]
    InvalidColor(#[from] ParseColorError),

    /// A scroll window offset could not be parsed
    #[error("Invalid scroll offset `{0}`")]
    InvalidScrollOffset(String),
}

/// Result type for flair_effects operations
pub type Result<T> = std::result::Result<T, EffectsError>;
