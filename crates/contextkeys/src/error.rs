//! Error types for keymap loading, resolution and lookup

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Relation;

/// Result type for configuration loading and resolution
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that abort loading or resolving a keymap configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{relation} refers to an invalid or missing context: {parent} in context: {context}")]
    MissingContext {
        context: String,
        relation: Relation,
        parent: String,
    },

    #[error("Context not defined: {0}")]
    UnknownContext(String),

    #[error("cyclic dependency detected: {}", .chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    #[error("Invalid key {key:?} in context {context}: {source}")]
    InvalidKey {
        context: String,
        key: String,
        #[source]
        source: KeyError,
    },

    #[error("Duplicate key {key} in context {context} after normalization")]
    DuplicateKey { context: String, key: String },

    #[error("Failed to parse keymap: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// A context on the offending cycle, for diagnostics
    pub fn cycle_root(&self) -> Option<&str> {
        match self {
            ConfigError::CyclicDependency { chain } => chain.first().map(String::as_str),
            _ => None,
        }
    }

    /// Whether this error reports an inheritance cycle
    pub fn is_cycle(&self) -> bool {
        matches!(self, ConfigError::CyclicDependency { .. })
    }
}

/// Errors that can occur while normalizing a key identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("empty key name")]
    Empty,

    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("unknown modifier: {0}")]
    UnknownModifier(String),

    #[error("function key must be F1-F24, got: {0}")]
    FunctionKeyOutOfRange(String),
}

/// Errors reported by key lookup against a resolved table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Lookup failed: Context '{0}' not found.")]
    ContextNotFound(String),
}

/// Misuse of the context stack by its caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("PopExpect: expected '{expected}' but got '{found}'")]
    Mismatch { expected: String, found: String },

    #[error("PopExpect called on an empty stack (expected '{expected}')")]
    Empty { expected: String },
}

/// Errors raised while assembling layered settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("No keymap path configured and no platform config directory available")]
    NoKeymapPath,
}
