//! Layered settings for applications embedding a keymap
//!
//! Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional settings file (TOML)
//! 3. `CONTEXTKEYS_*` environment variables
//!    (`CONTEXTKEYS_DEFAULT_CONTEXT=Base`, `CONTEXTKEYS_KEYMAP_PATH=...`)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::resolver::{ResolverOptions, DEFAULT_CONTEXT, EMPTY_SENTINEL};
use crate::stack::{ContextStack, GLOBAL_CONTEXT};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CONTEXTKEYS";

/// Settings controlling where a keymap comes from and how it resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeymapSettings {
    /// Keymap file; falls back to the platform config directory
    pub keymap_path: Option<PathBuf>,
    /// Context merged underneath all others
    pub default_context: String,
    /// `context_add` marker suppressing the default context; empty disables it
    pub suppression_sentinel: String,
    /// Bottom entry of every context stack
    pub root_context: String,
}

impl Default for KeymapSettings {
    fn default() -> Self {
        Self {
            keymap_path: None,
            default_context: DEFAULT_CONTEXT.to_string(),
            suppression_sentinel: EMPTY_SENTINEL.to_string(),
            root_context: GLOBAL_CONTEXT.to_string(),
        }
    }
}

impl KeymapSettings {
    /// Load defaults, then `path` if given and present, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with_environment(path, Some(Self::environment()))
    }

    /// Like [`KeymapSettings::load`] with an explicit environment source;
    /// `None` ignores the environment entirely
    pub fn load_with_environment(
        path: Option<&Path>,
        environment: Option<Environment>,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        Self::build(builder, environment)
    }

    /// Load from TOML content plus the environment
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Self::from_toml_str_with_environment(content, Some(Self::environment()))
    }

    /// Load from TOML content plus an explicit environment source
    pub fn from_toml_str_with_environment(
        content: &str,
        environment: Option<Environment>,
    ) -> Result<Self, SettingsError> {
        let builder = Config::builder().add_source(File::from_str(content, FileFormat::Toml));
        Self::build(builder, environment)
    }

    /// The `CONTEXTKEYS_*` process environment source
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
    }

    fn build(
        mut builder: config::builder::ConfigBuilder<config::builder::DefaultState>,
        environment: Option<Environment>,
    ) -> Result<Self, SettingsError> {
        if let Some(environment) = environment {
            builder = builder.add_source(environment);
        }
        let settings: KeymapSettings = builder.build()?.try_deserialize()?;
        tracing::debug!(?settings, "keymap settings loaded");
        Ok(settings)
    }

    /// Default keymap location under the platform config directory
    pub fn default_keymap_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("contextkeys").join("keys.toml"))
    }

    /// Configured keymap path, or the platform default
    pub fn keymap_path(&self) -> Result<PathBuf, SettingsError> {
        self.keymap_path
            .clone()
            .or_else(Self::default_keymap_path)
            .ok_or(SettingsError::NoKeymapPath)
    }

    /// Resolver options matching these settings
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            default_context: self.default_context.clone(),
            suppression_sentinel: Some(self.suppression_sentinel.clone())
                .filter(|sentinel| !sentinel.is_empty()),
        }
    }

    /// A fresh stack rooted at the configured root context
    pub fn new_stack(&self) -> ContextStack {
        ContextStack::with_root(self.root_context.clone())
    }
}
