//! Core data models for keymap contexts

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The two inheritance relations a context can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// `context_add`: parent bindings fill keys that are still absent
    Add,
    /// `context_override`: parent bindings replace existing entries
    Override,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Add => write!(f, "context_add"),
            Relation::Override => write!(f, "context_override"),
        }
    }
}

/// A named scope of keybindings, exactly as declared in configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub bindings: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_add: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_override: Vec<String>,
    /// Opaque per-context settings, never inherited
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub settings: toml::Table,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding from a key identifier to a command
    pub fn with_binding(mut self, key: impl Into<String>, command: impl Into<String>) -> Self {
        self.bindings.insert(key.into(), command.into());
        self
    }

    /// Append an additive parent
    pub fn with_add(mut self, parent: impl Into<String>) -> Self {
        self.context_add.push(parent.into());
        self
    }

    /// Append an overriding parent
    pub fn with_override(mut self, parent: impl Into<String>) -> Self {
        self.context_override.push(parent.into());
        self
    }

    /// Attach an opaque setting
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Parent names declared for one relation, in declaration order
    pub fn parents(&self, relation: Relation) -> &[String] {
        match relation {
            Relation::Add => &self.context_add,
            Relation::Override => &self.context_override,
        }
    }
}

/// A context after inheritance has been flattened into its bindings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedContext {
    pub bindings: HashMap<String, String>,
    #[serde(skip_serializing_if = "toml::Table::is_empty")]
    pub settings: toml::Table,
}

impl ResolvedContext {
    /// Command bound to an already-normalized key identifier
    pub fn command(&self, key: &str) -> Option<&str> {
        self.bindings.get(key).map(String::as_str)
    }

    /// Bindings sorted by key, for display
    pub fn sorted_bindings(&self) -> Vec<(&str, &str)> {
        let mut bindings: Vec<(&str, &str)> = self
            .bindings
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        bindings.sort_unstable();
        bindings
    }
}
