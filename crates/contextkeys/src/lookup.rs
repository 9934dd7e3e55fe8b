//! Resolved binding tables and key lookup

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::LookupError;
use crate::keys;
use crate::models::ResolvedContext;

/// Flattened bindings for every context, keyed by context name
///
/// Built once by the resolver and read-only afterwards, so it can be shared
/// between readers (for example behind an `Arc`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTable {
    contexts: HashMap<String, ResolvedContext>,
}

impl ResolvedTable {
    /// Resolved context by name
    pub fn get(&self, context: &str) -> Option<&ResolvedContext> {
        self.contexts.get(context)
    }

    pub fn contains(&self, context: &str) -> bool {
        self.contexts.contains_key(context)
    }

    /// Context names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.contexts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedContext)> {
        self.contexts.iter().map(|(name, ctx)| (name.as_str(), ctx))
    }

    /// Command bound to `key` in `context`
    ///
    /// `Ok(None)` means the key is simply unbound there. A context that does
    /// not exist is reported as [`LookupError::ContextNotFound`]. The key is
    /// normalized first, so `Rune[a]`, `ctrl-q` and friends match their
    /// canonical bindings.
    pub fn lookup(&self, context: &str, key: &str) -> Result<Option<&str>, LookupError> {
        let resolved = self.context(context)?;
        Ok(resolved.command(&keys::normalize_lossy(key)))
    }

    /// Lookup returning a self-describing record
    pub fn lookup_key(&self, context: &str, key: &str) -> Result<KeyLookup, LookupError> {
        let resolved = self.context(context)?;
        let key_name = keys::normalize_lossy(key);
        let command = resolved.command(&key_name).map(str::to_string);
        Ok(KeyLookup { key_name, command })
    }

    fn context(&self, name: &str) -> Result<&ResolvedContext, LookupError> {
        self.contexts
            .get(name)
            .ok_or_else(|| LookupError::ContextNotFound(name.to_string()))
    }
}

impl From<HashMap<String, ResolvedContext>> for ResolvedTable {
    fn from(contexts: HashMap<String, ResolvedContext>) -> Self {
        ResolvedTable { contexts }
    }
}

impl Serialize for ResolvedTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sorted: BTreeMap<&str, BTreeMap<&str, &str>> = self
            .contexts
            .iter()
            .map(|(name, ctx)| (name.as_str(), ctx.sorted_bindings().into_iter().collect()))
            .collect();
        sorted.serialize(serializer)
    }
}

/// Outcome of looking one key up in one context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLookup {
    /// Canonical key identifier
    pub key_name: String,
    /// Bound command, `None` when unbound
    pub command: Option<String>,
}

impl KeyLookup {
    pub fn is_bound(&self) -> bool {
        self.command.is_some()
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }
}

impl fmt::Display for KeyLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.command {
            Some(command) => write!(f, "Key: {}, Command: {}", self.key_name, command),
            None => write!(f, "Key: {} (unbound)", self.key_name),
        }
    }
}
