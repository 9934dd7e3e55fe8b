//! Context graph: every named context with its raw relations and bindings

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::keys;
use crate::models::{Context, Relation};

/// All contexts of one configuration, keyed by name
///
/// The graph performs no validation on construction; reference checks,
/// cycle detection and resolution are layered on top of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextGraph {
    contexts: BTreeMap<String, Context>,
}

impl ContextGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a context
    pub fn insert(&mut self, name: impl Into<String>, context: Context) -> Option<Context> {
        self.contexts.insert(name.into(), context)
    }

    /// Builder-style insert
    pub fn with_context(mut self, name: impl Into<String>, context: Context) -> Self {
        self.insert(name, context);
        self
    }

    /// Look up a context by name
    pub fn get(&self, name: &str) -> Option<&Context> {
        self.contexts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.contexts.contains_key(name)
    }

    /// Context names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Context)> {
        self.contexts.iter().map(|(name, context)| (name.as_str(), context))
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Check that every `context_add` / `context_override` entry names a
    /// defined context
    ///
    /// `sentinel` is the Default-suppression marker; it may appear in
    /// `context_add` without being defined.
    pub fn validate_references(&self, sentinel: Option<&str>) -> Result<()> {
        for relation in [Relation::Add, Relation::Override] {
            for (name, context) in &self.contexts {
                for parent in context.parents(relation) {
                    let is_sentinel = relation == Relation::Add && sentinel == Some(parent.as_str());
                    if !is_sentinel && !self.contains(parent) {
                        return Err(ConfigError::MissingContext {
                            context: name.clone(),
                            relation,
                            parent: parent.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Rewrite every binding key into its canonical spelling
    ///
    /// Fails on keys that cannot be parsed and on two spellings of the same
    /// key inside one context.
    pub fn normalize_keys(self) -> Result<Self> {
        let mut contexts = BTreeMap::new();

        for (name, mut context) in self.contexts {
            let mut bindings = HashMap::with_capacity(context.bindings.len());
            for (key, command) in context.bindings {
                let canonical = keys::normalize(&key).map_err(|source| ConfigError::InvalidKey {
                    context: name.clone(),
                    key: key.clone(),
                    source,
                })?;
                if bindings.insert(canonical.clone(), command).is_some() {
                    return Err(ConfigError::DuplicateKey {
                        context: name,
                        key: canonical,
                    });
                }
            }
            context.bindings = bindings;
            contexts.insert(name, context);
        }

        Ok(ContextGraph { contexts })
    }
}

impl FromIterator<(String, Context)> for ContextGraph {
    fn from_iter<I: IntoIterator<Item = (String, Context)>>(iter: I) -> Self {
        ContextGraph {
            contexts: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, Context>> for ContextGraph {
    fn from(contexts: BTreeMap<String, Context>) -> Self {
        ContextGraph { contexts }
    }
}
