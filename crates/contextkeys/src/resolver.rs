//! Inheritance resolution
//!
//! Flattens every context of a [`ContextGraph`] into a single binding table.
//! Layers, in merge order:
//!
//! 1. the implicit `Default` context (fill-if-absent)
//! 2. `context_add` parents in declared order (fill-if-absent, so Default
//!    and then the earliest parent defining a key win)
//! 3. `context_override` parents in declared order (last writer wins)
//! 4. the context's own bindings (always win)
//!
//! Each context is computed once per pass. The memo is owned by the pass
//! created inside a single call to [`InheritanceResolver::resolve`] and is
//! dropped when that call returns.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::graph::ContextGraph;
use crate::lookup::ResolvedTable;
use crate::models::{Context, Relation, ResolvedContext};

/// Name of the context every other context implicitly inherits from
pub const DEFAULT_CONTEXT: &str = "Default";

/// `context_add` entry that suppresses the implicit Default inheritance
pub const EMPTY_SENTINEL: &str = "Empty";

/// Tunables for the implicit Default layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Context merged underneath every other context
    pub default_context: String,
    /// `context_add` marker that opts a context out of the Default layer;
    /// `None` disables suppression entirely
    pub suppression_sentinel: Option<String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            default_context: DEFAULT_CONTEXT.to_string(),
            suppression_sentinel: Some(EMPTY_SENTINEL.to_string()),
        }
    }
}

impl ResolverOptions {
    /// Options without any Default-suppression marker
    pub fn without_suppression() -> Self {
        Self {
            suppression_sentinel: None,
            ..Self::default()
        }
    }

    fn is_sentinel(&self, name: &str) -> bool {
        self.suppression_sentinel.as_deref() == Some(name)
    }
}

/// Resolves a validated graph into flattened binding tables
#[derive(Debug, Clone, Default)]
pub struct InheritanceResolver {
    options: ResolverOptions,
}

impl InheritanceResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve every context in the graph
    ///
    /// The input graph is never modified; a fresh table is returned. Any
    /// missing parent or cycle aborts the whole pass.
    pub fn resolve(&self, graph: &ContextGraph) -> Result<ResolvedTable> {
        let mut pass = ResolutionPass::new(graph, &self.options);
        for name in graph.names() {
            pass.resolve(name)?;
        }
        Ok(ResolvedTable::from(pass.cache))
    }

    /// Resolve a single context and whatever it depends on
    pub fn resolve_one(&self, graph: &ContextGraph, name: &str) -> Result<ResolvedContext> {
        if !graph.contains(name) {
            return Err(ConfigError::UnknownContext(name.to_string()));
        }
        let mut pass = ResolutionPass::new(graph, &self.options);
        pass.resolve(name)?;
        pass.cache
            .remove(name)
            .ok_or_else(|| ConfigError::UnknownContext(name.to_string()))
    }
}

/// Memo and recursion state for one resolution pass
struct ResolutionPass<'g> {
    graph: &'g ContextGraph,
    options: &'g ResolverOptions,
    cache: HashMap<String, ResolvedContext>,
    in_progress: Vec<&'g str>,
    /// Contexts the default context inherits from, directly or not
    default_ancestors: HashSet<&'g str>,
}

impl<'g> ResolutionPass<'g> {
    fn new(graph: &'g ContextGraph, options: &'g ResolverOptions) -> Self {
        Self {
            graph,
            options,
            cache: HashMap::with_capacity(graph.len()),
            in_progress: Vec::new(),
            default_ancestors: ancestors(graph, &options.default_context),
        }
    }

    fn resolve(&mut self, name: &'g str) -> Result<()> {
        if self.cache.contains_key(name) {
            return Ok(());
        }

        // Safety net only: cycle detection runs before resolution.
        if let Some(start) = self.in_progress.iter().position(|entry| *entry == name) {
            let mut chain: Vec<String> =
                self.in_progress[start..].iter().map(|s| s.to_string()).collect();
            chain.push(name.to_string());
            return Err(ConfigError::CyclicDependency { chain });
        }

        let graph = self.graph;
        let context = graph
            .get(name)
            .ok_or_else(|| ConfigError::UnknownContext(name.to_string()))?;

        self.in_progress.push(name);
        let mut bindings = HashMap::new();

        if self.inherits_default(name, context) {
            let options = self.options;
            let default = options.default_context.as_str();
            self.resolve(default)?;
            fill_absent(&mut bindings, &self.cache[default].bindings);
        }

        for parent in &context.context_add {
            if self.options.is_sentinel(parent) && !graph.contains(parent) {
                continue;
            }
            self.resolve_parent(name, Relation::Add, parent)?;
            fill_absent(&mut bindings, &self.cache[parent.as_str()].bindings);
        }

        for parent in &context.context_override {
            self.resolve_parent(name, Relation::Override, parent)?;
            override_with(&mut bindings, &self.cache[parent.as_str()].bindings);
        }

        override_with(&mut bindings, &context.bindings);
        self.in_progress.pop();

        tracing::debug!(context = name, bindings = bindings.len(), "resolved context");
        self.cache.insert(
            name.to_string(),
            ResolvedContext {
                bindings,
                settings: context.settings.clone(),
            },
        );
        Ok(())
    }

    fn resolve_parent(&mut self, child: &str, relation: Relation, parent: &'g str) -> Result<()> {
        if !self.graph.contains(parent) {
            return Err(ConfigError::MissingContext {
                context: child.to_string(),
                relation,
                parent: parent.to_string(),
            });
        }
        self.resolve(parent)
    }

    /// Whether the implicit Default layer applies to `name`
    fn inherits_default(&self, name: &str, context: &Context) -> bool {
        let default = self.options.default_context.as_str();
        if name == default {
            return false;
        }
        if context.context_add.iter().any(|parent| parent == default) {
            return false;
        }
        if context
            .context_add
            .iter()
            .any(|parent| self.options.is_sentinel(parent))
        {
            return false;
        }
        if !self.graph.contains(default) {
            return false;
        }
        // The default context itself depends on `name`; inheriting back would loop.
        if self.default_ancestors.contains(name) {
            tracing::debug!(
                context = name,
                default,
                "skipping implicit default for an ancestor of the default context"
            );
            return false;
        }
        true
    }
}

/// Every context reachable from `root` through either relation
fn ancestors<'g>(graph: &'g ContextGraph, root: &str) -> HashSet<&'g str> {
    let mut seen = HashSet::new();
    let mut pending: Vec<&'g str> = graph
        .get(root)
        .map(|context| {
            context
                .context_add
                .iter()
                .chain(&context.context_override)
                .map(String::as_str)
                .collect()
        })
        .unwrap_or_default();

    while let Some(name) = pending.pop() {
        if !seen.insert(name) {
            continue;
        }
        if let Some(context) = graph.get(name) {
            pending.extend(
                context
                    .context_add
                    .iter()
                    .chain(&context.context_override)
                    .map(String::as_str),
            );
        }
    }
    seen
}

/// Copy parent bindings for keys that are still unbound
fn fill_absent(target: &mut HashMap<String, String>, parent: &HashMap<String, String>) {
    for (key, command) in parent {
        target
            .entry(key.clone())
            .or_insert_with(|| command.clone());
    }
}

/// Copy parent bindings, replacing existing entries
fn override_with(target: &mut HashMap<String, String>, parent: &HashMap<String, String>) {
    for (key, command) in parent {
        target.insert(key.clone(), command.clone());
    }
}
