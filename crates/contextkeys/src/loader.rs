//! Keymap loading: parse, normalize, validate, resolve
//!
//! ```no_run
//! use contextkeys::{ContextStack, KeymapLoader};
//!
//! let keymap = KeymapLoader::new().load_file("keys.toml")?;
//! let mut stack = ContextStack::new();
//! stack.push("Queue");
//! let command = keymap.lookup(stack.current(), "d")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::Path;

use tracing::Dispatch;

use crate::cycles::CycleDetector;
use crate::error::{ConfigError, LookupError, Result};
use crate::graph::ContextGraph;
use crate::lookup::{KeyLookup, ResolvedTable};
use crate::models::ResolvedContext;
use crate::resolver::{InheritanceResolver, ResolverOptions};

/// A loaded configuration: the normalized graph and its resolved tables
#[derive(Debug, Clone)]
pub struct Keymap {
    graph: ContextGraph,
    table: ResolvedTable,
}

impl Keymap {
    /// Normalized graph as declared, before inheritance
    pub fn graph(&self) -> &ContextGraph {
        &self.graph
    }

    /// Flattened tables
    pub fn table(&self) -> &ResolvedTable {
        &self.table
    }

    pub fn into_table(self) -> ResolvedTable {
        self.table
    }

    pub fn context(&self, name: &str) -> Option<&ResolvedContext> {
        self.table.get(name)
    }

    /// See [`ResolvedTable::lookup`]
    pub fn lookup(&self, context: &str, key: &str) -> std::result::Result<Option<&str>, LookupError> {
        self.table.lookup(context, key)
    }

    /// See [`ResolvedTable::lookup_key`]
    pub fn lookup_key(&self, context: &str, key: &str) -> std::result::Result<KeyLookup, LookupError> {
        self.table.lookup_key(context, key)
    }
}

/// Runs the full loading pipeline
///
/// Diagnostics go to the ambient `tracing` subscriber unless a dispatcher is
/// injected with [`KeymapLoader::with_dispatch`], in which case every event
/// emitted while loading is routed to it.
#[derive(Debug, Clone, Default)]
pub struct KeymapLoader {
    options: ResolverOptions,
    dispatch: Option<Dispatch>,
}

impl KeymapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Route loader diagnostics to `dispatch`
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Parse TOML into a raw graph without any validation
    pub fn parse_str(content: &str) -> Result<ContextGraph> {
        Ok(toml::from_str(content)?)
    }

    /// Read and load a TOML file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Keymap> {
        let path = path.as_ref();
        self.scoped(|| {
            tracing::debug!(path = %path.display(), "reading keymap");
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            self.load_str_inner(&content)
        })
    }

    /// Load TOML content
    pub fn load_str(&self, content: &str) -> Result<Keymap> {
        self.scoped(|| self.load_str_inner(content))
    }

    /// Load an already-built graph
    pub fn load_graph(&self, graph: ContextGraph) -> Result<Keymap> {
        self.scoped(|| self.load_graph_inner(graph))
    }

    fn load_str_inner(&self, content: &str) -> Result<Keymap> {
        let graph = Self::parse_str(content).map_err(|err| {
            tracing::error!(error = %err, "failed to parse keymap");
            err
        })?;
        self.load_graph_inner(graph)
    }

    fn load_graph_inner(&self, graph: ContextGraph) -> Result<Keymap> {
        let graph = graph.normalize_keys()?;
        graph.validate_references(self.options.suppression_sentinel.as_deref())?;
        CycleDetector::validate(&graph)?;

        if !graph.is_empty() && !graph.contains(&self.options.default_context) {
            tracing::debug!(
                default = %self.options.default_context,
                "no default context defined; implicit inheritance disabled"
            );
        }

        let table = InheritanceResolver::new(self.options.clone()).resolve(&graph)?;
        tracing::info!(contexts = table.len(), "keymap loaded");

        Ok(Keymap { graph, table })
    }

    fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use super::*;

    const VALID: &str = r#"
        [Global]
        bindings = { ESC = "closeModal", "ctrl-q" = "quit" }

        [Default]
        bindings = { d = "deleteTrack", a = "addToQueue" }

        [Queue]
        bindings = { d = "queue.deleteTrack", s = "shuffleQueue" }
    "#;

    #[test]
    fn test_load_str() {
        let keymap = KeymapLoader::new().load_str(VALID).unwrap();
        assert_eq!(keymap.lookup("Queue", "d").unwrap(), Some("queue.deleteTrack"));
        assert_eq!(keymap.lookup("Queue", "a").unwrap(), Some("addToQueue"));
        assert_eq!(keymap.lookup("Global", "CTRL-Q").unwrap(), Some("quit"));
        assert_eq!(keymap.graph().len(), 3);
    }

    #[test]
    fn test_empty_content() {
        let keymap = KeymapLoader::new().load_str("").unwrap();
        assert!(keymap.table().is_empty());
    }

    #[test]
    fn test_garbage_content() {
        let err = KeymapLoader::new().load_str("this is [not toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = KeymapLoader::new()
            .load_file("/definitely/not/here/keys.toml")
            .unwrap_err();
        match err {
            ConfigError::Io { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let keymap = KeymapLoader::new().load_file(file.path()).unwrap();
        assert_eq!(keymap.lookup("Queue", "s").unwrap(), Some("shuffleQueue"));
    }

    #[test]
    fn test_cycle_aborts_loading() {
        let err = KeymapLoader::new()
            .load_str(
                r#"
                [A]
                context_add = ["B"]
                [B]
                context_override = ["A"]
                "#,
            )
            .unwrap_err();
        assert!(err.is_cycle());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_injected_dispatch_receives_diagnostics() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        KeymapLoader::new()
            .with_dispatch(Dispatch::new(subscriber))
            .load_str(VALID)
            .unwrap();

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("keymap loaded"), "{output}");
        assert!(output.contains("resolved context"), "{output}");
    }
}
