//! Cycle detection over `context_add` and `context_override` edges

use std::collections::HashSet;

use crate::error::{ConfigError, Result};
use crate::graph::ContextGraph;
use crate::models::Relation;

/// Validates that the inheritance relations form a DAG
pub struct CycleDetector;

impl CycleDetector {
    /// Walk the graph from every context and fail on the first cycle
    ///
    /// A context may be reachable along several paths; only reaching the
    /// same context twice within one path is a cycle. The reported chain
    /// starts and ends at the repeated context, e.g. `A -> B -> A`.
    pub fn validate(graph: &ContextGraph) -> Result<()> {
        let mut cleared = HashSet::new();

        for name in graph.names() {
            let mut path = Vec::new();
            Self::visit(graph, name, &mut path, &mut cleared)?;
        }

        tracing::debug!(contexts = graph.len(), "no inheritance cycles");
        Ok(())
    }

    fn visit<'g>(
        graph: &'g ContextGraph,
        name: &'g str,
        path: &mut Vec<&'g str>,
        cleared: &mut HashSet<&'g str>,
    ) -> Result<()> {
        if let Some(start) = path.iter().position(|entry| *entry == name) {
            let mut chain: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
            chain.push(name.to_string());
            tracing::warn!(chain = %chain.join(" -> "), "cyclic dependency detected");
            return Err(ConfigError::CyclicDependency { chain });
        }

        // Fully explored without a cycle; nothing new to find below it.
        if cleared.contains(name) {
            return Ok(());
        }

        // Undefined names (the suppression sentinel) have no edges.
        let Some(context) = graph.get(name) else {
            return Ok(());
        };

        path.push(name);
        for relation in [Relation::Override, Relation::Add] {
            for parent in context.parents(relation) {
                Self::visit(graph, parent, path, cleared)?;
            }
        }
        path.pop();

        cleared.insert(name);
        Ok(())
    }
}
