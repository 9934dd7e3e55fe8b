//! Runtime stack of active contexts
//!
//! UI code pushes a context name when a scope gains focus and pops it when
//! the scope is left. The top of the stack names the resolved table that key
//! lookups should query. The bottom entry is a root sentinel (`Global`) that
//! is never removed.

use std::fmt;

use crate::error::StackError;

/// Root context every stack starts from
pub const GLOBAL_CONTEXT: &str = "Global";

/// LIFO register of active context names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextStack {
    stack: Vec<String>,
    root: String,
}

impl ContextStack {
    /// Create a stack holding only `Global`
    pub fn new() -> Self {
        Self::with_root(GLOBAL_CONTEXT)
    }

    /// Create a stack with a custom root sentinel
    pub fn with_root(root: impl Into<String>) -> Self {
        let root = root.into();
        ContextStack {
            stack: vec![root.clone()],
            root,
        }
    }

    /// Enter a context
    pub fn push(&mut self, context: impl Into<String>) {
        let context = context.into();
        tracing::trace!(context = %context, depth = self.stack.len() + 1, "push context");
        self.stack.push(context);
    }

    /// Leave the current context
    ///
    /// Returns the removed name, or `None` when only the root remains.
    pub fn pop(&mut self) -> Option<String> {
        if self.stack.len() > 1 {
            let popped = self.stack.pop();
            tracing::trace!(context = ?popped, "pop context");
            popped
        } else {
            None
        }
    }

    /// Pop, asserting that the current context is `expected`
    ///
    /// For callers that push and pop in matched pairs. On a mismatch the
    /// stack is left untouched. Both failures indicate unbalanced nesting in
    /// the caller rather than bad configuration; callers that want a hard
    /// failure can `expect` the result.
    pub fn pop_expect(&mut self, expected: &str) -> Result<(), StackError> {
        if self.stack.len() <= 1 {
            tracing::error!(expected, "pop_expect on a stack holding only its root");
            return Err(StackError::Empty {
                expected: expected.to_string(),
            });
        }

        let current = self.current();
        if current != expected {
            tracing::error!(expected, found = current, "pop_expect mismatch");
            return Err(StackError::Mismatch {
                expected: expected.to_string(),
                found: current.to_string(),
            });
        }

        self.stack.pop();
        Ok(())
    }

    /// The active context name
    pub fn current(&self) -> &str {
        self.stack.last().map(String::as_str).unwrap_or(&self.root)
    }

    /// Drop everything above the root
    pub fn reset(&mut self) {
        self.stack.clear();
        self.stack.push(self.root.clone());
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Number of entries including the root
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Entries from bottom (root) to top (current)
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.stack.iter().map(String::as_str)
    }
}

impl Default for ContextStack {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Current Context Stack: [{}]", self.stack.join(" "))
    }
}
