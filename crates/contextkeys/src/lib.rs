//! Layered keybinding contexts for terminal applications
//!
//! This crate resolves a keybinding configuration made of named contexts:
//! - Context graph with additive (`context_add`) and overriding
//!   (`context_override`) inheritance
//! - Cycle detection over both relations
//! - Memoized inheritance resolution with an implicit `Default` layer
//! - A runtime context stack naming the active context
//! - Key lookup against the resolved tables
//! - Key-name normalization and a crossterm event bridge
//! - TOML loading and layered settings

pub mod cycles;
pub mod error;
pub mod event;
pub mod graph;
pub mod keys;
pub mod loader;
pub mod lookup;
pub mod models;
pub mod resolver;
pub mod settings;
pub mod stack;

// Re-export public types
pub use cycles::CycleDetector;
pub use error::{ConfigError, KeyError, LookupError, SettingsError, StackError};
pub use graph::ContextGraph;
pub use keys::{Key, KeyName, Modifier};
pub use loader::{Keymap, KeymapLoader};
pub use lookup::{KeyLookup, ResolvedTable};
pub use models::{Context, Relation, ResolvedContext};
pub use resolver::{InheritanceResolver, ResolverOptions, DEFAULT_CONTEXT, EMPTY_SENTINEL};
pub use settings::KeymapSettings;
pub use stack::{ContextStack, GLOBAL_CONTEXT};
