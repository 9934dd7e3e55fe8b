// Command handlers

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use contextkeys::{Keymap, KeymapLoader, KeymapSettings, LookupError};

use crate::output::OutputStyle;

/// Load the keymap at `file`, or at the configured path
fn load_keymap(settings: &KeymapSettings, file: Option<&Path>) -> anyhow::Result<(PathBuf, Keymap)> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => settings.keymap_path()?,
    };

    let keymap = KeymapLoader::new()
        .with_options(settings.resolver_options())
        .load_file(&path)
        .with_context(|| format!("failed to load keymap {}", path.display()))?;

    Ok((path, keymap))
}

/// `ctxkeys check`
pub struct CheckCommand {
    file: Option<PathBuf>,
    quiet: bool,
}

impl CheckCommand {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file, quiet: false }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn execute(&self, settings: &KeymapSettings, style: OutputStyle) -> anyhow::Result<String> {
        let (path, keymap) = load_keymap(settings, self.file.as_deref())?;
        let table = keymap.table();

        let mut lines = vec![style.success(&format!(
            "{}: {} contexts resolved",
            path.display(),
            table.len()
        ))];

        if !self.quiet {
            for name in table.names() {
                let count = table.get(name).map_or(0, |ctx| ctx.bindings.len());
                lines.push(style.muted(&format!("  {} ({} bindings)", name, count)));
            }
        }

        Ok(lines.join("\n"))
    }
}

/// `ctxkeys resolve`
pub struct ResolveCommand {
    file: Option<PathBuf>,
    context: Option<String>,
    json: bool,
}

impl ResolveCommand {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self {
            file,
            context: None,
            json: false,
        }
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn execute(&self, settings: &KeymapSettings, style: OutputStyle) -> anyhow::Result<String> {
        let (_, keymap) = load_keymap(settings, self.file.as_deref())?;
        let table = keymap.table();

        let names: Vec<&str> = match &self.context {
            Some(name) if !table.contains(name) => {
                return Err(LookupError::ContextNotFound(name.clone()).into());
            }
            Some(name) => vec![name.as_str()],
            None => table.names(),
        };

        let sections: BTreeMap<&str, Vec<(&str, &str)>> = names
            .into_iter()
            .filter_map(|name| table.get(name).map(|ctx| (name, ctx.sorted_bindings())))
            .collect();

        if self.json {
            let json: BTreeMap<&str, BTreeMap<&str, &str>> = sections
                .into_iter()
                .map(|(name, bindings)| (name, bindings.into_iter().collect()))
                .collect();
            return Ok(serde_json::to_string_pretty(&json)?);
        }

        let blocks: Vec<String> = sections
            .into_iter()
            .map(|(name, bindings)| {
                let mut lines = vec![style.context(name)];
                lines.extend(
                    bindings
                        .into_iter()
                        .map(|(key, command)| style.binding(key, command)),
                );
                lines.join("\n")
            })
            .collect();

        Ok(blocks.join("\n\n"))
    }
}

/// `ctxkeys lookup`
pub struct LookupCommand {
    file: Option<PathBuf>,
    key: String,
    contexts: Vec<String>,
    verbose: bool,
}

impl LookupCommand {
    pub fn new(file: Option<PathBuf>, key: String) -> Self {
        Self {
            file,
            key,
            contexts: Vec::new(),
            verbose: false,
        }
    }

    pub fn with_contexts(mut self, contexts: Vec<String>) -> Self {
        self.contexts = contexts;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn execute(&self, settings: &KeymapSettings, style: OutputStyle) -> anyhow::Result<String> {
        let (_, keymap) = load_keymap(settings, self.file.as_deref())?;

        let mut stack = settings.new_stack();
        for context in &self.contexts {
            stack.push(context.clone());
        }
        tracing::debug!(stack = %stack, key = %self.key, "looking up key");

        let lookup = keymap.lookup_key(stack.current(), &self.key)?;

        let mut out = lookup.to_string();
        if self.verbose {
            out.push('\n');
            out.push_str(&style.muted(&stack.to_string()));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const KEYMAP: &str = r#"
        [Global]
        bindings = { ESC = "closeModal", "ctrl-q" = "quit" }

        [Default]
        bindings = { d = "deleteTrack", a = "addToQueue" }

        [Queue]
        bindings = { d = "queue.deleteTrack", s = "shuffleQueue" }
    "#;

    fn keymap_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KEYMAP.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_check_summary() {
        let file = keymap_file();
        let out = CheckCommand::new(Some(file.path().to_path_buf()))
            .execute(&KeymapSettings::default(), OutputStyle::plain())
            .unwrap();

        assert!(out.starts_with("✓ "));
        assert!(out.contains("3 contexts resolved"));
        assert!(out.contains("  Queue (3 bindings)"));
    }

    #[test]
    fn test_check_quiet_prints_one_line() {
        let file = keymap_file();
        let out = CheckCommand::new(Some(file.path().to_path_buf()))
            .with_quiet(true)
            .execute(&KeymapSettings::default(), OutputStyle::plain())
            .unwrap();
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_check_reports_missing_reference() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[Queue]\ncontext_add = [\"Nowhere\"]\n").unwrap();

        let err = CheckCommand::new(Some(file.path().to_path_buf()))
            .execute(&KeymapSettings::default(), OutputStyle::plain())
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("failed to load keymap"));
        assert!(message.contains("Nowhere"));
    }

    #[test]
    fn test_resolve_text() {
        let file = keymap_file();
        let out = ResolveCommand::new(Some(file.path().to_path_buf()))
            .with_context(Some("Queue".to_string()))
            .execute(&KeymapSettings::default(), OutputStyle::plain())
            .unwrap();

        assert_eq!(
            out,
            "[Queue]\n  a = addToQueue\n  d = queue.deleteTrack\n  s = shuffleQueue"
        );
    }

    #[test]
    fn test_resolve_json() {
        let file = keymap_file();
        let out = ResolveCommand::new(Some(file.path().to_path_buf()))
            .with_json(true)
            .execute(&KeymapSettings::default(), OutputStyle::plain())
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["Queue"]["d"], "queue.deleteTrack");
        assert_eq!(value["Global"]["CTRL-Q"], "quit");
        assert_eq!(value["Global"]["d"], "deleteTrack");
    }

    #[test]
    fn test_resolve_unknown_context() {
        let file = keymap_file();
        let err = ResolveCommand::new(Some(file.path().to_path_buf()))
            .with_context(Some("Nope".to_string()))
            .execute(&KeymapSettings::default(), OutputStyle::plain())
            .unwrap_err();
        assert_eq!(err.to_string(), "Lookup failed: Context 'Nope' not found.");
    }

    #[test]
    fn test_lookup_through_stack() {
        let file = keymap_file();
        let settings = KeymapSettings::default();

        let out = LookupCommand::new(Some(file.path().to_path_buf()), "d".to_string())
            .with_contexts(vec!["Queue".to_string()])
            .execute(&settings, OutputStyle::plain())
            .unwrap();
        assert_eq!(out, "Key: d, Command: queue.deleteTrack");

        let out = LookupCommand::new(Some(file.path().to_path_buf()), "ctrl+q".to_string())
            .with_verbose(true)
            .execute(&settings, OutputStyle::plain())
            .unwrap();
        assert_eq!(out, "Key: CTRL-Q, Command: quit\nCurrent Context Stack: [Global]");
    }

    #[test]
    fn test_lookup_unbound_key() {
        let file = keymap_file();
        let out = LookupCommand::new(Some(file.path().to_path_buf()), "x".to_string())
            .with_contexts(vec!["Queue".to_string()])
            .execute(&KeymapSettings::default(), OutputStyle::plain())
            .unwrap();
        assert_eq!(out, "Key: x (unbound)");
    }

    #[test]
    fn test_keymap_path_from_settings() {
        let file = keymap_file();
        let settings = KeymapSettings {
            keymap_path: Some(file.path().to_path_buf()),
            ..KeymapSettings::default()
        };

        let out = LookupCommand::new(None, "s".to_string())
            .with_contexts(vec!["Queue".to_string()])
            .execute(&settings, OutputStyle::plain())
            .unwrap();
        assert_eq!(out, "Key: s, Command: shuffleQueue");
    }
}
