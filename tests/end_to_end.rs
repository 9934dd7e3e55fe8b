//! End-to-end keymap workflows
//!
//! Load a keymap, drive a context stack the way a terminal UI would, and feed
//! it crossterm key events.

use std::io::Write;
use std::sync::Arc;

use contextkeys::{
    event, Context, ContextGraph, ContextStack, KeymapLoader, KeymapSettings, LookupError,
    StackError,
};
use contextkeys_cli::{CommandRouter, OutputStyle};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::TempDir;

const PLAYER_KEYMAP: &str = r#"
[Global]
context_add = ["Empty"]
bindings = { ESC = "closeModal", "ctrl-q" = "quit" }

[Default]
bindings = { d = "deleteTrack", a = "addToQueue", " " = "togglePause" }

[ListPreset]
bindings = { g = "goToTop", G = "goToBottom", j = "down", k = "up" }

[Queue]
context_add = ["ListPreset"]
bindings = { d = "queue.deleteTrack", s = "shuffleQueue" }

[QueueSearch]
context_add = ["Empty"]
context_override = ["Global"]
bindings = { Enter = "search.submit" }
"#;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn test_queue_resolves_own_inherited_and_preset_bindings() {
    let graph = ContextGraph::new()
        .with_context(
            "Default",
            Context::new()
                .with_binding("d", "deleteTrack")
                .with_binding("a", "addToQueue"),
        )
        .with_context(
            "Queue",
            Context::new()
                .with_binding("d", "queue.deleteTrack")
                .with_binding("s", "shuffleQueue"),
        );

    let keymap = KeymapLoader::new().load_graph(graph).unwrap();
    let queue = keymap.context("Queue").unwrap();

    assert_eq!(
        queue.sorted_bindings(),
        vec![
            ("a", "addToQueue"),
            ("d", "queue.deleteTrack"),
            ("s", "shuffleQueue"),
        ]
    );
}

#[test]
fn test_ui_session_with_stack_and_events() {
    let keymap = KeymapLoader::new().load_str(PLAYER_KEYMAP).unwrap();
    let table = Arc::new(keymap.into_table());
    let mut stack = ContextStack::new();

    // Global screen
    let quit = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
    let lookup = event::lookup_event(&table, stack.current(), &quit).unwrap().unwrap();
    assert_eq!(lookup.command(), Some("quit"));

    // Queue page gains focus
    stack.push("Queue");
    let lookup = event::lookup_event(&table, stack.current(), &key(KeyCode::Char('d')))
        .unwrap()
        .unwrap();
    assert_eq!(lookup.to_string(), "Key: d, Command: queue.deleteTrack");

    let lookup = event::lookup_event(&table, stack.current(), &key(KeyCode::Char(' ')))
        .unwrap()
        .unwrap();
    assert_eq!(lookup.command(), Some("togglePause"));

    let shifted = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
    let lookup = event::lookup_event(&table, stack.current(), &shifted).unwrap().unwrap();
    assert_eq!(lookup.command(), Some("goToBottom"));

    // Search box opens on top of the queue
    stack.push("QueueSearch");
    assert_eq!(
        stack.to_string(),
        "Current Context Stack: [Global Queue QueueSearch]"
    );

    let lookup = event::lookup_event(&table, stack.current(), &key(KeyCode::Char('d')))
        .unwrap()
        .unwrap();
    assert!(!lookup.is_bound());

    let lookup = event::lookup_event(&table, stack.current(), &key(KeyCode::Esc))
        .unwrap()
        .unwrap();
    assert_eq!(lookup.command(), Some("closeModal"));

    // Closing the search box with the wrong name is rejected
    let err = stack.pop_expect("Queue").unwrap_err();
    assert_eq!(
        err,
        StackError::Mismatch {
            expected: "Queue".to_string(),
            found: "QueueSearch".to_string(),
        }
    );
    assert_eq!(stack.current(), "QueueSearch");

    stack.pop_expect("QueueSearch").unwrap();
    stack.pop_expect("Queue").unwrap();
    assert_eq!(stack.current(), "Global");
    assert!(stack.pop_expect("Global").is_err());
}

#[test]
fn test_unknown_context_is_distinct_from_unbound_key() {
    let keymap = KeymapLoader::new().load_str(PLAYER_KEYMAP).unwrap();

    assert_eq!(keymap.lookup("Queue", "x").unwrap(), None);
    assert_eq!(
        keymap.lookup("Settings", "x").unwrap_err(),
        LookupError::ContextNotFound("Settings".to_string())
    );
}

#[test]
fn test_rune_spelling_matches_plain_binding() {
    let keymap = KeymapLoader::new().load_str(PLAYER_KEYMAP).unwrap();
    assert_eq!(
        keymap.lookup("Queue", "Rune[a]").unwrap(),
        keymap.lookup("Queue", "a").unwrap()
    );
}

#[test]
fn test_settings_drive_loading_and_cli() {
    let dir = TempDir::new().unwrap();
    let keymap_path = dir.path().join("keys.toml");
    std::fs::write(&keymap_path, PLAYER_KEYMAP).unwrap();

    let settings_path = dir.path().join("settings.toml");
    let mut settings_file = std::fs::File::create(&settings_path).unwrap();
    writeln!(settings_file, "keymap_path = {:?}", keymap_path.to_str().unwrap()).unwrap();
    writeln!(settings_file, "root_context = \"Global\"").unwrap();

    let settings = KeymapSettings::load(Some(settings_path.as_path())).unwrap();
    assert_eq!(settings.keymap_path().unwrap(), keymap_path);

    let keymap = KeymapLoader::new()
        .with_options(settings.resolver_options())
        .load_file(settings.keymap_path().unwrap())
        .unwrap();
    let mut stack = settings.new_stack();
    stack.push("Queue");
    assert_eq!(keymap.lookup(stack.current(), "s").unwrap(), Some("shuffleQueue"));

    let cli = <contextkeys_cli::Cli as clap::Parser>::try_parse_from([
        "ctxkeys",
        "lookup",
        "--settings",
        settings_path.to_str().unwrap(),
        "--key",
        "j",
        "--context",
        "Queue",
    ])
    .unwrap();
    let out = CommandRouter::execute(&cli, OutputStyle::plain()).unwrap();
    assert_eq!(out, "Key: j, Command: down");
}
