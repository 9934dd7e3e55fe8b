//! Bridge between crossterm key events and canonical key identifiers

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::error::LookupError;
use crate::keys::{Key, KeyName, Modifier};
use crate::lookup::{KeyLookup, ResolvedTable};

/// Convert a crossterm key event into a canonical key name
///
/// Releases and keys that have no canonical spelling yield `None`.
pub fn key_name(event: &KeyEvent) -> Option<KeyName> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    let mut modifiers = Vec::new();
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        modifiers.push(Modifier::Ctrl);
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        modifiers.push(Modifier::Alt);
    }
    if event.modifiers.contains(KeyModifiers::SHIFT) {
        modifiers.push(Modifier::Shift);
    }

    let key = match event.code {
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => {
            modifiers.push(Modifier::Shift);
            Key::Tab
        }
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Insert => Key::Insert,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::F(n) if (1..=24).contains(&n) => Key::F(n),
        _ => return None,
    };

    Some(KeyName::new(modifiers, key))
}

/// Look a terminal key event up in `context`
///
/// `Ok(None)` means the event has no canonical key name (a release or an
/// unsupported key); an unbound key is `Ok(Some(lookup))` with no command.
pub fn lookup_event(
    table: &ResolvedTable,
    context: &str,
    event: &KeyEvent,
) -> Result<Option<KeyLookup>, LookupError> {
    match key_name(event) {
        Some(name) => table.lookup_key(context, &name.to_string()).map(Some),
        None => {
            if !table.contains(context) {
                return Err(LookupError::ContextNotFound(context.to_string()));
            }
            Ok(None)
        }
    }
}
