//! Key identifier normalization
//!
//! Configuration files and terminal events spell the same key in several
//! ways (`CTRL-q`, `Ctrl+Q`, `esc`, `Escape`, `Rune[a]`). Every binding key
//! and every lookup key is reduced to one canonical string so that merging
//! and lookup can compare keys by exact string equality.
//!
//! Canonical forms:
//!
//! - printable characters are themselves (`d`, `Q`, `?`), space is `Space`
//! - named keys: `Enter`, `ESC`, `Tab`, `Backspace`, `Delete`, `Insert`,
//!   `Home`, `End`, `PgUp`, `PgDn`, `Up`, `Down`, `Left`, `Right`, `F1`-`F24`
//! - modifiers are upper-case, ordered `CTRL`, `ALT`, `SHIFT`, joined with `-`
//!   (`CTRL-Q`, `ALT-x`, `CTRL-ALT-Delete`, `SHIFT-Tab`)

use std::fmt;
use std::str::FromStr;

use crate::error::KeyError;

/// Prefix of the wrapper form terminal rune events are reported in
pub const RUNE_PREFIX: &str = "Rune[";

/// A keyboard modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Ctrl => write!(f, "CTRL"),
            Modifier::Alt => write!(f, "ALT"),
            Modifier::Shift => write!(f, "SHIFT"),
        }
    }
}

impl FromStr for Modifier {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ctrl" | "control" | "c" => Ok(Modifier::Ctrl),
            "alt" | "meta" | "m" => Ok(Modifier::Alt),
            "shift" | "s" => Ok(Modifier::Shift),
            _ => Err(KeyError::UnknownModifier(s.to_string())),
        }
    }
}

/// A key without modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Space,
    Enter,
    Esc,
    Tab,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    F(u8),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Space => write!(f, "Space"),
            Key::Enter => write!(f, "Enter"),
            Key::Esc => write!(f, "ESC"),
            Key::Tab => write!(f, "Tab"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Delete => write!(f, "Delete"),
            Key::Insert => write!(f, "Insert"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
            Key::PageUp => write!(f, "PgUp"),
            Key::PageDown => write!(f, "PgDn"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::F(n) => write!(f, "F{}", n),
        }
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => return Err(KeyError::Empty),
            (Some(' '), None) => return Ok(Key::Space),
            (Some(c), None) => return Ok(Key::Char(c)),
            _ => {}
        }

        if let Some(inner) = s.strip_prefix(RUNE_PREFIX).and_then(|r| r.strip_suffix(']')) {
            return Key::from_str(inner).and_then(|key| match key {
                Key::Char(_) | Key::Space => Ok(key),
                _ => Err(KeyError::UnknownKey(s.to_string())),
            });
        }

        match s.to_lowercase().as_str() {
            "space" | "spc" => Ok(Key::Space),
            "enter" | "return" | "ret" => Ok(Key::Enter),
            "esc" | "escape" => Ok(Key::Esc),
            "tab" => Ok(Key::Tab),
            "backspace" | "bksp" | "backspace2" => Ok(Key::Backspace),
            "delete" | "del" => Ok(Key::Delete),
            "insert" | "ins" => Ok(Key::Insert),
            "home" => Ok(Key::Home),
            "end" => Ok(Key::End),
            "pgup" | "pageup" | "page_up" => Ok(Key::PageUp),
            "pgdn" | "pagedown" | "page_down" => Ok(Key::PageDown),
            "up" => Ok(Key::Up),
            "down" => Ok(Key::Down),
            "left" => Ok(Key::Left),
            "right" => Ok(Key::Right),
            lower if lower.starts_with('f') => {
                let num: u8 = lower[1..]
                    .parse()
                    .map_err(|_| KeyError::UnknownKey(s.to_string()))?;
                if (1..=24).contains(&num) {
                    Ok(Key::F(num))
                } else {
                    Err(KeyError::FunctionKeyOutOfRange(s.to_string()))
                }
            }
            _ => Err(KeyError::UnknownKey(s.to_string())),
        }
    }
}

/// A key plus its modifiers, in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyName {
    modifiers: Vec<Modifier>,
    key: Key,
}

impl KeyName {
    /// Build a canonical key name from parts
    ///
    /// Modifiers are sorted and deduplicated. `SHIFT` on a printable
    /// character is folded into the character itself, and letters under
    /// `CTRL` are upper-cased, matching what terminals can distinguish.
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>, key: Key) -> Self {
        let mut modifiers: Vec<Modifier> = modifiers.into_iter().collect();
        modifiers.sort_unstable();
        modifiers.dedup();

        let mut key = key;
        if let Key::Char(c) = key {
            if let Some(pos) = modifiers.iter().position(|m| *m == Modifier::Shift) {
                modifiers.remove(pos);
                key = Key::Char(c.to_ascii_uppercase());
            }
            if modifiers.contains(&Modifier::Ctrl) {
                key = Key::Char(c.to_ascii_uppercase());
            }
        }

        KeyName { modifiers, key }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}-", modifier)?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyName {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Vec::new();
        let mut rest = s;

        // Peel `MOD-` / `MOD+` prefixes; a trailing separator is the key itself (`CTRL--`).
        while let Some(idx) = rest.find(['-', '+']) {
            let (head, tail) = (&rest[..idx], &rest[idx + 1..]);
            if head.is_empty() || tail.is_empty() {
                break;
            }
            match Modifier::from_str(head) {
                Ok(modifier) => {
                    modifiers.push(modifier);
                    rest = tail;
                }
                Err(err) if head.chars().count() > 1 && !is_named_key(rest) => return Err(err),
                Err(_) => break,
            }
        }

        Ok(KeyName::new(modifiers, Key::from_str(rest)?))
    }
}

fn is_named_key(s: &str) -> bool {
    Key::from_str(s).is_ok()
}

/// Normalize a key identifier to its canonical string
pub fn normalize(key: &str) -> Result<String, KeyError> {
    KeyName::from_str(key).map(|name| name.to_string())
}

/// Normalize a lookup key, passing unparseable input through untouched
///
/// Lookup never fails on a strange key; it simply cannot match anything
/// that configuration loading accepted.
pub fn normalize_lossy(key: &str) -> String {
    normalize(key).unwrap_or_else(|_| key.to_string())
}
