use std::collections::HashMap;

use winit::keyboard::{Key, NamedKey};

/// Held-state of every key seen so far, keyed by lowercase key name.
///
/// Names follow the DOM `KeyboardEvent.key` convention lowercased, so letters
/// are `"w"`, arrows are `"arrowup"`. A key only returns to "not held" on an
/// explicit release; losing window focus does not clear anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStates {
    held: HashMap<String, bool>,
}

impl KeyStates {
    pub fn set(&mut self, key: &str, is_down: bool) {
        self.held.insert(key.to_lowercase(), is_down);
    }

    pub fn is_down(&self, key: &str) -> bool {
        self.held
            .get(key.to_lowercase().as_str())
            .copied()
            .unwrap_or(false)
    }

    pub fn any_down(&self, keys: &[&str]) -> bool {
        keys.iter().any(|key| self.is_down(key))
    }

    pub fn held_keys(&self) -> impl Iterator<Item = &str> {
        self.held
            .iter()
            .filter(|(_, is_down)| **is_down)
            .map(|(key, _)| key.as_str())
    }
}

pub fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(text) => Some(text.to_lowercase()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        Key::Named(named) => Some(format!("{named:?}").to_ascii_lowercase()),
        _ => None,
    }
}
