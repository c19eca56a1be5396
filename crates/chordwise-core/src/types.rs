use crate::fingerprint::Fingerprint;
use std::fmt;

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const fn none() -> Self {
        Self {
            alt: false,
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    pub const fn is_empty(self) -> bool {
        !(self.alt || self.ctrl || self.meta || self.shift)
    }

    pub fn set(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Alt => self.alt = true,
            Modifier::Ctrl => self.ctrl = true,
            Modifier::Meta => self.meta = true,
            Modifier::Shift => self.shift = true,
        }
    }

    pub const fn has(self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Alt => self.alt,
            Modifier::Ctrl => self.ctrl,
            Modifier::Meta => self.meta,
            Modifier::Shift => self.shift,
        }
    }

    pub fn fingerprint(self) -> Fingerprint {
        crate::fingerprint::generate(self)
    }
}

/// One of the four modifier names accepted in chord tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Alt,
    Ctrl,
    Meta,
    Shift,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [Modifier::Alt, Modifier::Ctrl, Modifier::Meta, Modifier::Shift];

    /// Case-sensitive: `Ctrl` is not a modifier name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "alt" => Some(Modifier::Alt),
            "ctrl" => Some(Modifier::Ctrl),
            "meta" => Some(Modifier::Meta),
            "shift" => Some(Modifier::Shift),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Modifier::Alt => "alt",
            Modifier::Ctrl => "ctrl",
            Modifier::Meta => "meta",
            Modifier::Shift => "shift",
        }
    }
}

/// Terminal key of a chord step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Tab,
}

impl Key {
    pub const TAB_NAME: &'static str = "Tab";

    /// Maps the key string reported by an input source.
    /// Anything other than a single character or `Tab` has no chord representation.
    pub fn from_event_key(raw: &str) -> Option<Self> {
        if raw == Self::TAB_NAME {
            return Some(Key::Tab);
        }

        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Key::Char(c)),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(' ') => write!(f, "space"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Tab => write!(f, "{}", Self::TAB_NAME),
        }
    }
}

/// A single required key press: modifier fingerprint plus terminal key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChordStep {
    pub fingerprint: Fingerprint,
    pub key: Key,
}

impl ChordStep {
    pub const fn new(fingerprint: Fingerprint, key: Key) -> Self {
        Self { fingerprint, key }
    }

    pub fn matches(&self, fingerprint: Fingerprint, key: Key) -> bool {
        self.fingerprint == fingerprint && self.key == key
    }
}

impl fmt::Display for ChordStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mods = self.fingerprint.modifiers();
        for modifier in Modifier::ALL {
            if mods.has(modifier) {
                write!(f, "{}-", modifier.name())?;
            }
        }
        write!(f, "{}", self.key)
    }
}

/// Input event as seen by the engine.
///
/// The bubbling hooks default to no-ops so that sources without a
/// propagation model only need to report the key and modifiers.
pub trait KeyboardEvent {
    fn key(&self) -> &str;
    fn modifiers(&self) -> Modifiers;

    fn prevent_default(&mut self) {}
    fn stop_propagation(&mut self) {}
    fn stop_immediate_propagation(&mut self) {}
}

/// Owned key press that records which bubbling hooks were invoked on it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPress {
    pub key: String,
    pub mods: Modifiers,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    pub immediate_propagation_stopped: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_modifiers(key: impl Into<String>, mods: Modifiers) -> Self {
        Self {
            key: key.into(),
            mods,
            ..Self::default()
        }
    }

    pub fn alt(mut self) -> Self {
        self.mods.alt = true;
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.mods.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.mods.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.mods.shift = true;
        self
    }

    /// True when the engine touched this event at all.
    pub fn was_intercepted(&self) -> bool {
        self.default_prevented || self.propagation_stopped || self.immediate_propagation_stopped
    }
}

impl KeyboardEvent for KeyPress {
    fn key(&self) -> &str {
        &self.key
    }

    fn modifiers(&self) -> Modifiers {
        self.mods
    }

    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    fn stop_immediate_propagation(&mut self) {
        self.immediate_propagation_stopped = true;
    }
}
