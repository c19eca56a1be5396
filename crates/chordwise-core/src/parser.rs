//! Chord string parsing.
//!
//! A chord string is a space separated list of tokens, each token being up to
//! four modifier names followed by one terminal key, joined with `-`:
//!
//! ```text
//! sequence = token (" " token)*
//! token    = (modifier "-")* key
//! modifier = "alt" | "ctrl" | "meta" | "shift"
//! key      = "Tab" | single-char
//! ```
//!
//! Every part of a token is looked up in the alias table before being
//! classified, so an alias may stand for a modifier name or a key character.

use crate::fingerprint;
use crate::types::{ChordStep, Key, Modifier, Modifiers};
use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

/// 4 modifiers + 1 key.
pub const MAX_TOKEN_PARTS: usize = 5;

pub const TOKEN_SEPARATOR: char = ' ';
pub const PART_SEPARATOR: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid key combination: {0}")]
    Empty(String),
    #[error("invalid key combination: {0}")]
    TooManyParts(String),
    #[error("invalid key combination: {0}")]
    UnknownPart(String),
    #[error("invalid key combination: {0}")]
    MultipleKeys(String),
    #[error("invalid key combination: {0}")]
    MissingKey(String),
}

impl ParseError {
    /// The token (or whole chord string) that was rejected.
    pub fn token(&self) -> &str {
        match self {
            ParseError::Empty(t)
            | ParseError::TooManyParts(t)
            | ParseError::UnknownPart(t)
            | ParseError::MultipleKeys(t)
            | ParseError::MissingKey(t) => t,
        }
    }
}

pub fn parse_sequence(
    text: &str,
    aliases: &HashMap<String, String>,
) -> Result<Vec<ChordStep>, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty(text.to_string()));
    }

    text.split(TOKEN_SEPARATOR)
        .map(|token| parse_step(token, aliases))
        .collect()
}

pub fn parse_step(token: &str, aliases: &HashMap<String, String>) -> Result<ChordStep, ParseError> {
    let parts: Vec<&str> = token.trim().split(PART_SEPARATOR).collect();
    if parts.len() > MAX_TOKEN_PARTS {
        return Err(ParseError::TooManyParts(token.to_string()));
    }

    let mut mods = Modifiers::none();
    let mut key: Option<Key> = None;

    for part in parts {
        let part = part.trim();
        let part = aliases.get(part).map(String::as_str).unwrap_or(part);

        if let Some(modifier) = Modifier::from_name(part) {
            mods.set(modifier);
            continue;
        }

        // Tab replaces any key seen before it.
        if part == Key::TAB_NAME {
            key = Some(Key::Tab);
            continue;
        }

        let c = single_char(part).ok_or_else(|| ParseError::UnknownPart(token.to_string()))?;
        if key.is_some() {
            return Err(ParseError::MultipleKeys(token.to_string()));
        }

        // An uppercase key can only be typed with shift held.
        if c != ' ' && is_own_uppercase(c) {
            mods.shift = true;
        }

        key = Some(Key::Char(c));
    }

    let key = match key {
        Some(Key::Char(c)) if mods.shift => Key::Char(to_single_uppercase(c)),
        Some(key) => key,
        None => return Err(ParseError::MissingKey(token.to_string())),
    };

    let step = ChordStep::new(fingerprint::generate(mods), key);
    trace!("Parsed token {:?} as {}", token, step);
    Ok(step)
}

fn single_char(part: &str) -> Option<char> {
    let mut chars = part.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn is_own_uppercase(c: char) -> bool {
    c.to_uppercase().eq(std::iter::once(c))
}

// Characters whose uppercase form expands to several chars (e.g. 'ß') are kept as is.
fn to_single_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}
