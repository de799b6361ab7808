//! Template key generation: entity names become YAML-safe keys, collisions
//! get a numeric suffix, and a bidirectional map ties every generated key
//! back to its entity id for the lifetime of one conversion pass.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s").unwrap_or_else(|_| unreachable!()))
}

fn unwanted_characters() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[#>\-.]").unwrap_or_else(|_| unreachable!()))
}

fn multiple_underscores() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_+").unwrap_or_else(|_| unreachable!()))
}

/// Normalize an entity name into a template key: trim, turn whitespace and
/// the characters `# > - .` into underscores, collapse runs of underscores,
/// lowercase.
pub fn transform_to_key(name: &str) -> String {
    let trimmed = name.trim();
    let keyed = whitespace().replace_all(trimmed, "_");
    let keyed = unwanted_characters().replace_all(&keyed, "_");
    let keyed = multiple_underscores().replace_all(&keyed, "_");
    keyed.to_lowercase()
}

/// Hands out each key at most once per conversion pass. A collision gets a
/// numeric suffix, counted up until free.
#[derive(Debug, Default)]
pub struct UniqueKeyManager {
    used: HashSet<String>,
}

impl UniqueKeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_unique(&mut self, key: String) -> String {
        if self.used.insert(key.clone()) {
            return key;
        }
        let mut counter = 2usize;
        loop {
            let candidate = format!("{key}_{counter}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Bidirectional key/id lookup built up during one conversion.
#[derive(Debug, Clone, Default)]
pub struct TwoWayKeyIdMap {
    key_to_id: HashMap<String, String>,
    id_to_key: HashMap<String, String>,
}

impl TwoWayKeyIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, id: &str) {
        self.key_to_id.insert(key.to_string(), id.to_string());
        self.id_to_key.insert(id.to_string(), key.to_string());
    }

    pub fn key_of(&self, id: &str) -> Option<&str> {
        self.id_to_key.get(id).map(String::as_str)
    }

    pub fn id_of(&self, key: &str) -> Option<&str> {
        self.key_to_id.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.key_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_to_id.is_empty()
    }
}
