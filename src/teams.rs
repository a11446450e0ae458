use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("psg", "PSG"),
    ("paris", "PSG"),
    ("paris sg", "PSG"),
    ("om", "OM"),
    ("marseille", "OM"),
    ("ol", "Lyon"),
    ("olympique lyonnais", "Lyon"),
    ("losc", "Lille"),
    ("lille", "Lille"),
    ("monaco", "Monaco"),
    ("as monaco", "Monaco"),
    ("nice", "Nice"),
    ("ogc nice", "Nice"),
    ("lens", "Lens"),
    ("rc lens", "Lens"),
    ("rennes", "Rennes"),
    ("stade rennais", "Rennes"),
];

/// Alias → canonical team name lookup.
///
/// Keys are stored trimmed and lowercased; lookups are case-insensitive.
/// Names without an alias come back trimmed but otherwise untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, String>", into = "HashMap<String, String>")]
pub struct TeamAliases {
    map: HashMap<String, String>,
}

impl From<HashMap<String, String>> for TeamAliases {
    fn from(raw: HashMap<String, String>) -> Self {
        let mut out = Self::empty();
        for (alias, canonical) in &raw {
            out.insert(alias, canonical);
        }
        out
    }
}

impl From<TeamAliases> for HashMap<String, String> {
    fn from(aliases: TeamAliases) -> Self {
        aliases.map
    }
}

impl Default for TeamAliases {
    fn default() -> Self {
        Self::from_pairs(BUILTIN_ALIASES.iter().copied())
    }
}

impl TeamAliases {
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut out = Self::empty();
        for (alias, canonical) in pairs {
            out.insert(alias, canonical);
        }
        out
    }

    pub fn insert(&mut self, alias: &str, canonical: &str) {
        let key = alias_key(alias);
        let canonical = canonical.trim();
        if key.is_empty() || canonical.is_empty() {
            return;
        }
        self.map.insert(key, canonical.to_string());
    }

    /// Layer `other` on top; its entries win on conflict.
    pub fn extend(&mut self, other: &TeamAliases) {
        for (alias, canonical) in &other.map {
            self.map.insert(alias.clone(), canonical.clone());
        }
    }

    pub fn normalize(&self, name: &str) -> String {
        let trimmed = name.trim();
        self.map
            .get(&alias_key(trimmed))
            .cloned()
            .unwrap_or_else(|| trimmed.to_string())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Entries sorted by alias, for display.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut out = self
            .map
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect::<Vec<_>>();
        out.sort_unstable();
        out
    }
}

fn alias_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}
