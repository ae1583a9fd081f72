//! Maps noisy names read off a screenshot to catalog ids.

use std::collections::HashMap;

use log::{debug, warn};

use crate::core_api::Corpus;

const SKILL_NAME_STRIP: &[char] = &[
    '-', '_', '・', '!', '！', '?', '？', ',', '、', '.', '。', ':', '：', ';', '；', '\'', '"', '‘',
    '’', '“', '”', '「', '」', '『', '』', '【', '】', '(', ')', '（', '）', '[', ']', '☆', '★',
];

const EPITHET_STRIP: &[char] = &[
    '[', ']', '「', '」', '『', '』', '【', '】', '-', '_', '・', '☆', '★', '♪',
];

fn strip(text: &str, set: &[char]) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && !set.contains(c))
        .collect()
}

/// Lowercase and drop whitespace, punctuation, brackets and stars.
pub fn normalize(text: &str) -> String {
    strip(text, SKILL_NAME_STRIP)
}

/// Like [`normalize`] with the bracket/decoration set used for outfit epithets.
pub fn normalize_epithet(text: &str) -> String {
    strip(text, EPITHET_STRIP)
}

/// Normalized key -> id, remembering insertion order for the substring fallback.
#[derive(Debug, Clone, Default)]
struct NameTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl NameTable {
    /// A repeated key keeps its first position and takes the newer id.
    fn insert(&mut self, key: String, id: &str) {
        if key.is_empty() {
            return;
        }
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = id.to_string(),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, id.to_string()));
            }
        }
    }

    /// Exact match first, then the first entry (in insertion order) where either
    /// string contains the other.
    fn lookup(&self, key: &str) -> Option<&str> {
        if key.is_empty() {
            return None;
        }
        if let Some(&pos) = self.index.get(key) {
            return Some(self.entries[pos].1.as_str());
        }
        self.entries
            .iter()
            .find(|(k, _)| k.contains(key) || key.contains(k.as_str()))
            .map(|(_, id)| id.as_str())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Read-only lookup tables built once from a [`Corpus`].
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    skills: NameTable,
    epithets: NameTable,
}

impl Resolver {
    pub fn new(corpus: &Corpus) -> Self {
        Self {
            skills: build_skill_table(corpus),
            epithets: build_epithet_table(corpus),
        }
    }

    pub fn skill_name_count(&self) -> usize {
        self.skills.len()
    }

    pub fn epithet_count(&self) -> usize {
        self.epithets.len()
    }

    pub fn resolve_skill_name(&self, name: &str) -> Option<&str> {
        self.skills.lookup(&normalize(name))
    }

    /// Resolve each name; names with no match are left out.
    pub fn resolve_skill_names<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                let id = self.resolve_skill_name(name);
                if id.is_none() {
                    debug!("no skill matches {name:?}");
                }
                id.map(str::to_string)
            })
            .collect()
    }

    /// The outfit id for an epithet, or `""` when nothing matches.
    pub fn resolve_outfit_epithet(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        match self.epithets.lookup(&normalize_epithet(text)) {
            Some(id) => id.to_string(),
            None => {
                warn!("could not find outfit id for {text:?}");
                String::new()
            }
        }
    }
}

fn build_skill_table(corpus: &Corpus) -> NameTable {
    let mut table = NameTable::default();
    for entry in &corpus.skill_names {
        if !corpus.skills.contains_base(&entry.id) {
            continue;
        }
        for name in entry.names.iter().take(2) {
            table.insert(normalize(name), &entry.id);
        }
    }
    table
}

fn build_epithet_table(corpus: &Corpus) -> NameTable {
    let mut table = NameTable::default();
    for (outfit_id, epithet) in corpus.outfits.outfits() {
        table.insert(normalize_epithet(epithet), outfit_id);
    }
    table
}
