use std::collections::BTreeMap;

/// Highest rarity that is always inheritable; anything above is character-bound.
const GENERAL_RARITY_LIMIT: i32 = 3;

/// Pink uniques any character may carry (the Welfare Kraft alt inherit), on top of every `4xxxxx` id.
const UNIVERSAL_PINKS: &[&str] = &["92111091"];

/// Strips an evolution suffix such as `-1` from a skill id.
pub fn base_skill_id(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillEntry {
    pub id: String,
    pub rarity: i32,
    pub group_id: Option<String>,
    pub order: Option<i64>,
}

/// Skill id -> rarity / group / display order, joined from `skill_data.json` and `skill_meta.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillCatalog {
    entries: BTreeMap<String, SkillEntry>,
}

impl SkillCatalog {
    pub fn from_entries<I: IntoIterator<Item = SkillEntry>>(entries: I) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&SkillEntry> {
        self.entries.get(id)
    }

    /// Whether the id, ignoring any `-N` suffix, names a catalog skill.
    pub fn contains_base(&self, id: &str) -> bool {
        self.entries.contains_key(base_skill_id(id))
    }

    pub fn rarity(&self, id: &str) -> Option<i32> {
        self.entries.get(base_skill_id(id)).map(|e| e.rarity)
    }

    /// Mutual-exclusion key. Skills without metadata get a group of their own.
    pub fn group_id(&self, id: &str) -> String {
        self.entries
            .get(id)
            .or_else(|| self.entries.get(base_skill_id(id)))
            .and_then(|e| e.group_id.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn order_key(&self, id: &str) -> i64 {
        self.entries
            .get(id)
            .and_then(|e| e.order)
            .unwrap_or(i64::MAX)
    }

    pub fn is_universally_accessible(id: &str) -> bool {
        id.starts_with('4') || UNIVERSAL_PINKS.contains(&id)
    }

    /// Skills that survive an outfit change.
    pub fn is_general(&self, id: &str) -> bool {
        match self.rarity(id) {
            Some(rarity) => rarity < GENERAL_RARITY_LIMIT || Self::is_universally_accessible(id),
            None => false,
        }
    }

    /// Display order: catalog order key, then id.
    pub fn sort_for_display<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        let mut out: Vec<&str> = ids.into_iter().collect();
        out.sort_by(|a, b| {
            self.order_key(a)
                .cmp(&self.order_key(b))
                .then_with(|| a.cmp(b))
        });
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
