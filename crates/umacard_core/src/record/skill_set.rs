use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::core_api::SkillCatalog;

/// Active skills keyed by group id, so a group can never hold two skills.
///
/// Serializes as a flat array of skill ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet {
    by_group: BTreeMap<String, String>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later ids replace earlier ones that share a group.
    pub fn from_ids<I, S>(ids: I, catalog: &SkillCatalog) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for id in ids {
            set.insert(id.into(), catalog);
        }
        set
    }

    /// Insert under the skill's group; returns the id it displaced, if any.
    pub fn insert(&mut self, id: String, catalog: &SkillCatalog) -> Option<String> {
        let group = catalog.group_id(&id);
        self.by_group.insert(group, id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_group.values().any(|v| v == id)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.by_group.len();
        self.by_group.retain(|_, v| v != id);
        self.by_group.len() != before
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.by_group.retain(|_, v| keep(v));
    }

    pub fn group_of(&self, id: &str) -> Option<&str> {
        self.by_group
            .iter()
            .find(|(_, v)| *v == id)
            .map(|(g, _)| g.as_str())
    }

    pub fn in_group(&self, group: &str) -> Option<&str> {
        self.by_group.get(group).map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.by_group.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_group.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_group.is_empty()
    }
}

impl Serialize for SkillSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ids())
    }
}
