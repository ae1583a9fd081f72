use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::error::{CoreError, CoreErrorCode};
use super::outfit_catalog::{CharacterEntry, OutfitCatalog};
use super::skill_catalog::{SkillCatalog, SkillEntry, base_skill_id};

pub const SKILL_DATA_FILE: &str = "skill_data.json";
pub const SKILL_META_FILE: &str = "skill_meta.json";
pub const SKILL_NAMES_FILE: &str = "skillnames.json";
pub const UMAS_FILE: &str = "umas.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillNameEntry {
    pub id: String,
    /// Localized names, Japanese first then English; either may be empty.
    pub names: Vec<String>,
}

/// Static game data the resolver and invariant rules are built from.
/// Table order follows the source files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    pub skills: SkillCatalog,
    pub skill_names: Vec<SkillNameEntry>,
    pub outfits: OutfitCatalog,
}

#[derive(Debug, Deserialize)]
struct RawSkillData {
    rarity: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSkillMeta {
    #[serde(default)]
    group_id: Option<JsonValue>,
    #[serde(default)]
    order: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawUma {
    #[serde(default)]
    name: Vec<String>,
    #[serde(default)]
    outfits: JsonMap<String, JsonValue>,
}

impl Corpus {
    pub fn load_from_dir(data_dir: &Path) -> Result<Self, CoreError> {
        let read = |file: &str| {
            let path = data_dir.join(file);
            fs::read_to_string(&path).map_err(|e| {
                CoreError::new(
                    CoreErrorCode::Io,
                    format!("failed to read {}: {e}", path.display()),
                )
            })
        };

        Self::from_json_strs(
            &read(SKILL_DATA_FILE)?,
            &read(SKILL_META_FILE)?,
            &read(SKILL_NAMES_FILE)?,
            &read(UMAS_FILE)?,
        )
    }

    pub fn from_json_strs(
        skill_data: &str,
        skill_meta: &str,
        skill_names: &str,
        umas: &str,
    ) -> Result<Self, CoreError> {
        let skill_data = parse_table(SKILL_DATA_FILE, skill_data)?;
        let skill_meta = parse_table(SKILL_META_FILE, skill_meta)?;
        let skill_names = parse_table(SKILL_NAMES_FILE, skill_names)?;
        let umas = parse_table(UMAS_FILE, umas)?;

        let mut metas = BTreeMap::new();
        for (id, value) in skill_meta {
            let meta: RawSkillMeta = parse_entry(SKILL_META_FILE, &id, value)?;
            metas.insert(id, meta);
        }

        let mut entries = Vec::with_capacity(skill_data.len());
        for (id, value) in skill_data {
            let data: RawSkillData = parse_entry(SKILL_DATA_FILE, &id, value)?;
            let meta = metas.remove(&id).unwrap_or_default();
            entries.push(SkillEntry {
                group_id: meta.group_id.and_then(|g| scalar_to_string(&g)),
                order: meta.order,
                rarity: data.rarity,
                id,
            });
        }

        let mut names = Vec::with_capacity(skill_names.len());
        for (id, value) in skill_names {
            let localized: Vec<Option<String>> = parse_entry(SKILL_NAMES_FILE, &id, value)?;
            names.push(SkillNameEntry {
                id,
                names: localized.into_iter().map(Option::unwrap_or_default).collect(),
            });
        }

        let mut characters = Vec::with_capacity(umas.len());
        for (id, value) in umas {
            let uma: RawUma = parse_entry(UMAS_FILE, &id, value)?;
            let outfits = uma
                .outfits
                .into_iter()
                .filter_map(|(outfit_id, epithet)| match epithet {
                    JsonValue::String(s) => Some((outfit_id, s)),
                    _ => None,
                })
                .collect();
            let mut name = uma.name.into_iter();
            characters.push(CharacterEntry {
                id,
                name_ja: name.next().unwrap_or_default(),
                name_en: name.next().unwrap_or_default(),
                outfits,
            });
        }

        Ok(Self {
            skills: SkillCatalog::from_entries(entries),
            skill_names: names,
            outfits: OutfitCatalog::new(characters),
        })
    }

    /// English name for a skill, falling back to Japanese.
    pub fn skill_display_name(&self, id: &str) -> Option<&str> {
        let base = base_skill_id(id);
        let entry = self.skill_names.iter().find(|e| e.id == base)?;
        entry
            .names
            .get(1)
            .filter(|n| !n.is_empty())
            .or_else(|| entry.names.first().filter(|n| !n.is_empty()))
            .map(String::as_str)
    }
}

fn parse_table(file: &str, text: &str) -> Result<JsonMap<String, JsonValue>, CoreError> {
    serde_json::from_str(text).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Parse,
            format!("{file} is not a JSON object: {e}"),
        )
    })
}

fn parse_entry<T: DeserializeOwned>(
    file: &str,
    key: &str,
    value: JsonValue,
) -> Result<T, CoreError> {
    serde_json::from_value(value).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Parse,
            format!("invalid entry {key:?} in {file}: {e}"),
        )
    })
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
