use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::{Map as JsonMap, Value as JsonValue};
use thiserror::Error;

use crate::core_api::SkillCatalog;

use super::{
    Aptitude, CanonicalRecord, MOOD_MAX, MOOD_MIN, SkillSet, Strategy, is_well_formed_outfit_id,
};

/// The one rejection outcome of [`validate`]. The reason is for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a recognized horse record: {reason}")]
pub struct InvalidRecord {
    pub reason: String,
}

impl InvalidRecord {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Turn an untrusted JSON blob into a record, or reject it outright.
///
/// Unknown skill ids are dropped rather than rejected. Forced positions are taken as
/// given; pruning them against the skill set is left to the invariant rules.
pub fn validate(blob: &JsonValue, catalog: &SkillCatalog) -> Result<CanonicalRecord, InvalidRecord> {
    let Some(obj) = blob.as_object() else {
        return Err(InvalidRecord::new("expected a JSON object"));
    };

    let speed = stat_field(obj, "speed")?;
    let stamina = stat_field(obj, "stamina")?;
    let power = stat_field(obj, "power")?;
    let guts = stat_field(obj, "guts")?;
    let wisdom = stat_field(obj, "wisdom")?;

    let mood = number_field(obj, "mood")?;
    if mood < f64::from(MOOD_MIN) || mood > f64::from(MOOD_MAX) {
        return Err(InvalidRecord::new(format!(
            "mood {mood} outside {MOOD_MIN}..={MOOD_MAX}"
        )));
    }

    let strategy: Strategy = enum_field(obj, "strategy")?;
    let distance_aptitude: Aptitude = enum_field(obj, "distanceAptitude")?;
    let surface_aptitude: Aptitude = enum_field(obj, "surfaceAptitude")?;
    let strategy_aptitude: Aptitude = enum_field(obj, "strategyAptitude")?;

    let Some(JsonValue::Array(raw_skills)) = obj.get("skills") else {
        return Err(InvalidRecord::new("skills must be an array"));
    };
    let skill_ids = raw_skills
        .iter()
        .filter_map(JsonValue::as_str)
        .filter(|id| catalog.contains_base(id));
    let skills = SkillSet::from_ids(skill_ids, catalog);

    Ok(CanonicalRecord {
        outfit_id: outfit_field(obj)?,
        speed,
        stamina,
        power,
        guts,
        wisdom,
        strategy,
        distance_aptitude,
        surface_aptitude,
        strategy_aptitude,
        mood: mood as i8,
        skills,
        forced_skill_positions: forced_positions_field(obj),
    })
}

fn number_field(obj: &JsonMap<String, JsonValue>, key: &str) -> Result<f64, InvalidRecord> {
    obj.get(key)
        .and_then(JsonValue::as_f64)
        .ok_or_else(|| InvalidRecord::new(format!("{key} must be a number")))
}

fn stat_field(obj: &JsonMap<String, JsonValue>, key: &str) -> Result<i32, InvalidRecord> {
    number_field(obj, key).map(|v| v as i32)
}

fn enum_field<T: FromStr<Err = String>>(
    obj: &JsonMap<String, JsonValue>,
    key: &str,
) -> Result<T, InvalidRecord> {
    let Some(raw) = obj.get(key).and_then(JsonValue::as_str) else {
        return Err(InvalidRecord::new(format!("{key} must be a string")));
    };
    raw.parse()
        .map_err(|e: String| InvalidRecord::new(format!("{key}: {e}")))
}

fn outfit_field(obj: &JsonMap<String, JsonValue>) -> Result<String, InvalidRecord> {
    match obj.get("outfitId") {
        None | Some(JsonValue::Null) => Ok(String::new()),
        Some(JsonValue::String(s)) if s.is_empty() || is_well_formed_outfit_id(s) => Ok(s.clone()),
        Some(other) => Err(InvalidRecord::new(format!(
            "outfitId {other} is not an outfit id"
        ))),
    }
}

fn forced_positions_field(obj: &JsonMap<String, JsonValue>) -> BTreeMap<String, f64> {
    let raw = obj
        .get("forcedSkillPositions")
        .or_else(|| obj.get("forcedPositions"));
    let Some(JsonValue::Object(map)) = raw else {
        return BTreeMap::new();
    };
    map.iter()
        .filter_map(|(id, v)| {
            v.as_f64()
                .filter(|d| d.is_finite())
                .map(|d| (id.clone(), d))
        })
        .collect()
}
