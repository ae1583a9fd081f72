//! Cross-field rules for [`CanonicalRecord`] and the mutations that preserve them.
//!
//! After any operation here:
//! 1. every forced position key is an active skill,
//! 2. a selected outfit's unique skill is active,
//! 3. the runaway skill forces the `Oonige` strategy,
//! 4. no group holds two skills (guaranteed by [`SkillSet`]).

use log::warn;
use thiserror::Error;

use crate::core_api::SkillCatalog;
use crate::core_api::skill_catalog::base_skill_id;
use crate::ocr::OcrHorseData;
use crate::record::{
    Aptitude, AptitudeKind, CanonicalRecord, MOOD_MAX, MOOD_MIN, SkillSet, Stat, Strategy,
    is_well_formed_outfit_id,
};
use crate::resolver::Resolver;

/// Skill that only works with the runaway (`Oonige`) style.
pub const RUNAWAY_SKILL_ID: &str = "202051";

/// Leading digit of the inherited (gold) copy of a unique skill.
const GOLD_UNIQUE_PREFIX: char = '9';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("malformed outfit id {0:?}")]
    MalformedOutfitId(String),
    #[error("unknown skill id {0:?}")]
    UnknownSkill(String),
    #[error("skill {0} is the selected outfit's unique skill and cannot be removed")]
    UniqueSkillLocked(String),
    #[error("mood {0} outside {MOOD_MIN}..={MOOD_MAX}")]
    MoodOutOfRange(i8),
    #[error("record violates invariants: {0}")]
    Violated(String),
}

/// A single user-level edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    SetOutfit(String),
    /// `raw` is free text from an input box; empty or non-numeric clears the position.
    SetForcedPosition { skill_id: String, raw: String },
    AddSkill(String),
    RemoveSkill(String),
    SetStrategy(Strategy),
    SetStat(Stat, i32),
    SetMood(i8),
    SetAptitude(AptitudeKind, Aptitude),
    Reset,
}

/// `100000 + 10000 * (variant - 1) + character_index * 10 + 1`, where the character
/// index is the id minus its first and last two digits and the variant is the last two.
pub fn derive_unique_skill_id(outfit_id: &str) -> Result<String, InvariantError> {
    let malformed = || InvariantError::MalformedOutfitId(outfit_id.to_string());
    if !is_well_formed_outfit_id(outfit_id) {
        return Err(malformed());
    }

    let split = outfit_id.len() - 2;
    let index: i64 = outfit_id[1..split].parse().map_err(|_| malformed())?;
    let variant: i64 = outfit_id[split..].parse().map_err(|_| malformed())?;

    index
        .checked_mul(10)
        .and_then(|i| i.checked_add(10_000 * (variant - 1)))
        .and_then(|i| i.checked_add(100_001))
        .map(|id| id.to_string())
        .ok_or_else(malformed)
}

/// The inherited copy of a unique skill shares its digits after the first.
pub fn gold_counterpart(unique_skill_id: &str) -> String {
    let base = base_skill_id(unique_skill_id);
    let tail = base.get(1..).unwrap_or_default();
    format!("{GOLD_UNIQUE_PREFIX}{tail}")
}

/// Longest numeric prefix after leading whitespace, the way a browser number box
/// reads `"850m"` as 850. Non-finite results count as unparsable.
fn parse_leading_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let b = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;
    if b.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        digits += frac_end - (end + 1);
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(b.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(b.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy)]
pub struct InvariantManager<'a> {
    catalog: &'a SkillCatalog,
    resolver: &'a Resolver,
}

impl<'a> InvariantManager<'a> {
    pub fn new(catalog: &'a SkillCatalog, resolver: &'a Resolver) -> Self {
        Self { catalog, resolver }
    }

    /// Apply one edit to a copy of `record` and restore the invariants.
    pub fn apply(
        &self,
        record: &CanonicalRecord,
        op: Operation,
    ) -> Result<CanonicalRecord, InvariantError> {
        let next = match op {
            Operation::SetOutfit(outfit_id) => {
                return self.apply_outfit_change(record, &outfit_id);
            }
            Operation::SetForcedPosition { skill_id, raw } => {
                return Ok(self.set_forced_position(record, &skill_id, &raw));
            }
            Operation::AddSkill(id) => {
                if !self.catalog.contains_base(&id) {
                    return Err(InvariantError::UnknownSkill(id));
                }
                let mut next = record.clone();
                if let Some(displaced) = next.skills.insert(id, self.catalog) {
                    next.forced_skill_positions.remove(&displaced);
                }
                next
            }
            Operation::RemoveSkill(id) => {
                if !record.outfit_id.is_empty()
                    && derive_unique_skill_id(&record.outfit_id)? == id
                {
                    return Err(InvariantError::UniqueSkillLocked(id));
                }
                let mut next = record.clone();
                next.skills.remove(&id);
                next.forced_skill_positions.remove(&id);
                next
            }
            Operation::SetStrategy(strategy) => CanonicalRecord {
                strategy,
                ..record.clone()
            },
            Operation::SetStat(stat, value) => {
                let mut next = record.clone();
                *next.stat_mut(stat) = value;
                next
            }
            Operation::SetMood(mood) => {
                if !(MOOD_MIN..=MOOD_MAX).contains(&mood) {
                    return Err(InvariantError::MoodOutOfRange(mood));
                }
                CanonicalRecord {
                    mood,
                    ..record.clone()
                }
            }
            Operation::SetAptitude(kind, grade) => {
                let mut next = record.clone();
                *next.aptitude_mut(kind) = grade;
                next
            }
            Operation::Reset => CanonicalRecord::default(),
        };
        self.repair(next)
    }

    /// Swap outfits: keep general skills, install the new unique skill, prune
    /// forced positions of anything that was dropped.
    pub fn apply_outfit_change(
        &self,
        record: &CanonicalRecord,
        new_outfit_id: &str,
    ) -> Result<CanonicalRecord, InvariantError> {
        let mut skills = record.skills.clone();
        skills.retain(|id| self.catalog.is_general(id));

        if !new_outfit_id.is_empty() {
            let unique = derive_unique_skill_id(new_outfit_id)?;
            skills.insert(unique, self.catalog);
        }

        let mut next = CanonicalRecord {
            outfit_id: new_outfit_id.to_string(),
            skills,
            ..record.clone()
        };
        prune_forced_positions(&mut next);
        Ok(self.enforce_runaway_coupling(next))
    }

    /// Build a record from vision-model fields. Mood is not on the screenshot and
    /// defaults to the best value.
    pub fn apply_ocr_assembly(
        &self,
        fields: &OcrHorseData,
        raw_skill_names: &[String],
    ) -> Result<CanonicalRecord, InvariantError> {
        let outfit_id = self.resolver.resolve_outfit_epithet(&fields.outfit);
        let mut skill_ids = self.resolver.resolve_skill_names(raw_skill_names);

        if !outfit_id.is_empty() {
            let unique = derive_unique_skill_id(&outfit_id)?;
            let unique_base = base_skill_id(&unique).to_string();
            let gold = gold_counterpart(&unique);
            skill_ids.retain(|id| {
                let base = base_skill_id(id);
                base != unique_base && base != gold
            });
            skill_ids.insert(0, unique);
        }

        let defaults = CanonicalRecord::default();
        let record = CanonicalRecord {
            outfit_id,
            speed: fields.speed as i32,
            stamina: fields.stamina as i32,
            power: fields.power as i32,
            guts: fields.guts as i32,
            wisdom: fields.wisdom as i32,
            strategy: parse_or_default("strategy", &fields.strategy, defaults.strategy),
            distance_aptitude: parse_or_default(
                "distanceAptitude",
                &fields.distance_aptitude,
                defaults.distance_aptitude,
            ),
            surface_aptitude: parse_or_default(
                "surfaceAptitude",
                &fields.surface_aptitude,
                defaults.surface_aptitude,
            ),
            strategy_aptitude: parse_or_default(
                "strategyAptitude",
                &fields.strategy_aptitude,
                defaults.strategy_aptitude,
            ),
            mood: MOOD_MAX,
            skills: SkillSet::from_ids(skill_ids, self.catalog),
            forced_skill_positions: Default::default(),
        };
        self.repair(record)
    }

    /// Set or clear a forced position. Never fails: bad input clears the entry.
    pub fn set_forced_position(
        &self,
        record: &CanonicalRecord,
        skill_id: &str,
        raw: &str,
    ) -> CanonicalRecord {
        let mut next = record.clone();
        match parse_leading_float(raw) {
            Some(value) => {
                next.forced_skill_positions.insert(skill_id.to_string(), value);
            }
            None => {
                next.forced_skill_positions.remove(skill_id);
            }
        }
        prune_forced_positions(&mut next);
        next
    }

    pub fn enforce_runaway_coupling(&self, mut record: CanonicalRecord) -> CanonicalRecord {
        if record.skills.contains(RUNAWAY_SKILL_ID) && record.strategy != Strategy::Oonige {
            record.strategy = Strategy::Oonige;
        }
        record
    }

    /// Re-establish every invariant on a record from any source.
    pub fn repair(&self, mut record: CanonicalRecord) -> Result<CanonicalRecord, InvariantError> {
        if !record.outfit_id.is_empty() {
            let unique = derive_unique_skill_id(&record.outfit_id)?;
            if !record.skills.contains(&unique) {
                if !self.catalog.contains_base(&unique) {
                    warn!(
                        "unique skill {unique} for outfit {} is missing from the skill catalog",
                        record.outfit_id
                    );
                }
                if let Some(displaced) = record.skills.insert(unique, self.catalog) {
                    record.forced_skill_positions.remove(&displaced);
                }
            }
        }
        prune_forced_positions(&mut record);
        Ok(self.enforce_runaway_coupling(record))
    }

    /// Err with a description of the first broken invariant.
    pub fn verify(&self, record: &CanonicalRecord) -> Result<(), InvariantError> {
        if let Some(orphan) = record
            .forced_skill_positions
            .keys()
            .find(|id| !record.skills.contains(id))
        {
            return Err(InvariantError::Violated(format!(
                "forced position for inactive skill {orphan}"
            )));
        }
        if !record.outfit_id.is_empty() {
            let unique = derive_unique_skill_id(&record.outfit_id)?;
            if !record.skills.contains(&unique) {
                return Err(InvariantError::Violated(format!(
                    "outfit {} without its unique skill {unique}",
                    record.outfit_id
                )));
            }
        }
        if record.skills.contains(RUNAWAY_SKILL_ID) && record.strategy != Strategy::Oonige {
            return Err(InvariantError::Violated(format!(
                "runaway skill with strategy {}",
                record.strategy
            )));
        }
        let mut groups: Vec<String> = record
            .skills
            .ids()
            .map(|id| self.catalog.group_id(id))
            .collect();
        groups.sort();
        if groups.windows(2).any(|w| w[0] == w[1]) {
            return Err(InvariantError::Violated(
                "two skills share a group".to_string(),
            ));
        }
        Ok(())
    }
}

fn prune_forced_positions(record: &mut CanonicalRecord) {
    let skills = &record.skills;
    record
        .forced_skill_positions
        .retain(|id, _| skills.contains(id));
}

fn parse_or_default<T: std::str::FromStr<Err = String>>(field: &str, raw: &str, default: T) -> T {
    match raw.trim().parse() {
        Ok(v) => v,
        Err(e) => {
            warn!("ignoring {field} from vision model: {e}");
            default
        }
    }
}
