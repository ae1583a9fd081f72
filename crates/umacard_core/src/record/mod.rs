mod skill_set;
mod validate;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use skill_set::SkillSet;
pub use validate::{InvalidRecord, validate};

pub const STAT_MIN: i32 = 1;
pub const STAT_MAX: i32 = 2000;
pub const MOOD_MIN: i8 = -2;
pub const MOOD_MAX: i8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    Nige,
    Senkou,
    Sasi,
    Oikomi,
    Oonige,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Self::Nige,
        Self::Senkou,
        Self::Sasi,
        Self::Oikomi,
        Self::Oonige,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nige => "Nige",
            Self::Senkou => "Senkou",
            Self::Sasi => "Sasi",
            Self::Oikomi => "Oikomi",
            Self::Oonige => "Oonige",
        }
    }

    /// English running-style label shown in the game client.
    pub fn english_label(&self) -> &'static str {
        match self {
            Self::Nige => "Front Runner",
            Self::Senkou => "Pace Chaser",
            Self::Sasi => "Late Surger",
            Self::Oikomi => "End Closer",
            Self::Oonige => "Runaway",
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown strategy {s:?}"))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Aptitude {
    S,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Aptitude {
    pub const ALL: [Aptitude; 8] = [
        Self::S,
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
        }
    }
}

impl FromStr for Aptitude {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown aptitude grade {s:?}"))
    }
}

impl fmt::Display for Aptitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Speed,
    Stamina,
    Power,
    Guts,
    Wisdom,
}

impl Stat {
    pub const ALL: [Stat; 5] = [
        Self::Speed,
        Self::Stamina,
        Self::Power,
        Self::Guts,
        Self::Wisdom,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Stamina => "stamina",
            Self::Power => "power",
            Self::Guts => "guts",
            Self::Wisdom => "wisdom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AptitudeKind {
    Surface,
    Distance,
    Strategy,
}

/// The validated character build every import path converges on.
///
/// Serialize-only: untrusted input becomes a record through [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub outfit_id: String,
    pub speed: i32,
    pub stamina: i32,
    pub power: i32,
    pub guts: i32,
    pub wisdom: i32,
    pub strategy: Strategy,
    pub distance_aptitude: Aptitude,
    pub surface_aptitude: Aptitude,
    pub strategy_aptitude: Aptitude,
    pub mood: i8,
    pub skills: SkillSet,
    pub forced_skill_positions: BTreeMap<String, f64>,
}

impl Default for CanonicalRecord {
    fn default() -> Self {
        Self {
            outfit_id: String::new(),
            speed: 1200,
            stamina: 1200,
            power: 800,
            guts: 400,
            wisdom: 400,
            strategy: Strategy::Senkou,
            distance_aptitude: Aptitude::S,
            surface_aptitude: Aptitude::A,
            strategy_aptitude: Aptitude::A,
            mood: MOOD_MAX,
            skills: SkillSet::new(),
            forced_skill_positions: BTreeMap::new(),
        }
    }
}

impl CanonicalRecord {
    pub fn stat(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Speed => self.speed,
            Stat::Stamina => self.stamina,
            Stat::Power => self.power,
            Stat::Guts => self.guts,
            Stat::Wisdom => self.wisdom,
        }
    }

    pub fn stat_mut(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Speed => &mut self.speed,
            Stat::Stamina => &mut self.stamina,
            Stat::Power => &mut self.power,
            Stat::Guts => &mut self.guts,
            Stat::Wisdom => &mut self.wisdom,
        }
    }

    pub fn aptitude(&self, kind: AptitudeKind) -> Aptitude {
        match kind {
            AptitudeKind::Surface => self.surface_aptitude,
            AptitudeKind::Distance => self.distance_aptitude,
            AptitudeKind::Strategy => self.strategy_aptitude,
        }
    }

    pub fn aptitude_mut(&mut self, kind: AptitudeKind) -> &mut Aptitude {
        match kind {
            AptitudeKind::Surface => &mut self.surface_aptitude,
            AptitudeKind::Distance => &mut self.distance_aptitude,
            AptitudeKind::Strategy => &mut self.strategy_aptitude,
        }
    }

    /// Stats outside `[STAT_MIN, STAT_MAX]`; imports keep them, callers may warn.
    pub fn out_of_domain_stats(&self) -> Vec<(Stat, i32)> {
        Stat::ALL
            .into_iter()
            .map(|s| (s, self.stat(s)))
            .filter(|(_, v)| !(STAT_MIN..=STAT_MAX).contains(v))
            .collect()
    }
}

/// Outfit ids are ASCII digit strings: a four digit character id followed by a two digit variant.
pub fn is_well_formed_outfit_id(outfit_id: &str) -> bool {
    outfit_id.len() >= 4 && outfit_id.bytes().all(|b| b.is_ascii_digit())
}
