//! Shape of the text a vision model returns for a character screenshot.
//!
//! The network round trip lives outside this crate; callers hand over the model's
//! reply text and get typed fields back.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::record::Stat;

/// Instructions sent alongside the screenshot.
pub const EXTRACTION_PROMPT: &str = r#"Read this Uma Musume character screenshot and extract the horse's build.

Reply with ONLY one JSON object of exactly this shape (no markdown, no commentary):
{
  "name": "character name, e.g. 'El Condor Pasa'",
  "outfit": "outfit epithet including its brackets, e.g. '[El☆Número 1]'",
  "speed": <Speed stat as a number>,
  "stamina": <Stamina stat as a number>,
  "power": <Power stat as a number>,
  "guts": <Guts stat as a number>,
  "wisdom": <Wit stat as a number>,
  "surfaceAptitude": "<Turf grade: S, A, B, C, D, E, F or G>",
  "distanceAptitude": "<best grade among Sprint, Mile, Medium and Long>",
  "strategyAptitude": "<best grade among the Front, Pace, Late and End styles>",
  "strategy": "<style with that best grade: Nige, Senkou, Sasi or Oikomi>",
  "skills": ["skill name", ...]
}

Style names: Front / Front Runner = Nige, Pace / Pace Chaser = Senkou,
Late / Late Surger = Sasi, End / End Closer = Oikomi.

List every skill name visible on the Skills tab, without levels or icons."#;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OcrError {
    #[error("vision model returned no text")]
    EmptyResponse,
    #[error("vision model reply is not JSON: {0}")]
    Json(String),
    #[error("invalid stat values in vision model reply ({0} is not a number)")]
    InvalidStats(&'static str),
    #[error("unexpected vision model reply shape: {0}")]
    Shape(String),
}

/// Fields as the model reported them; strings are not yet checked against any enum.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrHorseData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub outfit: String,
    pub speed: f64,
    pub stamina: f64,
    pub power: f64,
    pub guts: f64,
    pub wisdom: f64,
    #[serde(default)]
    pub surface_aptitude: String,
    #[serde(default)]
    pub distance_aptitude: String,
    #[serde(default)]
    pub strategy_aptitude: String,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl OcrHorseData {
    pub fn stat(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Speed => self.speed,
            Stat::Stamina => self.stamina,
            Stat::Power => self.power,
            Stat::Guts => self.guts,
            Stat::Wisdom => self.wisdom,
        }
    }
}

/// Models sometimes wrap their JSON in a markdown fence.
fn strip_code_fence(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

pub fn parse_extraction_text(text: &str) -> Result<OcrHorseData, OcrError> {
    if text.trim().is_empty() {
        return Err(OcrError::EmptyResponse);
    }

    let value: JsonValue =
        serde_json::from_str(strip_code_fence(text)).map_err(|e| OcrError::Json(e.to_string()))?;

    for stat in Stat::ALL {
        if !value.get(stat.key()).is_some_and(JsonValue::is_number) {
            return Err(OcrError::InvalidStats(stat.key()));
        }
    }

    serde_json::from_value(value).map_err(|e| OcrError::Shape(e.to_string()))
}
