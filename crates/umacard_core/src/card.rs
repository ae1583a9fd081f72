//! Uma cards: a portrait PNG with the horse record riding along in a `tEXt` chunk.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core_api::OutfitCatalog;
use crate::core_api::outfit_catalog::character_id;
use crate::png::{self, CodecError};
use crate::record::CanonicalRecord;

pub const CARD_VERSION: u32 = 1;

/// Portrait used when no character is selected.
pub const DEFAULT_PORTRAIT_OUTFIT: &str = "100101";

#[derive(Debug, Serialize)]
struct CardPayloadRef<'a> {
    version: u32,
    horse: &'a CanonicalRecord,
}

/// Decoded card envelope. `horse` is still untrusted and must go through validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CardPayload {
    pub version: Option<u64>,
    pub horse: JsonValue,
}

pub fn payload_text(record: &CanonicalRecord) -> Result<String, CodecError> {
    serde_json::to_string(&CardPayloadRef {
        version: CARD_VERSION,
        horse: record,
    })
    .map_err(|e| CodecError::PayloadCorrupt(format!("failed to serialize record: {e}")))
}

pub fn write_card(portrait_png: &[u8], record: &CanonicalRecord) -> Result<Vec<u8>, CodecError> {
    png::embed_text(portrait_png, &payload_text(record)?)
}

/// `Ok(None)` for an ordinary PNG without card data.
///
/// The version is reported but not checked; any version with a `horse` object is accepted.
pub fn read_card(png_bytes: &[u8]) -> Result<Option<CardPayload>, CodecError> {
    let Some(text) = png::extract_text(png_bytes)? else {
        return Ok(None);
    };
    parse_payload(&text).map(Some)
}

pub fn parse_payload(text: &str) -> Result<CardPayload, CodecError> {
    let value: JsonValue = serde_json::from_str(text)
        .map_err(|e| CodecError::PayloadCorrupt(format!("card text is not JSON: {e}")))?;
    let JsonValue::Object(mut obj) = value else {
        return Err(CodecError::PayloadCorrupt(
            "card payload is not a JSON object".to_string(),
        ));
    };
    let horse = match obj.remove("horse") {
        Some(horse @ JsonValue::Object(_)) => horse,
        _ => {
            return Err(CodecError::PayloadCorrupt(
                "card payload has no horse object".to_string(),
            ));
        }
    };
    Ok(CardPayload {
        version: obj.get("version").and_then(JsonValue::as_u64),
        horse,
    })
}

/// Icon file for an outfit's trained portrait, e.g. `trained_chr_icon_1001_100101_02.png`.
pub fn portrait_file_name(outfit_id: &str) -> String {
    let outfit_id = if outfit_id.is_empty() {
        DEFAULT_PORTRAIT_OUTFIT
    } else {
        outfit_id
    };
    format!(
        "trained_chr_icon_{}_{outfit_id}_02.png",
        character_id(outfit_id)
    )
}

/// Download name stem: the character's English name with spaces as underscores.
pub fn export_file_stem(record: &CanonicalRecord, outfits: &OutfitCatalog) -> String {
    let name = if record.outfit_id.is_empty() {
        None
    } else {
        outfits.character_name(&record.outfit_id)
    };
    match name {
        Some(name) => name.split_whitespace().collect::<Vec<_>>().join("_"),
        None => "horse".to_string(),
    }
}
