use std::fmt::Write as _;

use serde_json::{Map as JsonMap, Value as JsonValue};
use umacard_core::core_api::Corpus;
use umacard_core::layout::FileLayout;
use umacard_core::png::{CARD_KEYWORD, Chunk, TEXT};
use umacard_core::record::{CanonicalRecord, Stat};

const SHEET_WIDTH: usize = 60;
const STAT_LABEL_WIDTH: usize = 9;
const SKILL_ID_WIDTH: usize = 10;
const SKILL_NAME_WIDTH: usize = 34;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// Exactly the import/export field set.
    #[default]
    Canonical,
    /// Canonical fields plus character and skill details looked up in the corpus.
    Annotated,
}

pub fn render_json(record: &CanonicalRecord, corpus: &Corpus, style: JsonStyle) -> JsonValue {
    let mut out = canonical_json(record, corpus);
    if style == JsonStyle::Annotated {
        out.insert("character".to_string(), character_to_json(record, corpus));
        out.insert("skillDetails".to_string(), skill_details_to_json(record, corpus));
    }
    JsonValue::Object(out)
}

fn canonical_json(record: &CanonicalRecord, corpus: &Corpus) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert(
        "outfitId".to_string(),
        JsonValue::String(record.outfit_id.clone()),
    );
    for stat in Stat::ALL {
        out.insert(stat.key().to_string(), JsonValue::from(record.stat(stat)));
    }
    out.insert(
        "strategy".to_string(),
        JsonValue::String(record.strategy.to_string()),
    );
    out.insert(
        "distanceAptitude".to_string(),
        JsonValue::String(record.distance_aptitude.to_string()),
    );
    out.insert(
        "surfaceAptitude".to_string(),
        JsonValue::String(record.surface_aptitude.to_string()),
    );
    out.insert(
        "strategyAptitude".to_string(),
        JsonValue::String(record.strategy_aptitude.to_string()),
    );
    out.insert("mood".to_string(), JsonValue::from(record.mood));
    out.insert(
        "skills".to_string(),
        JsonValue::Array(
            corpus
                .skills
                .sort_for_display(record.skills.ids())
                .into_iter()
                .map(|id| JsonValue::String(id.to_string()))
                .collect(),
        ),
    );
    out.insert(
        "forcedSkillPositions".to_string(),
        JsonValue::Object(
            record
                .forced_skill_positions
                .iter()
                .map(|(id, pos)| (id.clone(), JsonValue::from(*pos)))
                .collect(),
        ),
    );
    out
}

fn character_to_json(record: &CanonicalRecord, corpus: &Corpus) -> JsonValue {
    if record.outfit_id.is_empty() {
        return JsonValue::Null;
    }
    let mut m = JsonMap::new();
    m.insert(
        "name".to_string(),
        optional_string(corpus.outfits.character_name(&record.outfit_id)),
    );
    m.insert(
        "epithet".to_string(),
        optional_string(corpus.outfits.epithet(&record.outfit_id)),
    );
    JsonValue::Object(m)
}

fn skill_details_to_json(record: &CanonicalRecord, corpus: &Corpus) -> JsonValue {
    JsonValue::Array(
        corpus
            .skills
            .sort_for_display(record.skills.ids())
            .into_iter()
            .map(|id| {
                let mut m = JsonMap::new();
                m.insert("id".to_string(), JsonValue::String(id.to_string()));
                m.insert(
                    "name".to_string(),
                    optional_string(corpus.skill_display_name(id)),
                );
                m.insert(
                    "rarity".to_string(),
                    corpus
                        .skills
                        .rarity(id)
                        .map(JsonValue::from)
                        .unwrap_or(JsonValue::Null),
                );
                if let Some(pos) = record.forced_skill_positions.get(id) {
                    m.insert("forcedPosition".to_string(), JsonValue::from(*pos));
                }
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn optional_string(value: Option<&str>) -> JsonValue {
    value
        .map(|s| JsonValue::String(s.to_string()))
        .unwrap_or(JsonValue::Null)
}

pub fn mood_label(mood: i8) -> &'static str {
    match mood {
        2 => "Great",
        1 => "Good",
        0 => "Normal",
        -1 => "Bad",
        -2 => "Awful",
        _ => "Unknown",
    }
}

fn stat_label(stat: Stat) -> &'static str {
    match stat {
        Stat::Speed => "Speed",
        Stat::Stamina => "Stamina",
        Stat::Power => "Power",
        Stat::Guts => "Guts",
        Stat::Wisdom => "Wit",
    }
}

/// Forced positions are whole meters in practice; keep fractions when present.
fn format_position(pos: f64) -> String {
    if pos.fract() == 0.0 {
        format!("{pos:.0}m")
    } else {
        format!("{pos}m")
    }
}

pub fn render_sheet(record: &CanonicalRecord, corpus: &Corpus) -> String {
    let mut out = String::new();

    let name = if record.outfit_id.is_empty() {
        "(no character)"
    } else {
        corpus
            .outfits
            .character_name(&record.outfit_id)
            .unwrap_or("(unknown character)")
    };
    writeln!(&mut out, "{name}").expect("writing to String cannot fail");
    if !record.outfit_id.is_empty() {
        let epithet = corpus.outfits.epithet(&record.outfit_id).unwrap_or("?");
        writeln!(&mut out, "{epithet}  (outfit {})", record.outfit_id)
            .expect("writing to String cannot fail");
    }
    writeln!(&mut out, "{}", "-".repeat(SHEET_WIDTH)).expect("writing to String cannot fail");

    for stat in Stat::ALL {
        writeln!(
            &mut out,
            "  {:<width$}{:>5}",
            stat_label(stat),
            record.stat(stat),
            width = STAT_LABEL_WIDTH
        )
        .expect("writing to String cannot fail");
    }
    writeln!(&mut out).expect("writing to String cannot fail");

    writeln!(
        &mut out,
        "  Strategy: {} ({})",
        record.strategy,
        record.strategy.english_label()
    )
    .expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "  Aptitude: Surface {}  Distance {}  Strategy {}",
        record.surface_aptitude, record.distance_aptitude, record.strategy_aptitude
    )
    .expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "  Mood:     {} ({:+})",
        mood_label(record.mood),
        record.mood
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    writeln!(&mut out, "Skills ({})", record.skills.len()).expect("writing to String cannot fail");
    if record.skills.is_empty() {
        writeln!(&mut out, "  (none)").expect("writing to String cannot fail");
    }
    for id in corpus.skills.sort_for_display(record.skills.ids()) {
        let skill_name = corpus.skill_display_name(id).unwrap_or("?");
        let line = match record.forced_skill_positions.get(id) {
            Some(&pos) => format!(
                "  {:<id_w$}{:<name_w$}@ {}",
                id,
                skill_name,
                format_position(pos),
                id_w = SKILL_ID_WIDTH,
                name_w = SKILL_NAME_WIDTH
            ),
            None => format!("  {:<id_w$}{}", id, skill_name, id_w = SKILL_ID_WIDTH),
        };
        writeln!(&mut out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }

    out
}

/// Extra detail for `tEXt` chunks.
fn chunk_note(chunk: &Chunk<'_>) -> String {
    if chunk.kind != TEXT {
        return String::new();
    }
    let (keyword, text) = chunk.text_parts();
    let keyword = String::from_utf8_lossy(keyword);
    if keyword == CARD_KEYWORD {
        format!("card payload, {} bytes", text.len())
    } else {
        format!("keyword {keyword:?}")
    }
}

pub fn render_chunk_listing(chunks: &[Chunk<'_>], layout: &FileLayout) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "{:<6}{:>10}{:>10}  {:<4}  note",
        "type", "offset", "length", "crc"
    )
    .expect("writing to String cannot fail");
    for chunk in chunks {
        let line = format!(
            "{:<6}{:>10}{:>10}  {:<4}  {}",
            chunk.kind_str(),
            chunk.range.start,
            chunk.data.len(),
            if chunk.crc_ok() { "ok" } else { "BAD" },
            chunk_note(chunk)
        );
        writeln!(&mut out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
    if let Some(trailing) = layout.trailing() {
        writeln!(
            &mut out,
            "{} trailing bytes after IEND",
            trailing.range.len()
        )
        .expect("writing to String cannot fail");
    }
    out
}

pub fn render_chunks_json(chunks: &[Chunk<'_>], layout: &FileLayout) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("fileLength".to_string(), JsonValue::from(layout.file_len));
    out.insert(
        "trailingBytes".to_string(),
        JsonValue::from(layout.trailing().map(|s| s.range.len()).unwrap_or(0)),
    );
    out.insert(
        "chunks".to_string(),
        JsonValue::Array(
            chunks
                .iter()
                .map(|chunk| {
                    let mut m = JsonMap::new();
                    m.insert("type".to_string(), JsonValue::String(chunk.kind_str()));
                    m.insert("offset".to_string(), JsonValue::from(chunk.range.start));
                    m.insert("length".to_string(), JsonValue::from(chunk.data.len()));
                    m.insert("crcOk".to_string(), JsonValue::Bool(chunk.crc_ok()));
                    if chunk.kind == TEXT {
                        let (keyword, _) = chunk.text_parts();
                        m.insert(
                            "keyword".to_string(),
                            JsonValue::String(String::from_utf8_lossy(keyword).into_owned()),
                        );
                    }
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    );
    JsonValue::Object(out)
}
