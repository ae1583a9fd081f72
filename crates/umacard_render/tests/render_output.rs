use std::path::PathBuf;

use umacard_core::core_api::Engine;
use umacard_core::png::{self, Chunks};
use umacard_core::record::CanonicalRecord;
use umacard_render::{
    JsonStyle, mood_label, render_chunk_listing, render_chunks_json, render_json, render_sheet,
};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn engine() -> Engine {
    Engine::load_from_dir(&workspace_root().join("tests/fixtures/corpus"))
        .expect("fixture corpus should load")
}

fn fixture_bytes(name: &str) -> Vec<u8> {
    std::fs::read(workspace_root().join("tests/fixtures").join(name))
        .expect("fixture should be readable")
}

fn fixture_record(engine: &Engine) -> CanonicalRecord {
    engine
        .open_bytes(fixture_bytes("horse.json"), None)
        .expect("fixture should import")
}

#[test]
fn canonical_json_uses_wire_key_order() {
    let engine = engine();
    let record = fixture_record(&engine);
    let value = render_json(&record, engine.corpus(), JsonStyle::Canonical);
    let keys: Vec<&str> = value
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect();

    assert_eq!(
        keys,
        vec![
            "outfitId",
            "speed",
            "stamina",
            "power",
            "guts",
            "wisdom",
            "strategy",
            "distanceAptitude",
            "surfaceAptitude",
            "strategyAptitude",
            "mood",
            "skills",
            "forcedSkillPositions",
        ]
    );
}

#[test]
fn canonical_json_lists_skills_in_display_order() {
    let engine = engine();
    let record = fixture_record(&engine);
    let value = render_json(&record, engine.corpus(), JsonStyle::Canonical);

    let skills: Vec<&str> = value["skills"]
        .as_array()
        .expect("skills array")
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(skills, vec!["100011", "200011", "201011", "300011"]);
    assert_eq!(value["forcedSkillPositions"]["200011"], 850.0);
}

#[test]
fn canonical_json_reimports_to_same_record() {
    let engine = engine();
    let record = fixture_record(&engine);
    let value = render_json(&record, engine.corpus(), JsonStyle::Canonical);

    let again = engine.import_json_value(&value).expect("re-import");
    assert_eq!(again, record);
}

#[test]
fn annotated_json_adds_corpus_details() {
    let engine = engine();
    let record = fixture_record(&engine);
    let value = render_json(&record, engine.corpus(), JsonStyle::Annotated);

    assert_eq!(value["character"]["name"], "Special Week");
    assert_eq!(value["character"]["epithet"], "[Special Dreamer]");

    let details = value["skillDetails"].as_array().expect("details");
    assert_eq!(details.len(), 4);
    assert_eq!(details[0]["name"], "Shooting Star");
    assert_eq!(details[0]["rarity"], 4);
    assert_eq!(details[1]["forcedPosition"], 850.0);
    assert!(details[0].get("forcedPosition").is_none());
}

#[test]
fn annotated_json_without_outfit_has_null_character() {
    let engine = engine();
    let value = render_json(
        &CanonicalRecord::default(),
        engine.corpus(),
        JsonStyle::Annotated,
    );
    assert!(value["character"].is_null());
    assert_eq!(value["skillDetails"].as_array().map(Vec::len), Some(0));
}

#[test]
fn sheet_shows_character_stats_and_skills() {
    let engine = engine();
    let record = fixture_record(&engine);
    let sheet = render_sheet(&record, engine.corpus());
    let lines: Vec<&str> = sheet.lines().collect();

    assert_eq!(lines[0], "Special Week");
    assert_eq!(lines[1], "[Special Dreamer]  (outfit 100101)");
    assert!(lines.contains(&"  Speed     1450"));
    assert!(lines.contains(&"  Wit        610"));
    assert!(lines.contains(&"  Strategy: Senkou (Pace Chaser)"));
    assert!(lines.contains(&"  Mood:     Good (+1)"));
    assert!(lines.contains(&"Skills (4)"));
    assert!(lines.contains(&"  100011    Shooting Star"));
    assert!(
        lines
            .iter()
            .any(|l| l.starts_with("  200011    Right-Handed ○") && l.ends_with("@ 850m"))
    );
}

#[test]
fn sheet_for_empty_record() {
    let engine = engine();
    let sheet = render_sheet(&CanonicalRecord::default(), engine.corpus());

    assert!(sheet.starts_with("(no character)\n"));
    assert!(sheet.contains("Skills (0)\n  (none)\n"));
}

#[test]
fn mood_labels_cover_range() {
    assert_eq!(mood_label(2), "Great");
    assert_eq!(mood_label(0), "Normal");
    assert_eq!(mood_label(-2), "Awful");
}

#[test]
fn chunk_listing_marks_card_payload() {
    let portrait = fixture_bytes("portrait.png");
    let card = png::embed_text(&portrait, "{}").expect("embed");
    let chunks: Vec<_> = Chunks::new(&card)
        .expect("png")
        .collect::<Result<_, _>>()
        .expect("chunks");

    let layout = png::scan_layout(&card).expect("layout");
    let listing = render_chunk_listing(&chunks, &layout);
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("type"));
    assert!(lines[3].starts_with("tEXt"));
    assert!(lines[3].ends_with("card payload, 2 bytes"));
    assert!(lines[4].starts_with("IEND"));

    let value = render_chunks_json(&chunks, &layout);
    assert_eq!(value["fileLength"], card.len());
    assert_eq!(value["trailingBytes"], 0);
    assert_eq!(value["chunks"][2]["keyword"], "UmaCard");
    assert_eq!(value["chunks"][2]["crcOk"], true);
    assert_eq!(value["chunks"][3]["offset"], portrait.len() - 12 + 22);
}

#[test]
fn chunk_listing_reports_trailing_bytes() {
    let mut image = fixture_bytes("portrait.png");
    image.extend_from_slice(b"junk");
    let chunks: Vec<_> = Chunks::new(&image)
        .expect("png")
        .collect::<Result<_, _>>()
        .expect("chunks");
    let layout = png::scan_layout(&image).expect("layout");

    let listing = render_chunk_listing(&chunks, &layout);
    assert_eq!(listing.lines().last(), Some("4 trailing bytes after IEND"));
    assert_eq!(render_chunks_json(&chunks, &layout)["trailingBytes"], 4);
}
