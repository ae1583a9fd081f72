use std::path::PathBuf;

use serde_json::{Value, json};
use umacard_core::core_api::Corpus;
use umacard_core::record::{Aptitude, CanonicalRecord, Strategy, validate};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn load_corpus() -> Corpus {
    Corpus::load_from_dir(&workspace_root().join("tests/fixtures/corpus"))
        .unwrap_or_else(|e| panic!("failed to load fixture corpus: {e}"))
}

fn base_blob() -> Value {
    json!({
        "outfitId": "100101",
        "speed": 1450,
        "stamina": 1100,
        "power": 950,
        "guts": 420,
        "wisdom": 610,
        "strategy": "Senkou",
        "distanceAptitude": "A",
        "surfaceAptitude": "A",
        "strategyAptitude": "S",
        "mood": 1,
        "skills": ["100011", "200011"],
        "forcedSkillPositions": {"200011": 850}
    })
}

fn with(mut blob: Value, key: &str, value: Value) -> Value {
    blob[key] = value;
    blob
}

fn without(mut blob: Value, key: &str) -> Value {
    blob.as_object_mut().expect("object").remove(key);
    blob
}

#[test]
fn accepts_well_formed_record() {
    let corpus = load_corpus();
    let record = validate(&base_blob(), &corpus.skills).expect("valid record");

    assert_eq!(record.outfit_id, "100101");
    assert_eq!(record.speed, 1450);
    assert_eq!(record.wisdom, 610);
    assert_eq!(record.strategy, Strategy::Senkou);
    assert_eq!(record.strategy_aptitude, Aptitude::S);
    assert_eq!(record.mood, 1);
    assert!(record.skills.contains("100011"));
    assert!(record.skills.contains("200011"));
    assert_eq!(record.forced_skill_positions.get("200011"), Some(&850.0));
}

#[test]
fn rejects_non_objects() {
    let corpus = load_corpus();
    for blob in [json!(null), json!([1, 2]), json!("horse"), json!(12)] {
        assert!(validate(&blob, &corpus.skills).is_err(), "{blob} accepted");
    }
}

#[test]
fn rejects_mood_out_of_range() {
    let corpus = load_corpus();
    let err = validate(&with(base_blob(), "mood", json!(3)), &corpus.skills)
        .expect_err("mood 3 must be rejected");
    assert!(err.reason.contains("mood"));

    assert!(validate(&with(base_blob(), "mood", json!(-3)), &corpus.skills).is_err());
    assert!(validate(&with(base_blob(), "mood", json!(-2)), &corpus.skills).is_ok());
}

#[test]
fn rejects_missing_or_mistyped_stats() {
    let corpus = load_corpus();
    assert!(validate(&without(base_blob(), "speed"), &corpus.skills).is_err());
    assert!(validate(&with(base_blob(), "guts", json!("420")), &corpus.skills).is_err());
    assert!(validate(&without(base_blob(), "mood"), &corpus.skills).is_err());
}

#[test]
fn rejects_unknown_enum_values() {
    let corpus = load_corpus();
    assert!(validate(&with(base_blob(), "strategy", json!("Front")), &corpus.skills).is_err());
    assert!(validate(&with(base_blob(), "surfaceAptitude", json!("H")), &corpus.skills).is_err());
    assert!(validate(&with(base_blob(), "distanceAptitude", json!(1)), &corpus.skills).is_err());
    assert!(validate(&without(base_blob(), "strategyAptitude"), &corpus.skills).is_err());
}

#[test]
fn rejects_non_array_skills() {
    let corpus = load_corpus();
    assert!(validate(&with(base_blob(), "skills", json!("100011")), &corpus.skills).is_err());
    assert!(validate(&without(base_blob(), "skills"), &corpus.skills).is_err());
}

#[test]
fn drops_unknown_skill_ids() {
    let corpus = load_corpus();
    let blob = with(
        base_blob(),
        "skills",
        json!(["100011", "999999", "200011", 42, "201011-1"]),
    );
    let record = validate(&blob, &corpus.skills).expect("valid record");

    let ids: Vec<&str> = record.skills.ids().collect();
    assert_eq!(ids.len(), 3);
    assert!(!record.skills.contains("999999"));
    assert!(record.skills.contains("201011-1"));
}

#[test]
fn same_group_skills_collapse_to_the_later_one() {
    let corpus = load_corpus();
    let blob = with(base_blob(), "skills", json!(["200011", "200012"]));
    let record = validate(&blob, &corpus.skills).expect("valid record");

    assert!(!record.skills.contains("200011"));
    assert!(record.skills.contains("200012"));
    assert_eq!(record.skills.len(), 1);
}

#[test]
fn outfit_id_may_be_absent_or_empty() {
    let corpus = load_corpus();
    let absent = validate(&without(base_blob(), "outfitId"), &corpus.skills).expect("absent");
    assert_eq!(absent.outfit_id, "");

    let empty = validate(&with(base_blob(), "outfitId", json!("")), &corpus.skills).expect("empty");
    assert_eq!(empty.outfit_id, "");
}

#[test]
fn rejects_malformed_outfit_id() {
    let corpus = load_corpus();
    assert!(validate(&with(base_blob(), "outfitId", json!("abc")), &corpus.skills).is_err());
    assert!(validate(&with(base_blob(), "outfitId", json!(100101)), &corpus.skills).is_err());
    assert!(validate(&with(base_blob(), "outfitId", json!("10")), &corpus.skills).is_err());
}

#[test]
fn accepts_legacy_forced_positions_key() {
    let corpus = load_corpus();
    let blob = with(
        without(base_blob(), "forcedSkillPositions"),
        "forcedPositions",
        json!({"200011": 1200.5, "100011": "fast", "201011": null}),
    );
    let record = validate(&blob, &corpus.skills).expect("valid record");

    assert_eq!(record.forced_skill_positions.len(), 1);
    assert_eq!(record.forced_skill_positions.get("200011"), Some(&1200.5));
}

#[test]
fn fractional_numbers_are_truncated() {
    let corpus = load_corpus();
    let blob = with(with(base_blob(), "speed", json!(1450.9)), "mood", json!(1.5));
    let record = validate(&blob, &corpus.skills).expect("valid record");

    assert_eq!(record.speed, 1450);
    assert_eq!(record.mood, 1);
}

#[test]
fn out_of_domain_stats_are_kept_and_reported() {
    let corpus = load_corpus();
    let blob = with(base_blob(), "speed", json!(2400));
    let record = validate(&blob, &corpus.skills).expect("valid record");

    assert_eq!(record.speed, 2400);
    let flagged = record.out_of_domain_stats();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].1, 2400);
}

#[test]
fn serialized_record_uses_wire_field_order() {
    let corpus = load_corpus();
    let record = validate(&base_blob(), &corpus.skills).expect("valid record");
    let text = serde_json::to_string(&record).expect("serialize");

    let keys: Vec<String> = serde_json::from_str::<serde_json::Map<String, Value>>(&text)
        .expect("object")
        .keys()
        .cloned()
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

    let reparsed: Value = serde_json::from_str(&text).expect("json");
    let again = validate(&reparsed, &corpus.skills).expect("re-validate");
    assert_eq!(again, record);
}

#[test]
fn default_record_is_valid() {
    let corpus = load_corpus();
    let value = serde_json::to_value(CanonicalRecord::default()).expect("serialize");
    let record = validate(&value, &corpus.skills).expect("valid record");
    assert_eq!(record, CanonicalRecord::default());
}
