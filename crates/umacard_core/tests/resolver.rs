use std::path::PathBuf;

use umacard_core::core_api::Corpus;
use umacard_core::resolver::{Resolver, normalize, normalize_epithet};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn load_corpus() -> Corpus {
    Corpus::load_from_dir(&workspace_root().join("tests/fixtures/corpus"))
        .unwrap_or_else(|e| panic!("failed to load fixture corpus: {e}"))
}

#[test]
fn normalize_ignores_case_spacing_and_punctuation() {
    assert_eq!(normalize("Special Week"), normalize(" special   week "));
    assert_eq!(normalize("Right-Handed ○"), "righthanded○");
    assert_eq!(normalize("「先頭の景色は譲らない…！」"), "先頭の景色は譲らない…");
    assert_eq!(normalize("  "), "");
}

#[test]
fn normalize_epithet_strips_decorations() {
    assert_eq!(normalize_epithet("[Hopp'n♪Happy Heart]"), "hopp'nhappyheart");
    assert_eq!(normalize_epithet("【Special Dreamer】"), "specialdreamer");
}

#[test]
fn skill_tables_skip_names_missing_from_catalog() {
    let corpus = load_corpus();
    let resolver = Resolver::new(&corpus);

    assert_eq!(resolver.resolve_skill_name("Phantom Skill"), None);
    assert_eq!(resolver.resolve_skill_name("まぼろし"), None);
}

#[test]
fn resolves_english_and_japanese_names() {
    let corpus = load_corpus();
    let resolver = Resolver::new(&corpus);

    assert_eq!(resolver.resolve_skill_name("Concentration"), Some("201011"));
    assert_eq!(resolver.resolve_skill_name("CONCENTRATION!"), Some("201011"));
    assert_eq!(resolver.resolve_skill_name("集中力"), Some("201011"));
    assert_eq!(resolver.resolve_skill_name("Right-Handed ◎"), Some("200012"));
}

#[test]
fn exact_match_wins_over_substring() {
    let corpus = load_corpus();
    let resolver = Resolver::new(&corpus);

    assert_eq!(resolver.resolve_skill_name("Shooting Star"), Some("100011"));
    assert_eq!(resolver.resolve_skill_name("Shooting Star Echo"), Some("900011"));
}

#[test]
fn substring_fallback_takes_first_entry_in_corpus_order() {
    let corpus = load_corpus();
    let resolver = Resolver::new(&corpus);

    assert_eq!(resolver.resolve_skill_name("Right-Handed"), Some("200011"));
    assert_eq!(resolver.resolve_skill_name("Corner"), Some("300011"));
    assert_eq!(
        resolver.resolve_skill_name("Professor of Curvature Lv3"),
        Some("400011")
    );
}

#[test]
fn unmatched_names_are_dropped() {
    let corpus = load_corpus();
    let resolver = Resolver::new(&corpus);

    let ids = resolver.resolve_skill_names(&["Concentration", "No Such Skill", "", "Runaway"]);
    assert_eq!(ids, vec!["201011", "202051"]);
}

#[test]
fn resolves_outfit_epithets() {
    let corpus = load_corpus();
    let resolver = Resolver::new(&corpus);

    assert_eq!(resolver.resolve_outfit_epithet("[Special Dreamer]"), "100101");
    assert_eq!(resolver.resolve_outfit_epithet("Hopp'n♪Happy Heart"), "100102");
    assert_eq!(resolver.resolve_outfit_epithet("innocent silence"), "100201");
    assert_eq!(resolver.resolve_outfit_epithet("Dreamer"), "100101");
}

#[test]
fn unknown_epithet_resolves_to_empty() {
    let corpus = load_corpus();
    let resolver = Resolver::new(&corpus);

    assert_eq!(resolver.resolve_outfit_epithet("[Nobody Here]"), "");
    assert_eq!(resolver.resolve_outfit_epithet(""), "");
    assert_eq!(resolver.resolve_outfit_epithet("[]"), "");
}

#[test]
fn table_sizes_reflect_corpus() {
    let corpus = load_corpus();
    let resolver = Resolver::new(&corpus);

    assert_eq!(resolver.epithet_count(), 3);
    assert!(resolver.skill_name_count() >= corpus.skills.len());
}
