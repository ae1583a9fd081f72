use umacard_core::ocr::{EXTRACTION_PROMPT, OcrError, parse_extraction_text};
use umacard_core::record::Stat;

#[test]
fn parses_plain_json_reply() {
    let text = r#"{"name":"Special Week","outfit":"[Special Dreamer]","speed":1200,
        "stamina":800,"power":900,"guts":300,"wisdom":400.5,"surfaceAptitude":"A",
        "distanceAptitude":"A","strategyAptitude":"S","strategy":"Sasi",
        "skills":["Shooting Star","Concentration"]}"#;
    let data = parse_extraction_text(text).expect("parse");

    assert_eq!(data.name, "Special Week");
    assert_eq!(data.outfit, "[Special Dreamer]");
    assert_eq!(data.stat(Stat::Wisdom), 400.5);
    assert_eq!(data.strategy, "Sasi");
    assert_eq!(data.skills, vec!["Shooting Star", "Concentration"]);
}

#[test]
fn strips_markdown_fences() {
    let fenced = "```json\n{\"speed\":1,\"stamina\":2,\"power\":3,\"guts\":4,\"wisdom\":5}\n```";
    let data = parse_extraction_text(fenced).expect("parse");
    assert_eq!(data.stat(Stat::Guts), 4.0);

    let bare = "```\n{\"speed\":1,\"stamina\":2,\"power\":3,\"guts\":4,\"wisdom\":5}\n```\n";
    assert!(parse_extraction_text(bare).is_ok());
}

#[test]
fn missing_strings_and_skills_default_to_empty() {
    let text = r#"{"speed":1,"stamina":2,"power":3,"guts":4,"wisdom":5}"#;
    let data = parse_extraction_text(text).expect("parse");

    assert_eq!(data.outfit, "");
    assert_eq!(data.strategy, "");
    assert!(data.skills.is_empty());
}

#[test]
fn non_numeric_stats_are_rejected() {
    let text = r#"{"speed":"fast","stamina":2,"power":3,"guts":4,"wisdom":5}"#;
    assert_eq!(
        parse_extraction_text(text),
        Err(OcrError::InvalidStats("speed"))
    );

    let text = r#"{"speed":1,"stamina":2,"power":3,"guts":4}"#;
    assert_eq!(
        parse_extraction_text(text),
        Err(OcrError::InvalidStats("wisdom"))
    );
}

#[test]
fn empty_and_non_json_replies_are_errors() {
    assert_eq!(parse_extraction_text("  \n"), Err(OcrError::EmptyResponse));
    assert!(matches!(
        parse_extraction_text("I could not read the image."),
        Err(OcrError::Json(_))
    ));
}

#[test]
fn prompt_names_every_stat_field() {
    for stat in Stat::ALL {
        assert!(EXTRACTION_PROMPT.contains(stat.key()), "{}", stat.key());
    }
    assert!(EXTRACTION_PROMPT.contains("skills"));
}
