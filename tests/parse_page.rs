use std::fs;
use std::path::PathBuf;

use racecard::data::{columns, read_document, split_pages, write_csv, write_json};
use racecard::{JockeyStrategy, MeetingDate, ParserConfig, RaceCardParser, StarterRecord};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn meeting() -> MeetingDate {
    "2026-02-01".parse().expect("valid meeting date")
}

fn parse_fixture(parser: &RaceCardParser) -> Vec<StarterRecord> {
    let text = read_document(&fixture_path("race_card.txt")).expect("fixture should be readable");
    let pages = split_pages(&text);
    parser.parse_document(&pages, &meeting())
}

#[test]
fn splits_fixture_into_pages() {
    let text = read_document(&fixture_path("race_card.txt")).unwrap();
    let pages = split_pages(&text);
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0][0], "01.02.2026 - Dortmund Rennen # 3");
    assert_eq!(pages[1], vec!["Wettstar Service", "Seite 2"]);
}

#[test]
fn parses_all_starters_in_page_order() {
    let starters = parse_fixture(&RaceCardParser::new());
    assert_eq!(starters.len(), 3);

    let names: Vec<&str> = starters.iter().map(|s| s.horse_name.as_str()).collect();
    assert_eq!(names, vec!["Testhorse", "Beautiful Dawn", "Nordlicht"]);
    assert_eq!(starters[0].race.race_nr, 3);
    assert_eq!(starters[2].race.race_nr, 4);
    assert_eq!(starters[2].race.race_name, "Großer Preis");
    assert_eq!(starters[2].field_size, 1);
}

#[test]
fn single_line_block_fields() {
    let starters = parse_fixture(&RaceCardParser::new());
    let s = &starters[0];

    assert_eq!(s.start_nr, 1);
    assert_eq!(s.field_size, 2);
    assert_eq!(s.race.venue, "Dortmund");
    assert_eq!(s.race.distance_m, Some(1600));
    assert_eq!(s.race.prize_eur, Some(5100));
    assert_eq!(s.race.surface, "Sand");
    assert_eq!(s.race.race_time, "13:45");

    assert_eq!(s.current.starts, 10);
    assert_eq!(s.previous.starts, 6);
    assert_eq!(s.previous.win_pct(), 0.1667);
    assert_eq!(s.career.total_starts, 16);
    assert_eq!(s.career.career_roi_approx, 1137.5);

    assert_eq!(s.pedigree.age, Some(4));
    assert_eq!(s.pedigree.sire.as_deref(), Some("Sea The Moon"));
    assert_eq!(s.connections.trainer, "Markus Klug");
    assert_eq!(s.connections.breeder, "Gestüt Röttgen");
    assert_eq!(s.connections.weight_kg, Some(58.0));

    assert_eq!(s.wagering.ml_odds, Some(12.5));
    assert_eq!(s.wagering.box_nr, Some(50));

    // Today's form line supplies the jockey and is not a history slot
    assert_eq!(s.jockey, "Anna Schmidt");
    assert_eq!(s.form.len(), 2);
    assert_eq!(s.form[0].date, "15.01");
    assert_eq!(s.form[1].venue, "Neuss");

    let f = &s.features;
    assert_eq!(f.days_since_last_run, Some(17));
    assert_eq!(f.avg_place_last5, Some(2.5));
    assert_eq!(f.distance_diff_m, Some(-200));
    assert_eq!(f.weight_diff_kg, Some(-0.5));
    assert_eq!(f.venue_repeat, 1);
    assert_eq!(f.jockey_change, Some(1));
    assert_eq!(f.trainer_jockey_combo, "Markus Klug|Anna Schmidt");
}

#[test]
fn wrapped_block_fields() {
    let starters = parse_fixture(&RaceCardParser::new());
    let s = &starters[1];

    assert_eq!(s.start_nr, 2);
    assert_eq!(s.horse_name, "Beautiful Dawn");
    assert_eq!(s.current.starts, 0);
    assert_eq!(s.pedigree.gender.as_deref(), Some("S"));
    assert_eq!(s.connections.weight_kg, Some(57.5));

    assert_eq!(s.wagering.ml_odds, Some(8.0));
    assert_eq!(s.wagering.box_nr, Some(3));
    assert_eq!(s.jockey, "Lukas Delozier");

    assert_eq!(s.features.days_since_last_run, Some(43));
    assert_eq!(s.features.jockey_change, Some(0));
    assert_eq!(s.features.distance_diff_m, Some(-400));
    assert_eq!(s.features.weight_diff_kg, Some(0.5));
    assert_eq!(s.features.venue_repeat, 0);
}

#[test]
fn starter_without_history() {
    let starters = parse_fixture(&RaceCardParser::new());
    let s = &starters[2];

    assert_eq!(s.wagering.box_nr, Some(71));
    assert_eq!(s.wagering.ml_odds, Some(4.2));
    assert_eq!(s.jockey, "Esentur Turganaaly Uulu");
    assert!(s.form.is_empty());
    assert_eq!(s.features.days_since_last_run, None);
    assert_eq!(s.features.avg_place_last5, None);
    assert_eq!(s.features.jockey_change, None);
}

#[test]
fn jockey_strategy_is_configurable() {
    let config = ParserConfig {
        jockey_strategy: JockeyStrategy::CommaThreeToken,
        ..ParserConfig::default()
    };
    let starters = parse_fixture(&RaceCardParser::with_config(config));

    assert_eq!(starters[0].form[0].jockey, "Bauyrzhan Murzabayev Horse");
    assert_eq!(starters[0].form[1].jockey, "Max Meier Horse");
}

#[test]
fn parsing_is_idempotent() {
    let parser = RaceCardParser::new();
    assert_eq!(parse_fixture(&parser), parse_fixture(&parser));
}

#[test]
fn exports_fixed_columns() {
    let starters = parse_fixture(&RaceCardParser::new());
    let cols = columns(ParserConfig::default().years);
    for s in &starters {
        assert_eq!(s.to_row().len(), cols.len());
    }

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("horse_starters_2026-02-01.csv");
    write_csv(&csv_path, ParserConfig::default().years, &starters).unwrap();

    let csv = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert_eq!(csv.lines().next().unwrap(), cols.join(","));

    let json_path = dir.path().join("horse_starters_2026-02-01.json");
    write_json(&json_path, &starters).unwrap();
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(3));
}
