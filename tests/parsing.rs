use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use sports_analyser::model::{HalfTimeScore, Sport};
use sports_analyser::parser::{SkipReason, TextParser};
use sports_analyser::teams::TeamAliases;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn monday_noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 10)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid clock")
}

#[test]
fn parses_mixed_results_fixture() {
    let aliases = TeamAliases::default();
    let parser = TextParser::at(&aliases, monday_noon());
    let report = parser.parse_results(&read_fixture("results_mixed.txt"), Sport::Football);

    assert_eq!(report.accepted.len(), 4);
    let csv = &report.accepted[0];
    assert_eq!((csv.home_team.as_str(), csv.away_team.as_str()), ("PSG", "OM"));
    assert_eq!((csv.score_home, csv.score_away), (3, 1));
    assert_eq!(csv.date, "2024-01-25");
    assert_eq!(csv.league.as_deref(), Some("Ligue 1"));

    let scoreboard = &report.accepted[1];
    assert_eq!(scoreboard.score_ht, Some(HalfTimeScore { home: 1, away: 0 }));
    assert_eq!(scoreboard.date, "2025-03-10T12:00:00");

    let casual = &report.accepted[2];
    assert_eq!((casual.home_team.as_str(), casual.away_team.as_str()), ("Lens", "Lille"));

    let block = &report.accepted[3];
    assert_eq!(block.home_team, "Monaco");
    assert_eq!(block.away_team, "Rennes");
    assert_eq!(block.date, "2025-01-12T20:45:00");
    assert_eq!((block.score_home, block.score_away), (2, 0));

    let reasons = report.skipped.iter().map(|s| s.reason).collect::<Vec<_>>();
    assert_eq!(reasons, vec![SkipReason::Unrecognized, SkipReason::InvalidScore]);
    assert_eq!(report.skipped[1].line, "Nantes,Brest,x,1");
}

#[test]
fn parses_mixed_upcoming_fixture() {
    let aliases = TeamAliases::default();
    let parser = TextParser::at(&aliases, monday_noon());
    let report = parser.parse_upcoming(&read_fixture("upcoming_mixed.txt"), Sport::Football);

    let summary = report
        .accepted
        .iter()
        .map(|m| (m.home_team.as_str(), m.away_team.as_str(), m.date.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            ("PSG", "OM", "2025-03-12T21:00:00"),
            ("Lens", "Lille", "2025-03-15T20:00:00"),
            ("Monaco", "Nice", "2025-03-11T20:00:00"),
            ("Rennes", "Lyon", "2025-03-10T18:30:00"),
        ]
    );

    let odds = report.accepted[0]
        .odds
        .as_ref()
        .and_then(|o| o.match_result)
        .expect("odds line should carry 1X2 odds");
    assert_eq!((odds.home, odds.draw, odds.away), (1.65, 3.8, 5.2));
    assert!(report.accepted[1..].iter().all(|m| m.odds.is_none()));

    let reasons = report.skipped.iter().map(|s| s.reason).collect::<Vec<_>>();
    assert_eq!(reasons, vec![SkipReason::InvalidDate, SkipReason::Unrecognized]);
}

#[test]
fn every_record_gets_a_fresh_id() {
    let aliases = TeamAliases::default();
    let parser = TextParser::at(&aliases, monday_noon());
    let report = parser.parse_results("PSG,OM,1,0\nPSG,OM,1,0", Sport::Football);
    assert_eq!(report.accepted.len(), 2);
    assert_ne!(report.accepted[0].id, report.accepted[1].id);
}

#[test]
fn custom_aliases_apply_while_parsing() {
    let mut aliases = TeamAliases::default();
    aliases.insert("les phocéens", "OM");
    let parser = TextParser::at(&aliases, monday_noon());
    let report = parser.parse_results("PSG vs Les Phocéens 2-0", Sport::Football);
    assert_eq!(report.accepted[0].away_team, "OM");
}

#[test]
fn skip_reasons_serialize_in_kebab_case() {
    let aliases = TeamAliases::default();
    let parser = TextParser::at(&aliases, monday_noon());
    let report = parser.parse_results("PSG,OM,two,0", Sport::Football);
    let json = serde_json::to_value(&report.skipped).expect("skipped lines serialize");
    assert_eq!(json[0]["reason"], "invalid-score");
    assert_eq!(json[0]["line"], "PSG,OM,two,0");
}
