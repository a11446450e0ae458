use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use sports_analyser::h2h::analyze_h2h;
use sports_analyser::model::{Dominance, Match, Sport};
use sports_analyser::parser::TextParser;
use sports_analyser::team_stats::compute_team_stats;
use sports_analyser::teams::TeamAliases;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn season() -> Vec<Match> {
    let aliases = TeamAliases::default();
    let now = NaiveDate::from_ymd_opt(2025, 3, 10)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid clock");
    let report =
        TextParser::at(&aliases, now).parse_results(&read_fixture("season.csv"), Sport::Football);
    assert!(report.skipped.is_empty(), "season fixture should parse cleanly");
    report.accepted
}

#[test]
fn splits_and_totals_agree_for_every_team() {
    let matches = season();
    for team in ["PSG", "OM", "Lens", "Rennes", "Lille", "Monaco", "Nice", "Lyon"] {
        let stats = compute_team_stats(team, &matches, Sport::Football);
        let overall = &stats.overall;
        assert_eq!(
            overall.wins + overall.draws + overall.losses,
            overall.matches_played,
            "{team}"
        );
        assert_eq!(
            stats.home.matches_played + stats.away.matches_played,
            overall.matches_played,
            "{team}"
        );
        assert_eq!(stats.home.goals_for + stats.away.goals_for, overall.goals_for);

        let form5 = stats.form_last5.split('-').filter(|s| !s.is_empty()).count();
        assert_eq!(form5, overall.matches_played.min(5), "{team}");
        assert!(stats.form_last10.starts_with(&stats.form_last5), "{team}");
    }
}

#[test]
fn psg_season_profile() {
    let stats = compute_team_stats("PSG", &season(), Sport::Football);
    assert_eq!(stats.overall.matches_played, 6);
    assert_eq!(stats.home.wins, 5);
    assert_eq!(stats.home.win_rate(), 100.0);
    assert_eq!(stats.form_last5, "W-W-W-W-W");
    assert_eq!(stats.recent_trends.win_streak, 6);
    assert_eq!(stats.recent_trends.clean_sheet_streak, 1);
    assert!((stats.home.avg_goals_for - 2.8).abs() < 1e-9);
}

#[test]
fn team_lookup_ignores_case() {
    let matches = season();
    let upper = compute_team_stats("OM", &matches, Sport::Football);
    let lower = compute_team_stats("om", &matches, Sport::Football);
    assert_eq!(upper.overall, lower.overall);
    assert_eq!(upper.away.matches_played, 5);
    assert_eq!(upper.away.wins, 0);
}

#[test]
fn head_to_head_from_season() {
    let h2h = analyze_h2h("PSG", "OM", &season());
    assert_eq!(h2h.last5_meetings.len(), 2);
    assert_eq!(h2h.last5_meetings[0].date, "2024-10-19");
    assert_eq!(h2h.team1_wins, 2);
    assert_eq!(h2h.dominance, Dominance::Team1);
    assert!((h2h.avg_goals_team1 - 2.5).abs() < 1e-9);
}
