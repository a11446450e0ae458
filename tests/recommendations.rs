use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use sports_analyser::config::AppConfig;
use sports_analyser::model::{BetType, BttsOdds, Match, MatchOdds, Odds, Sport, UpcomingMatch};
use sports_analyser::parser::TextParser;
use sports_analyser::persist::Store;
use sports_analyser::recommender::{
    Assessment, MatchContext, Recommender, ScoringStrategy, value_rating,
};
use sports_analyser::service::Analyser;
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

fn loaded(dir: &tempfile::TempDir) -> Analyser {
    let svc = Analyser::with_clock(Store::open(dir.path()), monday_noon());
    svc.add_results(&read_fixture("season.csv"), Sport::Football)
        .expect("season stores");
    svc.add_upcoming(&read_fixture("upcoming_mixed.txt"), Sport::Football)
        .expect("fixtures store");
    svc
}

#[test]
fn strong_home_side_tops_the_singles() {
    let dir = tempfile::tempdir().expect("tempdir");
    let resp = loaded(&dir).recommendations(Sport::Football);

    assert_eq!(resp.singles.len(), 4);
    let top = &resp.singles[0];
    assert_eq!(top.match_label, "PSG vs OM");
    assert_eq!(top.bet_type, BetType::MatchResult);
    assert_eq!(top.selection, "1 (PSG Win)");
    assert_eq!(top.odds, 1.65);
    assert_eq!(top.confidence, 95.0);
    assert_eq!(top.reasoning.len(), 5);
    assert!((top.value_rating - value_rating(95.0, 1.65)).abs() < 1e-9);

    // The rest have no prices and fall back to the estimated 2.0.
    let rest = resp.singles[1..]
        .iter()
        .map(|r| (r.match_label.as_str(), r.confidence))
        .collect::<Vec<_>>();
    assert_eq!(
        rest,
        vec![
            ("Monaco vs Nice", 80.0),
            ("Lens vs Lille", 75.0),
            ("Rennes vs Lyon", 75.0),
        ]
    );
    for rec in &resp.singles[1..] {
        assert_eq!(rec.odds, 2.0);
        assert_eq!(rec.value_rating, rec.confidence - 60.0);
    }
    assert!(
        resp.singles
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence)
    );
}

#[test]
fn combos_use_distinct_matches_and_cap_at_ten() {
    let dir = tempfile::tempdir().expect("tempdir");
    let resp = loaded(&dir).recommendations(Sport::Football);

    // 4 singles on 4 matches: 6 pairs + 4 triples + 1 four-fold, capped.
    assert_eq!(resp.combos.len(), 10);
    assert_eq!(resp.combos[0].confidence, 88.0);
    for combo in &resp.combos {
        let ids = combo
            .bets
            .iter()
            .map(|b| b.match_id.as_str())
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), combo.bets.len());
        assert!((2..=4).contains(&combo.bets.len()));
        let product = combo.bets.iter().map(|b| b.odds).product::<f64>();
        assert!((combo.total_odds - product).abs() < 0.005 + 1e-9);
    }
}

#[test]
fn stricter_config_filters_singles() {
    let dir = tempfile::tempdir().expect("tempdir");
    let svc = loaded(&dir);
    svc.update_config(&json!({"minConfidence": 90}))
        .expect("patch applies");
    let resp = svc.recommendations(Sport::Football);
    assert_eq!(resp.singles.len(), 1);
    assert!(resp.combos.is_empty());

    svc.update_config(&json!({"minConfidence": 60, "betTypes": {"1X2": false}}))
        .expect("patch applies");
    assert!(svc.recommendations(Sport::Football).singles.is_empty());
}

#[test]
fn unpriced_home_favourite_is_recommended_at_two() {
    let dir = tempfile::tempdir().expect("tempdir");
    let svc = Analyser::with_clock(Store::open(dir.path()), monday_noon());
    svc.add_results(
        "Lens,Nice,2,0,2024-01-06\nLens,Lyon,1,0,2024-01-20\nLens,Brest,3,1,2024-02-03\nLens,Lille,1,1,2024-02-17\nLens,Nantes,2,1,2024-03-02",
        Sport::Football,
    )
    .expect("results store");
    svc.add_upcoming("Lens vs Toulouse", Sport::Football)
        .expect("fixture stores");

    let resp = svc.recommendations(Sport::Football);
    assert_eq!(resp.singles.len(), 1);
    let rec = &resp.singles[0];
    assert_eq!(rec.odds, 2.0);
    assert!(rec.confidence >= 65.0);
    assert_eq!(rec.date, "2025-03-11T20:00:00");
}

#[test]
fn btts_and_goals_need_their_own_prices() {
    let dir = tempfile::tempdir().expect("tempdir");
    let resp = loaded(&dir).recommendations(Sport::Football);
    assert!(
        resp.singles
            .iter()
            .all(|r| r.bet_type == BetType::MatchResult)
    );
}

/// Lille score and concede freely at home; Nantes do the same away.
const OPEN_GAMES: &str = "\
Lille,Angers,2,2,2024-01-06
Lille,Brest,3,2,2024-01-13
Lille,Metz,2,3,2024-01-20
Reims,Nantes,2,2,2024-01-07
Lorient,Nantes,3,1,2024-01-14
Auxerre,Nantes,2,2,2024-01-21";

const LENS_AT_HOME: &str = "\
Lens,Nice,2,0,2024-01-06
Lens,Lyon,1,0,2024-01-20
Lens,Brest,3,1,2024-02-03
Lens,Lille,1,1,2024-02-17
Lens,Nantes,2,1,2024-03-02";

fn history(csv: &str) -> Vec<Match> {
    let aliases = TeamAliases::default();
    let report = TextParser::at(&aliases, monday_noon()).parse_results(csv, Sport::Football);
    assert!(report.skipped.is_empty(), "history should parse cleanly");
    report.accepted
}

fn fixture(id: &str, home: &str, away: &str, odds: Option<Odds>) -> UpcomingMatch {
    UpcomingMatch {
        id: id.to_string(),
        date: "2025-03-11T20:00:00".to_string(),
        sport: Sport::Football,
        home_team: home.to_string(),
        away_team: away.to_string(),
        league: None,
        odds,
    }
}

fn goal_prices(btts_yes: f64, over25: f64) -> Odds {
    Odds {
        btts: Some(BttsOdds {
            yes: btts_yes,
            no: 2.0,
        }),
        over25: Some(over25),
        ..Odds::default()
    }
}

#[test]
fn priced_goal_markets_are_recommended() {
    let config = AppConfig::default();
    let upcoming = vec![fixture("u1", "Lille", "Nantes", Some(goal_prices(1.8, 1.7)))];
    let singles =
        Recommender::new(&config).generate_recommendations(&upcoming, &history(OPEN_GAMES));

    let summary = singles
        .iter()
        .map(|r| (r.bet_type, r.selection.as_str(), r.odds, r.confidence))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            (BetType::Btts, "Yes", 1.8, 90.0),
            (BetType::OverUnder, "Over 2.5", 1.7, 85.0),
            (BetType::MatchResult, "1 (Lille Win)", 2.0, 65.0),
        ]
    );
    assert_eq!(singles[0].reasoning.len(), 3);
    assert!((singles[0].value_rating - value_rating(90.0, 1.8)).abs() < 1e-9);
    assert!((singles[1].value_rating - value_rating(85.0, 1.7)).abs() < 1e-9);
    assert_eq!(singles[2].value_rating, 5.0);
}

#[test]
fn short_home_price_is_dropped_while_unpriced_fixture_passes() {
    let config = AppConfig::default();
    let short = Odds {
        match_result: Some(MatchOdds {
            home: 1.4,
            draw: 4.2,
            away: 7.0,
        }),
        ..Odds::default()
    };
    let upcoming = vec![
        fixture("priced", "Lens", "Toulouse", Some(short)),
        fixture("unpriced", "Lens", "Metz", None),
    ];
    let singles =
        Recommender::new(&config).generate_recommendations(&upcoming, &history(LENS_AT_HOME));

    assert_eq!(singles.len(), 1);
    assert_eq!(singles[0].match_id, "unpriced");
    assert_eq!(singles[0].odds, 2.0);
}

#[test]
fn goal_markets_respect_min_odds() {
    let results = history(OPEN_GAMES);
    let upcoming = vec![fixture("u1", "Lille", "Nantes", Some(goal_prices(1.5, 1.55)))];

    let strict = AppConfig::default();
    let singles = Recommender::new(&strict).generate_recommendations(&upcoming, &results);
    assert_eq!(singles.len(), 1);
    assert_eq!(singles[0].bet_type, BetType::MatchResult);

    let relaxed = AppConfig {
        min_odds: 1.4,
        ..AppConfig::default()
    };
    let singles = Recommender::new(&relaxed).generate_recommendations(&upcoming, &results);
    let kinds = singles.iter().map(|r| r.bet_type).collect::<Vec<_>>();
    assert_eq!(kinds, vec![BetType::Btts, BetType::OverUnder, BetType::MatchResult]);
}

struct AlwaysSure;

impl ScoringStrategy for AlwaysSure {
    fn match_result(&self, _ctx: &MatchContext<'_>) -> Assessment {
        Assessment {
            confidence: 99.0,
            reasoning: vec!["sure".to_string()],
        }
    }

    fn both_teams_score(&self, _ctx: &MatchContext<'_>) -> Assessment {
        Assessment {
            confidence: 10.0,
            reasoning: Vec::new(),
        }
    }

    fn over_2_5(&self, _ctx: &MatchContext<'_>) -> Assessment {
        Assessment {
            confidence: 10.0,
            reasoning: Vec::new(),
        }
    }
}

#[test]
fn scoring_strategy_is_pluggable() {
    let config = AppConfig::default();
    let upcoming = vec![UpcomingMatch {
        id: "u1".to_string(),
        date: "2025-03-11T20:00:00".to_string(),
        sport: Sport::Football,
        home_team: "Brest".to_string(),
        away_team: "Lorient".to_string(),
        league: None,
        odds: None,
    }];
    let singles =
        Recommender::with_strategy(&config, AlwaysSure).generate_recommendations(&upcoming, &[]);
    assert_eq!(singles.len(), 1);
    assert_eq!(singles[0].confidence, 99.0);
    assert_eq!(singles[0].reasoning, vec!["sure".to_string()]);
}
