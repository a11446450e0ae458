use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use sports_analyser::config::AppConfig;
use sports_analyser::model::{Match, UpcomingMatch};
use sports_analyser::recommender::Recommender;

#[derive(Debug, serde::Deserialize)]
struct Snapshot {
    #[serde(default)]
    config: AppConfig,
    #[serde(default)]
    results: Vec<Match>,
    #[serde(default)]
    upcoming: Vec<UpcomingMatch>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/snapshot.json"));

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let snapshot: Snapshot =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    let config = snapshot.config.validated();

    // Store-free: one snapshot in, the recommendations out.
    let recommender = Recommender::new(&config);
    let singles = recommender.generate_recommendations(&snapshot.upcoming, &snapshot.results);
    let combos = recommender.generate_combos(&singles);

    println!(
        "{} results, {} fixtures",
        snapshot.results.len(),
        snapshot.upcoming.len()
    );
    for rec in &singles {
        println!(
            "{:<28} {:<10} {:<24} @ {:>5.2}  conf {:>3.0}  value {:>+5.1}",
            rec.match_label, rec.bet_type, rec.selection, rec.odds, rec.confidence, rec.value_rating
        );
        for reason in &rec.reasoning {
            println!("    - {reason}");
        }
    }
    for combo in &combos {
        println!(
            "{}  conf {:.0}  [{}]",
            combo.reasoning,
            combo.confidence,
            combo
                .bets
                .iter()
                .map(|b| b.match_label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    if singles.is_empty() {
        println!("No bet cleared the thresholds.");
    }

    Ok(())
}
