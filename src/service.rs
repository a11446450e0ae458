//! Request/response operations over the store.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use crate::config::AppConfig;
use crate::h2h::analyze_h2h;
use crate::model::{
    ComboRecommendation, H2HStats, Match, Recommendation, Sport, TeamStats, UpcomingMatch,
};
use crate::parser::{SkippedLine, TextParser};
use crate::persist::{SportBuckets, Store};
use crate::recommender::Recommender;
use crate::team_stats::compute_team_stats;
use crate::teams::TeamAliases;

#[derive(Debug, Clone, Serialize)]
pub struct AddResponse<T> {
    pub count: usize,
    pub matches: Vec<T>,
    pub skipped: Vec<SkippedLine>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RecommendationsResponse {
    pub singles: Vec<Recommendation>,
    pub combos: Vec<ComboRecommendation>,
}

pub struct Analyser {
    store: Store,
    /// Fixed parser clock; `None` reads the system clock per request.
    now: Option<NaiveDateTime>,
}

impl Analyser {
    pub fn new(store: Store) -> Self {
        Self { store, now: None }
    }

    pub fn with_clock(store: Store, now: NaiveDateTime) -> Self {
        Self {
            store,
            now: Some(now),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    fn parser<'a>(&self, aliases: &'a TeamAliases) -> TextParser<'a> {
        match self.now {
            Some(now) => TextParser::at(aliases, now),
            None => TextParser::new(aliases),
        }
    }

    pub fn add_results(&self, text: &str, sport: Sport) -> Result<AddResponse<Match>> {
        let aliases = self.store.aliases();
        let report = self.parser(&aliases).parse_results(text, sport);
        log::info!(
            "add results ({sport}): {} parsed, {} skipped",
            report.accepted.len(),
            report.skipped.len()
        );
        if !report.accepted.is_empty() {
            self.store
                .append_results(sport, &report.accepted)
                .context("store parsed results")?;
        }
        Ok(AddResponse {
            count: report.accepted.len(),
            matches: report.accepted,
            skipped: report.skipped,
        })
    }

    pub fn add_upcoming(&self, text: &str, sport: Sport) -> Result<AddResponse<UpcomingMatch>> {
        let aliases = self.store.aliases();
        let report = self.parser(&aliases).parse_upcoming(text, sport);
        log::info!(
            "add upcoming ({sport}): {} parsed, {} skipped",
            report.accepted.len(),
            report.skipped.len()
        );
        if !report.accepted.is_empty() {
            self.store
                .append_upcoming(sport, &report.accepted)
                .context("store parsed fixtures")?;
        }
        Ok(AddResponse {
            count: report.accepted.len(),
            matches: report.accepted,
            skipped: report.skipped,
        })
    }

    pub fn clear_upcoming(&self, sport: Option<Sport>) -> Result<()> {
        self.store
            .clear_upcoming(sport)
            .context("clear upcoming fixtures")?;
        match sport {
            Some(sport) => log::info!("cleared upcoming fixtures for {sport}"),
            None => log::info!("cleared all upcoming fixtures"),
        }
        Ok(())
    }

    pub fn results(&self) -> SportBuckets<Match> {
        self.store.results()
    }

    pub fn upcoming(&self) -> SportBuckets<UpcomingMatch> {
        self.store.upcoming()
    }

    pub fn recommendations(&self, sport: Sport) -> RecommendationsResponse {
        let config = self.store.config();
        let results = self.store.results();
        let upcoming = self.store.upcoming();
        let results = results.get(sport);
        let upcoming = upcoming.get(sport);
        log::info!(
            "recommendations ({sport}): {} results, {} upcoming",
            results.len(),
            upcoming.len()
        );
        if upcoming.is_empty() {
            log::info!("no upcoming {sport} fixtures to analyse");
        }

        let recommender = Recommender::new(&config);
        let singles = recommender.generate_recommendations(upcoming, results);
        let combos = recommender.generate_combos(&singles);
        if singles.is_empty() && !upcoming.is_empty() {
            log::info!(
                "no bet cleared minConfidence {} / minOdds {}",
                config.min_confidence,
                config.min_odds
            );
        }
        log::info!("{} singles, {} combos", singles.len(), combos.len());

        RecommendationsResponse { singles, combos }
    }

    pub fn team_stats(&self, team: &str, sport: Sport) -> TeamStats {
        let team = self.store.aliases().normalize(team);
        let results = self.store.results();
        compute_team_stats(&team, results.get(sport), sport)
    }

    pub fn head_to_head(&self, team1: &str, team2: &str, sport: Sport) -> H2HStats {
        let aliases = self.store.aliases();
        let results = self.store.results();
        analyze_h2h(
            &aliases.normalize(team1),
            &aliases.normalize(team2),
            results.get(sport),
        )
    }

    pub fn config(&self) -> AppConfig {
        self.store.config()
    }

    /// Shallow-merges `patch` into the stored config and saves the result.
    pub fn update_config(&self, patch: &Value) -> Result<AppConfig> {
        let updated = self.store.config().merged_with(patch)?;
        self.store.save_config(&updated).context("save config")?;
        log::info!("config updated");
        Ok(updated)
    }

    pub fn aliases(&self) -> TeamAliases {
        self.store.aliases()
    }

    pub fn add_alias(&self, alias: &str, canonical: &str) -> Result<TeamAliases> {
        self.store.add_alias(alias, canonical)?;
        log::info!("alias '{}' -> '{}'", alias.trim(), canonical.trim());
        Ok(self.store.aliases())
    }
}
