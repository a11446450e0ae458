use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Sport;

pub const MAX_COMBO_LEGS: usize = 8;
const MAX_RECENT_FORM: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub min_odds: f64,
    pub min_confidence: f64,
    pub recent_form_matches: usize,
    pub enabled_sports: Vec<Sport>,
    pub bet_types: BetTypeToggles,
    pub combo_settings: ComboSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetTypeToggles {
    #[serde(rename = "1X2")]
    pub match_result: bool,
    #[serde(rename = "BTTS")]
    pub btts: bool,
    #[serde(rename = "overUnder")]
    pub over_under: bool,
    pub handicap: bool,
    pub corners: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComboSettings {
    pub min_bets: usize,
    pub max_bets: usize,
    pub min_total_odds: f64,
    /// Highest pairwise leg correlation a combo may contain, in [0, 1].
    pub max_correlation: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            min_odds: 1.6,
            min_confidence: 60.0,
            recent_form_matches: 5,
            enabled_sports: vec![Sport::Football],
            bet_types: BetTypeToggles::default(),
            combo_settings: ComboSettings::default(),
        }
    }
}

impl Default for BetTypeToggles {
    fn default() -> Self {
        Self {
            match_result: true,
            btts: true,
            over_under: true,
            handicap: false,
            corners: false,
        }
    }
}

impl Default for ComboSettings {
    fn default() -> Self {
        Self {
            min_bets: 2,
            max_bets: 4,
            min_total_odds: 1.6,
            max_correlation: 0.3,
        }
    }
}

impl AppConfig {
    pub fn sport_enabled(&self, sport: Sport) -> bool {
        self.enabled_sports.contains(&sport)
    }

    /// Clamp every bound into its usable range. Out-of-range values are
    /// logged and pulled back in; non-finite ones reset to the default.
    pub fn validated(mut self) -> Self {
        let defaults = AppConfig::default();

        self.min_odds = bounded("minOdds", self.min_odds, 1.0, f64::MAX, defaults.min_odds);
        self.min_confidence = bounded(
            "minConfidence",
            self.min_confidence,
            0.0,
            100.0,
            defaults.min_confidence,
        );
        if !(1..=MAX_RECENT_FORM).contains(&self.recent_form_matches) {
            let fixed = self.recent_form_matches.clamp(1, MAX_RECENT_FORM);
            log::warn!(
                "config recentFormMatches {} out of range, using {fixed}",
                self.recent_form_matches
            );
            self.recent_form_matches = fixed;
        }

        let mut seen = Vec::with_capacity(self.enabled_sports.len());
        self.enabled_sports.retain(|s| {
            if seen.contains(s) {
                false
            } else {
                seen.push(*s);
                true
            }
        });

        let combo = &mut self.combo_settings;
        if combo.min_bets == 0 {
            log::warn!("config comboSettings.minBets 0 out of range, using 1");
            combo.min_bets = 1;
        }
        if combo.min_bets > MAX_COMBO_LEGS {
            log::warn!(
                "config comboSettings.minBets {} out of range, using {MAX_COMBO_LEGS}",
                combo.min_bets
            );
            combo.min_bets = MAX_COMBO_LEGS;
        }
        let max_bets = combo.max_bets.clamp(combo.min_bets, MAX_COMBO_LEGS);
        if max_bets != combo.max_bets {
            log::warn!(
                "config comboSettings.maxBets {} out of range, using {max_bets}",
                combo.max_bets
            );
            combo.max_bets = max_bets;
        }
        combo.min_total_odds = bounded(
            "comboSettings.minTotalOdds",
            combo.min_total_odds,
            1.0,
            f64::MAX,
            defaults.combo_settings.min_total_odds,
        );
        combo.max_correlation = bounded(
            "comboSettings.maxCorrelation",
            combo.max_correlation,
            0.0,
            1.0,
            defaults.combo_settings.max_correlation,
        );

        self
    }

    /// Shallow merge: each top-level key of `patch` replaces the stored
    /// value wholesale (nested objects are not merged).
    pub fn merged_with(&self, patch: &Value) -> Result<AppConfig> {
        let Value::Object(patch) = patch else {
            return Err(anyhow!("config patch must be a JSON object"));
        };
        let mut merged = serde_json::to_value(self).context("serialize current config")?;
        if let Value::Object(base) = &mut merged {
            for (key, value) in patch {
                base.insert(key.clone(), value.clone());
            }
        }
        let config: AppConfig =
            serde_json::from_value(merged).context("patched config does not deserialize")?;
        Ok(config.validated())
    }
}

fn bounded(name: &str, value: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if !value.is_finite() {
        log::warn!("config {name} is not a finite number, using {fallback}");
        return fallback;
    }
    let fixed = value.clamp(lo, hi);
    if fixed != value {
        log::warn!("config {name} {value} out of range, using {fixed}");
    }
    fixed
}
