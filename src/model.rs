use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Format used for every timestamp the parser produces.
pub const KICKOFF_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    #[default]
    Football,
    Basketball,
    Tennis,
}

impl Sport {
    pub const ALL: [Sport; 3] = [Sport::Football, Sport::Basketball, Sport::Tennis];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Football => "football",
            Sport::Basketball => "basketball",
            Sport::Tennis => "tennis",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "football" | "soccer" => Ok(Sport::Football),
            "basketball" => Ok(Sport::Basketball),
            "tennis" => Ok(Sport::Tennis),
            other => Err(anyhow!("unknown sport '{other}'")),
        }
    }
}

/// Result of a match from one team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn classify(goals_for: u32, goals_against: u32) -> Self {
        if goals_for > goals_against {
            Outcome::Win
        } else if goals_for < goals_against {
            Outcome::Loss
        } else {
            Outcome::Draw
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Outcome::Win => 'W',
            Outcome::Draw => 'D',
            Outcome::Loss => 'L',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfTimeScore {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideCount {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCount {
    pub yellow: u32,
    pub red: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corners: Option<SideCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<CardCount>,
}

/// A finished match. Team names are already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub date: String,
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
    pub score_home: u32,
    pub score_away: u32,
    #[serde(rename = "scoreHT", default, skip_serializing_if = "Option::is_none")]
    pub score_ht: Option<HalfTimeScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MatchMetadata>,
}

impl Match {
    pub fn is_home(&self, team: &str) -> bool {
        self.home_team.eq_ignore_ascii_case(team)
    }

    pub fn is_away(&self, team: &str) -> bool {
        self.away_team.eq_ignore_ascii_case(team)
    }

    pub fn involves(&self, team: &str) -> bool {
        self.is_home(team) || self.is_away(team)
    }

    /// `(goals_for, goals_against)` for `team`. Callers filter with
    /// [`Match::involves`] first; a non-participant reads as the away side.
    pub fn goals_for_against(&self, team: &str) -> (u32, u32) {
        if self.is_home(team) {
            (self.score_home, self.score_away)
        } else {
            (self.score_away, self.score_home)
        }
    }

    pub fn outcome_for(&self, team: &str) -> Outcome {
        let (goals_for, goals_against) = self.goals_for_against(team);
        Outcome::classify(goals_for, goals_against)
    }

    pub fn total_goals(&self) -> u32 {
        self.score_home.saturating_add(self.score_away)
    }

    pub fn kickoff(&self) -> Option<NaiveDateTime> {
        parse_kickoff(&self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOdds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BttsOdds {
    pub yes: f64,
    pub no: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    #[serde(rename = "1X2", default, skip_serializing_if = "Option::is_none")]
    pub match_result: Option<MatchOdds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub btts: Option<BttsOdds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over25: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub under25: Option<f64>,
}

impl Odds {
    pub fn home_win(&self) -> Option<f64> {
        self.match_result.map(|o| o.home).filter(|v| is_valid_odds(*v))
    }

    pub fn btts_yes(&self) -> Option<f64> {
        self.btts.map(|o| o.yes).filter(|v| is_valid_odds(*v))
    }

    pub fn over_2_5(&self) -> Option<f64> {
        self.over25.filter(|v| is_valid_odds(*v))
    }
}

/// Decimal odds must be finite and at least 1.0.
pub fn is_valid_odds(value: f64) -> bool {
    value.is_finite() && value >= 1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingMatch {
    pub id: String,
    pub date: String,
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odds: Option<Odds>,
}

impl UpcomingMatch {
    pub fn label(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetrics {
    pub matches_played: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub goals_for: u32,
    pub goals_against: u32,
    pub avg_goals_for: f64,
    pub avg_goals_against: f64,
}

impl MatchMetrics {
    /// Win percentage in [0, 100]; 0 when nothing was played.
    pub fn win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            return 0.0;
        }
        self.wins as f64 / self.matches_played as f64 * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streaks {
    pub scoring_streak: usize,
    pub clean_sheet_streak: usize,
    pub win_streak: usize,
    pub unbeaten_streak: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedMetrics {
    pub btts_percentage: f64,
    pub over25_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_corners_for: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub team_id: String,
    pub sport: Sport,
    pub overall: MatchMetrics,
    pub home: MatchMetrics,
    pub away: MatchMetrics,
    pub form_last5: String,
    pub form_last10: String,
    pub recent_trends: Streaks,
    pub advanced: AdvancedMetrics,
    pub last_updated: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dominance {
    Team1,
    Team2,
    Balanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct H2HStats {
    pub team1: String,
    pub team2: String,
    pub last5_meetings: Vec<Match>,
    pub team1_wins: usize,
    pub draws: usize,
    pub team2_wins: usize,
    pub avg_goals_team1: f64,
    pub avg_goals_team2: f64,
    pub dominance: Dominance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetType {
    #[serde(rename = "1X2")]
    MatchResult,
    #[serde(rename = "BTTS")]
    Btts,
    #[serde(rename = "Over/Under")]
    OverUnder,
    Handicap,
    #[serde(rename = "HT")]
    HalfTime,
    Corners,
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BetType::MatchResult => "1X2",
            BetType::Btts => "BTTS",
            BetType::OverUnder => "Over/Under",
            BetType::Handicap => "Handicap",
            BetType::HalfTime => "HT",
            BetType::Corners => "Corners",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub match_id: String,
    #[serde(rename = "match")]
    pub match_label: String,
    pub home_team: String,
    pub away_team: String,
    pub date: String,
    pub sport: Sport,
    pub bet_type: BetType,
    pub selection: String,
    pub odds: f64,
    pub confidence: f64,
    pub reasoning: Vec<String>,
    pub value_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboRecommendation {
    pub id: String,
    pub bets: Vec<Recommendation>,
    pub total_odds: f64,
    pub confidence: f64,
    pub reasoning: String,
}

/// Best-effort parse of the timestamp shapes stored in the documents.
pub fn parse_kickoff(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn format_kickoff(at: NaiveDateTime) -> String {
    at.format(KICKOFF_FORMAT).to_string()
}
