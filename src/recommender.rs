//! Single-bet and combo recommendations for upcoming matches.
//!
//! Each upcoming match is scored per bet type by a [`ScoringStrategy`];
//! the recommender turns a score into a bet when its confidence and its
//! edge over the bookmaker's implied probability clear the configured bars.

use uuid::Uuid;

use crate::config::AppConfig;
use crate::h2h::analyze_h2h;
use crate::model::{
    BetType, ComboRecommendation, Dominance, H2HStats, Match, Recommendation, TeamStats,
    UpcomingMatch,
};
use crate::team_stats::{compute_team_stats, form_score};

const BASE_CONFIDENCE: f64 = 50.0;
/// Stand-in price for a home win when no 1X2 odds were supplied.
const ESTIMATED_HOME_ODDS: f64 = 2.0;
/// Without a price, value is confidence above this break-even guess.
const NO_ODDS_BREAK_EVEN: f64 = 60.0;
const SHARED_TEAM_CORRELATION: f64 = 0.5;
const MAX_COMBOS: usize = 10;

/// Everything a strategy may look at for one upcoming match.
pub struct MatchContext<'a> {
    pub upcoming: &'a UpcomingMatch,
    pub home: &'a TeamStats,
    pub away: &'a TeamStats,
    pub h2h: &'a H2HStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub confidence: f64,
    pub reasoning: Vec<String>,
}

impl Assessment {
    fn base() -> Self {
        Self {
            confidence: BASE_CONFIDENCE,
            reasoning: Vec::new(),
        }
    }

    fn add(&mut self, points: f64, reason: String) {
        self.confidence += points;
        self.reasoning.push(reason);
    }
}

/// Confidence scoring per bet type. Value and threshold gating stay in the
/// [`Recommender`], so a strategy only decides how sure it is.
pub trait ScoringStrategy {
    fn match_result(&self, ctx: &MatchContext<'_>) -> Assessment;
    fn both_teams_score(&self, ctx: &MatchContext<'_>) -> Assessment;
    fn over_2_5(&self, ctx: &MatchContext<'_>) -> Assessment;
}

/// Fixed point additions on top of a 50 base.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScoring;

impl ScoringStrategy for HeuristicScoring {
    fn match_result(&self, ctx: &MatchContext<'_>) -> Assessment {
        let mut out = Assessment::base();
        let home_team = &ctx.upcoming.home_team;
        let away_team = &ctx.upcoming.away_team;

        let home_win_rate = ctx.home.home.win_rate();
        if home_win_rate > 60.0 {
            out.add(15.0, format!("{home_team}: {home_win_rate:.0}% wins at home"));
        }

        let away_win_rate = ctx.away.away.win_rate();
        if away_win_rate < 30.0 {
            out.add(10.0, format!("{away_team}: only {away_win_rate:.0}% wins away"));
        }

        if form_score(&ctx.home.form_last5) > form_score(&ctx.away.form_last5) + 3 {
            out.add(
                10.0,
                format!(
                    "Better recent form: {} vs {}",
                    ctx.home.form_last5, ctx.away.form_last5
                ),
            );
        }

        if ctx.h2h.dominance == Dominance::Team1 && ctx.h2h.team1.eq_ignore_ascii_case(home_team) {
            out.add(
                5.0,
                format!(
                    "H2H: {}W-{}D-{}L",
                    ctx.h2h.team1_wins, ctx.h2h.draws, ctx.h2h.team2_wins
                ),
            );
        }

        let home_scoring = ctx.home.home.avg_goals_for;
        let away_conceding = ctx.away.away.avg_goals_against;
        if home_scoring > 1.5 && away_conceding > 1.2 {
            out.add(
                5.0,
                format!("Avg goals: {home_scoring:.1} vs {away_conceding:.1} conceded"),
            );
        }
        out
    }

    fn both_teams_score(&self, ctx: &MatchContext<'_>) -> Assessment {
        let mut out = Assessment::base();

        let home_btts = ctx.home.advanced.btts_percentage;
        let away_btts = ctx.away.advanced.btts_percentage;
        if home_btts > 60.0 && away_btts > 60.0 {
            out.add(
                20.0,
                format!("Both teams BTTS%: {home_btts:.0}% / {away_btts:.0}%"),
            );
        }

        if ctx.home.overall.avg_goals_for > 1.2 && ctx.away.overall.avg_goals_for > 1.0 {
            out.add(10.0, "Both teams score regularly".to_string());
        }

        let home_streak = ctx.home.recent_trends.scoring_streak;
        let away_streak = ctx.away.recent_trends.scoring_streak;
        if home_streak >= 3 && away_streak >= 3 {
            out.add(
                10.0,
                format!("Scoring streaks: {home_streak} / {away_streak} matches"),
            );
        }
        out
    }

    fn over_2_5(&self, ctx: &MatchContext<'_>) -> Assessment {
        let mut out = Assessment::base();

        let home_over = ctx.home.advanced.over25_percentage;
        let away_over = ctx.away.advanced.over25_percentage;
        if home_over > 65.0 && away_over > 65.0 {
            out.add(
                20.0,
                format!("Over 2.5 %: {home_over:.0}% / {away_over:.0}%"),
            );
        }

        let combined = ctx.home.home.avg_goals_for + ctx.away.away.avg_goals_against;
        if combined > 3.0 {
            out.add(15.0, format!("Avg combined goals: {combined:.1}"));
        }
        out
    }
}

/// Edge in percentage points of our probability over the implied one.
pub fn value_rating(confidence: f64, odds: f64) -> f64 {
    (confidence / 100.0 - 1.0 / odds) * 100.0
}

pub struct Recommender<'c, S = HeuristicScoring> {
    config: &'c AppConfig,
    strategy: S,
}

impl<'c> Recommender<'c> {
    pub fn new(config: &'c AppConfig) -> Self {
        Self::with_strategy(config, HeuristicScoring)
    }
}

impl<'c, S: ScoringStrategy> Recommender<'c, S> {
    pub fn with_strategy(config: &'c AppConfig, strategy: S) -> Self {
        Self { config, strategy }
    }

    /// Every accepted single bet across `upcoming`, highest confidence first.
    pub fn generate_recommendations(
        &self,
        upcoming: &[UpcomingMatch],
        results: &[Match],
    ) -> Vec<Recommendation> {
        let bet_types = self.config.bet_types;
        let mut recs = Vec::new();

        for fixture in upcoming {
            let home = compute_team_stats(&fixture.home_team, results, fixture.sport);
            let away = compute_team_stats(&fixture.away_team, results, fixture.sport);
            let h2h = analyze_h2h(&fixture.home_team, &fixture.away_team, results);
            let ctx = MatchContext {
                upcoming: fixture,
                home: &home,
                away: &away,
                h2h: &h2h,
            };

            if bet_types.match_result {
                recs.extend(self.match_result(&ctx));
            }
            if bet_types.btts {
                recs.extend(self.both_teams_score(&ctx));
            }
            if bet_types.over_under {
                recs.extend(self.over_2_5(&ctx));
            }
        }

        recs.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        recs
    }

    fn match_result(&self, ctx: &MatchContext<'_>) -> Option<Recommendation> {
        let assessment = self.strategy.match_result(ctx);
        let priced = ctx.upcoming.odds.as_ref().and_then(|o| o.home_win());

        let (odds, value) = match priced {
            Some(odds) => {
                if odds < self.config.min_odds {
                    return None;
                }
                (odds, value_rating(assessment.confidence, odds))
            }
            None => (
                ESTIMATED_HOME_ODDS,
                assessment.confidence - NO_ODDS_BREAK_EVEN,
            ),
        };

        let selection = format!("1 ({} Win)", ctx.upcoming.home_team);
        self.accept(ctx, BetType::MatchResult, selection, odds, value, assessment)
    }

    fn both_teams_score(&self, ctx: &MatchContext<'_>) -> Option<Recommendation> {
        let odds = ctx.upcoming.odds.as_ref()?.btts_yes()?;
        if odds < self.config.min_odds {
            return None;
        }
        let assessment = self.strategy.both_teams_score(ctx);
        let value = value_rating(assessment.confidence, odds);
        self.accept(ctx, BetType::Btts, "Yes".to_string(), odds, value, assessment)
    }

    fn over_2_5(&self, ctx: &MatchContext<'_>) -> Option<Recommendation> {
        let odds = ctx.upcoming.odds.as_ref()?.over_2_5()?;
        if odds < self.config.min_odds {
            return None;
        }
        let assessment = self.strategy.over_2_5(ctx);
        let value = value_rating(assessment.confidence, odds);
        self.accept(
            ctx,
            BetType::OverUnder,
            "Over 2.5".to_string(),
            odds,
            value,
            assessment,
        )
    }

    fn accept(
        &self,
        ctx: &MatchContext<'_>,
        bet_type: BetType,
        selection: String,
        odds: f64,
        value: f64,
        assessment: Assessment,
    ) -> Option<Recommendation> {
        if assessment.confidence < self.config.min_confidence || value <= 0.0 {
            log::debug!(
                "{} {bet_type}: rejected (confidence {:.0}, value {value:.1})",
                ctx.upcoming.label(),
                assessment.confidence
            );
            return None;
        }
        let fixture = ctx.upcoming;
        Some(Recommendation {
            match_id: fixture.id.clone(),
            match_label: fixture.label(),
            home_team: fixture.home_team.clone(),
            away_team: fixture.away_team.clone(),
            date: fixture.date.clone(),
            sport: fixture.sport,
            bet_type,
            selection,
            odds,
            confidence: assessment.confidence,
            reasoning: assessment.reasoning,
            value_rating: value,
        })
    }

    /// Up to ten multi-leg bets built from `singles`, highest confidence first.
    ///
    /// Only the best ten candidates are kept while enumerating; ties keep
    /// generation order (fewer legs first, then lexicographic).
    pub fn generate_combos(&self, singles: &[Recommendation]) -> Vec<ComboRecommendation> {
        let settings = self.config.combo_settings;
        let max_legs = settings.max_bets.min(singles.len());
        let mut best: Vec<ComboCandidate> = Vec::with_capacity(MAX_COMBOS + 1);

        for size in settings.min_bets.max(1)..=max_legs {
            for_each_combination(singles.len(), size, |picked| {
                if is_correlated(singles, picked, settings.max_correlation) {
                    return;
                }
                let total_odds = picked.iter().map(|&i| singles[i].odds).product::<f64>();
                let confidence = picked.iter().map(|&i| singles[i].confidence).sum::<f64>()
                    / picked.len() as f64;
                if total_odds < settings.min_total_odds || confidence < self.config.min_confidence
                {
                    return;
                }
                let confidence = confidence.round();
                let at = best.partition_point(|c| c.confidence >= confidence);
                if at >= MAX_COMBOS {
                    return;
                }
                best.insert(
                    at,
                    ComboCandidate {
                        picked: picked.to_vec(),
                        total_odds,
                        confidence,
                    },
                );
                best.truncate(MAX_COMBOS);
            });
        }

        best.into_iter()
            .map(|c| ComboRecommendation {
                id: Uuid::new_v4().to_string(),
                bets: c.picked.iter().map(|&i| singles[i].clone()).collect(),
                total_odds: round_to(c.total_odds, 2),
                confidence: c.confidence,
                reasoning: format!("Combo {} legs @ {:.2}", c.picked.len(), c.total_odds),
            })
            .collect()
    }
}

struct ComboCandidate {
    picked: Vec<usize>,
    total_odds: f64,
    /// Already rounded; ranking uses the published value.
    confidence: f64,
}

/// 1.0 for two bets on the same match, 0.5 when the matches share a team.
pub fn leg_correlation(a: &Recommendation, b: &Recommendation) -> f64 {
    if a.match_id == b.match_id {
        return 1.0;
    }
    let shares_team = [&a.home_team, &a.away_team]
        .iter()
        .any(|t| b.home_team.eq_ignore_ascii_case(t) || b.away_team.eq_ignore_ascii_case(t));
    if shares_team {
        SHARED_TEAM_CORRELATION
    } else {
        0.0
    }
}

fn is_correlated(singles: &[Recommendation], picked: &[usize], max_correlation: f64) -> bool {
    for (n, &i) in picked.iter().enumerate() {
        for &j in &picked[n + 1..] {
            let (a, b) = (&singles[i], &singles[j]);
            // Same match is never allowed, whatever the tolerance.
            if a.match_id == b.match_id || leg_correlation(a, b) > max_correlation {
                return true;
            }
        }
    }
    false
}

/// Calls `visit` with every k-subset of `0..n` as ascending indices, in
/// lexicographic order.
fn for_each_combination(n: usize, k: usize, mut visit: impl FnMut(&[usize])) {
    if k == 0 || k > n {
        return;
    }
    let mut idx = (0..k).collect::<Vec<_>>();
    loop {
        visit(&idx);
        let Some(i) = (0..k).rev().find(|&i| idx[i] != i + n - k) else {
            return;
        };
        idx[i] += 1;
        for j in i + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
