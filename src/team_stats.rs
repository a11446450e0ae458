//! Per-team form, streaks and aggregate metrics over the results history.

use std::cmp::Reverse;

use chrono::Utc;

use crate::model::{
    AdvancedMetrics, Match, MatchMetrics, Outcome, Sport, Streaks, TeamStats, format_kickoff,
};

const SHORT_FORM: usize = 5;
const LONG_FORM: usize = 10;

pub fn compute_team_stats(team: &str, matches: &[Match], sport: Sport) -> TeamStats {
    let team = team.trim();
    let played = team_matches(team, matches);

    let home = played
        .iter()
        .copied()
        .filter(|m| m.is_home(team))
        .collect::<Vec<_>>();
    let away = played
        .iter()
        .copied()
        .filter(|m| !m.is_home(team))
        .collect::<Vec<_>>();

    TeamStats {
        team_id: team.to_string(),
        sport,
        overall: match_metrics(team, &played),
        home: match_metrics(team, &home),
        away: match_metrics(team, &away),
        form_last5: form_string(team, &played[..played.len().min(SHORT_FORM)]),
        form_last10: form_string(team, &played[..played.len().min(LONG_FORM)]),
        recent_trends: streaks(team, &played),
        advanced: advanced_metrics(team, &played),
        last_updated: format_kickoff(Utc::now().naive_utc()),
    }
}

/// Matches `team` took part in, most recent first. Undated matches sort
/// last; ties keep their stored order.
pub fn team_matches<'m>(team: &str, matches: &'m [Match]) -> Vec<&'m Match> {
    let mut played = matches
        .iter()
        .filter(|m| m.involves(team))
        .collect::<Vec<_>>();
    sort_most_recent_first(&mut played);
    played
}

pub fn sort_most_recent_first(matches: &mut [&Match]) {
    matches.sort_by_cached_key(|m| Reverse(m.kickoff()));
}

pub fn match_metrics(team: &str, matches: &[&Match]) -> MatchMetrics {
    let mut out = MatchMetrics {
        matches_played: matches.len(),
        ..MatchMetrics::default()
    };

    for m in matches {
        let (goals_for, goals_against) = m.goals_for_against(team);
        out.goals_for = out.goals_for.saturating_add(goals_for);
        out.goals_against = out.goals_against.saturating_add(goals_against);
        match Outcome::classify(goals_for, goals_against) {
            Outcome::Win => out.wins += 1,
            Outcome::Draw => out.draws += 1,
            Outcome::Loss => out.losses += 1,
        }
    }

    if out.matches_played > 0 {
        let n = out.matches_played as f64;
        out.avg_goals_for = out.goals_for as f64 / n;
        out.avg_goals_against = out.goals_against as f64 / n;
    }
    out
}

/// `W-D-L` letters, one per match, in the order given.
pub fn form_string(team: &str, matches: &[&Match]) -> String {
    matches
        .iter()
        .map(|m| m.outcome_for(team).letter().to_string())
        .collect::<Vec<_>>()
        .join("-")
}

/// W = 3, D = 1, L = 0.
pub fn form_score(form: &str) -> u32 {
    form.split('-')
        .map(|c| match c.trim() {
            "W" => 3,
            "D" => 1,
            _ => 0,
        })
        .sum()
}

/// Streaks read from the most recent match backward and stop at the first
/// match that breaks them.
pub fn streaks(team: &str, matches: &[&Match]) -> Streaks {
    let run = |holds: &dyn Fn(u32, u32) -> bool| {
        matches
            .iter()
            .map(|m| m.goals_for_against(team))
            .take_while(|(goals_for, goals_against)| holds(*goals_for, *goals_against))
            .count()
    };

    Streaks {
        scoring_streak: run(&|gf, _| gf > 0),
        clean_sheet_streak: run(&|_, ga| ga == 0),
        win_streak: run(&|gf, ga| gf > ga),
        unbeaten_streak: run(&|gf, ga| gf >= ga),
    }
}

pub fn advanced_metrics(team: &str, matches: &[&Match]) -> AdvancedMetrics {
    let mut btts = 0usize;
    let mut over25 = 0usize;
    let mut corners_total = 0u32;
    let mut corners_count = 0usize;

    for m in matches {
        let (goals_for, goals_against) = m.goals_for_against(team);
        if goals_for > 0 && goals_against > 0 {
            btts += 1;
        }
        if m.total_goals() > 2 {
            over25 += 1;
        }
        if let Some(corners) = m.metadata.as_ref().and_then(|meta| meta.corners) {
            let side = if m.is_home(team) {
                corners.home
            } else {
                corners.away
            };
            corners_total = corners_total.saturating_add(side);
            corners_count += 1;
        }
    }

    let pct = |count: usize| {
        if matches.is_empty() {
            0.0
        } else {
            count as f64 / matches.len() as f64 * 100.0
        }
    };

    AdvancedMetrics {
        btts_percentage: pct(btts),
        over25_percentage: pct(over25),
        avg_corners_for: (corners_count > 0).then(|| corners_total as f64 / corners_count as f64),
    }
}
