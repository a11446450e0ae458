use crate::model::{Dominance, H2HStats, Match, Outcome};
use crate::team_stats::sort_most_recent_first;

const MEETINGS: usize = 5;

/// Last five meetings between two teams, either way round.
pub fn analyze_h2h(team1: &str, team2: &str, matches: &[Match]) -> H2HStats {
    let team1 = team1.trim();
    let team2 = team2.trim();

    let mut meetings = matches
        .iter()
        .filter(|m| {
            (m.is_home(team1) && m.is_away(team2)) || (m.is_home(team2) && m.is_away(team1))
        })
        .collect::<Vec<_>>();
    sort_most_recent_first(&mut meetings);
    meetings.truncate(MEETINGS);

    let mut team1_wins = 0usize;
    let mut draws = 0usize;
    let mut team2_wins = 0usize;
    let mut goals_team1 = 0u32;
    let mut goals_team2 = 0u32;

    for m in &meetings {
        let (g1, g2) = m.goals_for_against(team1);
        goals_team1 = goals_team1.saturating_add(g1);
        goals_team2 = goals_team2.saturating_add(g2);
        match Outcome::classify(g1, g2) {
            Outcome::Win => team1_wins += 1,
            Outcome::Draw => draws += 1,
            Outcome::Loss => team2_wins += 1,
        }
    }

    let (avg_goals_team1, avg_goals_team2) = if meetings.is_empty() {
        (0.0, 0.0)
    } else {
        let n = meetings.len() as f64;
        (goals_team1 as f64 / n, goals_team2 as f64 / n)
    };

    H2HStats {
        team1: team1.to_string(),
        team2: team2.to_string(),
        last5_meetings: meetings.into_iter().cloned().collect(),
        team1_wins,
        draws,
        team2_wins,
        avg_goals_team1,
        avg_goals_team2,
        dominance: dominance(team1_wins, team2_wins),
    }
}

/// A side dominates with at least two more wins than the other.
pub fn dominance(team1_wins: usize, team2_wins: usize) -> Dominance {
    if team1_wins > team2_wins + 1 {
        Dominance::Team1
    } else if team2_wins > team1_wins + 1 {
        Dominance::Team2
    } else {
        Dominance::Balanced
    }
}
