use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use uuid::Uuid;

use crate::model::{
    HalfTimeScore, Match, MatchOdds, Odds, Sport, UpcomingMatch, format_kickoff, is_valid_odds,
};
use crate::teams::TeamAliases;

/// date, home, home, away, away, score, score
const RESULT_BLOCK_LINES: usize = 7;
/// time, home, home, away, away
const UPCOMING_BLOCK_LINES: usize = 5;
const DEFAULT_KICKOFF_HOUR: u32 = 20;

static RESULT_BLOCK_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})\.(\d{1,2})\.\s+(\d{1,2}):(\d{2})$").expect("result block date regex")
});
static UPCOMING_BLOCK_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("upcoming block time regex"));
static SCOREBOARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\s*[-–]\s*(.+?)\s+(\d+):(\d+)\s*(?:\((\d+):(\d+)\))?")
        .expect("scoreboard regex")
});
static CASUAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+(?:vs|v)\s+(.+?)\s+(\d+)-(\d+)").expect("casual regex"));
static UPCOMING_WITH_ODDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(.+?)\s+(?:vs|v|-)\s+(.+?)\s+(\d{1,2})/(\d{1,2})(?:\s+(\d{1,2}):(\d{2}))?\s+([\d.]+)\s+([\d.]+)\s+([\d.]+)",
    )
    .expect("upcoming odds regex")
});
static UPCOMING_DATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\s+(?:vs|v|-)\s+(.+?)\s+(\d{1,2})/(\d{1,2})(?:\s+(\d{1,2}):(\d{2}))?")
        .expect("upcoming dated regex")
});
static UPCOMING_PLAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+(?:vs|v|-)\s+(.+)$").expect("upcoming plain regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    Unrecognized,
    InvalidScore,
    InvalidDate,
    InvalidOdds,
    EmptyTeamName,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SkipReason::Unrecognized => "unrecognized format",
            SkipReason::InvalidScore => "invalid score",
            SkipReason::InvalidDate => "invalid date",
            SkipReason::InvalidOdds => "invalid odds",
            SkipReason::EmptyTeamName => "empty team name",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line: String,
    pub reason: SkipReason,
}

/// Records that parsed, plus every line that did not and why.
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport<T> {
    pub accepted: Vec<T>,
    pub skipped: Vec<SkippedLine>,
}

impl<T> Default for ParseReport<T> {
    fn default() -> Self {
        Self {
            accepted: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> ParseReport<T> {
    fn skip(&mut self, line: &str, reason: SkipReason) {
        log::debug!("skipping line {line:?}: {reason}");
        self.skipped.push(SkippedLine {
            line: line.to_string(),
            reason,
        });
    }
}

/// Turns pasted result/fixture text into records.
///
/// Multi-line blocks are tried first at every position; a line that does
/// not open a block is parsed on its own. The clock only feeds defaults
/// (missing dates, the current year for `DD.MM.` / `DD/MM` dates).
pub struct TextParser<'a> {
    aliases: &'a TeamAliases,
    now: NaiveDateTime,
}

impl<'a> TextParser<'a> {
    pub fn new(aliases: &'a TeamAliases) -> Self {
        Self::at(aliases, Utc::now().naive_utc())
    }

    pub fn at(aliases: &'a TeamAliases, now: NaiveDateTime) -> Self {
        Self { aliases, now }
    }

    pub fn parse_results(&self, input: &str, sport: Sport) -> ParseReport<Match> {
        let lines = non_empty_lines(input);
        let mut report = ParseReport::default();

        let mut i = 0;
        while i < lines.len() {
            if let Some(parsed) = self.result_block(&lines[i..], sport) {
                report.accepted.push(parsed);
                i += RESULT_BLOCK_LINES;
                continue;
            }
            match self.result_line(lines[i], sport) {
                Ok(parsed) => report.accepted.push(parsed),
                Err(reason) => report.skip(lines[i], reason),
            }
            i += 1;
        }
        report
    }

    pub fn parse_upcoming(&self, input: &str, sport: Sport) -> ParseReport<UpcomingMatch> {
        let lines = non_empty_lines(input);
        let mut report = ParseReport::default();

        let mut i = 0;
        while i < lines.len() {
            if let Some(parsed) = self.upcoming_block(&lines[i..], sport) {
                report.accepted.push(parsed);
                i += UPCOMING_BLOCK_LINES;
                continue;
            }
            match self.upcoming_line(lines[i], sport) {
                Ok(parsed) => report.accepted.push(parsed),
                Err(reason) => report.skip(lines[i], reason),
            }
            i += 1;
        }
        report
    }

    fn result_block(&self, lines: &[&str], sport: Sport) -> Option<Match> {
        let [date, home, home_again, away, away_again, score_home, score_away, ..] = lines else {
            return None;
        };
        let caps = RESULT_BLOCK_DATE.captures(date)?;
        if home != home_again || away != away_again {
            return None;
        }
        let score_home = parse_score(score_home)?;
        let score_away = parse_score(score_away)?;

        let day = cap_u32(&caps, 1)?;
        let month = cap_u32(&caps, 2)?;
        let kickoff = NaiveDate::from_ymd_opt(self.now.year(), month, day)?
            .and_hms_opt(cap_u32(&caps, 3)?, cap_u32(&caps, 4)?, 0)?;

        let (home_team, away_team) = self.teams(home, away).ok()?;
        Some(Match {
            id: new_id(),
            date: format_kickoff(kickoff),
            sport,
            home_team,
            away_team,
            score_home,
            score_away,
            score_ht: None,
            league: None,
            metadata: None,
        })
    }

    fn result_line(&self, line: &str, sport: Sport) -> Result<Match, SkipReason> {
        if let Some(parsed) = self.comma_separated(line, sport)? {
            return Ok(parsed);
        }
        if let Some(parsed) = self.scoreboard(line, sport)? {
            return Ok(parsed);
        }
        if let Some(parsed) = self.casual(line, sport)? {
            return Ok(parsed);
        }
        Err(SkipReason::Unrecognized)
    }

    /// `home,away,scoreHome,scoreAway[,date[,league]]`
    fn comma_separated(&self, line: &str, sport: Sport) -> Result<Option<Match>, SkipReason> {
        if !line.contains(',') {
            return Ok(None);
        }
        let parts = line.split(',').map(str::trim).collect::<Vec<_>>();
        if parts.len() < 4 {
            return Ok(None);
        }
        let (home_team, away_team) = self.teams(parts[0], parts[1])?;
        let score_home = parse_score(parts[2]).ok_or(SkipReason::InvalidScore)?;
        let score_away = parse_score(parts[3]).ok_or(SkipReason::InvalidScore)?;
        let date = parts
            .get(4)
            .filter(|d| !d.is_empty())
            .map(|d| d.to_string())
            .unwrap_or_else(|| format_kickoff(self.now));
        let league = parts
            .get(5)
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string());
        Ok(Some(Match {
            id: new_id(),
            date,
            sport,
            home_team,
            away_team,
            score_home,
            score_away,
            score_ht: None,
            league,
            metadata: None,
        }))
    }

    /// `Home - Away 3:1 (1:0)`
    fn scoreboard(&self, line: &str, sport: Sport) -> Result<Option<Match>, SkipReason> {
        let Some(caps) = SCOREBOARD.captures(line) else {
            return Ok(None);
        };
        let (home_team, away_team) = self.teams(&caps[1], &caps[2])?;
        let score_home = cap_u32(&caps, 3).ok_or(SkipReason::InvalidScore)?;
        let score_away = cap_u32(&caps, 4).ok_or(SkipReason::InvalidScore)?;
        let score_ht = match (caps.get(5), caps.get(6)) {
            (Some(_), Some(_)) => Some(HalfTimeScore {
                home: cap_u32(&caps, 5).ok_or(SkipReason::InvalidScore)?,
                away: cap_u32(&caps, 6).ok_or(SkipReason::InvalidScore)?,
            }),
            _ => None,
        };
        Ok(Some(Match {
            id: new_id(),
            date: format_kickoff(self.now),
            sport,
            home_team,
            away_team,
            score_home,
            score_away,
            score_ht,
            league: None,
            metadata: None,
        }))
    }

    /// `Home vs Away 3-1`
    fn casual(&self, line: &str, sport: Sport) -> Result<Option<Match>, SkipReason> {
        let Some(caps) = CASUAL.captures(line) else {
            return Ok(None);
        };
        let (home_team, away_team) = self.teams(&caps[1], &caps[2])?;
        Ok(Some(Match {
            id: new_id(),
            date: format_kickoff(self.now),
            sport,
            home_team,
            away_team,
            score_home: cap_u32(&caps, 3).ok_or(SkipReason::InvalidScore)?,
            score_away: cap_u32(&caps, 4).ok_or(SkipReason::InvalidScore)?,
            score_ht: None,
            league: None,
            metadata: None,
        }))
    }

    fn upcoming_block(&self, lines: &[&str], sport: Sport) -> Option<UpcomingMatch> {
        let [time, home, home_again, away, away_again, ..] = lines else {
            return None;
        };
        let caps = UPCOMING_BLOCK_TIME.captures(time)?;
        if home != home_again || away != away_again {
            return None;
        }
        let kickoff = self
            .now
            .date()
            .and_hms_opt(cap_u32(&caps, 1)?, cap_u32(&caps, 2)?, 0)?;
        let (home_team, away_team) = self.teams(home, away).ok()?;
        Some(UpcomingMatch {
            id: new_id(),
            date: format_kickoff(kickoff),
            sport,
            home_team,
            away_team,
            league: None,
            odds: None,
        })
    }

    fn upcoming_line(&self, line: &str, sport: Sport) -> Result<UpcomingMatch, SkipReason> {
        if let Some(parsed) = self.upcoming_with_odds(line, sport)? {
            return Ok(parsed);
        }
        if let Some(parsed) = self.upcoming_dated(line, sport)? {
            return Ok(parsed);
        }
        if let Some(parsed) = self.upcoming_plain(line, sport)? {
            return Ok(parsed);
        }
        Err(SkipReason::Unrecognized)
    }

    /// `Home vs Away DD/MM [HH:MM] 1.65 3.80 5.20`
    fn upcoming_with_odds(
        &self,
        line: &str,
        sport: Sport,
    ) -> Result<Option<UpcomingMatch>, SkipReason> {
        let Some(caps) = UPCOMING_WITH_ODDS.captures(line) else {
            return Ok(None);
        };
        let (home_team, away_team) = self.teams(&caps[1], &caps[2])?;
        let kickoff = self.scheduled(&caps).ok_or(SkipReason::InvalidDate)?;
        let home = parse_odds(&caps[7]).ok_or(SkipReason::InvalidOdds)?;
        let draw = parse_odds(&caps[8]).ok_or(SkipReason::InvalidOdds)?;
        let away = parse_odds(&caps[9]).ok_or(SkipReason::InvalidOdds)?;
        Ok(Some(UpcomingMatch {
            id: new_id(),
            date: format_kickoff(kickoff),
            sport,
            home_team,
            away_team,
            league: None,
            odds: Some(Odds {
                match_result: Some(MatchOdds { home, draw, away }),
                ..Odds::default()
            }),
        }))
    }

    /// `Home vs Away DD/MM [HH:MM]`
    fn upcoming_dated(&self, line: &str, sport: Sport) -> Result<Option<UpcomingMatch>, SkipReason> {
        let Some(caps) = UPCOMING_DATED.captures(line) else {
            return Ok(None);
        };
        let (home_team, away_team) = self.teams(&caps[1], &caps[2])?;
        let kickoff = self.scheduled(&caps).ok_or(SkipReason::InvalidDate)?;
        Ok(Some(UpcomingMatch {
            id: new_id(),
            date: format_kickoff(kickoff),
            sport,
            home_team,
            away_team,
            league: None,
            odds: None,
        }))
    }

    /// `Home vs Away`, scheduled tomorrow evening.
    fn upcoming_plain(&self, line: &str, sport: Sport) -> Result<Option<UpcomingMatch>, SkipReason> {
        let Some(caps) = UPCOMING_PLAIN.captures(line) else {
            return Ok(None);
        };
        let (home_team, away_team) = self.teams(&caps[1], &caps[2])?;
        let tomorrow = self.now.date().succ_opt().unwrap_or(self.now.date());
        Ok(Some(UpcomingMatch {
            id: new_id(),
            date: format_kickoff(evening_of(tomorrow)),
            sport,
            home_team,
            away_team,
            league: None,
            odds: None,
        }))
    }

    /// Day/month in groups 3-4, optional hour/minute in 5-6.
    fn scheduled(&self, caps: &Captures<'_>) -> Option<NaiveDateTime> {
        let day = cap_u32(caps, 3)?;
        let month = cap_u32(caps, 4)?;
        let date = NaiveDate::from_ymd_opt(self.now.year(), month, day)?;
        match (cap_u32(caps, 5), cap_u32(caps, 6)) {
            (Some(hour), Some(minute)) => date.and_hms_opt(hour, minute, 0),
            _ => Some(evening_of(date)),
        }
    }

    fn teams(&self, home: &str, away: &str) -> Result<(String, String), SkipReason> {
        let home = self.aliases.normalize(home);
        let away = self.aliases.normalize(away);
        if home.is_empty() || away.is_empty() {
            return Err(SkipReason::EmptyTeamName);
        }
        Ok((home, away))
    }
}

fn non_empty_lines(input: &str) -> Vec<&str> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn parse_score(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_odds(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| is_valid_odds(*v))
}

fn cap_u32(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

fn evening_of(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(DEFAULT_KICKOFF_HOUR, 0, 0)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
