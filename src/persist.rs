//! JSON documents under one data root.
//!
//! ```text
//! <root>/data/results.json     results per sport, with a revision counter
//! <root>/data/upcoming.json    fixtures per sport, with a revision counter
//! <root>/config/settings.json  AppConfig
//! <root>/config/aliases.json   custom team aliases, merged over the built-ins
//! ```
//!
//! Reads never fail: a missing document is the default and a malformed one
//! is logged and treated as the default. Updates refuse to touch a document
//! that exists but does not parse. Writes go to a temp file that is renamed
//! over the target.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::model::{Match, Sport, UpcomingMatch};
use crate::teams::TeamAliases;

const APP_DIR: &str = "sports_analyser";
const RESULTS_FILE: &str = "data/results.json";
const UPCOMING_FILE: &str = "data/upcoming.json";
const SETTINGS_FILE: &str = "config/settings.json";
const ALIASES_FILE: &str = "config/aliases.json";
const MAX_UPDATE_ATTEMPTS: usize = 3;

/// Records partitioned by sport. `revision` goes up by one on every write
/// and is what concurrent writers compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct SportBuckets<T> {
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub football: Vec<T>,
    #[serde(default)]
    pub basketball: Vec<T>,
    #[serde(default)]
    pub tennis: Vec<T>,
}

impl<T> Default for SportBuckets<T> {
    fn default() -> Self {
        Self {
            revision: 0,
            football: Vec::new(),
            basketball: Vec::new(),
            tennis: Vec::new(),
        }
    }
}

impl<T> SportBuckets<T> {
    pub fn get(&self, sport: Sport) -> &[T] {
        match sport {
            Sport::Football => &self.football,
            Sport::Basketball => &self.basketball,
            Sport::Tennis => &self.tennis,
        }
    }

    pub fn get_mut(&mut self, sport: Sport) -> &mut Vec<T> {
        match sport {
            Sport::Football => &mut self.football,
            Sport::Basketball => &mut self.basketball,
            Sport::Tennis => &mut self.tennis,
        }
    }

    pub fn len(&self) -> usize {
        Sport::ALL.iter().map(|s| self.get(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default, Deserialize)]
struct RevisionOnly {
    #[serde(default)]
    revision: u64,
}

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn results(&self) -> SportBuckets<Match> {
        read_or_default(&self.root.join(RESULTS_FILE))
    }

    pub fn upcoming(&self) -> SportBuckets<UpcomingMatch> {
        read_or_default(&self.root.join(UPCOMING_FILE))
    }

    /// Returns the revision written.
    pub fn append_results(&self, sport: Sport, records: &[Match]) -> Result<u64> {
        self.update_buckets(RESULTS_FILE, |docs: &mut SportBuckets<Match>| {
            docs.get_mut(sport).extend_from_slice(records);
        })
    }

    pub fn append_upcoming(&self, sport: Sport, records: &[UpcomingMatch]) -> Result<u64> {
        self.update_buckets(UPCOMING_FILE, |docs: &mut SportBuckets<UpcomingMatch>| {
            docs.get_mut(sport).extend_from_slice(records);
        })
    }

    /// Empties one sport's fixtures, or every sport's with `None`.
    pub fn clear_upcoming(&self, sport: Option<Sport>) -> Result<u64> {
        self.update_buckets(UPCOMING_FILE, |docs: &mut SportBuckets<UpcomingMatch>| {
            match sport {
                Some(sport) => docs.get_mut(sport).clear(),
                None => Sport::ALL.iter().for_each(|s| docs.get_mut(*s).clear()),
            }
        })
    }

    pub fn config(&self) -> AppConfig {
        read_or_default::<AppConfig>(&self.root.join(SETTINGS_FILE)).validated()
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        write_atomic(&self.root.join(SETTINGS_FILE), config)
    }

    /// Built-in aliases with the custom ones layered on top.
    pub fn aliases(&self) -> TeamAliases {
        let mut aliases = TeamAliases::default();
        aliases.extend(&self.custom_aliases());
        aliases
    }

    pub fn custom_aliases(&self) -> TeamAliases {
        let raw: HashMap<String, String> = read_or_default(&self.root.join(ALIASES_FILE));
        TeamAliases::from(raw)
    }

    pub fn add_alias(&self, alias: &str, canonical: &str) -> Result<()> {
        if alias.trim().is_empty() || canonical.trim().is_empty() {
            return Err(anyhow!("alias and team name must both be non-empty"));
        }
        let mut custom = self.custom_aliases();
        custom.insert(alias, canonical);
        write_atomic(&self.root.join(ALIASES_FILE), &custom)
    }

    /// Read, mutate, and write back only if nobody else wrote in between.
    /// A lost race re-reads and re-applies `mutate`.
    fn update_buckets<T, F>(&self, file: &str, mut mutate: F) -> Result<u64>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut(&mut SportBuckets<T>),
    {
        let path = self.root.join(file);
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let mut docs: SportBuckets<T> = read_for_update(&path)?;
            let seen = docs.revision;
            mutate(&mut docs);
            docs.revision = seen + 1;
            if commit_if_unchanged(&path, &docs, seen)? {
                return Ok(docs.revision);
            }
            log::warn!(
                "{} changed during update (attempt {attempt}/{MAX_UPDATE_ATTEMPTS})",
                path.display()
            );
        }
        Err(anyhow!(
            "{} kept changing under concurrent writers; update abandoned",
            path.display()
        ))
    }
}

/// `$SPORTS_ANALYSER_DIR`, else the XDG data dir, else the working directory.
pub fn default_root() -> PathBuf {
    if let Ok(dir) = env::var("SPORTS_ANALYSER_DIR")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }
    if let Ok(base) = env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return PathBuf::from(base).join(APP_DIR);
    }
    if let Ok(home) = env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home).join(".local").join("share").join(APP_DIR);
    }
    PathBuf::from(".")
}

fn read_or_default<D: DeserializeOwned + Default>(path: &Path) -> D {
    let Ok(raw) = fs::read_to_string(path) else {
        return D::default();
    };
    match serde_json::from_str(&raw) {
        Ok(doc) => doc,
        Err(err) => {
            log::warn!("ignoring malformed {}: {err}", path.display());
            D::default()
        }
    }
}

/// Like `read_or_default`, but a document that exists and does not parse is
/// an error so the update cannot overwrite it.
fn read_for_update<D: DeserializeOwned + Default>(path: &Path) -> Result<D> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(D::default()),
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    serde_json::from_str(&raw).with_context(|| {
        format!(
            "{} does not parse; fix or remove it before writing",
            path.display()
        )
    })
}

fn stored_revision(path: &Path) -> u64 {
    read_or_default::<RevisionOnly>(path).revision
}

/// Writes `doc` unless the stored revision moved away from `expected`.
/// The check and the rename are two steps, so a writer landing between
/// them still wins; the window is the rename itself.
fn commit_if_unchanged<D: Serialize>(path: &Path, doc: &D, expected: u64) -> Result<bool> {
    let tmp = stage(path, doc)?;
    if stored_revision(path) != expected {
        if let Err(err) = fs::remove_file(&tmp) {
            log::debug!("could not remove {}: {err}", tmp.display());
        }
        return Ok(false);
    }
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(true)
}

fn write_atomic<D: Serialize>(path: &Path, doc: &D) -> Result<()> {
    let tmp = stage(path, doc)?;
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))
}

/// Serializes `doc` next to `path` under a unique temp name.
fn stage<D: Serialize>(path: &Path, doc: &D) -> Result<PathBuf> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(doc)
        .with_context(|| format!("serialize {}", path.display()))?;
    let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    Ok(tmp)
}
