//! sports_analyser CLI
//!
//! Paste results and fixtures in, get team stats and ranked bets out. Every
//! command prints JSON on stdout; diagnostics go to the log on stderr.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use sports_analyser::model::Sport;
use sports_analyser::persist::{Store, default_root};
use sports_analyser::service::Analyser;

#[derive(Parser)]
#[command(name = "sports_analyser")]
#[command(about = "Match-result analysis and betting recommendations", long_about = None)]
struct Cli {
    /// Store root (defaults to $SPORTS_ANALYSER_DIR or the XDG data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse pasted results and append them to the store
    AddResults {
        /// Text file to read (stdin when omitted)
        input: Option<PathBuf>,
        #[arg(long, default_value_t = Sport::Football)]
        sport: Sport,
    },
    /// Parse pasted fixtures and append them to the store
    AddUpcoming {
        /// Text file to read (stdin when omitted)
        input: Option<PathBuf>,
        #[arg(long, default_value_t = Sport::Football)]
        sport: Sport,
    },
    /// Drop stored fixtures for one sport, or all of them
    ClearUpcoming {
        #[arg(long)]
        sport: Option<Sport>,
    },
    /// Print stored results
    Results {
        #[arg(long)]
        sport: Option<Sport>,
    },
    /// Print stored fixtures
    Upcoming {
        #[arg(long)]
        sport: Option<Sport>,
    },
    /// Single and combo recommendations for stored fixtures
    Recommend {
        #[arg(long, default_value_t = Sport::Football)]
        sport: Sport,
    },
    /// Statistics for one team
    Stats {
        team: String,
        #[arg(long, default_value_t = Sport::Football)]
        sport: Sport,
    },
    /// Last five meetings between two teams
    H2h {
        team1: String,
        team2: String,
        #[arg(long, default_value_t = Sport::Football)]
        sport: Sport,
    },
    /// Show or patch the analysis settings
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Team name aliases used when parsing and looking up teams
    Alias {
        #[command(subcommand)]
        action: AliasCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the current settings
    Show,
    /// Shallow-merge a JSON object into the settings
    Set {
        /// e.g. '{"minConfidence": 70}'
        patch: String,
    },
}

#[derive(Subcommand)]
enum AliasCommands {
    /// Print every alias in effect
    List,
    /// Map an alias onto a canonical team name
    Add { alias: String, canonical: String },
}

#[derive(Serialize)]
struct AliasEntry<'a> {
    alias: &'a str,
    team: &'a str,
}

fn main() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = cli.data_dir.unwrap_or_else(default_root);
    log::debug!("store root: {}", root.display());
    let analyser = Analyser::new(Store::open(root));

    match cli.command {
        Commands::AddResults { input, sport } => {
            let text = read_input(input)?;
            print_json(&analyser.add_results(&text, sport)?)
        }
        Commands::AddUpcoming { input, sport } => {
            let text = read_input(input)?;
            print_json(&analyser.add_upcoming(&text, sport)?)
        }
        Commands::ClearUpcoming { sport } => {
            analyser.clear_upcoming(sport)?;
            print_json(&serde_json::json!({ "success": true }))
        }
        Commands::Results { sport } => {
            let docs = analyser.results();
            match sport {
                Some(sport) => print_json(&docs.get(sport)),
                None => print_json(&docs),
            }
        }
        Commands::Upcoming { sport } => {
            let docs = analyser.upcoming();
            match sport {
                Some(sport) => print_json(&docs.get(sport)),
                None => print_json(&docs),
            }
        }
        Commands::Recommend { sport } => print_json(&analyser.recommendations(sport)),
        Commands::Stats { team, sport } => print_json(&analyser.team_stats(&team, sport)),
        Commands::H2h {
            team1,
            team2,
            sport,
        } => print_json(&analyser.head_to_head(&team1, &team2, sport)),
        Commands::Config { action } => match action {
            ConfigCommands::Show => print_json(&analyser.config()),
            ConfigCommands::Set { patch } => {
                let patch: serde_json::Value =
                    serde_json::from_str(&patch).context("config patch is not valid JSON")?;
                print_json(&analyser.update_config(&patch)?)
            }
        },
        Commands::Alias { action } => {
            let aliases = match action {
                AliasCommands::List => analyser.aliases(),
                AliasCommands::Add { alias, canonical } => {
                    analyser.add_alias(&alias, &canonical)?
                }
            };
            let entries = aliases
                .entries()
                .into_iter()
                .map(|(alias, team)| AliasEntry { alias, team })
                .collect::<Vec<_>>();
            print_json(&entries)
        }
    }
}

fn read_input(path: Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("read stdin")?;
            Ok(text)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}
