//! Match-result analysis and betting recommendations.
//!
//! Pasted result/fixture text goes through [`parser`], accumulates in the
//! JSON documents managed by [`persist`], and is turned into per-team
//! statistics ([`team_stats`], [`h2h`]) and ranked bets ([`recommender`]).

pub mod config;
pub mod h2h;
pub mod model;
pub mod parser;
pub mod persist;
pub mod recommender;
pub mod service;
pub mod team_stats;
pub mod teams;
