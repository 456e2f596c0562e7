//! Server configuration from environment variables.
//!
//! - `SERVER_ADDR`: bind address, default `0.0.0.0:8080`
//! - `HOKM_ROUNDS_TO_WIN`: rounds needed to take a match, default 7
//! - `HOKM_TWO_PLAYER_ROTATION`: `alternate` (default) or `keep-on-win`
//! - `HOKM_SEED`: base seed for reproducible deals; unset draws from entropy

use anyhow::{bail, Context};
use hokm_core::{HakemRotation, MatchRules};
use std::env;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub rules: MatchRules,
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".into())
            .parse()
            .context("SERVER_ADDR is not a socket address")?;

        let mut rules = MatchRules::default();
        if let Some(rounds) = lookup("HOKM_ROUNDS_TO_WIN") {
            rules.rounds_to_win_match = rounds
                .parse()
                .context("HOKM_ROUNDS_TO_WIN is not a number")?;
        }
        if let Some(rotation) = lookup("HOKM_TWO_PLAYER_ROTATION") {
            rules.two_player_rotation = match rotation.as_str() {
                "alternate" => HakemRotation::Alternate,
                "keep-on-win" => HakemRotation::KeepOnWin,
                other => bail!("unknown HOKM_TWO_PLAYER_ROTATION {other:?}"),
            };
        }
        rules.validate()?;

        let seed = lookup("HOKM_SEED")
            .map(|s| s.parse().context("HOKM_SEED is not a number"))
            .transpose()?;

        Ok(Self { addr, rules, seed })
    }
}
