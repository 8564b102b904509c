//! Engine configuration from environment variables
//!
//! Environment variables (a `.env` file is honoured):
//! - `WATCHLIST` (default: bitcoin,ethereum,solana)
//! - `REDDIT_SUBS` (default: CryptoCurrency,Bitcoin,ethtrader)
//! - `MENTION_HORIZON_HOURS` (default: 24, at most 720)
//! - `EVENT_FORWARD_STEPS` (default: 6)
//! - `RSI_PERIOD` (default: 14)
//! - `PAPER_HOLD_STEPS` (default: 6)
//! - `PAPER_FEE_BPS` (default: 10)

use std::env;
use std::str::FromStr;

use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::event_study::DEFAULT_FORWARD_STEPS;
use crate::indicators::DEFAULT_RSI_PERIOD;
use crate::paper_trade::PaperTradeConfig;

const DEFAULT_WATCHLIST: &str = "bitcoin,ethereum,solana";
const DEFAULT_REDDIT_SUBS: &str = "CryptoCurrency,Bitcoin,ethtrader";
const DEFAULT_MENTION_HORIZON_HOURS: usize = 24;
/// Thirty days of hourly buckets
const MAX_MENTION_HORIZON_HOURS: usize = 24 * 30;

/// Static configuration for pipeline runs
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Default asset ids to analyse
    pub watchlist: Vec<String>,
    /// Default social source groups
    pub reddit_subreddits: Vec<String>,
    /// Number of hourly mention buckets
    pub mention_horizon_hours: usize,
    /// Price steps measured after each burst event
    pub event_forward_steps: usize,
    pub rsi_period: usize,
    pub paper_hold_steps: usize,
    pub paper_fee_bps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            watchlist: split_list(DEFAULT_WATCHLIST),
            reddit_subreddits: split_list(DEFAULT_REDDIT_SUBS),
            mention_horizon_hours: DEFAULT_MENTION_HORIZON_HOURS,
            event_forward_steps: DEFAULT_FORWARD_STEPS,
            rsi_period: DEFAULT_RSI_PERIOD,
            paper_hold_steps: 6,
            paper_fee_bps: 10,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_var<T: FromStr>(key: &str, raw: Option<String>, default: T) -> EngineResult<T> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| EngineError::InvalidConfig {
            key: key.to_string(),
            value,
        }),
    }
}

fn parse_horizon(raw: Option<String>) -> EngineResult<usize> {
    const KEY: &str = "MENTION_HORIZON_HOURS";
    let hours = parse_var(KEY, raw.clone(), DEFAULT_MENTION_HORIZON_HOURS)?;
    if hours > MAX_MENTION_HORIZON_HOURS {
        return Err(EngineError::InvalidConfig {
            key: KEY.to_string(),
            value: raw.unwrap_or_default(),
        });
    }
    Ok(hours)
}

impl EngineConfig {
    /// Load from the process environment
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        info!(
            watchlist = ?config.watchlist,
            horizon = config.mention_horizon_hours,
            "Engine configuration loaded"
        );
        Ok(config)
    }

    /// Load from an arbitrary key lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EngineResult<Self> {
        let defaults = Self::default();

        let list = |key: &str, fallback: Vec<String>| match lookup(key) {
            Some(raw) if !raw.trim().is_empty() => split_list(&raw),
            _ => fallback,
        };

        Ok(Self {
            watchlist: list("WATCHLIST", defaults.watchlist),
            reddit_subreddits: list("REDDIT_SUBS", defaults.reddit_subreddits),
            mention_horizon_hours: parse_horizon(lookup("MENTION_HORIZON_HOURS"))?,
            event_forward_steps: parse_var(
                "EVENT_FORWARD_STEPS",
                lookup("EVENT_FORWARD_STEPS"),
                defaults.event_forward_steps,
            )?,
            rsi_period: parse_var("RSI_PERIOD", lookup("RSI_PERIOD"), defaults.rsi_period)?,
            paper_hold_steps: parse_var(
                "PAPER_HOLD_STEPS",
                lookup("PAPER_HOLD_STEPS"),
                defaults.paper_hold_steps,
            )?,
            paper_fee_bps: parse_var(
                "PAPER_FEE_BPS",
                lookup("PAPER_FEE_BPS"),
                defaults.paper_fee_bps,
            )?,
        })
    }

    /// Paper-trade parameters with the entry level taken from `rsi_low`
    pub fn paper_trade(&self, rsi_low: f64) -> PaperTradeConfig {
        PaperTradeConfig {
            rsi_low,
            hold_steps: self.paper_hold_steps,
            fee_bps: self.paper_fee_bps,
            period: self.rsi_period,
        }
    }
}
