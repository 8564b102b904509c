//! User-tunable settings: watchlist, source groups, alert thresholds and mode
//!
//! Thresholds are resolved once at the boundary into a fully populated
//! [`Thresholds`] value; rule code never falls back to defaults itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::alerts::AlertLevel;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

// ============================================================================
// Mode
// ============================================================================

/// Alert verbosity profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Only `high` and `warn` alerts
    Quiet,
    /// Currently identical to `Aggressive`
    #[default]
    Normal,
    /// Everything
    Aggressive,
}

impl Mode {
    /// Whether an alert of `level` survives this mode's filter
    pub fn allows(self, level: AlertLevel) -> bool {
        match self {
            Mode::Aggressive => true,
            Mode::Quiet => matches!(level, AlertLevel::High | AlertLevel::Warn),
            Mode::Normal => true,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Quiet => write!(f, "quiet"),
            Mode::Normal => write!(f, "normal"),
            Mode::Aggressive => write!(f, "aggressive"),
        }
    }
}

impl FromStr for Mode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiet" => Ok(Mode::Quiet),
            "normal" => Ok(Mode::Normal),
            "aggressive" => Ok(Mode::Aggressive),
            other => Err(EngineError::InvalidMode(other.to_string())),
        }
    }
}

// ============================================================================
// Thresholds
// ============================================================================

/// Fully resolved alert thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub social_burst_z: f64,
    pub attention_spike_z: f64,
    pub manipulation_concentration: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            social_burst_z: 2.5,
            attention_spike_z: 2.0,
            manipulation_concentration: 0.6,
        }
    }
}

/// Partial thresholds as supplied by a caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdOverrides {
    pub rsi_overbought: Option<f64>,
    pub rsi_oversold: Option<f64>,
    pub social_burst_z: Option<f64>,
    pub attention_spike_z: Option<f64>,
    pub manipulation_concentration: Option<f64>,
}

impl ThresholdOverrides {
    /// Field-wise overlay: values in `patch` win
    fn overlay(self, patch: ThresholdOverrides) -> ThresholdOverrides {
        ThresholdOverrides {
            rsi_overbought: patch.rsi_overbought.or(self.rsi_overbought),
            rsi_oversold: patch.rsi_oversold.or(self.rsi_oversold),
            social_burst_z: patch.social_burst_z.or(self.social_burst_z),
            attention_spike_z: patch.attention_spike_z.or(self.attention_spike_z),
            manipulation_concentration: patch
                .manipulation_concentration
                .or(self.manipulation_concentration),
        }
    }
}

impl From<Thresholds> for ThresholdOverrides {
    fn from(t: Thresholds) -> Self {
        Self {
            rsi_overbought: Some(t.rsi_overbought),
            rsi_oversold: Some(t.rsi_oversold),
            social_burst_z: Some(t.social_burst_z),
            attention_spike_z: Some(t.attention_spike_z),
            manipulation_concentration: Some(t.manipulation_concentration),
        }
    }
}

fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(fallback)
}

impl Thresholds {
    /// Fill every missing or non-finite override from `defaults`
    pub fn resolve(overrides: &ThresholdOverrides, defaults: &Thresholds) -> Thresholds {
        Thresholds {
            rsi_overbought: finite_or(overrides.rsi_overbought, defaults.rsi_overbought),
            rsi_oversold: finite_or(overrides.rsi_oversold, defaults.rsi_oversold),
            social_burst_z: finite_or(overrides.social_burst_z, defaults.social_burst_z),
            attention_spike_z: finite_or(overrides.attention_spike_z, defaults.attention_spike_z),
            manipulation_concentration: finite_or(
                overrides.manipulation_concentration,
                defaults.manipulation_concentration,
            ),
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Normalized settings used for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub watchlist: Vec<String>,
    pub reddit_subreddits: Vec<String>,
    pub thresholds: Thresholds,
    pub mode: Mode,
}

/// A list given either as a JSON array or as a comma-separated string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    Items(Vec<String>),
    Csv(String),
}

impl ListInput {
    /// Trimmed, lower-cased, non-empty items. An empty string yields `None`
    /// so the caller falls back to its default list.
    fn normalize(&self) -> Option<Vec<String>> {
        let clean = |s: &str| -> Option<String> {
            let item = s.trim().to_lowercase();
            (!item.is_empty()).then_some(item)
        };
        match self {
            ListInput::Items(items) => Some(items.iter().filter_map(|s| clean(s)).collect()),
            ListInput::Csv(s) if s.is_empty() => None,
            ListInput::Csv(s) => Some(s.split(',').filter_map(clean).collect()),
        }
    }
}

/// Raw, partially specified settings (request bodies, stored documents)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub watchlist: Option<ListInput>,
    pub reddit_subreddits: Option<ListInput>,
    pub thresholds: Option<ThresholdOverrides>,
    pub mode: Option<String>,
}

impl SettingsPatch {
    /// Parse a JSON settings document
    pub fn from_json(raw: &str) -> EngineResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }
}

impl From<&Settings> for SettingsPatch {
    fn from(s: &Settings) -> Self {
        Self {
            watchlist: Some(ListInput::Items(s.watchlist.clone())),
            reddit_subreddits: Some(ListInput::Items(s.reddit_subreddits.clone())),
            thresholds: Some(s.thresholds.into()),
            mode: Some(s.mode.to_string()),
        }
    }
}

impl Settings {
    /// Lists from the engine config, default thresholds, `normal` mode
    pub fn defaults_from_config(config: &EngineConfig) -> Self {
        Self {
            watchlist: config.watchlist.clone(),
            reddit_subreddits: config.reddit_subreddits.clone(),
            thresholds: Thresholds::default(),
            mode: Mode::default(),
        }
    }

    /// Turn a raw patch into complete settings, falling back to `defaults`
    /// wherever the patch is missing or invalid.
    pub fn normalize(input: &SettingsPatch, defaults: &Settings) -> Settings {
        let list = |value: &Option<ListInput>, fallback: &Vec<String>| {
            value
                .as_ref()
                .and_then(ListInput::normalize)
                .unwrap_or_else(|| fallback.clone())
        };

        let mode = match input.mode.as_deref() {
            None => defaults.mode,
            Some(raw) => raw.parse::<Mode>().unwrap_or_else(|e: EngineError| {
                warn!(error = %e, fallback = %defaults.mode, "Ignoring invalid mode");
                defaults.mode
            }),
        };

        Settings {
            watchlist: list(&input.watchlist, &defaults.watchlist),
            reddit_subreddits: list(&input.reddit_subreddits, &defaults.reddit_subreddits),
            thresholds: Thresholds::resolve(
                &input.thresholds.unwrap_or_default(),
                &defaults.thresholds,
            ),
            mode,
        }
    }

    /// Apply `patch` on top of `previous` (thresholds merged per field), then normalize
    pub fn merge(previous: &Settings, patch: &SettingsPatch, defaults: &Settings) -> Settings {
        let base = SettingsPatch::from(previous);
        let draft = SettingsPatch {
            watchlist: patch.watchlist.clone().or(base.watchlist),
            reddit_subreddits: patch.reddit_subreddits.clone().or(base.reddit_subreddits),
            thresholds: Some(
                base.thresholds
                    .unwrap_or_default()
                    .overlay(patch.thresholds.unwrap_or_default()),
            ),
            mode: patch.mode.clone().or(base.mode),
        };
        Settings::normalize(&draft, defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Settings {
        Settings::defaults_from_config(&EngineConfig::default())
    }

    #[test]
    fn test_defaults_from_config() {
        let settings = defaults();
        assert_eq!(settings.watchlist, vec!["bitcoin", "ethereum", "solana"]);
        assert_eq!(settings.mode, Mode::Normal);
        assert_eq!(settings.thresholds, Thresholds::default());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("quiet".parse::<Mode>().unwrap(), Mode::Quiet);
        assert_eq!("aggressive".parse::<Mode>().unwrap(), Mode::Aggressive);
        assert!(matches!(
            "Loud".parse::<Mode>(),
            Err(EngineError::InvalidMode(m)) if m == "Loud"
        ));
    }

    #[test]
    fn test_mode_filter() {
        assert!(!Mode::Quiet.allows(AlertLevel::Info));
        assert!(Mode::Quiet.allows(AlertLevel::Warn));
        assert!(Mode::Quiet.allows(AlertLevel::High));
        assert!(Mode::Aggressive.allows(AlertLevel::Info));
        // Documented quirk: normal does not filter anything
        assert!(Mode::Normal.allows(AlertLevel::Info));
    }

    #[test]
    fn test_resolve_thresholds() {
        let overrides = ThresholdOverrides {
            rsi_overbought: Some(80.0),
            social_burst_z: Some(f64::NAN),
            ..Default::default()
        };
        let resolved = Thresholds::resolve(&overrides, &Thresholds::default());
        assert_eq!(resolved.rsi_overbought, 80.0);
        assert_eq!(resolved.social_burst_z, 2.5);
        assert_eq!(resolved.rsi_oversold, 30.0);
    }

    #[test]
    fn test_normalize_lists() {
        let patch = SettingsPatch::from_json(
            r#"{"watchlist": " Bitcoin , DOGECOIN,, ", "redditSubreddits": ["  CryptoMarkets", ""]}"#,
        )
        .unwrap();
        let settings = Settings::normalize(&patch, &defaults());
        assert_eq!(settings.watchlist, vec!["bitcoin", "dogecoin"]);
        assert_eq!(settings.reddit_subreddits, vec!["cryptomarkets"]);
    }

    #[test]
    fn test_normalize_falls_back() {
        let patch = SettingsPatch::from_json(r#"{"watchlist": "", "mode": "loud"}"#).unwrap();
        let settings = Settings::normalize(&patch, &defaults());
        assert_eq!(settings.watchlist, defaults().watchlist);
        assert_eq!(settings.mode, Mode::Normal);

        let settings = Settings::normalize(&SettingsPatch::default(), &defaults());
        assert_eq!(settings, defaults());
    }

    #[test]
    fn test_merge_keeps_previous_thresholds() {
        let defaults = defaults();
        let first = Settings::merge(
            &defaults,
            &SettingsPatch::from_json(r#"{"thresholds": {"rsiOverbought": 75}, "mode": "quiet"}"#)
                .unwrap(),
            &defaults,
        );
        assert_eq!(first.thresholds.rsi_overbought, 75.0);
        assert_eq!(first.mode, Mode::Quiet);

        let second = Settings::merge(
            &first,
            &SettingsPatch::from_json(r#"{"thresholds": {"socialBurstZ": 3.0}}"#).unwrap(),
            &defaults,
        );
        assert_eq!(second.thresholds.rsi_overbought, 75.0);
        assert_eq!(second.thresholds.social_burst_z, 3.0);
        assert_eq!(second.mode, Mode::Quiet);
        assert_eq!(second.watchlist, defaults.watchlist);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            SettingsPatch::from_json("{not json"),
            Err(EngineError::Json(_))
        ));
        assert_eq!(SettingsPatch::from_json("").unwrap(), SettingsPatch::default());
    }
}
