//! Per-asset signal summaries and the run snapshot

use serde::{Deserialize, Serialize};

use crate::burst::MentionBurst;
use crate::event_study::EventImpact;
use crate::paper_trade::PaperTradeResult;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorBlock {
    pub rsi14: Option<f64>,
    pub realized_volatility: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialBlock {
    /// Hourly mention counts, most recent hour last
    #[serde(rename = "mentionWindows24h")]
    pub mention_windows: Vec<u32>,
    pub mention_z: Option<f64>,
    pub mention_burst: MentionBurst,
    pub author_concentration: f64,
    /// All posts scanned across source groups
    pub reddit_posts_scanned: usize,
    /// Posts mentioning this asset
    pub matched_posts: usize,
    pub news_count: usize,
    pub attention_z: Option<f64>,
}

/// Complete signal set for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    pub coin_id: String,
    pub ticker: String,
    pub captured_at: i64,
    pub price_source: String,
    pub last_price: Option<f64>,
    pub signal_score: u8,
    pub indicators: IndicatorBlock,
    pub paper_trade: PaperTradeResult,
    pub social: SocialBlock,
    #[serde(rename = "eventImpact6h")]
    pub event_impact: EventImpact,
}

/// An asset whose primary data could not be obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetError {
    pub coin_id: String,
    pub error: String,
}

/// Either a full summary or an asset-level error, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalSummary {
    Full(Box<AssetSummary>),
    Error(AssetError),
}

impl SignalSummary {
    pub fn coin_id(&self) -> &str {
        match self {
            SignalSummary::Full(s) => &s.coin_id,
            SignalSummary::Error(e) => &e.coin_id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SignalSummary::Error(_))
    }
}

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub generated_at: i64,
    pub settings_used: Settings,
    pub summaries: Vec<SignalSummary>,
}
