//! Signal Engine: social/price signal fusion and alerting
//!
//! Pure, synchronous analytics over already-fetched inputs:
//! - Price indicators (returns, RSI, realized volatility)
//! - Mention-burst, attention and concentration detectors
//! - Event-impact study over historical bursts
//! - RSI long-only paper-trading simulator
//! - Composite per-asset score
//! - Rule-based alert feed with mode filtering and ranking

pub mod alerts;
pub mod burst;
pub mod config;
pub mod error;
pub mod event_study;
pub mod indicators;
pub mod paper_trade;
pub mod pipeline;
pub mod scoring;
pub mod settings;
pub mod summary;
pub mod types;

mod stats;

// Re-exports for convenience
pub use alerts::{
    build_alerts, build_alerts_at, confidence_for, filter_and_rank, Alert, AlertLevel, AlertType,
    Evidence, EvidenceValue,
};
pub use burst::{author_concentration, detect_mention_burst, z_score, MentionBurst};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use event_study::{event_impact, forward_return, nearest_index, EventImpact, Impact};
pub use indicators::{compute_returns, realized_volatility, rsi};
pub use paper_trade::{simulate_rsi_long_only, PaperTradeConfig, PaperTradeResult};
pub use pipeline::{build_snapshot, coin_meta, summarize_asset, AssetInput, CoinMeta};
pub use scoring::{signal_score, ScoreInputs};
pub use settings::{Mode, Settings, SettingsPatch, ThresholdOverrides, Thresholds};
pub use summary::{AssetError, AssetSummary, IndicatorBlock, SignalSummary, SocialBlock, Snapshot};
pub use types::*;
