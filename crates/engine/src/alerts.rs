//! Alert rule engine
//!
//! Evaluates a fixed rule set against each [`SignalSummary`], producing
//! leveled alerts that carry the evidence behind them. Alerts are then
//! filtered by the active [`Mode`] and ranked by level, then confidence.
//!
//! Confidence policy: `clamp(base + 0.08 * evidence.len(), 0, 1)`. Rules that
//! cite more evidence rank higher within a level, so the evidence lists below
//! are part of the ranking contract.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::settings::{Mode, Settings, Thresholds};
use crate::summary::{AssetError, AssetSummary, SignalSummary, Snapshot};

/// Confidence added per evidence item
pub const EVIDENCE_CONFIDENCE_STEP: f64 = 0.08;

/// Mention z-score required alongside high concentration for a manipulation alert
const MANIPULATION_MIN_MENTION_Z: f64 = 1.5;

/// Minimum simulated trades before a paper edge is reported
const PAPER_EDGE_MIN_TRADES: usize = 3;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warn,
    High,
}

impl AlertLevel {
    /// Sort rank, higher is more severe
    pub fn rank(self) -> u8 {
        match self {
            AlertLevel::High => 3,
            AlertLevel::Warn => 2,
            AlertLevel::Info => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    DataError,
    OverboughtSignal,
    OversoldSignal,
    SocialBurst,
    ManipulationRisk,
    AttentionSpike,
    HistoricalImpact,
    PaperEdge,
}

impl AlertType {
    pub fn level(self) -> AlertLevel {
        match self {
            AlertType::DataError => AlertLevel::Warn,
            AlertType::SocialBurst | AlertType::ManipulationRisk => AlertLevel::High,
            AlertType::OverboughtSignal
            | AlertType::OversoldSignal
            | AlertType::AttentionSpike
            | AlertType::HistoricalImpact
            | AlertType::PaperEdge => AlertLevel::Info,
        }
    }

    pub fn base_confidence(self) -> f64 {
        match self {
            AlertType::DataError => 0.9,
            AlertType::OverboughtSignal | AlertType::OversoldSignal => 0.62,
            AlertType::SocialBurst => 0.74,
            AlertType::ManipulationRisk => 0.78,
            AlertType::AttentionSpike => 0.58,
            AlertType::HistoricalImpact => 0.57,
            AlertType::PaperEdge => 0.56,
        }
    }
}

/// Value attached to an evidence item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvidenceValue {
    Count(u64),
    Number(f64),
    Text(String),
    Missing,
}

impl From<Option<f64>> for EvidenceValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(EvidenceValue::Missing, EvidenceValue::Number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub field: String,
    pub value: EvidenceValue,
}

impl Evidence {
    fn number(field: &str, value: f64) -> Self {
        Self {
            field: field.to_string(),
            value: EvidenceValue::Number(value),
        }
    }

    fn count(field: &str, value: usize) -> Self {
        Self {
            field: field.to_string(),
            value: EvidenceValue::Count(value as u64),
        }
    }
}

/// A single actionable alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub level: AlertLevel,
    pub coin_id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub confidence: f64,
    pub evidence: Vec<Evidence>,
    #[serde(rename = "ts")]
    pub timestamp: i64,
}

/// `clamp(base + step * evidence_count, 0, 1)`
pub fn confidence_for(base: f64, evidence_count: usize) -> f64 {
    (base + evidence_count as f64 * EVIDENCE_CONFIDENCE_STEP).clamp(0.0, 1.0)
}

impl Alert {
    fn new(
        alert_type: AlertType,
        coin_id: &str,
        message: String,
        evidence: Vec<Evidence>,
        timestamp: i64,
    ) -> Self {
        Self {
            level: alert_type.level(),
            coin_id: coin_id.to_string(),
            alert_type,
            message,
            confidence: confidence_for(alert_type.base_confidence(), evidence.len()),
            evidence,
            timestamp,
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

/// Message and evidence produced by a rule that fired
struct Finding {
    message: String,
    evidence: Vec<Evidence>,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// The fixed set of per-asset rules, evaluated independently
const RULES: [AlertType; 7] = [
    AlertType::OverboughtSignal,
    AlertType::OversoldSignal,
    AlertType::SocialBurst,
    AlertType::ManipulationRisk,
    AlertType::AttentionSpike,
    AlertType::HistoricalImpact,
    AlertType::PaperEdge,
];

fn evaluate(rule: AlertType, s: &AssetSummary, t: &Thresholds) -> Option<Finding> {
    let rsi = finite(s.indicators.rsi14);
    let mention_z = finite(s.social.mention_z);
    let ticker = &s.ticker;

    match rule {
        AlertType::OverboughtSignal => {
            let rsi = rsi.filter(|&v| v >= t.rsi_overbought)?;
            Some(Finding {
                message: format!("{} RSI(14) is {:.1} (overbought zone).", ticker, rsi),
                evidence: vec![Evidence::number("rsi14", rsi)],
            })
        }
        AlertType::OversoldSignal => {
            let rsi = rsi.filter(|&v| v <= t.rsi_oversold)?;
            Some(Finding {
                message: format!("{} RSI(14) is {:.1} (oversold zone).", ticker, rsi),
                evidence: vec![Evidence::number("rsi14", rsi)],
            })
        }
        AlertType::SocialBurst => {
            let z = mention_z.filter(|&v| v >= t.social_burst_z)?;
            Some(Finding {
                message: format!(
                    "{} mentions are elevated (z={:.2}). Volatility risk may be higher.",
                    ticker, z
                ),
                evidence: vec![
                    Evidence::number("mentionZ", z),
                    Evidence::count("matchedPosts", s.social.matched_posts),
                ],
            })
        }
        AlertType::ManipulationRisk => {
            let concentration = Some(s.social.author_concentration)
                .filter(|v| v.is_finite() && *v >= t.manipulation_concentration)?;
            let z = mention_z.filter(|&v| v >= MANIPULATION_MIN_MENTION_Z)?;
            Some(Finding {
                message: format!(
                    "{} has concentrated social activity (concentration={:.2}). Possible coordinated narrative risk.",
                    ticker, concentration
                ),
                evidence: vec![
                    Evidence::number("authorConcentration", concentration),
                    Evidence::number("mentionZ", z),
                ],
            })
        }
        AlertType::AttentionSpike => {
            let z = finite(s.social.attention_z).filter(|&v| v >= t.attention_spike_z)?;
            Some(Finding {
                message: format!("{} Wikipedia attention is elevated (z={:.2}).", ticker, z),
                evidence: vec![Evidence::number("attentionZ", z)],
            })
        }
        AlertType::HistoricalImpact => {
            let impact = &s.event_impact;
            if impact.count == 0 {
                return None;
            }
            let median = finite(impact.median_forward_return)?;
            Some(Finding {
                message: format!(
                    "Similar social bursts historically had median forward return of {:.2}% for {}.",
                    median * 100.0,
                    ticker
                ),
                evidence: vec![
                    Evidence::count("impactCount", impact.count),
                    Evidence::number("medianForwardReturn", median),
                ],
            })
        }
        AlertType::PaperEdge => {
            let paper = &s.paper_trade;
            let avg = finite(paper.avg_return).filter(|&v| v > 0.0)?;
            if paper.trade_count < PAPER_EDGE_MIN_TRADES {
                return None;
            }
            Some(Finding {
                message: format!(
                    "{} paper strategy shows positive average return ({:.2}%) over {} trades.",
                    ticker,
                    avg * 100.0,
                    paper.trade_count
                ),
                evidence: vec![
                    Evidence::number("paperAvgReturn", avg),
                    Evidence::count("paperTradeCount", paper.trade_count),
                    Evidence {
                        field: "paperWinRate".to_string(),
                        value: paper.win_rate.into(),
                    },
                ],
            })
        }
        AlertType::DataError => None,
    }
}

fn data_error_alert(e: &AssetError, timestamp: i64) -> Alert {
    Alert::new(
        AlertType::DataError,
        &e.coin_id,
        format!("Data unavailable: {}", e.error),
        vec![Evidence {
            field: "error".to_string(),
            value: EvidenceValue::Text(e.error.clone()),
        }],
        timestamp,
    )
}

/// All alerts for one summary, before mode filtering
fn alerts_for(summary: &SignalSummary, thresholds: &Thresholds, timestamp: i64) -> Vec<Alert> {
    match summary {
        SignalSummary::Error(e) => vec![data_error_alert(e, timestamp)],
        SignalSummary::Full(s) => RULES
            .iter()
            .filter_map(|&rule| {
                evaluate(rule, s, thresholds).map(|f| {
                    Alert::new(rule, &s.coin_id, f.message, f.evidence, timestamp)
                })
            })
            .collect(),
    }
}

/// Keep alerts allowed by `mode`, ordered by level rank then confidence (both descending)
pub fn filter_and_rank(mut alerts: Vec<Alert>, mode: Mode) -> Vec<Alert> {
    alerts.retain(|a| mode.allows(a.level));
    alerts.sort_by(|a, b| {
        b.level
            .rank()
            .cmp(&a.level.rank())
            .then(b.confidence.total_cmp(&a.confidence))
    });
    alerts
}

// ============================================================================
// Entry points
// ============================================================================

/// Build the ranked alert feed, stamping every alert with `timestamp`
pub fn build_alerts_at(summaries: &[SignalSummary], settings: &Settings, timestamp: i64) -> Vec<Alert> {
    let generated: Vec<Alert> = summaries
        .iter()
        .flat_map(|s| {
            let alerts = alerts_for(s, &settings.thresholds, timestamp);
            debug!(coin = s.coin_id(), alerts = alerts.len(), "Evaluated alert rules");
            alerts
        })
        .collect();
    let generated_count = generated.len();

    let ranked = filter_and_rank(generated, settings.mode);
    info!(
        summaries = summaries.len(),
        generated = generated_count,
        kept = ranked.len(),
        mode = %settings.mode,
        "Alerts built"
    );
    ranked
}

/// Build the ranked alert feed for a snapshot, stamped with the current time
pub fn build_alerts(snapshot: &Snapshot, settings: &Settings) -> Vec<Alert> {
    build_alerts_at(&snapshot.summaries, settings, Utc::now().timestamp_millis())
}
