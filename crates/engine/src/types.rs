//! Input types for the signal engine

use serde::{Deserialize, Serialize};

/// A single price observation (close price at `timestamp`, ms since epoch)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(rename = "ts")]
    pub timestamp: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Simple one-step return derived from two consecutive prices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    #[serde(rename = "ts")]
    pub timestamp: i64,
    pub ret: f64,
}

/// A normalized social post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPost {
    pub id: String,
    /// Origin group (subreddit)
    #[serde(rename = "subreddit")]
    pub group: String,
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub comments: i64,
    /// Creation time in ms; 0 when the source did not report one
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub permalink: String,
}

/// Daily page-view count for an asset's reference article
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttentionPoint {
    #[serde(rename = "ts")]
    pub timestamp: Option<i64>,
    pub views: f64,
}

/// A normalized price history as delivered by a price provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSeries {
    /// Provider name (e.g. "coingecko", "binance")
    pub source: String,
    pub points: Vec<PricePoint>,
    pub last_price: Option<f64>,
    /// Set when a fallback provider was used, describing the primary failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_from: Option<String>,
}

impl PriceSeries {
    pub fn new(source: impl Into<String>, points: Vec<PricePoint>) -> Self {
        let last_price = points.last().map(|p| p.price);
        Self {
            source: source.into(),
            points,
            last_price,
            fallback_from: None,
        }
    }
}
