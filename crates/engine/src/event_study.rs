//! Event-impact study: forward price returns following historical events
//!
//! Each event timestamp is snapped to the nearest price point and the return
//! `forward_steps` points later is measured. Events that cannot be measured
//! (no prices, not enough forward data, zero prices) are dropped silently.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stats;
use crate::types::PricePoint;

/// Default number of price steps looked ahead after an event
pub const DEFAULT_FORWARD_STEPS: usize = 6;

/// One measured event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Impact {
    /// Event timestamp as given (not the snapped price timestamp)
    #[serde(rename = "ts")]
    pub timestamp: i64,
    /// Index of the nearest price point
    #[serde(rename = "idx")]
    pub index: usize,
    pub forward_return: f64,
}

/// Aggregated result of an event-impact study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventImpact {
    pub count: usize,
    pub median_forward_return: Option<f64>,
    pub mean_forward_return: Option<f64>,
    pub impacts: Vec<Impact>,
}

impl EventImpact {
    pub fn empty() -> Self {
        Self {
            count: 0,
            median_forward_return: None,
            mean_forward_return: None,
            impacts: Vec::new(),
        }
    }
}

/// Index of the point closest in time to `timestamp`.
///
/// Linear scan; on equal distance the lowest index wins. `None` for no points.
pub fn nearest_index(points: &[PricePoint], timestamp: i64) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| p.timestamp.abs_diff(timestamp))
        .map(|(i, _)| i)
}

/// Return from `points[start]` to `points[start + steps]`.
///
/// `None` when either index is out of range or either price is zero/NaN.
pub fn forward_return(points: &[PricePoint], start: usize, steps: usize) -> Option<f64> {
    let from = points.get(start)?.price;
    let to = points.get(start.checked_add(steps)?)?.price;
    if from == 0.0 || from.is_nan() || to == 0.0 || to.is_nan() {
        return None;
    }
    Some((to - from) / from)
}

/// Measure forward returns after each event and aggregate them
pub fn event_impact(
    price_points: &[PricePoint],
    event_timestamps: &[i64],
    forward_steps: usize,
) -> EventImpact {
    let impacts: Vec<Impact> = event_timestamps
        .iter()
        .filter_map(|&ts| {
            let index = nearest_index(price_points, ts)?;
            let forward_return = forward_return(price_points, index, forward_steps)?;
            Some(Impact {
                timestamp: ts,
                index,
                forward_return,
            })
        })
        .collect();

    if impacts.len() < event_timestamps.len() {
        debug!(
            events = event_timestamps.len(),
            measured = impacts.len(),
            "Dropped events without a measurable forward return"
        );
    }

    if impacts.is_empty() {
        return EventImpact::empty();
    }

    let values: Vec<f64> = impacts.iter().map(|i| i.forward_return).collect();
    EventImpact {
        count: impacts.len(),
        median_forward_return: stats::lower_median(&values),
        mean_forward_return: stats::mean(&values),
        impacts,
    }
}
