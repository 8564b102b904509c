//! Price indicators: simple returns, trailing-window RSI and realized volatility
//!
//! All calculators are pure functions over a price slice. Too little data is
//! reported as `None` rather than an error.

use crate::stats;
use crate::types::{PricePoint, ReturnPoint};

/// Default RSI lookback
pub const DEFAULT_RSI_PERIOD: usize = 14;

// ============================================================================
// Returns
// ============================================================================

/// One return per consecutive price pair, stamped with the later timestamp.
///
/// A zero (or NaN) previous price yields a return of 0 instead of dividing by it.
pub fn compute_returns(prices: &[PricePoint]) -> Vec<ReturnPoint> {
    prices
        .windows(2)
        .map(|pair| {
            let prev = pair[0].price;
            let cur = pair[1].price;
            let ret = if prev == 0.0 || prev.is_nan() {
                0.0
            } else {
                (cur - prev) / prev
            };
            ReturnPoint {
                timestamp: pair[1].timestamp,
                ret,
            }
        })
        .collect()
}

// ============================================================================
// RSI
// ============================================================================

/// Relative Strength Index over the trailing `period` price changes.
///
/// Gains and losses are plain averages over the window (no Wilder smoothing).
/// Returns `None` when there are not more than `period` prices. When no loss
/// is observed in the window the result is 100, which includes a perfectly
/// flat window.
pub fn rsi(prices: &[PricePoint], period: usize) -> Option<f64> {
    if period == 0 || prices.len() <= period {
        return None;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in (prices.len() - period)..prices.len() {
        let delta = prices[i].price - prices[i - 1].price;
        if delta >= 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

// ============================================================================
// Volatility
// ============================================================================

/// Population standard deviation of the per-step returns
pub fn realized_volatility(returns: &[ReturnPoint]) -> Option<f64> {
    let values: Vec<f64> = returns.iter().map(|r| r.ret).collect();
    stats::population_std_dev(&values)
}
