//! Composite per-asset signal score

use serde::{Deserialize, Serialize};

const BASELINE: f64 = 50.0;
const OVERSOLD_RSI: f64 = 30.0;
const OVERBOUGHT_RSI: f64 = 70.0;

/// Signals folded into the composite score. Missing or non-finite inputs
/// simply drop their term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInputs {
    pub rsi14: Option<f64>,
    pub mention_z: Option<f64>,
    pub attention_z: Option<f64>,
    pub realized_volatility: Option<f64>,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Score in `[0, 100]`, 50 being neutral.
///
/// - oversold RSI (<= 30): +8, overbought RSI (>= 70): -6
/// - mention z clamped to [-3, 3], weight 4
/// - attention z clamped to [-3, 3], weight 2
/// - volatility penalty `vol * 1000`, clamped to [0, 10]
pub fn signal_score(inputs: &ScoreInputs) -> u8 {
    let mut score = BASELINE;

    if let Some(rsi) = finite(inputs.rsi14) {
        if rsi <= OVERSOLD_RSI {
            score += 8.0;
        }
        if rsi >= OVERBOUGHT_RSI {
            score -= 6.0;
        }
    }
    if let Some(z) = finite(inputs.mention_z) {
        score += z.clamp(-3.0, 3.0) * 4.0;
    }
    if let Some(z) = finite(inputs.attention_z) {
        score += z.clamp(-3.0, 3.0) * 2.0;
    }
    if let Some(vol) = finite(inputs.realized_volatility) {
        score -= (vol * 1000.0).clamp(0.0, 10.0);
    }

    score.round().clamp(0.0, 100.0) as u8
}
