//! Social burst and attention detection

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::stats;
use crate::types::SocialPost;

/// Default z threshold for a mention burst
pub const DEFAULT_BURST_Z: f64 = 2.5;

/// How far the latest value of `series` sits from the series' own mean,
/// in population standard deviations.
///
/// `None` for an empty series, 0 for a series with no variance.
pub fn z_score(series: &[f64]) -> Option<f64> {
    let latest = *series.last()?;
    let mean = stats::mean(series)?;
    let std = stats::population_std_dev(series)?;
    if std == 0.0 || std.is_nan() {
        return Some(0.0);
    }
    Some((latest - mean) / std)
}

/// Outcome of the mention-burst check for one asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MentionBurst {
    pub z: Option<f64>,
    pub threshold: f64,
    pub burst: bool,
    /// Mentions in the most recent hour
    pub latest: u32,
}

/// Flags a burst when the latest hourly bucket's z-score reaches `threshold`
pub fn detect_mention_burst(windows: &[u32], threshold: f64) -> MentionBurst {
    let series: Vec<f64> = windows.iter().map(|&c| f64::from(c)).collect();
    let z = z_score(&series);
    MentionBurst {
        z,
        threshold,
        burst: matches!(z, Some(value) if value >= threshold),
        latest: windows.last().copied().unwrap_or(0),
    }
}

/// Share of posts coming from the single largest origin group, in `[0, 1]`.
///
/// This is a proxy: it measures concentration across groups (subreddits),
/// not across individual authors. 0 for no posts.
pub fn author_concentration<'a>(posts: impl IntoIterator<Item = &'a SocialPost>) -> f64 {
    let mut grouped: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;
    for post in posts {
        *grouped.entry(post.group.as_str()).or_insert(0) += 1;
        total += 1;
    }

    if total == 0 {
        return 0.0;
    }
    let max_group = grouped.values().copied().max().unwrap_or(0);
    max_group as f64 / total as f64
}
