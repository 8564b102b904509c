//! Per-asset summary assembly
//!
//! Takes already-fetched inputs (prices, posts, attention, article counts)
//! and derives every signal for each watched asset. No I/O happens here;
//! provider failures arrive as values and become error summaries.

use tracing::{debug, info, warn};

use crate::burst::{author_concentration, detect_mention_burst, z_score};
use crate::config::EngineConfig;
use crate::event_study::event_impact;
use crate::indicators::{compute_returns, realized_volatility, rsi};
use crate::paper_trade::simulate_rsi_long_only;
use crate::scoring::{signal_score, ScoreInputs};
use crate::settings::Settings;
use crate::stats;
use crate::summary::{AssetError, AssetSummary, IndicatorBlock, SignalSummary, SocialBlock, Snapshot};
use crate::types::{AttentionPoint, PriceSeries, SocialPost};

const HOUR_MS: i64 = 3_600_000;

// ============================================================================
// Asset metadata
// ============================================================================

/// Display ticker and reference article for an asset id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinMeta {
    pub ticker: String,
    pub wiki: String,
}

/// Known asset metadata; unknown ids use the upper-cased id as ticker
pub fn coin_meta(coin_id: &str) -> CoinMeta {
    let known = match coin_id {
        "bitcoin" => Some(("BTC", "Bitcoin")),
        "ethereum" => Some(("ETH", "Ethereum")),
        "solana" => Some(("SOL", "Solana")),
        "dogecoin" => Some(("DOGE", "Dogecoin")),
        "ripple" => Some(("XRP", "XRP")),
        "cardano" => Some(("ADA", "Cardano")),
        _ => None,
    };
    match known {
        Some((ticker, wiki)) => CoinMeta {
            ticker: ticker.to_string(),
            wiki: wiki.to_string(),
        },
        None => CoinMeta {
            ticker: coin_id.to_uppercase(),
            wiki: coin_id.to_string(),
        },
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Everything fetched for one watched asset
#[derive(Debug, Clone, PartialEq)]
pub struct AssetInput {
    pub coin_id: String,
    /// Price history, or the reason it could not be fetched
    pub prices: Result<PriceSeries, String>,
    /// Page-view series; `None` when the attention source failed
    pub attention: Option<Vec<AttentionPoint>>,
    /// Article count; `None` when the news source failed
    pub news_count: Option<usize>,
}

// ============================================================================
// Social helpers
// ============================================================================

/// Case-insensitive match of the asset id or ticker in the post's title and body
pub fn post_matches(post: &SocialPost, coin_id: &str, ticker: &str) -> bool {
    let blob = format!("{}\n{}", post.title, post.text).to_lowercase();
    blob.contains(&coin_id.to_lowercase()) || blob.contains(&ticker.to_lowercase())
}

/// Count posts per hour over the last `hours` hours, most recent hour last.
///
/// Posts without a creation time, from the future, or older than the
/// horizon are ignored.
pub fn hour_buckets(posts: &[&SocialPost], now_ms: i64, hours: usize) -> Vec<u32> {
    let mut buckets = vec![0u32; hours];
    let horizon_ms = (hours as i64).saturating_mul(HOUR_MS);

    for post in posts {
        if post.created_at == 0 {
            continue;
        }
        let Some(age) = now_ms.checked_sub(post.created_at) else {
            continue;
        };
        if age < 0 || age > horizon_ms {
            continue;
        }
        let index = hours as i64 - 1 - age / HOUR_MS;
        if (0..hours as i64).contains(&index) {
            buckets[index as usize] += 1;
        }
    }

    buckets
}

/// Timestamps of the hourly buckets that count as burst events: at least
/// `mean + 2 * std` (population) and non-zero.
pub fn event_times_from_windows(windows: &[u32], now_ms: i64) -> Vec<i64> {
    let series: Vec<f64> = windows.iter().map(|&c| f64::from(c)).collect();
    let (Some(mean), Some(std)) = (stats::mean(&series), stats::population_std_dev(&series)) else {
        return Vec::new();
    };
    let cutoff = mean + 2.0 * std;

    windows
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0 && f64::from(count) >= cutoff)
        .map(|(idx, _)| {
            let hours_ago = (windows.len() - 1 - idx) as i64;
            now_ms - hours_ago * HOUR_MS
        })
        .collect()
}

/// z-score of the finite page-view counts; `None` without usable data
fn attention_z_score(attention: Option<&[AttentionPoint]>) -> Option<f64> {
    let views: Vec<f64> = attention?
        .iter()
        .map(|p| p.views)
        .filter(|v| v.is_finite())
        .collect();
    z_score(&views)
}

// ============================================================================
// Summary assembly
// ============================================================================

/// Derive the full signal summary for one asset
pub fn summarize_asset(
    input: &AssetInput,
    posts: &[SocialPost],
    settings: &Settings,
    config: &EngineConfig,
    now_ms: i64,
) -> SignalSummary {
    let series = match &input.prices {
        Ok(series) => series,
        Err(reason) => {
            warn!(coin = %input.coin_id, error = %reason, "Price data unavailable");
            return SignalSummary::Error(AssetError {
                coin_id: input.coin_id.clone(),
                error: format!("price fetch failed: {}", reason),
            });
        }
    };
    let meta = coin_meta(&input.coin_id);
    let thresholds = &settings.thresholds;

    let returns = compute_returns(&series.points);
    let current_rsi = rsi(&series.points, config.rsi_period);
    let volatility = realized_volatility(&returns);

    let matched: Vec<&SocialPost> = posts
        .iter()
        .filter(|p| post_matches(p, &input.coin_id, &meta.ticker))
        .collect();
    let windows = hour_buckets(&matched, now_ms, config.mention_horizon_hours);
    let mention_burst = detect_mention_burst(&windows, thresholds.social_burst_z);
    let mention_z = mention_burst.z;

    let events = event_times_from_windows(&windows, now_ms);
    let impact = event_impact(&series.points, &events, config.event_forward_steps);

    let attention_z = attention_z_score(input.attention.as_deref());
    let concentration = author_concentration(matched.iter().copied());

    let score = signal_score(&ScoreInputs {
        rsi14: current_rsi,
        mention_z,
        attention_z,
        realized_volatility: volatility,
    });

    let paper_trade = simulate_rsi_long_only(
        &series.points,
        &config.paper_trade(thresholds.rsi_oversold),
    );

    debug!(
        coin = %input.coin_id,
        rsi = ?current_rsi,
        mention_z = ?mention_z,
        attention_z = ?attention_z,
        score,
        matched = matched.len(),
        "Asset summarized"
    );

    SignalSummary::Full(Box::new(AssetSummary {
        coin_id: input.coin_id.clone(),
        ticker: meta.ticker,
        captured_at: now_ms,
        price_source: series.source.clone(),
        last_price: series.last_price,
        signal_score: score,
        indicators: IndicatorBlock {
            rsi14: current_rsi,
            realized_volatility: volatility,
        },
        paper_trade,
        social: SocialBlock {
            mention_windows: windows,
            mention_z,
            mention_burst,
            author_concentration: concentration,
            reddit_posts_scanned: posts.len(),
            matched_posts: matched.len(),
            news_count: input.news_count.unwrap_or(0),
            attention_z,
        },
        event_impact: impact,
    }))
}

/// Summarize every asset, in input order
pub fn build_snapshot(
    inputs: &[AssetInput],
    posts: &[SocialPost],
    settings: &Settings,
    config: &EngineConfig,
    now_ms: i64,
) -> Snapshot {
    info!(
        assets = inputs.len(),
        posts = posts.len(),
        "Building signal snapshot"
    );

    let summaries: Vec<SignalSummary> = inputs
        .iter()
        .map(|input| summarize_asset(input, posts, settings, config, now_ms))
        .collect();

    let errors = summaries.iter().filter(|s| s.is_error()).count();
    info!(
        summaries = summaries.len(),
        errors,
        "Signal snapshot built"
    );

    Snapshot {
        generated_at: now_ms,
        settings_used: settings.clone(),
        summaries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;

    const NOW: i64 = 1_700_000_000_000;

    fn make_post(id: &str, group: &str, title: &str, hours_ago: f64) -> SocialPost {
        SocialPost {
            id: id.to_string(),
            group: group.to_string(),
            title: title.to_string(),
            text: String::new(),
            score: 1,
            comments: 0,
            created_at: NOW - (hours_ago * HOUR_MS as f64) as i64,
            permalink: format!("https://reddit.com/r/{}/{}", group, id),
        }
    }

    #[test]
    fn test_coin_meta() {
        assert_eq!(coin_meta("bitcoin").ticker, "BTC");
        assert_eq!(coin_meta("ripple").wiki, "XRP");
        let unknown = coin_meta("pepe");
        assert_eq!(unknown.ticker, "PEPE");
        assert_eq!(unknown.wiki, "pepe");
    }

    #[test]
    fn test_post_matches_is_case_insensitive() {
        let post = make_post("1", "CryptoCurrency", "Why is btc pumping?", 1.0);
        assert!(post_matches(&post, "bitcoin", "BTC"));
        assert!(!post_matches(&post, "ethereum", "ETH"));

        let mut body = make_post("2", "ethtrader", "Daily thread", 1.0);
        body.text = "Ethereum gas is low".to_string();
        assert!(post_matches(&body, "ethereum", "ETH"));
    }

    #[test]
    fn test_hour_buckets() {
        let posts = vec![
            make_post("a", "g", "x", 0.5),
            make_post("b", "g", "x", 0.9),
            make_post("c", "g", "x", 5.5),
            make_post("d", "g", "x", 30.0),
            make_post("e", "g", "x", -1.0),
        ];
        let mut undated = make_post("f", "g", "x", 0.0);
        undated.created_at = 0;

        let refs: Vec<&SocialPost> = posts.iter().chain(std::iter::once(&undated)).collect();
        let buckets = hour_buckets(&refs, NOW, 24);

        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[23], 2);
        assert_eq!(buckets[18], 1);
        assert_eq!(buckets.iter().sum::<u32>(), 3);
    }

    #[test]
    fn test_hour_buckets_ignore_out_of_range_timestamps() {
        let mut ancient = make_post("a", "g", "x", 1.0);
        ancient.created_at = i64::MIN + 1;
        let mut far_future = make_post("b", "g", "x", 1.0);
        far_future.created_at = i64::MAX;

        let buckets = hour_buckets(&[&ancient, &far_future], NOW, 24);
        assert_eq!(buckets, vec![0u32; 24]);
    }

    #[test]
    fn test_hour_buckets_respect_horizon_length() {
        assert_eq!(hour_buckets(&[], NOW, 48).len(), 48);
        assert!(hour_buckets(&[], NOW, 0).is_empty());
    }

    #[test]
    fn test_event_times_from_windows() {
        let mut windows = vec![0u32; 24];
        windows[20] = 9;
        let events = event_times_from_windows(&windows, NOW);
        assert_eq!(events, vec![NOW - 3 * HOUR_MS]);

        assert!(event_times_from_windows(&[0; 24], NOW).is_empty());
        assert!(event_times_from_windows(&[], NOW).is_empty());
    }

    #[test]
    fn test_error_input_becomes_error_summary() {
        let input = AssetInput {
            coin_id: "solana".to_string(),
            prices: Err("HTTP 500".to_string()),
            attention: None,
            news_count: None,
        };
        let config = EngineConfig::default();
        let settings = Settings::defaults_from_config(&config);

        match summarize_asset(&input, &[], &settings, &config, NOW) {
            SignalSummary::Error(e) => {
                assert_eq!(e.coin_id, "solana");
                assert_eq!(e.error, "price fetch failed: HTTP 500");
            }
            other => panic!("expected error summary, got {:?}", other),
        }
    }

    #[test]
    fn test_attention_z_tolerates_missing_data() {
        assert_eq!(attention_z_score(None), None);
        assert_eq!(attention_z_score(Some(&[][..])), None);

        let points = vec![
            AttentionPoint { timestamp: Some(0), views: 100.0 },
            AttentionPoint { timestamp: None, views: f64::NAN },
            AttentionPoint { timestamp: Some(2), views: 100.0 },
        ];
        assert_eq!(attention_z_score(Some(points.as_slice())), Some(0.0));
    }

    #[test]
    fn test_summary_uses_configured_horizon() {
        let points: Vec<PricePoint> = (0..30)
            .map(|i| PricePoint::new(NOW - (29 - i) * HOUR_MS, 100.0 + i as f64))
            .collect();
        let input = AssetInput {
            coin_id: "bitcoin".to_string(),
            prices: Ok(PriceSeries::new("binance", points)),
            attention: None,
            news_count: Some(3),
        };
        let config = EngineConfig {
            mention_horizon_hours: 12,
            ..Default::default()
        };
        let settings = Settings::defaults_from_config(&config);
        let posts = vec![make_post("1", "Bitcoin", "BTC to the moon", 0.2)];

        let SignalSummary::Full(summary) = summarize_asset(&input, &posts, &settings, &config, NOW)
        else {
            panic!("expected full summary");
        };
        assert_eq!(summary.social.mention_windows.len(), 12);
        assert_eq!(summary.social.matched_posts, 1);
        assert_eq!(summary.social.news_count, 3);
        assert_eq!(summary.social.author_concentration, 1.0);
        assert_eq!(summary.indicators.rsi14, Some(100.0));
        assert_eq!(summary.last_price, Some(129.0));
        assert_eq!(summary.price_source, "binance");
    }
}
