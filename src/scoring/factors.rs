//! Factor threshold tables
//!
//! Each factor maps a raw domain value through a configured table to a
//! score in [0, 1] and a categorical label.

use rust_decimal::Decimal;

use crate::config::{TimeTier, VolumeTier};
use crate::domain::{NewsSignal, SignalDirection};

/// One factor's contribution to a confidence score
#[derive(Debug, Clone, serde::Serialize)]
pub struct FactorBreakdown {
    pub factor: String,
    /// Categorical label from the threshold table (e.g. "high")
    pub label: String,
    /// Factor score in [0, 1]
    pub score: f64,
    /// Normalized weight used in the final sum
    pub weight: f64,
}

/// Map 24h volume through the tier table
///
/// Tiers are ordered by descending `min_volume`; the first tier the
/// value meets wins.
pub fn volume_factor(tiers: &[VolumeTier], volume: Decimal) -> (f64, String) {
    for tier in tiers {
        if volume >= tier.min_volume {
            return (tier.score, tier.label.clone());
        }
    }
    (0.0, "unknown".to_string())
}

/// Map days-to-resolution through the tier table
///
/// Tiers are ordered by ascending `max_days`; the first tier covering
/// the value wins.
pub fn time_factor(tiers: &[TimeTier], days: f64) -> (f64, String) {
    for tier in tiers {
        if days <= tier.max_days {
            return (tier.score, tier.label.clone());
        }
    }
    (0.0, "unknown".to_string())
}

/// Map a news signal to a factor score
///
/// Bullish pushes above 0.5 by its confidence, bearish symmetrically
/// below, neutral sits at 0.5.
pub fn news_factor(signal: &NewsSignal) -> (f64, String) {
    let score = match signal.direction {
        SignalDirection::Bullish => 0.5 + signal.confidence / 2.0,
        SignalDirection::Bearish => 0.5 - signal.confidence / 2.0,
        SignalDirection::Neutral => 0.5,
    };
    (score.clamp(0.0, 1.0), signal.direction.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use rust_decimal_macros::dec;

    #[test]
    fn test_volume_tiers() {
        let tiers = ScoringConfig::default().volume_tiers;
        assert_eq!(volume_factor(&tiers, dec!(500000)).1, "high");
        assert_eq!(volume_factor(&tiers, dec!(30000)).1, "medium");
        assert_eq!(volume_factor(&tiers, dec!(6000)).1, "low");
        assert_eq!(volume_factor(&tiers, dec!(100)).1, "very_low");
    }

    #[test]
    fn test_time_tiers() {
        let tiers = ScoringConfig::default().time_tiers;
        assert_eq!(time_factor(&tiers, 1.0).1, "imminent");
        assert_eq!(time_factor(&tiers, 10.0).1, "near");
        assert_eq!(time_factor(&tiers, 30.0).1, "medium");
        assert_eq!(time_factor(&tiers, 200.0).1, "distant");
    }

    #[test]
    fn test_news_factor_direction() {
        let mut signal = NewsSignal::absent("q");
        assert_eq!(news_factor(&signal).0, 0.5);

        signal.direction = SignalDirection::Bullish;
        signal.confidence = 0.8;
        assert!((news_factor(&signal).0 - 0.9).abs() < 1e-9);

        signal.direction = SignalDirection::Bearish;
        assert!((news_factor(&signal).0 - 0.1).abs() < 1e-9);
    }
}
