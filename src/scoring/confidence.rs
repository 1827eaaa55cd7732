//! Configuration-driven confidence scorer
//!
//! Combines independently weighted factors into a single 0-100 score,
//! maps it to a named confidence band, and derives a recommendation.
//! An edge-quality table can override the band recommendation when a
//! predicted probability is supplied. Risk adjustment is a separate,
//! opt-in multiplicative pass on the sizing confidence only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{FactorKind, ScoringConfig};
use crate::domain::{to_f64, NewsSignal};
use crate::scoring::factors::{news_factor, time_factor, volume_factor, FactorBreakdown};

/// Coarse trading recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongYes,
    Yes,
    Hold,
    No,
    StrongNo,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::StrongYes => write!(f, "strong_yes"),
            Recommendation::Yes => write!(f, "yes"),
            Recommendation::Hold => write!(f, "hold"),
            Recommendation::No => write!(f, "no"),
            Recommendation::StrongNo => write!(f, "strong_no"),
        }
    }
}

/// Inputs for one scoring pass; any subset may be present
#[derive(Debug, Clone, Default)]
pub struct ScoreInput {
    pub news: Option<NewsSignal>,
    pub volume_24h: Option<Decimal>,
    pub days_to_resolution: Option<f64>,
    /// Model probability estimate, enables the edge-quality override
    pub predicted_probability: Option<f64>,
    pub current_price: Option<Decimal>,
}

/// Result of a scoring pass
#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceResult {
    /// Weighted total in [0, 100]
    pub total_score: f64,
    /// Name of the matched confidence band
    pub band: String,
    pub recommendation: Recommendation,
    pub breakdown: Vec<FactorBreakdown>,
}

impl ConfidenceResult {
    /// Total score expressed as a [0, 1] confidence
    pub fn as_confidence(&self) -> f64 {
        self.total_score / 100.0
    }
}

/// Portfolio context for the risk-adjustment pass
#[derive(Debug, Clone, Default)]
pub struct RiskContext {
    /// Candidate position size as a fraction of the portfolio
    pub position_fraction: Option<f64>,
    /// Number of currently open positions
    pub open_positions: Option<usize>,
    /// Recent price volatility of the market
    pub volatility: Option<f64>,
    /// 24h volume of the market
    pub volume_24h: Option<Decimal>,
}

/// Configuration-driven multi-factor scorer
///
/// Construct once at the composition root and share; scoring is pure.
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    config: ScoringConfig,
}

impl ConfidenceScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score the supplied factors
    ///
    /// Missing or zero-weight factor sets reduce to a neutral 50/100
    /// result rather than an error.
    pub fn score(&self, input: &ScoreInput) -> ConfidenceResult {
        let mut factors: Vec<(FactorKind, f64, f64, String)> = Vec::new();

        for fw in &self.config.factors {
            if !fw.enabled {
                continue;
            }
            let scored = match fw.factor {
                FactorKind::NewsSentiment => input.news.as_ref().map(news_factor),
                FactorKind::Volume => input
                    .volume_24h
                    .map(|v| volume_factor(&self.config.volume_tiers, v)),
                FactorKind::TimeToResolution => input
                    .days_to_resolution
                    .map(|d| time_factor(&self.config.time_tiers, d)),
            };
            if let Some((score, label)) = scored {
                factors.push((fw.factor, fw.weight, score, label));
            }
        }

        let weight_sum: f64 = factors.iter().map(|(_, w, _, _)| w).sum();
        if factors.is_empty() || weight_sum <= 0.0 {
            debug!("No enabled factors with inputs, returning neutral score");
            return self.neutral_result(input);
        }

        if (weight_sum - 1.0).abs() > 1e-3 {
            warn!(
                weight_sum,
                "Factor weights do not sum to 1.0, renormalizing"
            );
        }

        let mut total = 0.0;
        let mut breakdown = Vec::with_capacity(factors.len());
        for (factor, weight, score, label) in factors {
            let normalized = weight / weight_sum;
            total += normalized * score * 100.0;
            breakdown.push(FactorBreakdown {
                factor: factor.to_string(),
                label,
                score,
                weight: normalized,
            });
        }
        let total = total.clamp(0.0, 100.0);

        let band = self.band_for(total);
        let recommendation = self
            .edge_override(input, total)
            .unwrap_or(band.recommendation);

        ConfidenceResult {
            total_score: total,
            band: band.name.clone(),
            recommendation,
            breakdown,
        }
    }

    /// Apply configured risk rules to a sizing confidence
    ///
    /// Each matching rule multiplies the confidence by its sub-1.0
    /// factor; the result is clamped to the configured maximum so the
    /// engine never reports certainty.
    pub fn adjust_for_risk(&self, confidence: f64, context: &RiskContext) -> f64 {
        let rules = &self.config.risk;
        let mut adjusted = confidence;

        if let Some(fraction) = context.position_fraction {
            if fraction > rules.large_position_fraction {
                adjusted *= rules.large_position_factor;
                debug!(fraction, "Large-position risk adjustment applied");
            }
        }
        if let Some(count) = context.open_positions {
            if count >= rules.concentration_count {
                adjusted *= rules.concentration_factor;
                debug!(count, "Concentration risk adjustment applied");
            }
        }
        if let Some(volatility) = context.volatility {
            if volatility > rules.volatility_threshold {
                adjusted *= rules.volatility_factor;
                debug!(volatility, "Volatility risk adjustment applied");
            }
        }
        if let Some(volume) = context.volume_24h {
            if volume < rules.low_liquidity_volume {
                adjusted *= rules.low_liquidity_factor;
                debug!(%volume, "Low-liquidity risk adjustment applied");
            }
        }

        adjusted.clamp(0.0, rules.max_confidence)
    }

    fn neutral_result(&self, input: &ScoreInput) -> ConfidenceResult {
        let band = self.band_for(50.0);
        ConfidenceResult {
            total_score: 50.0,
            band: band.name.clone(),
            recommendation: self.edge_override(input, 50.0).unwrap_or(band.recommendation),
            breakdown: Vec::new(),
        }
    }

    /// First configured band containing the score
    ///
    /// `max_score` is exclusive except for the final band, so every
    /// score in [0, 100] matches exactly one band.
    fn band_for(&self, score: f64) -> &crate::config::ConfidenceBand {
        let bands = &self.config.bands;
        for (i, band) in bands.iter().enumerate() {
            let last = i == bands.len() - 1;
            if score >= band.min_score && (score < band.max_score || (last && score <= band.max_score))
            {
                return band;
            }
        }
        // Bands tile [0, 100] by validation; out-of-range scores are
        // already clamped
        &bands[bands.len() - 1]
    }

    /// Edge-quality override, taking precedence over the band
    /// recommendation when a qualifying edge and sufficient score exist
    fn edge_override(&self, input: &ScoreInput, total: f64) -> Option<Recommendation> {
        let predicted = input.predicted_probability?;
        let price = input.current_price?;
        let edge = predicted - to_f64(price);

        for rule in &self.config.edge_rules {
            if edge.abs() >= rule.min_edge && total >= rule.min_score {
                let rec = match (edge > 0.0, rule.strong) {
                    (true, true) => Recommendation::StrongYes,
                    (true, false) => Recommendation::Yes,
                    (false, true) => Recommendation::StrongNo,
                    (false, false) => Recommendation::No,
                };
                return Some(rec);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SignalDirection;
    use rust_decimal_macros::dec;

    fn scorer() -> ConfidenceScorer {
        ConfidenceScorer::new(ScoringConfig::default())
    }

    fn bullish_signal(confidence: f64) -> NewsSignal {
        let mut s = NewsSignal::absent("q");
        s.direction = SignalDirection::Bullish;
        s.confidence = confidence;
        s
    }

    #[test]
    fn test_empty_input_neutral() {
        let result = scorer().score(&ScoreInput::default());
        assert_eq!(result.total_score, 50.0);
        assert_eq!(result.band, "moderate");
        assert_eq!(result.recommendation, Recommendation::Hold);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_weights_normalized() {
        let mut config = ScoringConfig::default();
        // Deliberately mis-scaled weights
        for fw in &mut config.factors {
            fw.weight *= 3.0;
        }
        let scorer = ConfidenceScorer::new(config);
        let result = scorer.score(&ScoreInput {
            news: Some(bullish_signal(0.8)),
            volume_24h: Some(dec!(500000)),
            days_to_resolution: Some(5.0),
            ..Default::default()
        });
        let used: f64 = result.breakdown.iter().map(|b| b.weight).sum();
        assert!((used - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_partial_factors_renormalize() {
        // Only volume supplied: its 0.35 weight becomes the whole sum
        let result = scorer().score(&ScoreInput {
            volume_24h: Some(dec!(500000)),
            ..Default::default()
        });
        assert_eq!(result.breakdown.len(), 1);
        assert!((result.breakdown[0].weight - 1.0).abs() < 1e-9);
        assert_eq!(result.total_score, 100.0);
    }

    #[test]
    fn test_every_score_hits_exactly_one_band() {
        let s = scorer();
        for i in 0..=1000 {
            let score = i as f64 / 10.0;
            let matches = s
                .config
                .bands
                .iter()
                .enumerate()
                .filter(|(idx, b)| {
                    let last = *idx == s.config.bands.len() - 1;
                    score >= b.min_score
                        && (score < b.max_score || (last && score <= b.max_score))
                })
                .count();
            assert_eq!(matches, 1, "score {score} matched {matches} bands");
        }
    }

    #[test]
    fn test_edge_override_beats_band() {
        // Strong factors put the band at "high" (Yes); a large negative
        // edge flips the recommendation
        let result = scorer().score(&ScoreInput {
            news: Some(bullish_signal(0.8)),
            volume_24h: Some(dec!(500000)),
            days_to_resolution: Some(5.0),
            predicted_probability: Some(0.30),
            current_price: Some(dec!(0.55)),
        });
        assert!(result.total_score >= 70.0);
        assert_eq!(result.recommendation, Recommendation::StrongNo);
    }

    #[test]
    fn test_small_edge_falls_back_to_band() {
        let result = scorer().score(&ScoreInput {
            news: Some(bullish_signal(0.8)),
            volume_24h: Some(dec!(500000)),
            days_to_resolution: Some(5.0),
            predicted_probability: Some(0.56),
            current_price: Some(dec!(0.55)),
        });
        // Edge of 0.01 qualifies for no rule; the band decides
        assert_eq!(result.recommendation, Recommendation::StrongYes);
    }

    #[test]
    fn test_risk_adjustment_multiplies_and_clamps() {
        let s = scorer();
        let adjusted = s.adjust_for_risk(
            0.9,
            &RiskContext {
                position_fraction: Some(0.5),
                open_positions: Some(8),
                volatility: Some(0.3),
                volume_24h: Some(dec!(100)),
            },
        );
        // 0.9 * 0.85 * 0.90 * 0.85 * 0.80
        assert!((adjusted - 0.9 * 0.85 * 0.90 * 0.85 * 0.80).abs() < 1e-9);

        // Never reaches certainty
        let clamped = s.adjust_for_risk(1.5, &RiskContext::default());
        assert!(clamped <= 0.95);
    }

    #[test]
    fn test_risk_adjustment_ignores_missing_context() {
        let s = scorer();
        assert_eq!(s.adjust_for_risk(0.8, &RiskContext::default()), 0.8);
    }
}
