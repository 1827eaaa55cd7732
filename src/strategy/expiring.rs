//! Near-expiry extreme-probability strategy
//!
//! Restricted to markets inside a configured expiry window with enough
//! volume. Any outcome priced at or above the extreme threshold is
//! flagged as near-certain; an outcome priced at or below the
//! complementary level flags its complement. Confidence blends how far
//! past the threshold the price sits with how close expiry is.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

use crate::config::ExpiringConfig;
use crate::domain::{to_f64, MarketOpportunity, MarketSnapshot, Position};
use crate::error::Result;
use crate::providers::MarketDataProvider;
use crate::strategy::helpers::scan_markets;
use crate::strategy::traits::Strategy;

pub struct ExpiringStrategy {
    config: ExpiringConfig,
    markets: Arc<dyn MarketDataProvider>,
}

impl ExpiringStrategy {
    pub fn new(config: ExpiringConfig, markets: Arc<dyn MarketDataProvider>) -> Self {
        Self { config, markets }
    }

    /// Blend distance past the threshold with proximity to expiry into
    /// a confidence in [0.80, 0.95]
    fn near_certain_confidence(&self, price: Decimal, hours_to_expiry: f64) -> f64 {
        let extreme = to_f64(self.config.extreme_threshold);
        let past_threshold = if extreme < 1.0 {
            ((to_f64(price) - extreme) / (1.0 - extreme)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let window = self.config.max_hours_to_expiry - self.config.min_hours_to_expiry;
        let closeness = if window > 0.0 {
            (1.0 - (hours_to_expiry - self.config.min_hours_to_expiry) / window).clamp(0.0, 1.0)
        } else {
            1.0
        };

        0.80 + 0.15 * (0.5 * past_threshold + 0.5 * closeness)
    }

    fn near_certain_opportunity(
        &self,
        market: &MarketSnapshot,
        outcome_idx: usize,
        hours_to_expiry: f64,
    ) -> MarketOpportunity {
        let price = market.prices[outcome_idx];
        let confidence = self.near_certain_confidence(price, hours_to_expiry);
        // Near-certain outcomes are modeled just shy of certainty
        let predicted = 0.98_f64.max(to_f64(price));

        MarketOpportunity {
            market_id: market.id.clone(),
            outcome: market.outcomes[outcome_idx].clone(),
            current_price: price,
            predicted_probability: predicted,
            confidence,
            expected_value: (predicted - to_f64(price)) * 100.0,
            risk_score: 0.1,
            signals: vec![
                format!(
                    "{} priced {:.2} at or above extreme threshold {:.2}",
                    market.outcomes[outcome_idx], price, self.config.extreme_threshold
                ),
                format!("{hours_to_expiry:.1}h to expiry"),
            ],
            strategy: "expiring".to_string(),
        }
    }
}

#[async_trait]
impl Strategy for ExpiringStrategy {
    fn id(&self) -> &str {
        "expiring"
    }

    fn name(&self) -> &str {
        "Expiring Markets"
    }

    fn is_active(&self) -> bool {
        self.config.enabled
    }

    async fn find_opportunities(
        &self,
        open_positions: &[Position],
    ) -> Result<Vec<MarketOpportunity>> {
        scan_markets(self, self.markets.as_ref(), open_positions).await
    }

    async fn analyze_market(&self, market: &MarketSnapshot) -> Result<Vec<MarketOpportunity>> {
        if !market.is_well_formed() {
            return Ok(Vec::new());
        }
        let Some(hours) = market.hours_to_expiry(Utc::now()) else {
            return Ok(Vec::new());
        };
        if hours < self.config.min_hours_to_expiry || hours > self.config.max_hours_to_expiry {
            return Ok(Vec::new());
        }
        if market.volume_24h < self.config.min_volume {
            debug!(market = %market.id, "Expiring market below volume floor");
            return Ok(Vec::new());
        }

        let floor = Decimal::ONE - self.config.extreme_threshold;
        let mut flagged: Vec<usize> = Vec::new();

        for (idx, price) in market.prices.iter().enumerate() {
            if *price >= self.config.extreme_threshold {
                flagged.push(idx);
            } else if *price <= floor && market.outcomes.len() == 2 && market.prices.len() == 2 {
                // The complementary outcome of a collapsed price is the
                // near-certain side, even when its own quote sits just
                // under the threshold
                let complement = 1 - idx;
                if market.prices[complement] < self.config.extreme_threshold {
                    flagged.push(complement);
                }
            }
        }

        flagged.sort_unstable();
        flagged.dedup();

        Ok(flagged
            .into_iter()
            .map(|idx| self.near_certain_opportunity(market, idx, hours))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::StaticMarkets;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn strategy() -> ExpiringStrategy {
        ExpiringStrategy::new(
            ExpiringConfig::default(),
            Arc::new(StaticMarkets::new(vec![])),
        )
    }

    fn market(yes: Decimal, no: Decimal, hours: i64, volume: Decimal) -> MarketSnapshot {
        MarketSnapshot {
            id: "m1".to_string(),
            question: "Almost settled?".to_string(),
            outcomes: vec!["Yes".to_string(), "No".to_string()],
            prices: vec![yes, no],
            volume_24h: volume,
            end_date: Some(Utc::now() + Duration::hours(hours)),
        }
    }

    #[tokio::test]
    async fn test_extreme_yes_flagged() {
        let opps = strategy()
            .analyze_market(&market(dec!(0.97), dec!(0.03), 12, dec!(20000)))
            .await
            .unwrap();
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].outcome, "Yes");
        assert!(opps[0].confidence >= 0.8);
        assert!(opps[0].expected_value > 0.0);
    }

    #[tokio::test]
    async fn test_collapsed_price_flags_complement() {
        // YES quoted 0.94 (under the threshold) but NO collapsed to 0.04
        let opps = strategy()
            .analyze_market(&market(dec!(0.94), dec!(0.04), 12, dec!(20000)))
            .await
            .unwrap();
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].outcome, "Yes");
    }

    #[tokio::test]
    async fn test_outside_window_ignored() {
        // Too far out
        let opps = strategy()
            .analyze_market(&market(dec!(0.97), dec!(0.03), 100, dec!(20000)))
            .await
            .unwrap();
        assert!(opps.is_empty());

        // No end date at all
        let mut m = market(dec!(0.97), dec!(0.03), 12, dec!(20000));
        m.end_date = None;
        let opps = strategy().analyze_market(&m).await.unwrap();
        assert!(opps.is_empty());
    }

    #[tokio::test]
    async fn test_volume_floor() {
        let opps = strategy()
            .analyze_market(&market(dec!(0.97), dec!(0.03), 12, dec!(100)))
            .await
            .unwrap();
        assert!(opps.is_empty());
    }

    #[tokio::test]
    async fn test_closer_expiry_more_confident() {
        let near = strategy()
            .analyze_market(&market(dec!(0.97), dec!(0.03), 2, dec!(20000)))
            .await
            .unwrap();
        let far = strategy()
            .analyze_market(&market(dec!(0.97), dec!(0.03), 40, dec!(20000)))
            .await
            .unwrap();
        assert!(near[0].confidence > far[0].confidence);
    }
}
