//! Threshold mispricing strategy
//!
//! Buys an outcome when its price sits below a configured buy threshold
//! by more than the minimum edge, or the complementary outcome when the
//! YES side trades above the sell threshold by the same margin. Entries
//! can optionally be gated through the hybrid price+news combiner.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

use crate::config::ThresholdConfig;
use crate::domain::{to_f64, MarketOpportunity, MarketSnapshot, Position};
use crate::error::Result;
use crate::providers::MarketDataProvider;
use crate::scoring::HybridCombiner;
use crate::signals::NewsSignalFuser;
use crate::strategy::helpers::{base_risk_score, complementary_price, scan_markets};
use crate::strategy::traits::Strategy;

pub struct ThresholdStrategy {
    config: ThresholdConfig,
    markets: Arc<dyn MarketDataProvider>,
    combiner: HybridCombiner,
    /// Present when entries are news-gated
    fuser: Option<Arc<NewsSignalFuser>>,
}

impl ThresholdStrategy {
    pub fn new(
        config: ThresholdConfig,
        markets: Arc<dyn MarketDataProvider>,
        combiner: HybridCombiner,
        fuser: Option<Arc<NewsSignalFuser>>,
    ) -> Self {
        Self {
            config,
            markets,
            combiner,
            fuser,
        }
    }

    /// Build an opportunity for one side
    ///
    /// With news enabled the hybrid combiner gates the entry and its
    /// combined confidence is used; price-only mode derives confidence
    /// from the edge alone, since the threshold itself is the gate.
    async fn build_opportunity(
        &self,
        market: &MarketSnapshot,
        outcome: &str,
        price: Decimal,
        fair_value: Decimal,
        edge: Decimal,
    ) -> Option<MarketOpportunity> {
        let mut signals = vec![format!(
            "{} priced {:.2} vs fair value {:.2} (edge {:.3})",
            outcome, price, fair_value, edge
        )];

        let confidence = match (&self.fuser, self.config.use_news) {
            (Some(fuser), true) => {
                let news = fuser.market_signal(&market.question, None).await;
                let assessment = self.combiner.combine(to_f64(edge), Some(&news), outcome);
                if !assessment.should_trade {
                    debug!(
                        market = %market.id,
                        outcome,
                        "Hybrid gate rejected threshold entry"
                    );
                    return None;
                }
                signals.extend(assessment.reasoning);
                assessment.combined_confidence
            }
            _ => (0.5 + 4.0 * to_f64(edge)).clamp(0.0, 0.95),
        };

        let predicted = to_f64(fair_value);
        Some(MarketOpportunity {
            market_id: market.id.clone(),
            outcome: outcome.to_string(),
            current_price: price,
            predicted_probability: predicted,
            confidence,
            expected_value: (predicted - to_f64(price)) * 100.0,
            risk_score: base_risk_score(market),
            signals,
            strategy: self.id().to_string(),
        })
    }
}

#[async_trait]
impl Strategy for ThresholdStrategy {
    fn id(&self) -> &str {
        "threshold"
    }

    fn name(&self) -> &str {
        "Threshold Mispricing"
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
        let (Some(yes_price), Some(yes_outcome)) = (market.yes_price(), market.outcomes.first())
        else {
            return Ok(Vec::new());
        };
        let yes_outcome = yes_outcome.as_str();
        let mut opportunities = Vec::new();

        // Cheap YES side: price below the buy threshold by more than the
        // minimum edge (strictly greater; the boundary does not qualify)
        let buy_edge = self.config.buy_threshold - yes_price;
        if buy_edge > self.config.min_edge {
            if let Some(opp) = self
                .build_opportunity(
                    market,
                    yes_outcome,
                    yes_price,
                    self.config.buy_threshold,
                    buy_edge,
                )
                .await
            {
                opportunities.push(opp);
            }
        }

        // Expensive YES side: the complementary outcome is cheap
        let sell_edge = yes_price - self.config.sell_threshold;
        if sell_edge > self.config.min_edge {
            let no_outcome = market
                .outcomes
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("No");
            let no_price = market
                .prices
                .get(1)
                .copied()
                .unwrap_or_else(|| complementary_price(yes_price));
            let no_fair = complementary_price(self.config.sell_threshold);
            if let Some(opp) = self
                .build_opportunity(market, no_outcome, no_price, no_fair, sell_edge)
                .await
            {
                opportunities.push(opp);
            }
        }

        Ok(opportunities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HybridConfig;
    use crate::providers::StaticMarkets;
    use rust_decimal_macros::dec;

    fn market(yes_price: Decimal) -> MarketSnapshot {
        MarketSnapshot {
            id: "m1".to_string(),
            question: "Will it happen?".to_string(),
            outcomes: vec!["Yes".to_string(), "No".to_string()],
            prices: vec![yes_price, Decimal::ONE - yes_price],
            volume_24h: dec!(50000),
            end_date: None,
        }
    }

    fn strategy() -> ThresholdStrategy {
        let mut config = ThresholdConfig::default();
        // Price-only entries for deterministic tests
        config.use_news = false;
        ThresholdStrategy::new(
            config,
            Arc::new(StaticMarkets::new(vec![])),
            HybridCombiner::new(HybridConfig::default()),
            None,
        )
    }

    #[tokio::test]
    async fn test_cheap_yes_triggers() {
        // buy_threshold 0.35, min_edge 0.05: price 0.25 has edge 0.10
        let opps = strategy().analyze_market(&market(dec!(0.25))).await.unwrap();
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].outcome, "Yes");
        assert!(opps[0].expected_value > 0.0);
    }

    #[tokio::test]
    async fn test_boundary_price_does_not_qualify() {
        // Exactly buy_threshold - min_edge = 0.30: edge equals min_edge
        let opps = strategy().analyze_market(&market(dec!(0.30))).await.unwrap();
        assert!(opps.is_empty());

        // One cent below the boundary qualifies
        let opps = strategy().analyze_market(&market(dec!(0.29))).await.unwrap();
        assert_eq!(opps.len(), 1);
    }

    #[tokio::test]
    async fn test_rich_yes_triggers_no_side() {
        // sell_threshold 0.65: price 0.78 has sell edge 0.13
        let opps = strategy().analyze_market(&market(dec!(0.78))).await.unwrap();
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].outcome, "No");
        assert_eq!(opps[0].current_price, dec!(0.22));
    }

    #[tokio::test]
    async fn test_mid_range_is_quiet() {
        let opps = strategy().analyze_market(&market(dec!(0.50))).await.unwrap();
        assert!(opps.is_empty());
    }

    #[tokio::test]
    async fn test_held_markets_skipped() {
        let markets = Arc::new(StaticMarkets::new(vec![market(dec!(0.25))]));
        let mut config = ThresholdConfig::default();
        config.use_news = false;
        let strategy = ThresholdStrategy::new(
            config,
            markets,
            HybridCombiner::new(HybridConfig::default()),
            None,
        );

        let open = vec![Position::new("m1", "Yes", dec!(100), dec!(0.2))];
        let opps = strategy.find_opportunities(&open).await.unwrap();
        assert!(opps.is_empty());

        let opps = strategy.find_opportunities(&[]).await.unwrap();
        assert_eq!(opps.len(), 1);
    }
}
