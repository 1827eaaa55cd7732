//! Multi-signal interactive strategy
//!
//! Scores every outcome on three independent [0, 1] signals — price
//! extremity, volume, and news sentiment — combines them with
//! configured weights, and emits an opportunity when the combined
//! signal's distance from 0.5 clears the threshold and the derived
//! confidence clears its minimum. Results are ranked globally and
//! truncated to the best ten.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use crate::config::InteractiveConfig;
use crate::domain::{to_f64, MarketOpportunity, MarketSnapshot, NewsSignal, Position};
use crate::error::Result;
use crate::providers::MarketDataProvider;
use crate::signals::NewsSignalFuser;
use crate::strategy::helpers::{base_risk_score, rank_opportunities, scan_markets};
use crate::strategy::traits::Strategy;

pub struct InteractiveStrategy {
    config: InteractiveConfig,
    markets: Arc<dyn MarketDataProvider>,
    fuser: Arc<NewsSignalFuser>,
}

impl InteractiveStrategy {
    pub fn new(
        config: InteractiveConfig,
        markets: Arc<dyn MarketDataProvider>,
        fuser: Arc<NewsSignalFuser>,
    ) -> Self {
        Self {
            config,
            markets,
            fuser,
        }
    }

    /// Price-extremity signal: neutral mid-range, richer at the tails
    fn price_signal(price: f64) -> f64 {
        let distance = (price - 0.5).abs();
        if distance <= 0.2 {
            0.5
        } else {
            (0.5 + (distance - 0.2) * 1.5).min(1.0)
        }
    }

    /// Monotonic step function of 24h volume
    fn volume_signal(volume: Decimal) -> f64 {
        if volume < dec!(1000) {
            0.2
        } else if volume < dec!(10000) {
            0.4
        } else if volume < dec!(50000) {
            0.6
        } else if volume < dec!(250000) {
            0.8
        } else {
            1.0
        }
    }

    /// News signal mapped onto the candidate outcome
    fn news_signal_value(news: &NewsSignal, outcome: &str) -> f64 {
        match news.agrees_with(outcome) {
            Some(true) => 0.5 + news.confidence / 2.0,
            Some(false) => 0.5 - news.confidence / 2.0,
            None => 0.5,
        }
    }

    /// Derive confidence from the combined edge and its components
    fn derive_confidence(
        &self,
        edge: f64,
        volume_signal: f64,
        price_signal: f64,
        article_count: usize,
    ) -> f64 {
        let mut confidence = 0.5;
        confidence += edge * 0.8;
        confidence += (volume_signal - 0.5) * 0.2;
        confidence += 0.02 * article_count.min(5) as f64;
        if price_signal > 0.7 {
            confidence += 0.05;
        }
        confidence.min(0.95)
    }
}

#[async_trait]
impl Strategy for InteractiveStrategy {
    fn id(&self) -> &str {
        "interactive"
    }

    fn name(&self) -> &str {
        "Multi-Signal Interactive"
    }

    fn is_active(&self) -> bool {
        self.config.enabled
    }

    async fn find_opportunities(
        &self,
        open_positions: &[Position],
    ) -> Result<Vec<MarketOpportunity>> {
        let mut opportunities =
            scan_markets(self, self.markets.as_ref(), open_positions).await?;
        rank_opportunities(&mut opportunities);
        opportunities.truncate(self.config.max_results);
        Ok(opportunities)
    }

    async fn analyze_market(&self, market: &MarketSnapshot) -> Result<Vec<MarketOpportunity>> {
        let news = self.fuser.market_signal(&market.question, None).await;
        let volume_signal = Self::volume_signal(market.volume_24h);
        let mut opportunities = Vec::new();

        for (outcome, price) in market.outcomes.iter().zip(market.prices.iter()) {
            let price_f = to_f64(*price);
            let price_signal = Self::price_signal(price_f);
            let news_value = Self::news_signal_value(&news, outcome);

            let combined = self.config.price_weight * price_signal
                + self.config.volume_weight * volume_signal
                + self.config.news_weight * news_value;
            let edge = combined - 0.5;

            if edge <= self.config.signal_threshold {
                continue;
            }
            // The signal must actually favor this outcome at its price;
            // the expensive tail of the same market is not a buy
            if combined <= price_f {
                continue;
            }

            let confidence =
                self.derive_confidence(edge, volume_signal, price_signal, news.articles.len());
            if confidence < self.config.min_confidence {
                continue;
            }

            let predicted = combined.clamp(0.0, 1.0);
            opportunities.push(MarketOpportunity {
                market_id: market.id.clone(),
                outcome: outcome.clone(),
                current_price: *price,
                predicted_probability: predicted,
                confidence,
                expected_value: (predicted - price_f) * 100.0,
                risk_score: base_risk_score(market),
                signals: vec![
                    format!("price signal {:.2} at price {:.2}", price_signal, price),
                    format!("volume signal {:.2} on ${} 24h", volume_signal, market.volume_24h),
                    format!(
                        "news signal {:.2} ({}, {} articles)",
                        news_value,
                        news.direction,
                        news.articles.len()
                    ),
                    format!("combined signal {:.2}, edge {:.2}", combined, edge),
                ],
                strategy: self.id().to_string(),
            });
        }

        Ok(opportunities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NewsConfig;
    use crate::providers::{StaticMarkets, StaticNews};

    fn fuser() -> Arc<NewsSignalFuser> {
        Arc::new(NewsSignalFuser::new(
            Arc::new(StaticNews::new(vec![])),
            NewsConfig::default(),
        ))
    }

    fn market(id: &str, yes_price: Decimal, volume: Decimal) -> MarketSnapshot {
        MarketSnapshot {
            id: id.to_string(),
            question: "Will the index rise?".to_string(),
            outcomes: vec!["Yes".to_string(), "No".to_string()],
            prices: vec![yes_price, Decimal::ONE - yes_price],
            volume_24h: volume,
            end_date: None,
        }
    }

    fn strategy(markets: Vec<MarketSnapshot>) -> InteractiveStrategy {
        InteractiveStrategy::new(
            InteractiveConfig::default(),
            Arc::new(StaticMarkets::new(markets)),
            fuser(),
        )
    }

    #[test]
    fn test_price_signal_shape() {
        assert_eq!(InteractiveStrategy::price_signal(0.5), 0.5);
        assert_eq!(InteractiveStrategy::price_signal(0.35), 0.5);
        assert!(InteractiveStrategy::price_signal(0.05) > 0.8);
        assert!(InteractiveStrategy::price_signal(0.95) > 0.8);
    }

    #[test]
    fn test_volume_signal_monotonic() {
        let samples = [
            dec!(500),
            dec!(5000),
            dec!(20000),
            dec!(100000),
            dec!(500000),
        ];
        let mut last = 0.0;
        for v in samples {
            let s = InteractiveStrategy::volume_signal(v);
            assert!(s >= last);
            last = s;
        }
    }

    #[tokio::test]
    async fn test_extreme_price_high_volume_emits() {
        // price 0.05: price signal 0.875; volume 500k: 1.0; news 0.5
        // combined = 0.4*0.875 + 0.3*1.0 + 0.3*0.5 = 0.80, edge 0.30
        let opps = strategy(vec![])
            .analyze_market(&market("m1", dec!(0.05), dec!(500000)))
            .await
            .unwrap();
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].outcome, "Yes");
        assert!(opps[0].confidence >= 0.6);
    }

    #[tokio::test]
    async fn test_mid_price_low_volume_quiet() {
        let opps = strategy(vec![])
            .analyze_market(&market("m1", dec!(0.5), dec!(2000)))
            .await
            .unwrap();
        assert!(opps.is_empty());
    }

    #[tokio::test]
    async fn test_global_truncation_to_top_ten() {
        let markets: Vec<MarketSnapshot> = (0..15)
            .map(|i| market(&format!("m{i}"), dec!(0.05), dec!(500000)))
            .collect();
        let opps = strategy(markets).find_opportunities(&[]).await.unwrap();
        assert!(opps.len() <= 10);

        // Ranked best-first
        for pair in opps.windows(2) {
            assert!(pair[0].rank_key() >= pair[1].rank_key());
        }
    }
}
