//! Index-following strategy
//!
//! Does not score markets. Diffs the external index's target
//! allocations against open positions and emits forced BUY/SELL
//! opportunities for deviations beyond the threshold, plus an EXIT for
//! any held position no longer in the index. Fixed high confidence,
//! zero risk score: the index is the thesis.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;

use crate::config::IndexFollowConfig;
use crate::domain::{to_f64, MarketOpportunity, MarketSnapshot, Position};
use crate::error::Result;
use crate::providers::{IndexProvider, MarketDataProvider, PortfolioProvider};
use crate::strategy::traits::Strategy;

/// Confidence attached to every forced index order
const INDEX_CONFIDENCE: f64 = 0.9;

pub struct IndexFollowStrategy {
    config: IndexFollowConfig,
    index: Arc<dyn IndexProvider>,
    portfolio: Arc<dyn PortfolioProvider>,
    markets: Arc<dyn MarketDataProvider>,
}

impl IndexFollowStrategy {
    pub fn new(
        config: IndexFollowConfig,
        index: Arc<dyn IndexProvider>,
        portfolio: Arc<dyn PortfolioProvider>,
        markets: Arc<dyn MarketDataProvider>,
    ) -> Self {
        Self {
            config,
            index,
            portfolio,
            markets,
        }
    }

    fn held_amount(positions: &[Position], market_id: &str) -> Decimal {
        positions
            .iter()
            .filter(|p| p.market_id == market_id)
            .map(|p| p.amount)
            .sum()
    }

    fn forced_opportunity(
        &self,
        market: &MarketSnapshot,
        deviation: Decimal,
        signals: Vec<String>,
    ) -> MarketOpportunity {
        let price = market.yes_price().unwrap_or(Decimal::ZERO);
        MarketOpportunity {
            market_id: market.id.clone(),
            outcome: market
                .outcomes
                .first()
                .cloned()
                .unwrap_or_else(|| "Yes".to_string()),
            current_price: price,
            predicted_probability: to_f64(price),
            confidence: INDEX_CONFIDENCE,
            // Deviation in dollars stands in for expected value so
            // larger drifts rank first
            expected_value: to_f64(deviation.abs()),
            risk_score: 0.0,
            signals,
            strategy: self.id().to_string(),
        }
    }
}

#[async_trait]
impl Strategy for IndexFollowStrategy {
    fn id(&self) -> &str {
        "index_follow"
    }

    fn name(&self) -> &str {
        "Index Following"
    }

    fn is_active(&self) -> bool {
        self.config.enabled
    }

    async fn find_opportunities(
        &self,
        open_positions: &[Position],
    ) -> Result<Vec<MarketOpportunity>> {
        // A missing index composition degrades to no opportunities
        let composition = match self.index.composition().await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Index composition unavailable, skipping index scan");
                return Ok(Vec::new());
            }
        };
        let total_balance = match self.portfolio.total_balance().await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "Portfolio balance unavailable, skipping index scan");
                return Ok(Vec::new());
            }
        };

        let weight_sum: f64 = composition.members.iter().map(|m| m.weight).sum();
        if weight_sum <= 0.0 {
            return Ok(Vec::new());
        }

        let mut opportunities = Vec::new();

        for member in &composition.members {
            let weight = member.weight / weight_sum;
            let target = total_balance * Decimal::from_f64_retain(weight).unwrap_or(Decimal::ZERO);
            let current = Self::held_amount(open_positions, &member.market_id);
            let deviation = target - current;

            if deviation.abs() <= self.config.deviation_threshold {
                continue;
            }

            // A failed market fetch skips this member, not the scan
            let market = match self.markets.fetch_market(&member.market_id).await {
                Ok(m) => m,
                Err(e) => {
                    warn!(market = %member.market_id, error = %e, "Market fetch failed, skipping");
                    continue;
                }
            };

            let action = if deviation > Decimal::ZERO { "BUY" } else { "SELL" };
            opportunities.push(self.forced_opportunity(
                &market,
                deviation,
                vec![
                    format!(
                        "index target ${target:.2} vs held ${current:.2} (weight {weight:.3})"
                    ),
                    format!("forced {action} to track index"),
                ],
            ));
        }

        // Positions in markets the index dropped are exited outright
        for position in open_positions {
            if composition.member_weight(&position.market_id).is_none() {
                let market = match self.markets.fetch_market(&position.market_id).await {
                    Ok(m) => m,
                    Err(e) => {
                        warn!(market = %position.market_id, error = %e, "Market fetch failed, skipping");
                        continue;
                    }
                };
                opportunities.push(self.forced_opportunity(
                    &market,
                    -position.amount,
                    vec![
                        format!("held ${:.2} in market absent from index", position.amount),
                        "EXIT: market dropped from index".to_string(),
                    ],
                ));
            }
        }

        Ok(opportunities)
    }

    /// Index following diffs allocations; single markets are not scored
    async fn analyze_market(&self, _market: &MarketSnapshot) -> Result<Vec<MarketOpportunity>> {
        Ok(Vec::new())
    }
}
