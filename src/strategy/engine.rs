//! Scan engine
//!
//! Runs the configured strategy set over the available markets. Each
//! strategy scans independently; one strategy's failure never aborts
//! the pass. Results are merged and ranked best-first.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{MarketOpportunity, Position, TradingDecision};
use crate::strategy::evaluator::OpportunityEvaluator;
use crate::strategy::helpers::rank_opportunities;
use crate::strategy::traits::Strategy;

/// Owns the strategy set for a scan pass
pub struct ScanEngine {
    strategies: Vec<Arc<dyn Strategy>>,
}

impl ScanEngine {
    pub fn new(strategies: Vec<Arc<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Number of strategies that will participate in a scan
    pub fn active_count(&self) -> usize {
        self.strategies.iter().filter(|s| s.is_active()).count()
    }

    /// Scan all active strategies concurrently and rank the merged
    /// opportunities
    pub async fn scan(&self, open_positions: &[Position]) -> Vec<MarketOpportunity> {
        let active: Vec<&Arc<dyn Strategy>> =
            self.strategies.iter().filter(|s| s.is_active()).collect();

        let results = join_all(
            active
                .iter()
                .map(|s| async move { (s.id().to_string(), s.find_opportunities(open_positions).await) }),
        )
        .await;

        let mut opportunities = Vec::new();
        for (id, result) in results {
            match result {
                Ok(mut found) => {
                    info!(strategy = %id, count = found.len(), "Strategy scan complete");
                    opportunities.append(&mut found);
                }
                Err(e) => {
                    warn!(strategy = %id, error = %e, "Strategy scan failed, continuing");
                }
            }
        }

        rank_opportunities(&mut opportunities);
        opportunities
    }

    /// Scan and chain every opportunity through the evaluator
    pub async fn scan_and_evaluate(
        &self,
        evaluator: &OpportunityEvaluator,
        open_positions: &[Position],
    ) -> Vec<(MarketOpportunity, TradingDecision)> {
        self.scan(open_positions)
            .await
            .into_iter()
            .map(|opp| {
                let decision = evaluator.evaluate(&opp);
                (opp, decision)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketSnapshot;
    use crate::error::{EdgewiseError, Result};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    struct FixedStrategy {
        id: &'static str,
        active: bool,
        opportunities: Vec<MarketOpportunity>,
        fail: bool,
    }

    #[async_trait]
    impl Strategy for FixedStrategy {
        fn id(&self) -> &str {
            self.id
        }
        fn name(&self) -> &str {
            self.id
        }
        fn is_active(&self) -> bool {
            self.active
        }
        async fn find_opportunities(
            &self,
            _open_positions: &[Position],
        ) -> Result<Vec<MarketOpportunity>> {
            if self.fail {
                return Err(EdgewiseError::MarketDataUnavailable("boom".to_string()));
            }
            Ok(self.opportunities.clone())
        }
        async fn analyze_market(
            &self,
            _market: &MarketSnapshot,
        ) -> Result<Vec<MarketOpportunity>> {
            Ok(Vec::new())
        }
    }

    fn opp(market_id: &str, ev: f64, confidence: f64) -> MarketOpportunity {
        MarketOpportunity {
            market_id: market_id.to_string(),
            outcome: "Yes".to_string(),
            current_price: dec!(0.3),
            predicted_probability: 0.5,
            confidence,
            expected_value: ev,
            risk_score: 0.1,
            signals: vec![],
            strategy: "fixed".to_string(),
        }
    }

    #[tokio::test]
    async fn test_merges_and_ranks() {
        let engine = ScanEngine::new(vec![
            Arc::new(FixedStrategy {
                id: "a",
                active: true,
                opportunities: vec![opp("m1", 10.0, 0.5)],
                fail: false,
            }),
            Arc::new(FixedStrategy {
                id: "b",
                active: true,
                opportunities: vec![opp("m2", 20.0, 0.9)],
                fail: false,
            }),
        ]);

        let opps = engine.scan(&[]).await;
        assert_eq!(opps.len(), 2);
        assert_eq!(opps[0].market_id, "m2");
    }

    #[tokio::test]
    async fn test_failing_strategy_skipped() {
        let engine = ScanEngine::new(vec![
            Arc::new(FixedStrategy {
                id: "broken",
                active: true,
                opportunities: vec![],
                fail: true,
            }),
            Arc::new(FixedStrategy {
                id: "ok",
                active: true,
                opportunities: vec![opp("m1", 10.0, 0.5)],
                fail: false,
            }),
        ]);

        let opps = engine.scan(&[]).await;
        assert_eq!(opps.len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_strategy_inert() {
        let engine = ScanEngine::new(vec![Arc::new(FixedStrategy {
            id: "disabled",
            active: false,
            opportunities: vec![opp("m1", 10.0, 0.5)],
            fail: false,
        })]);

        assert_eq!(engine.active_count(), 0);
        assert!(engine.scan(&[]).await.is_empty());
    }
}
