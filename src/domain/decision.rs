//! Opportunity and decision value records
//!
//! Terminal outputs of the strategy layer and the opportunity evaluator.
//! Plain serializable records with no embedded behavior beyond ranking
//! helpers; callers log, display, or hand them to an execution system.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A candidate trade emitted by a strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOpportunity {
    pub market_id: String,
    /// Outcome to buy
    pub outcome: String,
    /// Market price of the outcome at scan time
    pub current_price: Decimal,
    /// Model's probability estimate for the outcome
    pub predicted_probability: f64,
    /// Strategy confidence in [0, 1]
    pub confidence: f64,
    /// Expected value in percentage points
    pub expected_value: f64,
    /// Risk score in [0, 1], higher is riskier
    pub risk_score: f64,
    /// Human-readable evidence strings
    pub signals: Vec<String>,
    /// Id of the strategy that produced the opportunity
    pub strategy: String,
}

impl MarketOpportunity {
    /// Ranking key used for global opportunity ordering
    pub fn rank_key(&self) -> f64 {
        self.expected_value * self.confidence
    }
}

/// Final trade/no-trade decision for one opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingDecision {
    pub should_trade: bool,
    pub market_id: String,
    pub outcome: String,
    /// Position size in USD (whole dollars)
    pub size: Decimal,
    /// Entry price the decision was made at
    pub price: Decimal,
    /// Risk-adjusted confidence in [0, 1]
    pub confidence: f64,
    /// Ordered clauses explaining which gates passed or failed
    pub reasoning: Vec<String>,
}

impl TradingDecision {
    /// Render the reasoning clauses as one line
    pub fn reasoning_text(&self) -> String {
        self.reasoning.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rank_key() {
        let opp = MarketOpportunity {
            market_id: "m".to_string(),
            outcome: "Yes".to_string(),
            current_price: dec!(0.30),
            predicted_probability: 0.45,
            confidence: 0.8,
            expected_value: 15.0,
            risk_score: 0.2,
            signals: vec![],
            strategy: "threshold".to_string(),
        };
        assert!((opp.rank_key() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_reasoning_text() {
        let d = TradingDecision {
            should_trade: false,
            market_id: "m".to_string(),
            outcome: "Yes".to_string(),
            size: Decimal::ZERO,
            price: dec!(0.30),
            confidence: 0.4,
            reasoning: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(d.reasoning_text(), "a; b");
    }
}
