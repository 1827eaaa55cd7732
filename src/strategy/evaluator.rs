//! Opportunity evaluator
//!
//! Applies quarter-Kelly position sizing with an absolute risk cap,
//! re-derives a risk-adjusted confidence, and renders the final
//! trade/no-trade decision with its reasoning.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::EvaluatorConfig;
use crate::domain::{to_f64, MarketOpportunity, TradingDecision};

/// Turns one opportunity into a sized trading decision
#[derive(Debug, Clone, Default)]
pub struct OpportunityEvaluator {
    config: EvaluatorConfig,
}

impl OpportunityEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Conservative Kelly position size in whole dollars
    ///
    /// `kelly = edge / (1 - price)`, scaled by the configured fraction
    /// of the maximum position and capped by the per-trade risk limit.
    /// A price at or above 1 yields zero rather than a division blowup.
    pub fn position_size(&self, predicted: f64, price: Decimal) -> Decimal {
        let price_f = to_f64(price);
        if price_f >= 1.0 {
            return Decimal::ZERO;
        }
        let edge = (predicted - price_f).abs();
        let kelly = edge / (1.0 - price_f);
        let raw = kelly * self.config.kelly_fraction * to_f64(self.config.max_position_size);
        let raw = Decimal::from_f64_retain(raw).unwrap_or(Decimal::ZERO);
        raw.min(self.config.risk_limit_per_trade).floor().max(Decimal::ZERO)
    }

    /// Evaluate one opportunity into a final decision
    pub fn evaluate(&self, opportunity: &MarketOpportunity) -> TradingDecision {
        let mut reasoning = Vec::new();

        let size = self.position_size(
            opportunity.predicted_probability,
            opportunity.current_price,
        );
        reasoning.push(format!(
            "quarter-Kelly size ${size} (edge {:.3}, price {:.2})",
            (opportunity.predicted_probability - to_f64(opportunity.current_price)).abs(),
            opportunity.current_price
        ));

        let confidence = opportunity.confidence * (1.0 - opportunity.risk_score);
        reasoning.push(format!(
            "confidence {:.2} after risk score {:.2}",
            confidence, opportunity.risk_score
        ));

        let mut should_trade = true;

        if confidence < self.config.min_confidence {
            reasoning.push(format!(
                "confidence below minimum {:.2}",
                self.config.min_confidence
            ));
            should_trade = false;
        }
        if size <= Decimal::ZERO {
            reasoning.push("position size rounded to zero".to_string());
            should_trade = false;
        }
        if opportunity.expected_value <= self.config.min_expected_value {
            reasoning.push(format!(
                "expected value {:.1} below floor {:.1}",
                opportunity.expected_value, self.config.min_expected_value
            ));
            should_trade = false;
        }

        if should_trade {
            reasoning.push(format!(
                "trade approved: {} {} at {:.2}",
                opportunity.outcome, opportunity.market_id, opportunity.current_price
            ));
        }

        debug!(
            market = %opportunity.market_id,
            should_trade,
            %size,
            confidence,
            "Evaluated opportunity"
        );

        TradingDecision {
            should_trade,
            market_id: opportunity.market_id.clone(),
            outcome: opportunity.outcome.clone(),
            size: if should_trade { size } else { Decimal::ZERO },
            price: opportunity.current_price,
            confidence,
            reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn opportunity(
        price: Decimal,
        predicted: f64,
        confidence: f64,
        risk: f64,
        ev: f64,
    ) -> MarketOpportunity {
        MarketOpportunity {
            market_id: "m1".to_string(),
            outcome: "Yes".to_string(),
            current_price: price,
            predicted_probability: predicted,
            confidence,
            expected_value: ev,
            risk_score: risk,
            signals: vec![],
            strategy: "threshold".to_string(),
        }
    }

    fn evaluator() -> OpportunityEvaluator {
        OpportunityEvaluator::new(EvaluatorConfig::default())
    }

    #[test]
    fn test_kelly_sizing() {
        // edge 0.15, price 0.30: kelly = 0.15/0.70 = 0.2143
        // raw = 0.2143 * 0.25 * 1000 = 53.57 -> floor 53
        let size = evaluator().position_size(0.45, dec!(0.30));
        assert_eq!(size, dec!(53));
    }

    #[test]
    fn test_risk_cap_applies() {
        // edge 0.5, price 0.40: kelly = 0.833, raw = 208 -> capped 100
        let size = evaluator().position_size(0.90, dec!(0.40));
        assert_eq!(size, dec!(100));
    }

    #[test]
    fn test_price_of_one_sizes_zero() {
        let size = evaluator().position_size(0.99, dec!(1.0));
        assert_eq!(size, Decimal::ZERO);
    }

    #[test]
    fn test_good_opportunity_trades() {
        let d = evaluator().evaluate(&opportunity(dec!(0.30), 0.45, 0.85, 0.1, 15.0));
        assert!(d.should_trade);
        assert!(d.size > Decimal::ZERO);
        assert!((d.confidence - 0.85 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_low_ev_rejected() {
        // Identical but expected value at the floor (gate is strict >)
        let d = evaluator().evaluate(&opportunity(dec!(0.30), 0.45, 0.85, 0.1, 5.0));
        assert!(!d.should_trade);
        assert_eq!(d.size, Decimal::ZERO);
        assert!(d.reasoning_text().contains("expected value"));
    }

    #[test]
    fn test_low_confidence_rejected() {
        let d = evaluator().evaluate(&opportunity(dec!(0.30), 0.45, 0.60, 0.3, 15.0));
        // 0.60 * 0.7 = 0.42 < 0.65
        assert!(!d.should_trade);
        assert_eq!(d.size, Decimal::ZERO);
    }

    #[test]
    fn test_tiny_edge_sizes_zero_and_rejects() {
        // edge 0.0004 -> raw size under a dollar floors to zero
        let d = evaluator().evaluate(&opportunity(dec!(0.50), 0.5004, 0.9, 0.0, 15.0));
        assert!(!d.should_trade);
        assert_eq!(d.size, Decimal::ZERO);
        assert!(d.reasoning_text().contains("size"));
    }
}
