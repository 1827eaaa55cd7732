//! Market and position value records
//!
//! Immutable per-fetch views supplied by the market data and portfolio
//! collaborators. Nothing in the engine mutates these after construction.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side for rebalance directives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Immutable snapshot of a binary-outcome market
///
/// `outcomes` and `prices` are parallel lists; prices are probabilities in
/// [0, 1] and sum to roughly 1 across outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Market identifier (condition ID on Polymarket)
    pub id: String,
    /// Market question text
    pub question: String,
    /// Ordered outcome names, typically ["Yes", "No"]
    pub outcomes: Vec<String>,
    /// Per-outcome prices, parallel to `outcomes`
    pub prices: Vec<Decimal>,
    /// 24h traded volume in USD
    pub volume_24h: Decimal,
    /// Resolution date, if known
    pub end_date: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    /// Look up the index of an outcome by name (case-insensitive)
    pub fn outcome_index(&self, outcome: &str) -> Option<usize> {
        self.outcomes
            .iter()
            .position(|o| o.eq_ignore_ascii_case(outcome))
    }

    /// Price for a named outcome
    pub fn price_for(&self, outcome: &str) -> Option<Decimal> {
        self.outcome_index(outcome)
            .and_then(|i| self.prices.get(i).copied())
    }

    /// Price of the first outcome (the YES side of a binary market)
    pub fn yes_price(&self) -> Option<Decimal> {
        self.prices.first().copied()
    }

    /// Hours until resolution, negative if already past
    pub fn hours_to_expiry(&self, now: DateTime<Utc>) -> Option<f64> {
        self.end_date
            .map(|end| (end - now).num_seconds() as f64 / 3600.0)
    }

    /// Check the snapshot is internally consistent (parallel lists,
    /// prices inside [0, 1])
    pub fn is_well_formed(&self) -> bool {
        !self.outcomes.is_empty()
            && self.outcomes.len() == self.prices.len()
            && self
                .prices
                .iter()
                .all(|p| *p >= Decimal::ZERO && *p <= Decimal::ONE)
    }
}

/// An open position, supplied read-only by the portfolio collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Market the position is in
    pub market_id: String,
    /// Outcome held
    pub outcome_id: String,
    /// Current USD value of the holding
    pub amount: Decimal,
    /// Average entry price
    pub avg_price: Decimal,
}

impl Position {
    pub fn new(
        market_id: impl Into<String>,
        outcome_id: impl Into<String>,
        amount: Decimal,
        avg_price: Decimal,
    ) -> Self {
        Self {
            market_id: market_id.into(),
            outcome_id: outcome_id.into(),
            amount,
            avg_price,
        }
    }
}

/// Convert a Decimal price/amount to f64 for probability math
///
/// Falls back to 0.0 on overflow rather than propagating a NaN.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot {
            id: "mkt-1".to_string(),
            question: "Will the Fed cut rates in March 2026?".to_string(),
            outcomes: vec!["Yes".to_string(), "No".to_string()],
            prices: vec![dec!(0.35), dec!(0.65)],
            volume_24h: dec!(125000),
            end_date: Some(Utc::now() + Duration::hours(72)),
        }
    }

    #[test]
    fn test_outcome_lookup() {
        let m = snapshot();
        assert_eq!(m.outcome_index("yes"), Some(0));
        assert_eq!(m.outcome_index("NO"), Some(1));
        assert_eq!(m.outcome_index("maybe"), None);
        assert_eq!(m.price_for("Yes"), Some(dec!(0.35)));
        assert_eq!(m.yes_price(), Some(dec!(0.35)));
    }

    #[test]
    fn test_hours_to_expiry() {
        let m = snapshot();
        let hours = m.hours_to_expiry(Utc::now()).unwrap();
        assert!(hours > 71.9 && hours < 72.1);
    }

    #[test]
    fn test_well_formed() {
        let mut m = snapshot();
        assert!(m.is_well_formed());

        m.prices.push(dec!(0.10));
        assert!(!m.is_well_formed());

        let mut m = snapshot();
        m.prices[0] = dec!(1.20);
        assert!(!m.is_well_formed());
    }
}
