//! Index composition and allocation value records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market::Side;

/// One member of a reference index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMember {
    pub market_id: String,
    /// Raw target weight; the calculator normalizes across members
    pub weight: f64,
}

/// Target composition supplied by the index collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexComposition {
    pub index_id: String,
    pub members: Vec<IndexMember>,
}

impl IndexComposition {
    pub fn member_weight(&self, market_id: &str) -> Option<f64> {
        self.members
            .iter()
            .find(|m| m.market_id == market_id)
            .map(|m| m.weight)
    }
}

/// Rebalance direction for one allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AllocationAction {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for AllocationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationAction::Buy => write!(f, "BUY"),
            AllocationAction::Sell => write!(f, "SELL"),
            AllocationAction::Hold => write!(f, "HOLD"),
        }
    }
}

/// Per-market dollar allocation target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationTarget {
    pub market_id: String,
    /// Normalized target weight; 0 for markets dropped from the index
    pub weight: f64,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    /// target - current
    pub delta: Decimal,
    pub action: AllocationAction,
}

/// Full allocation pass output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub allocations: Vec<AllocationTarget>,
    /// Mean of summed current and summed target amounts
    pub total_value: Decimal,
    /// RMS deviation between current and target weights, in percent
    pub tracking_error: f64,
    pub needs_rebalance: bool,
}

/// Directive to move a dollar amount toward target allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceOrder {
    pub market_id: String,
    pub side: Side,
    pub amount: Decimal,
    pub reason: String,
}
