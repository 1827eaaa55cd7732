//! Index allocation calculator
//!
//! Pure computation: given a target index composition and current
//! positions, produce per-market dollar allocations, a tracking error,
//! and an ordered rebalance-order list. Calling twice with identical
//! inputs yields identical output.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::AllocationConfig;
use crate::domain::{
    to_f64, AllocationAction, AllocationPlan, AllocationTarget, IndexComposition, Position,
    RebalanceOrder, Side,
};

#[derive(Debug, Clone, Default)]
pub struct AllocationCalculator {
    config: AllocationConfig,
}

impl AllocationCalculator {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    /// Compute per-market allocation targets and the tracking error
    ///
    /// Index weights are normalized to sum 1.0 before use. Every held
    /// market absent from the index is forced to a zero target and a
    /// SELL action regardless of size.
    pub fn calculate_allocations(
        &self,
        composition: &IndexComposition,
        total_balance: Decimal,
        positions: &[Position],
    ) -> AllocationPlan {
        let min_size = self.config.min_position_size;
        let weight_sum: f64 = composition.members.iter().map(|m| m.weight.max(0.0)).sum();

        let mut allocations: Vec<AllocationTarget> = Vec::new();

        for member in &composition.members {
            let weight = if weight_sum > 0.0 {
                member.weight.max(0.0) / weight_sum
            } else {
                0.0
            };
            let target_amount = total_balance
                * Decimal::from_f64_retain(weight).unwrap_or(Decimal::ZERO);
            let current_amount = held_amount(positions, &member.market_id);
            let delta = target_amount - current_amount;

            let action = if delta.abs() < min_size {
                AllocationAction::Hold
            } else if delta > Decimal::ZERO {
                AllocationAction::Buy
            } else {
                AllocationAction::Sell
            };

            allocations.push(AllocationTarget {
                market_id: member.market_id.clone(),
                weight,
                target_amount,
                current_amount,
                delta,
                action,
            });
        }

        // Held markets the index no longer contains: zero target,
        // forced sell
        for position in positions {
            if allocations.iter().any(|a| a.market_id == position.market_id) {
                continue;
            }
            let current_amount = held_amount(positions, &position.market_id);
            allocations.push(AllocationTarget {
                market_id: position.market_id.clone(),
                weight: 0.0,
                target_amount: Decimal::ZERO,
                current_amount,
                delta: -current_amount,
                action: AllocationAction::Sell,
            });
        }

        let sum_current: Decimal = allocations.iter().map(|a| a.current_amount).sum();
        let sum_target: Decimal = allocations.iter().map(|a| a.target_amount).sum();
        let total_value = (sum_current + sum_target) / Decimal::from(2);

        let tracking_error = tracking_error_pct(&allocations, total_value);
        let needs_rebalance = tracking_error > self.config.rebalance_threshold_pct
            || allocations
                .iter()
                .any(|a| a.delta.abs() > min_size * Decimal::from(2));

        debug!(
            allocations = allocations.len(),
            %total_value,
            tracking_error,
            needs_rebalance,
            "Allocation pass complete"
        );

        AllocationPlan {
            allocations,
            total_value,
            tracking_error,
            needs_rebalance,
        }
    }

    /// Sequence rebalance orders, sells before buys
    ///
    /// Every SELL frees its amount into the running capital counter
    /// before any BUY consumes it. Buys run in descending delta order,
    /// each capped at remaining capital; generation stops once capital
    /// falls below the minimum position size.
    pub fn generate_rebalance_orders(
        &self,
        allocations: &[AllocationTarget],
        available_balance: Decimal,
    ) -> Vec<RebalanceOrder> {
        let min_size = self.config.min_position_size;
        let mut orders = Vec::new();
        let mut capital = available_balance.max(Decimal::ZERO);

        for allocation in allocations {
            if allocation.action != AllocationAction::Sell {
                continue;
            }
            let amount = allocation.delta.abs();
            if amount <= Decimal::ZERO {
                continue;
            }
            let reason = if allocation.weight == 0.0 {
                "market removed from index".to_string()
            } else {
                format!(
                    "overweight: held {:.2} vs target {:.2}",
                    allocation.current_amount, allocation.target_amount
                )
            };
            orders.push(RebalanceOrder {
                market_id: allocation.market_id.clone(),
                side: Side::Sell,
                amount,
                reason,
            });
            capital += amount;
        }

        let mut buys: Vec<&AllocationTarget> = allocations
            .iter()
            .filter(|a| a.action == AllocationAction::Buy)
            .collect();
        buys.sort_by(|a, b| b.delta.abs().cmp(&a.delta.abs()));

        for allocation in buys {
            if capital < min_size {
                debug!(%capital, "Remaining capital below minimum, stopping buys");
                break;
            }
            let amount = allocation.delta.abs().min(capital);
            if amount < min_size {
                continue;
            }
            orders.push(RebalanceOrder {
                market_id: allocation.market_id.clone(),
                side: Side::Buy,
                amount,
                reason: format!(
                    "underweight: held {:.2} vs target {:.2}",
                    allocation.current_amount, allocation.target_amount
                ),
            });
            capital -= amount;
        }

        orders
    }
}

fn held_amount(positions: &[Position], market_id: &str) -> Decimal {
    positions
        .iter()
        .filter(|p| p.market_id == market_id)
        .map(|p| p.amount)
        .sum()
}

/// Deviation between current and target weight vectors, in percent
///
/// The root of the summed squared weight differences: weights {0.7,
/// 0.3} against holdings {60, 40} on $100 gives 14.14. A zero total
/// value means an empty book against an empty index; the error is zero
/// rather than a NaN.
fn tracking_error_pct(allocations: &[AllocationTarget], total_value: Decimal) -> f64 {
    if allocations.is_empty() || total_value <= Decimal::ZERO {
        return 0.0;
    }
    let total = to_f64(total_value);
    let sum_sq: f64 = allocations
        .iter()
        .map(|a| {
            let current_weight = to_f64(a.current_amount) / total;
            let diff = current_weight - a.weight;
            diff * diff
        })
        .sum();
    100.0 * sum_sq.sqrt()
}
