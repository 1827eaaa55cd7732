//! Shared strategy helpers
//!
//! Market-list scanning, price extraction, and the volume/expiry based
//! risk-score heuristic shared across strategies.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use crate::domain::{to_f64, MarketOpportunity, MarketSnapshot, Position};
use crate::error::Result;
use crate::providers::MarketDataProvider;
use crate::strategy::traits::Strategy;

/// Whether any open position is held in the given market
pub fn is_held(market_id: &str, positions: &[Position]) -> bool {
    positions.iter().any(|p| p.market_id == market_id)
}

/// Price of the complementary outcome in a binary market
pub fn complementary_price(price: Decimal) -> Decimal {
    (Decimal::ONE - price).max(Decimal::ZERO)
}

/// Expected value of buying at `price` given a probability estimate,
/// in percentage points
pub fn expected_value_pct(predicted: f64, price: Decimal) -> f64 {
    (predicted - to_f64(price)) * 100.0
}

/// Heuristic risk score in [0, 1] from liquidity and time to expiry
///
/// Thin markets and markets without a resolution date carry more risk;
/// imminent expiry adds a little (less time for a thesis to recover).
pub fn base_risk_score(market: &MarketSnapshot) -> f64 {
    let mut risk: f64 = 0.2;

    if market.volume_24h < dec!(1000) {
        risk += 0.4;
    } else if market.volume_24h < dec!(10000) {
        risk += 0.2;
    }

    match market.hours_to_expiry(Utc::now()) {
        Some(hours) if hours < 24.0 => risk += 0.1,
        Some(_) => {}
        None => risk += 0.1,
    }

    risk.clamp(0.0, 1.0)
}

/// Run a strategy's single-market analysis over a market batch
///
/// Held markets are excluded; a failure on one market is logged and
/// skipped so the batch survives (collaborator failures are per-market).
pub async fn scan_markets<S: Strategy + ?Sized>(
    strategy: &S,
    provider: &dyn MarketDataProvider,
    positions: &[Position],
) -> Result<Vec<MarketOpportunity>> {
    let markets = provider.list_markets().await?;
    let mut opportunities = Vec::new();

    for market in &markets {
        if is_held(&market.id, positions) {
            debug!(strategy = strategy.id(), market = %market.id, "Skipping held market");
            continue;
        }
        if !market.is_well_formed() {
            warn!(market = %market.id, "Skipping malformed market snapshot");
            continue;
        }
        match strategy.analyze_market(market).await {
            Ok(mut found) => opportunities.append(&mut found),
            Err(e) => {
                warn!(
                    strategy = strategy.id(),
                    market = %market.id,
                    error = %e,
                    "Market analysis failed, skipping"
                );
            }
        }
    }

    Ok(opportunities)
}

/// Sort opportunities by `expected_value * confidence`, best first
pub fn rank_opportunities(opportunities: &mut [MarketOpportunity]) {
    opportunities.sort_by(|a, b| {
        b.rank_key()
            .partial_cmp(&a.rank_key())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_held() {
        let positions = vec![Position::new("m1", "Yes", dec!(50), dec!(0.4))];
        assert!(is_held("m1", &positions));
        assert!(!is_held("m2", &positions));
    }

    #[test]
    fn test_complementary_price() {
        assert_eq!(complementary_price(dec!(0.35)), dec!(0.65));
        assert_eq!(complementary_price(dec!(1.2)), Decimal::ZERO);
    }

    #[test]
    fn test_expected_value_pct() {
        let ev = expected_value_pct(0.45, dec!(0.30));
        assert!((ev - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_risk_score_thin_market() {
        let market = MarketSnapshot {
            id: "m".to_string(),
            question: "q".to_string(),
            outcomes: vec!["Yes".to_string(), "No".to_string()],
            prices: vec![dec!(0.5), dec!(0.5)],
            volume_24h: dec!(500),
            end_date: None,
        };
        // 0.2 base + 0.4 thin + 0.1 no end date
        assert!((base_risk_score(&market) - 0.7).abs() < 1e-9);
    }
}
