//! Common strategy contract
//!
//! Every strategy scans markets and emits candidate opportunities; a
//! strategy disabled by configuration is inert. Strategies never emit an
//! opportunity for a market already present in the open positions.

use async_trait::async_trait;

use crate::domain::{MarketOpportunity, MarketSnapshot, Position};
use crate::error::Result;

/// Core trait implemented by all opportunity generators
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Unique strategy identifier
    fn id(&self) -> &str;

    /// Human-readable strategy name
    fn name(&self) -> &str;

    /// Whether the strategy participates in scans
    fn is_active(&self) -> bool;

    /// Scan all available markets, skipping those already held
    ///
    /// A collaborator failure on one market must not abort the scan;
    /// implementations skip the market and continue.
    async fn find_opportunities(
        &self,
        open_positions: &[Position],
    ) -> Result<Vec<MarketOpportunity>>;

    /// Analyze a single market snapshot
    async fn analyze_market(&self, market: &MarketSnapshot) -> Result<Vec<MarketOpportunity>>;
}
