//! Collaborator contracts
//!
//! The engine consumes market snapshots, news articles, an index
//! composition, and portfolio state through these traits. Everything
//! behind them — transports, retries, timeouts — belongs to the caller.

pub mod memory;

pub use memory::{StaticIndex, StaticMarkets, StaticNews, StaticPortfolio};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{IndexComposition, MarketSnapshot, NewsArticle, Position};
use crate::error::Result;

/// Supplies market snapshots for scanning
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// All currently scannable markets
    async fn list_markets(&self) -> Result<Vec<MarketSnapshot>>;

    /// A single market by identifier
    async fn fetch_market(&self, market_id: &str) -> Result<MarketSnapshot>;
}

/// Supplies ranked articles for a search query
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<NewsArticle>>;
}

/// Supplies the reference index composition
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IndexProvider: Send + Sync {
    async fn composition(&self) -> Result<IndexComposition>;
}

/// Supplies open positions and balances
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortfolioProvider: Send + Sync {
    async fn positions(&self) -> Result<Vec<Position>>;

    /// Total portfolio value in USD
    async fn total_balance(&self) -> Result<Decimal>;

    /// Free capital available for new orders
    async fn available_balance(&self) -> Result<Decimal>;
}
