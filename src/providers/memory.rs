//! In-memory providers backed by static data
//!
//! Used by tests and by the CLI's fixture mode; no I/O, no failures
//! beyond a missing market id.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{IndexProvider, MarketDataProvider, NewsProvider, PortfolioProvider};
use crate::domain::{IndexComposition, MarketSnapshot, NewsArticle, Position};
use crate::error::{EdgewiseError, Result};

/// Fixed set of market snapshots
#[derive(Debug, Clone, Default)]
pub struct StaticMarkets {
    markets: Vec<MarketSnapshot>,
}

impl StaticMarkets {
    pub fn new(markets: Vec<MarketSnapshot>) -> Self {
        Self { markets }
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarkets {
    async fn list_markets(&self) -> Result<Vec<MarketSnapshot>> {
        Ok(self.markets.clone())
    }

    async fn fetch_market(&self, market_id: &str) -> Result<MarketSnapshot> {
        self.markets
            .iter()
            .find(|m| m.id == market_id)
            .cloned()
            .ok_or_else(|| EdgewiseError::MarketDataUnavailable(market_id.to_string()))
    }
}

/// Fixed article pool; a search returns articles whose text shares at
/// least one query term, preserving insertion order
#[derive(Debug, Clone, Default)]
pub struct StaticNews {
    articles: Vec<NewsArticle>,
}

impl StaticNews {
    pub fn new(articles: Vec<NewsArticle>) -> Self {
        Self { articles }
    }
}

#[async_trait]
impl NewsProvider for StaticNews {
    async fn search(&self, query: &str) -> Result<Vec<NewsArticle>> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .articles
            .iter()
            .filter(|a| {
                let text = a.full_text().to_lowercase();
                terms.iter().any(|t| text.contains(t))
            })
            .cloned()
            .collect())
    }
}

/// Fixed index composition
#[derive(Debug, Clone)]
pub struct StaticIndex {
    composition: IndexComposition,
}

impl StaticIndex {
    pub fn new(composition: IndexComposition) -> Self {
        Self { composition }
    }
}

#[async_trait]
impl IndexProvider for StaticIndex {
    async fn composition(&self) -> Result<IndexComposition> {
        Ok(self.composition.clone())
    }
}

/// Fixed portfolio state
#[derive(Debug, Clone, Default)]
pub struct StaticPortfolio {
    positions: Vec<Position>,
    total_balance: Decimal,
    available_balance: Decimal,
}

impl StaticPortfolio {
    pub fn new(
        positions: Vec<Position>,
        total_balance: Decimal,
        available_balance: Decimal,
    ) -> Self {
        Self {
            positions,
            total_balance,
            available_balance,
        }
    }
}

#[async_trait]
impl PortfolioProvider for StaticPortfolio {
    async fn positions(&self) -> Result<Vec<Position>> {
        Ok(self.positions.clone())
    }

    async fn total_balance(&self) -> Result<Decimal> {
        Ok(self.total_balance)
    }

    async fn available_balance(&self) -> Result<Decimal> {
        Ok(self.available_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_static_markets_fetch() {
        let provider = StaticMarkets::new(vec![MarketSnapshot {
            id: "m1".to_string(),
            question: "q".to_string(),
            outcomes: vec!["Yes".to_string(), "No".to_string()],
            prices: vec![dec!(0.4), dec!(0.6)],
            volume_24h: dec!(1000),
            end_date: None,
        }]);

        assert!(provider.fetch_market("m1").await.is_ok());
        assert!(matches!(
            provider.fetch_market("missing").await,
            Err(EdgewiseError::MarketDataUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_static_news_term_overlap() {
        let provider = StaticNews::new(vec![
            NewsArticle {
                title: "Fed holds rates steady".to_string(),
                description: None,
                published_at: None,
                source: None,
            },
            NewsArticle {
                title: "Team wins the cup".to_string(),
                description: None,
                published_at: None,
                source: None,
            },
        ]);

        let hits = provider.search("fed rates").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].title.contains("Fed"));
    }
}
