//! Polymarket Gamma API market provider
//!
//! Fetches market snapshots from the public Gamma REST API. The API
//! encodes outcome and price lists as JSON strings inside JSON, so each
//! record is decoded in two steps; malformed records are skipped with a
//! warning rather than failing the batch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::domain::MarketSnapshot;
use crate::error::{EdgewiseError, Result};
use crate::providers::MarketDataProvider;

/// Gamma REST market record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GammaMarket {
    #[serde(alias = "conditionId")]
    id: String,
    question: String,
    /// JSON-encoded list, e.g. "[\"Yes\", \"No\"]"
    outcomes: Option<String>,
    /// JSON-encoded list, e.g. "[\"0.35\", \"0.65\"]"
    outcome_prices: Option<String>,
    volume_24hr: Option<f64>,
    end_date_iso: Option<String>,
}

impl GammaMarket {
    fn into_snapshot(self) -> Option<MarketSnapshot> {
        let outcomes: Vec<String> =
            serde_json::from_str(self.outcomes.as_deref()?).ok()?;
        let price_strings: Vec<String> =
            serde_json::from_str(self.outcome_prices.as_deref()?).ok()?;
        let prices: Vec<Decimal> = price_strings
            .iter()
            .map(|p| Decimal::from_str(p))
            .collect::<std::result::Result<_, _>>()
            .ok()?;

        if outcomes.len() != prices.len() || outcomes.is_empty() {
            return None;
        }

        let end_date = self
            .end_date_iso
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc));

        Some(MarketSnapshot {
            id: self.id,
            question: self.question,
            outcomes,
            prices,
            volume_24h: self
                .volume_24hr
                .and_then(Decimal::from_f64_retain)
                .unwrap_or(Decimal::ZERO),
            end_date,
        })
    }
}

/// Market provider backed by the Polymarket Gamma API
pub struct GammaMarketProvider {
    client: reqwest::Client,
    base_url: String,
    limit: usize,
}

impl GammaMarketProvider {
    pub fn new(base_url: impl Into<String>, limit: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            limit,
        }
    }
}

#[async_trait]
impl MarketDataProvider for GammaMarketProvider {
    async fn list_markets(&self) -> Result<Vec<MarketSnapshot>> {
        let url = format!(
            "{}/markets?active=true&closed=false&limit={}",
            self.base_url, self.limit
        );
        let records: Vec<GammaMarket> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let total = records.len();
        let snapshots: Vec<MarketSnapshot> = records
            .into_iter()
            .filter_map(|r| {
                let id = r.id.clone();
                let snapshot = r.into_snapshot();
                if snapshot.is_none() {
                    warn!(market = %id, "Skipping malformed Gamma market record");
                }
                snapshot
            })
            .collect();

        debug!(total, usable = snapshots.len(), "Fetched Gamma markets");
        Ok(snapshots)
    }

    async fn fetch_market(&self, market_id: &str) -> Result<MarketSnapshot> {
        let url = format!("{}/markets/{}", self.base_url, market_id);
        let record: GammaMarket = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        record
            .into_snapshot()
            .ok_or_else(|| EdgewiseError::InvalidMarketData(market_id.to_string()))
    }
}
