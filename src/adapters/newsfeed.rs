//! News article provider
//!
//! Searches a NewsAPI-compatible endpoint for articles matching a
//! query. Without an API key the provider returns an empty list, which
//! downstream fusion treats as a neutral signal.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::domain::NewsArticle;
use crate::error::Result;
use crate::providers::NewsProvider;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<ArticleRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleRecord {
    title: Option<String>,
    description: Option<String>,
    published_at: Option<String>,
    source: Option<SourceRecord>,
}

#[derive(Debug, Deserialize)]
struct SourceRecord {
    name: Option<String>,
}

impl ArticleRecord {
    fn into_article(self) -> Option<NewsArticle> {
        let title = self.title?;
        let published_at = self
            .published_at
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc));
        Some(NewsArticle {
            title,
            description: self.description,
            published_at,
            source: self.source.and_then(|s| s.name),
        })
    }
}

/// Article provider backed by a NewsAPI-style endpoint
pub struct NewsFeedProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    page_size: usize,
}

impl NewsFeedProvider {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
            page_size: 20,
        }
    }
}

#[async_trait]
impl NewsProvider for NewsFeedProvider {
    async fn search(&self, query: &str) -> Result<Vec<NewsArticle>> {
        let Some(api_key) = &self.api_key else {
            debug!("No news API key configured, returning no articles");
            return Ok(Vec::new());
        };

        let response: SearchResponse = self
            .client
            .get(format!("{}/everything", self.base_url))
            .query(&[
                ("q", query),
                ("sortBy", "relevancy"),
                ("pageSize", &self.page_size.to_string()),
                ("apiKey", api_key),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let articles: Vec<NewsArticle> = response
            .articles
            .into_iter()
            .filter_map(|r| r.into_article())
            .collect();
        debug!(%query, count = articles.len(), "Fetched news articles");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_key_returns_empty() {
        let provider = NewsFeedProvider::new("https://example.invalid/v2", None);
        let articles = provider.search("fed rates").await.unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn test_record_decoding() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
                "articles": [
                    {
                        "title": "Fed holds rates",
                        "description": "Officials pause",
                        "publishedAt": "2026-03-01T12:00:00Z",
                        "source": {"name": "Newswire"}
                    },
                    {"title": null}
                ]
            }"#,
        )
        .unwrap();

        let articles: Vec<NewsArticle> = response
            .articles
            .into_iter()
            .filter_map(|r| r.into_article())
            .collect();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source.as_deref(), Some("Newswire"));
        assert!(articles[0].published_at.is_some());
    }
}
