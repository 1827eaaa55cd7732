//! News signal fuser
//!
//! Builds a search query from market text, retrieves candidate articles
//! from the news collaborator, scores each for relevance and sentiment,
//! and aggregates the survivors into a directional signal. Provider
//! failures and empty result sets degrade to a neutral signal; the fuser
//! never returns an error.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::NewsConfig;
use crate::domain::{NewsArticle, NewsSignal, ScoredArticle, Sentiment, SignalDirection};
use crate::providers::NewsProvider;
use crate::signals::keywords::{build_query, extract_keywords, ExtractedKeywords};
use crate::signals::sentiment::lexical_sentiment;

#[derive(Debug, Clone)]
struct CachedSignal {
    fetched_at: DateTime<Utc>,
    signal: NewsSignal,
}

/// Fuses retrieved articles into a per-market news signal
///
/// Construct once and share; the query cache is internal and guarded, so
/// concurrent scans over the same instance are safe.
pub struct NewsSignalFuser {
    provider: Arc<dyn NewsProvider>,
    config: NewsConfig,
    cache: RwLock<HashMap<String, CachedSignal>>,
}

impl NewsSignalFuser {
    pub fn new(provider: Arc<dyn NewsProvider>, config: NewsConfig) -> Self {
        Self {
            provider,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Produce a directional signal for a market question
    ///
    /// `rules` is the market's resolution text, folded into keyword
    /// extraction when present.
    pub async fn market_signal(&self, question: &str, rules: Option<&str>) -> NewsSignal {
        let text = match rules {
            Some(r) => format!("{question} {r}"),
            None => question.to_string(),
        };

        let keywords = extract_keywords(&text, &self.config.categories);
        let query = build_query(&keywords);
        if query.is_empty() {
            debug!("No usable keywords in market text, returning neutral signal");
            return NewsSignal::absent(question);
        }

        if let Some(cached) = self.cached(&query).await {
            debug!(%query, "News signal cache hit");
            return cached;
        }

        let articles = match self.provider.search(&query).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(%query, error = %e, "News fetch failed, degrading to neutral signal");
                return NewsSignal::absent(question);
            }
        };

        let signal = self.fuse(question, &keywords, articles);
        self.store(&query, &signal).await;
        signal
    }

    async fn cached(&self, query: &str) -> Option<NewsSignal> {
        let ttl = Duration::seconds(self.config.cache_ttl_secs as i64);
        let cache = self.cache.read().await;
        cache
            .get(query)
            .filter(|entry| Utc::now() - entry.fetched_at < ttl)
            .map(|entry| entry.signal.clone())
    }

    async fn store(&self, query: &str, signal: &NewsSignal) {
        let mut cache = self.cache.write().await;
        cache.insert(
            query.to_string(),
            CachedSignal {
                fetched_at: Utc::now(),
                signal: signal.clone(),
            },
        );
    }

    /// Score, filter, and aggregate articles into a signal
    fn fuse(
        &self,
        question: &str,
        keywords: &ExtractedKeywords,
        articles: Vec<NewsArticle>,
    ) -> NewsSignal {
        let mut scored: Vec<(ScoredArticle, f64)> = Vec::new();

        for article in &articles {
            let text = article.full_text().to_lowercase();
            let category_rel = self.category_relevance(&text);
            let market_rel = market_relevance(&text, keywords);

            if category_rel < self.config.relevance_threshold
                || market_rel < self.config.market_relevance_floor
            {
                continue;
            }

            let relevance = (category_rel + market_rel) / 2.0;
            scored.push((
                ScoredArticle {
                    title: article.title.clone(),
                    sentiment: lexical_sentiment(&article.full_text()),
                    relevance,
                },
                relevance,
            ));
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.config.max_articles);

        if scored.is_empty() {
            debug!("No articles survived relevance filtering");
            return NewsSignal::absent(question);
        }

        let total_relevance: f64 = scored.iter().map(|(_, r)| r).sum();
        let positive_weight: f64 = scored
            .iter()
            .filter(|(a, _)| a.sentiment == Sentiment::Positive)
            .map(|(_, r)| r)
            .sum();
        let negative_weight: f64 = scored
            .iter()
            .filter(|(a, _)| a.sentiment == Sentiment::Negative)
            .map(|(_, r)| r)
            .sum();

        let positive_ratio = positive_weight / total_relevance;
        let negative_ratio = negative_weight / total_relevance;

        let (direction, base_confidence) = if positive_ratio > self.config.ratio_threshold {
            (SignalDirection::Bullish, positive_ratio)
        } else if negative_ratio > self.config.ratio_threshold {
            (SignalDirection::Bearish, negative_ratio)
        } else {
            (SignalDirection::Neutral, 0.5)
        };

        let avg_relevance = total_relevance / scored.len() as f64;
        let article_bonus = (self.config.extra_article_bonus
            * scored.len().saturating_sub(1) as f64)
            .min(self.config.max_article_bonus);
        let confidence = (base_confidence * avg_relevance + article_bonus)
            .clamp(0.0, self.config.confidence_ceiling);

        let articles: Vec<ScoredArticle> = scored
            .into_iter()
            .take(self.config.top_articles)
            .map(|(a, _)| a)
            .collect();

        debug!(
            %direction,
            confidence,
            articles = articles.len(),
            "Fused news signal"
        );

        NewsSignal {
            market_question: question.to_string(),
            direction,
            confidence,
            articles,
        }
    }

    /// Weighted average of matched category weights, with a bonus for
    /// matching several categories
    fn category_relevance(&self, text_lower: &str) -> f64 {
        let mut matched: Vec<f64> = Vec::new();
        for category in &self.config.categories {
            if category
                .keywords
                .iter()
                .any(|k| crate::signals::keywords::keyword_in_text(text_lower, k))
            {
                matched.push(category.weight);
            }
        }
        if matched.is_empty() {
            return 0.0;
        }
        let base = matched.iter().sum::<f64>() / matched.len() as f64;
        let multi_bonus = 0.05 * (matched.len() - 1) as f64;
        (base + multi_bonus).min(1.0)
    }
}

/// Fraction of extracted market terms present in the article text
fn market_relevance(text_lower: &str, keywords: &ExtractedKeywords) -> f64 {
    let terms = keywords.all_terms();
    if terms.is_empty() {
        return 0.0;
    }
    let hits = terms.iter().filter(|t| text_lower.contains(t.as_str())).count();
    hits as f64 / terms.len() as f64
}
