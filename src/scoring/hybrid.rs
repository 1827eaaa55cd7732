//! Hybrid price + news confidence combiner
//!
//! Fuses a price-edge-derived confidence with a news signal, applying an
//! agreement bonus or disagreement penalty, and renders the trade gate
//! used by discretionary strategies.

use tracing::debug;

use crate::config::HybridConfig;
use crate::domain::NewsSignal;

/// Output of one combine pass
#[derive(Debug, Clone, serde::Serialize)]
pub struct HybridAssessment {
    pub price_confidence: f64,
    pub news_confidence: f64,
    pub combined_confidence: f64,
    pub should_trade: bool,
    pub reasoning: Vec<String>,
    /// Articles backing the news component
    pub supporting_articles: usize,
}

/// Combines price-edge confidence with news-signal confidence
#[derive(Debug, Clone, Default)]
pub struct HybridCombiner {
    config: HybridConfig,
}

impl HybridCombiner {
    pub fn new(config: HybridConfig) -> Self {
        Self { config }
    }

    /// Combine a price edge and an optional news signal for a candidate
    /// outcome
    pub fn combine(
        &self,
        price_edge: f64,
        news: Option<&NewsSignal>,
        outcome: &str,
    ) -> HybridAssessment {
        let cfg = &self.config;
        let mut reasoning = Vec::new();

        let price_confidence = (0.5 + 4.0 * price_edge).clamp(0.0, cfg.ceiling);
        reasoning.push(format!(
            "price edge {:.3} gives price confidence {:.2}",
            price_edge, price_confidence
        ));

        // News component: the signal's confidence when it agrees with
        // the candidate outcome, its complement when it opposes, 0.5
        // when neutral or absent
        let (news_confidence, news_neutral) = match news {
            Some(signal) => match signal.agrees_with(outcome) {
                Some(true) => {
                    reasoning.push(format!(
                        "news signal {} agrees with {} at {:.2}",
                        signal.direction, outcome, signal.confidence
                    ));
                    (signal.confidence, false)
                }
                Some(false) => {
                    reasoning.push(format!(
                        "news signal {} opposes {} ({:.2} inverted)",
                        signal.direction, outcome, signal.confidence
                    ));
                    (1.0 - signal.confidence, false)
                }
                None => {
                    reasoning.push("news signal is neutral".to_string());
                    (0.5, true)
                }
            },
            None => {
                reasoning.push("no news signal available".to_string());
                (0.5, true)
            }
        };
        let supporting_articles = news.map(|s| s.articles.len()).unwrap_or(0);

        let mut combined =
            cfg.price_weight * price_confidence + cfg.news_weight * news_confidence;

        // Exactly one adjustment applies, in this order
        if price_confidence > 0.7 && news_confidence > 0.7 {
            combined *= cfg.agreement_bonus;
            reasoning.push("strong agreement bonus applied".to_string());
        } else if (price_confidence - news_confidence).abs() > 0.4 {
            combined *= cfg.conflict_penalty;
            reasoning.push("signal conflict penalty applied".to_string());
        } else if news_neutral {
            combined *= cfg.neutral_damping;
            reasoning.push("neutral news damping applied".to_string());
        }
        let combined_confidence = combined.clamp(0.0, cfg.ceiling);

        let should_trade = self.trade_gate(
            price_confidence,
            news_confidence,
            combined_confidence,
            supporting_articles,
            &mut reasoning,
        );

        debug!(
            price_confidence,
            news_confidence, combined_confidence, should_trade, "Hybrid assessment"
        );

        HybridAssessment {
            price_confidence,
            news_confidence,
            combined_confidence,
            should_trade,
            reasoning,
            supporting_articles,
        }
    }

    fn trade_gate(
        &self,
        price: f64,
        news: f64,
        combined: f64,
        articles: usize,
        reasoning: &mut Vec<String>,
    ) -> bool {
        let cfg = &self.config;

        if price > cfg.strong_price_override {
            reasoning.push(format!(
                "strong price signal {:.2} suffices alone",
                price
            ));
            return true;
        }
        if news > cfg.strong_news_override && articles >= cfg.min_news_articles {
            reasoning.push(format!(
                "strong news signal {:.2} with {} articles suffices",
                news, articles
            ));
            return true;
        }
        if combined < cfg.combined_threshold {
            reasoning.push(format!(
                "combined confidence {:.2} below threshold {:.2}",
                combined, cfg.combined_threshold
            ));
            return false;
        }
        if price < cfg.price_floor {
            reasoning.push(format!(
                "price confidence {:.2} below floor {:.2}",
                price, cfg.price_floor
            ));
            return false;
        }
        if news < cfg.news_floor {
            reasoning.push(format!(
                "news confidence {:.2} below floor {:.2}",
                news, cfg.news_floor
            ));
            return false;
        }
        reasoning.push(format!(
            "combined confidence {:.2} clears threshold with both floors",
            combined
        ));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScoredArticle, Sentiment, SignalDirection};

    fn combiner() -> HybridCombiner {
        HybridCombiner::new(HybridConfig::default())
    }

    fn bullish(confidence: f64, articles: usize) -> NewsSignal {
        NewsSignal {
            market_question: "q".to_string(),
            direction: SignalDirection::Bullish,
            confidence,
            articles: (0..articles)
                .map(|i| ScoredArticle {
                    title: format!("article {i}"),
                    sentiment: Sentiment::Positive,
                    relevance: 0.8,
                })
                .collect(),
        }
    }

    #[test]
    fn test_price_confidence_formula() {
        let a = combiner().combine(0.05, None, "Yes");
        assert!((a.price_confidence - 0.7).abs() < 1e-9);

        // Clamped at the ceiling
        let a = combiner().combine(0.3, None, "Yes");
        assert!((a.price_confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_opposing_news_inverts() {
        let a = combiner().combine(0.05, Some(&bullish(0.8, 3)), "No");
        assert!((a.news_confidence - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_agreement_bonus() {
        // price 0.5 + 4*0.06 = 0.74, news 0.75 agreeing: both above 0.7
        let a = combiner().combine(0.06, Some(&bullish(0.75, 3)), "Yes");
        let raw = 0.6 * 0.74 + 0.4 * 0.75;
        assert!((a.combined_confidence - raw * 1.10).abs() < 1e-9);
        assert!(a.should_trade);
    }

    #[test]
    fn test_conflict_penalty() {
        // price 0.9, opposing news gives 0.2: gap of 0.7
        let a = combiner().combine(0.1, Some(&bullish(0.8, 2)), "No");
        let raw = 0.6 * 0.9 + 0.4 * 0.2;
        assert!((a.combined_confidence - raw * 0.90).abs() < 1e-9);
    }

    #[test]
    fn test_neutral_damping() {
        let a = combiner().combine(0.05, None, "Yes");
        let raw = 0.6 * 0.7 + 0.4 * 0.5;
        assert!((a.combined_confidence - raw * 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_monotone_in_price_edge_with_agreeing_news() {
        // Holding a strong agreeing news signal fixed, combined
        // confidence never decreases as the edge grows
        let news = bullish(0.75, 3);
        let mut last = 0.0;
        for i in 0..=120 {
            let edge = i as f64 * 0.001;
            let a = combiner().combine(edge, Some(&news), "Yes");
            assert!(
                a.combined_confidence >= last - 1e-12,
                "combined dropped at edge {edge}"
            );
            last = a.combined_confidence;
        }
    }

    #[test]
    fn test_monotone_in_price_edge_without_news() {
        let mut last = 0.0;
        for i in 0..=100 {
            let edge = i as f64 * 0.001;
            let a = combiner().combine(edge, None, "Yes");
            assert!(a.combined_confidence >= last - 1e-12);
            last = a.combined_confidence;
        }
    }

    #[test]
    fn test_strong_price_alone_trades() {
        let a = combiner().combine(0.1, None, "Yes");
        assert!(a.price_confidence > 0.85);
        assert!(a.should_trade);
    }

    #[test]
    fn test_strong_news_needs_articles() {
        // news 0.85 agreeing but only 2 articles; price weak
        let a = combiner().combine(0.0, Some(&bullish(0.85, 2)), "Yes");
        assert!(!a.should_trade);

        let a = combiner().combine(0.0, Some(&bullish(0.85, 3)), "Yes");
        assert!(a.should_trade);
    }

    #[test]
    fn test_combined_path_needs_floors() {
        // price 0.5+4*0.01=0.54, news 0.9 agreeing with 1 article:
        // no override applies and combined 0.684 misses the threshold
        let a = combiner().combine(0.01, Some(&bullish(0.9, 1)), "Yes");
        assert!(!a.should_trade);
    }
}
