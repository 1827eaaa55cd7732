//! News article and signal records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lexical sentiment classification of a single article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Aggregated direction of a news signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalDirection {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalDirection::Bullish => write!(f, "bullish"),
            SignalDirection::Bearish => write!(f, "bearish"),
            SignalDirection::Neutral => write!(f, "neutral"),
        }
    }
}

/// Raw article as supplied by the news collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source: Option<String>,
}

impl NewsArticle {
    /// Title and description joined for scoring
    pub fn full_text(&self) -> String {
        match &self.description {
            Some(d) => format!("{} {}", self.title, d),
            None => self.title.clone(),
        }
    }
}

/// An article after relevance and sentiment scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub title: String,
    pub sentiment: Sentiment,
    /// Combined relevance in [0, 1], used for ranking and weighting
    pub relevance: f64,
}

/// Aggregated news opinion about a market's topic
///
/// Built once per opportunity-scan pass and discarded after use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSignal {
    /// The market question the signal was built for
    pub market_question: String,
    pub direction: SignalDirection,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Surviving articles, ordered by descending relevance
    pub articles: Vec<ScoredArticle>,
}

impl NewsSignal {
    /// The degraded signal used when no articles survive filtering
    pub fn absent(market_question: impl Into<String>) -> Self {
        Self {
            market_question: market_question.into(),
            direction: SignalDirection::Neutral,
            confidence: 0.0,
            articles: Vec::new(),
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.direction == SignalDirection::Neutral
    }

    /// Whether the signal direction supports buying the given outcome
    ///
    /// A bullish signal agrees with the YES side and opposes the NO side;
    /// symmetric for bearish. Neutral agrees with nothing.
    pub fn agrees_with(&self, outcome: &str) -> Option<bool> {
        let no_side = outcome_is_no_side(outcome);
        match self.direction {
            SignalDirection::Bullish => Some(!no_side),
            SignalDirection::Bearish => Some(no_side),
            SignalDirection::Neutral => None,
        }
    }
}

/// Classify an outcome name as the NO side of a binary market
pub fn outcome_is_no_side(outcome: &str) -> bool {
    outcome.eq_ignore_ascii_case("no") || outcome.eq_ignore_ascii_case("down")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_signal_is_neutral_zero() {
        let sig = NewsSignal::absent("Will X happen?");
        assert_eq!(sig.direction, SignalDirection::Neutral);
        assert_eq!(sig.confidence, 0.0);
        assert!(sig.articles.is_empty());
    }

    #[test]
    fn test_agreement() {
        let mut sig = NewsSignal::absent("q");
        sig.direction = SignalDirection::Bullish;
        assert_eq!(sig.agrees_with("Yes"), Some(true));
        assert_eq!(sig.agrees_with("No"), Some(false));

        sig.direction = SignalDirection::Bearish;
        assert_eq!(sig.agrees_with("Yes"), Some(false));
        assert_eq!(sig.agrees_with("no"), Some(true));

        sig.direction = SignalDirection::Neutral;
        assert_eq!(sig.agrees_with("Yes"), None);
    }

    #[test]
    fn test_full_text() {
        let art = NewsArticle {
            title: "Fed signals pause".to_string(),
            description: Some("Officials hint at steady rates".to_string()),
            published_at: None,
            source: None,
        };
        assert!(art.full_text().contains("pause"));
        assert!(art.full_text().contains("steady"));
    }
}
