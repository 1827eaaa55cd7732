//! Lexical sentiment counting
//!
//! Simple positive/negative keyword counts. A label is only assigned
//! when one count exceeds the other by more than one, which keeps
//! mixed headlines neutral.

use crate::domain::Sentiment;

const POSITIVE_WORDS: &[&str] = &[
    "win", "wins", "winning", "won", "surge", "surges", "rally", "rallies", "gain", "gains",
    "rise", "rises", "rising", "soar", "soars", "boost", "boosts", "strong", "strength",
    "success", "successful", "approve", "approves", "approved", "positive", "growth", "record",
    "breakthrough", "lead", "leads", "leading", "advance", "advances", "optimism", "confident",
    "beat", "beats", "exceed", "exceeds",
];

const NEGATIVE_WORDS: &[&str] = &[
    "lose", "loses", "losing", "lost", "fall", "falls", "falling", "drop", "drops", "plunge",
    "plunges", "crash", "crashes", "decline", "declines", "weak", "weakness", "fail", "fails",
    "failed", "failure", "reject", "rejects", "rejected", "negative", "concern", "concerns",
    "fear", "fears", "risk", "risks", "crisis", "scandal", "delay", "delays", "doubt", "doubts",
    "miss", "misses", "trail", "trails", "trailing",
];

/// Count positive and negative keyword hits in a text
pub fn sentiment_counts(text: &str) -> (usize, usize) {
    let mut positive = 0;
    let mut negative = 0;
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let lower = token.to_lowercase();
        if POSITIVE_WORDS.contains(&lower.as_str()) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&lower.as_str()) {
            negative += 1;
        }
    }
    (positive, negative)
}

/// Classify a text by keyword counts
pub fn lexical_sentiment(text: &str) -> Sentiment {
    let (positive, negative) = sentiment_counts(text);
    if positive > negative + 1 {
        Sentiment::Positive
    } else if negative > positive + 1 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_needs_margin_of_two() {
        // One positive hit is not enough
        assert_eq!(lexical_sentiment("Candidate wins debate"), Sentiment::Neutral);
        // Two clear positives, zero negatives
        assert_eq!(
            lexical_sentiment("Candidate wins debate, polls surge"),
            Sentiment::Positive
        );
    }

    #[test]
    fn test_negative_needs_margin_of_two() {
        assert_eq!(lexical_sentiment("Stocks drop"), Sentiment::Neutral);
        assert_eq!(
            lexical_sentiment("Stocks drop as fears grow and talks fail"),
            Sentiment::Negative
        );
    }

    #[test]
    fn test_mixed_stays_neutral() {
        assert_eq!(
            lexical_sentiment("Team wins but star player lost to injury, fears rise"),
            Sentiment::Neutral
        );
    }

    #[test]
    fn test_counts() {
        let (p, n) = sentiment_counts("surge surge drop");
        assert_eq!((p, n), (2, 1));
    }
}
