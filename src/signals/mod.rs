//! News signal fusion
//!
//! Turns raw article text plus a market's question into a directional
//! signal with a confidence value, using keyword-based categorization,
//! relevance scoring, and lexical sentiment counting.

pub mod keywords;
pub mod news;
pub mod sentiment;

pub use keywords::{build_query, extract_keywords, ExtractedKeywords, TopicCategory};
pub use news::NewsSignalFuser;
pub use sentiment::lexical_sentiment;
