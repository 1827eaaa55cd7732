//! Keyword extraction from market text
//!
//! Pulls named entities, topic keywords, and timeframe tokens out of a
//! market question to build a news search query.

use serde::Deserialize;

/// A topic category with a relevance weight and its trigger keywords
#[derive(Debug, Clone, Deserialize)]
pub struct TopicCategory {
    pub name: String,
    /// Relevance contribution when an article matches this category
    pub weight: f64,
    pub keywords: Vec<String>,
}

/// Default topic/category list used when none is configured
pub fn default_categories() -> Vec<TopicCategory> {
    fn cat(name: &str, weight: f64, keywords: &[&str]) -> TopicCategory {
        TopicCategory {
            name: name.to_string(),
            weight,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    vec![
        cat(
            "politics",
            1.0,
            &[
                "election", "president", "senate", "congress", "vote", "candidate", "poll",
                "nominee", "governor", "parliament",
            ],
        ),
        cat(
            "economy",
            0.9,
            &[
                "fed", "rates", "inflation", "recession", "gdp", "unemployment", "tariff",
                "economy", "treasury", "cpi",
            ],
        ),
        cat(
            "crypto",
            0.9,
            &[
                "bitcoin", "ethereum", "crypto", "btc", "eth", "solana", "etf", "blockchain",
                "stablecoin",
            ],
        ),
        cat(
            "geopolitics",
            0.8,
            &[
                "war", "ceasefire", "sanctions", "treaty", "invasion", "nato", "summit",
                "conflict", "missile",
            ],
        ),
        cat(
            "technology",
            0.7,
            &[
                "ai", "launch", "chip", "model", "startup", "ipo", "antitrust", "software",
                "robot",
            ],
        ),
        cat(
            "sports",
            0.6,
            &[
                "championship", "playoffs", "finals", "season", "league", "tournament", "match",
                "cup",
            ],
        ),
        cat(
            "entertainment",
            0.4,
            &["oscar", "award", "album", "movie", "box office", "grammy"],
        ),
    ]
}

/// Institution acronyms treated as entities even as single tokens
const KNOWN_ACRONYMS: &[&str] = &[
    "FED", "FOMC", "SEC", "ECB", "IMF", "NATO", "OPEC", "EU", "UN", "GDP", "CPI", "NBA", "NFL",
    "MLB", "NHL", "UFC", "FIFA", "NASA", "FDA", "DOJ", "FBI", "CIA", "WHO",
];

const MONTHS: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Words too common to carry search signal
const STOPWORDS: &[&str] = &[
    "will", "the", "and", "for", "that", "this", "with", "from", "have", "has", "been", "are",
    "was", "were", "when", "what", "which", "who", "how", "than", "then", "them", "they", "their",
    "there", "would", "could", "should", "before", "after", "above", "below", "more", "less",
    "most", "least", "into", "over", "under", "between", "about", "against", "during", "until",
    "reach", "happen", "occur", "announce", "officially", "resolve", "market", "question",
];

/// Keywords extracted from market text
#[derive(Debug, Clone, Default)]
pub struct ExtractedKeywords {
    /// Capitalized multi-word sequences and known acronyms
    pub entities: Vec<String>,
    /// Matched topic keywords
    pub topics: Vec<String>,
    /// Years, month names, quarter markers
    pub timeframes: Vec<String>,
    /// Fallback: significant lowercase words
    pub significant: Vec<String>,
}

impl ExtractedKeywords {
    /// All distinct lowercase terms, for overlap scoring
    pub fn all_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        let mut push = |t: &str| {
            let lower = t.to_lowercase();
            if !terms.contains(&lower) {
                terms.push(lower);
            }
        };
        for e in &self.entities {
            // Multi-word entities contribute their individual words
            for w in e.split_whitespace() {
                push(w);
            }
        }
        for t in &self.topics {
            push(t);
        }
        for t in &self.timeframes {
            push(t);
        }
        for s in &self.significant {
            push(s);
        }
        terms
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
            && self.topics.is_empty()
            && self.timeframes.is_empty()
            && self.significant.is_empty()
    }
}

/// Match a keyword against text: single words must match a whole token
/// (so "ai" does not fire inside "gains"), multi-word keywords match as
/// phrases
pub fn keyword_in_text(text_lower: &str, keyword: &str) -> bool {
    if keyword.contains(' ') {
        text_lower.contains(keyword)
    } else {
        text_lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|t| t == keyword)
    }
}

fn is_year(token: &str) -> bool {
    token.len() == 4
        && (token.starts_with("19") || token.starts_with("20"))
        && token.chars().all(|c| c.is_ascii_digit())
}

fn is_quarter(token: &str) -> bool {
    let bytes = token.as_bytes();
    token.len() == 2 && (bytes[0] == b'Q' || bytes[0] == b'q') && (b'1'..=b'4').contains(&bytes[1])
}

fn is_capitalized(token: &str) -> bool {
    token
        .chars()
        .next()
        .map(|c| c.is_uppercase())
        .unwrap_or(false)
}

/// Extract entities, topics, and timeframes from market text
pub fn extract_keywords(text: &str, categories: &[TopicCategory]) -> ExtractedKeywords {
    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .collect();
    let lower_text = text.to_lowercase();

    let mut out = ExtractedKeywords::default();

    // Entities: runs of 2+ capitalized tokens, or known acronyms
    fn flush_run(run: &mut Vec<&str>, entities: &mut Vec<String>) {
        if run.len() >= 2 {
            let entity = run.join(" ");
            if !entities.contains(&entity) {
                entities.push(entity);
            }
        }
        run.clear();
    }

    let mut run: Vec<&str> = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        let acronym = KNOWN_ACRONYMS.contains(&token.to_uppercase().as_str())
            && token.chars().all(|c| c.is_uppercase());
        if acronym {
            flush_run(&mut run, &mut out.entities);
            if !out.entities.contains(&token.to_string()) {
                out.entities.push(token.to_string());
            }
            continue;
        }
        // The sentence-leading word is capitalized by convention, not
        // because it names anything
        if is_capitalized(token) && i > 0 && token.len() > 1 {
            run.push(*token);
        } else {
            flush_run(&mut run, &mut out.entities);
        }
    }
    flush_run(&mut run, &mut out.entities);

    // Topics: category keywords present in the text
    for category in categories {
        for keyword in &category.keywords {
            if keyword_in_text(&lower_text, keyword) && !out.topics.contains(keyword) {
                out.topics.push(keyword.clone());
            }
        }
    }

    // Timeframes: years, months, quarter markers
    for token in &tokens {
        let lower = token.to_lowercase();
        if is_year(token) || is_quarter(token) || MONTHS.contains(&lower.as_str()) {
            if !out.timeframes.contains(&lower) {
                out.timeframes.push(lower);
            }
        }
    }

    // Significant fallback words
    for token in &tokens {
        let lower = token.to_lowercase();
        if lower.len() > 3
            && !STOPWORDS.contains(&lower.as_str())
            && !lower.chars().all(|c| c.is_ascii_digit())
            && !out.significant.contains(&lower)
        {
            out.significant.push(lower);
        }
    }

    out
}

/// Build a news search query, preferring entities and topics
pub fn build_query(keywords: &ExtractedKeywords) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.extend(keywords.entities.iter().take(3).cloned());
    parts.extend(keywords.topics.iter().take(3).cloned());

    if parts.is_empty() {
        parts.extend(keywords.significant.iter().take(5).cloned());
    }

    parts.join(" ")
}
