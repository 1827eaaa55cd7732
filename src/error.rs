use thiserror::Error;

/// Main error type for the decision engine
#[derive(Error, Debug)]
pub enum EdgewiseError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Market data errors
    #[error("Market data unavailable: {0}")]
    MarketDataUnavailable(String),

    #[error("Invalid market data: {0}")]
    InvalidMarketData(String),

    // News errors
    #[error("News source unavailable: {0}")]
    NewsUnavailable(String),

    // Index errors
    #[error("Index composition unavailable: {0}")]
    IndexUnavailable(String),

    // Portfolio errors
    #[error("Portfolio data unavailable: {0}")]
    PortfolioUnavailable(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for EdgewiseError
pub type Result<T> = std::result::Result<T, EdgewiseError>;
