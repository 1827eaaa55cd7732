use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::Path;

use crate::scoring::Recommendation;
use crate::signals::keywords::{default_categories, TopicCategory};

/// Main configuration structure
///
/// Loaded once at startup and passed into each component's constructor;
/// core logic never reads the environment directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub hybrid: HybridConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub strategies: StrategiesConfig,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Scoring
// =============================================================================

/// The factors the confidence scorer knows how to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    NewsSentiment,
    Volume,
    TimeToResolution,
}

impl std::fmt::Display for FactorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FactorKind::NewsSentiment => write!(f, "news_sentiment"),
            FactorKind::Volume => write!(f, "volume"),
            FactorKind::TimeToResolution => write!(f, "time_to_resolution"),
        }
    }
}

/// One weighted factor in the scorer
#[derive(Debug, Clone, Deserialize)]
pub struct FactorWeight {
    pub factor: FactorKind,
    pub weight: f64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Volume tier: first tier whose `min_volume` the value meets wins
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeTier {
    pub min_volume: Decimal,
    pub score: f64,
    pub label: String,
}

/// Time tier: first tier whose `max_days` covers the value wins
#[derive(Debug, Clone, Deserialize)]
pub struct TimeTier {
    pub max_days: f64,
    pub score: f64,
    pub label: String,
}

/// Named confidence band over a score range
///
/// Bands are contiguous and non-overlapping; `max_score` is exclusive
/// except for the final band, which is inclusive so 100 is covered.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfidenceBand {
    pub min_score: f64,
    pub max_score: f64,
    pub name: String,
    pub recommendation: Recommendation,
}

/// Edge-quality rule: minimum edge AND minimum score jointly required
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeRule {
    pub min_edge: f64,
    pub min_score: f64,
    /// Whether a match upgrades to the strong recommendation tier
    pub strong: bool,
}

/// Multiplicative risk-adjustment rules applied to sizing confidence
#[derive(Debug, Clone, Deserialize)]
pub struct RiskRulesConfig {
    /// Position fraction of the portfolio above which the large-position
    /// penalty applies
    pub large_position_fraction: f64,
    pub large_position_factor: f64,
    /// Open-position count at which the concentration penalty applies
    pub concentration_count: usize,
    pub concentration_factor: f64,
    /// Price volatility above which the volatility penalty applies
    pub volatility_threshold: f64,
    pub volatility_factor: f64,
    /// 24h volume below which the low-liquidity penalty applies
    pub low_liquidity_volume: Decimal,
    pub low_liquidity_factor: f64,
    /// Hard ceiling on adjusted confidence, always below 1.0
    pub max_confidence: f64,
}

impl Default for RiskRulesConfig {
    fn default() -> Self {
        Self {
            large_position_fraction: 0.25,
            large_position_factor: 0.85,
            concentration_count: 5,
            concentration_factor: 0.90,
            volatility_threshold: 0.15,
            volatility_factor: 0.85,
            low_liquidity_volume: dec!(1000),
            low_liquidity_factor: 0.80,
            max_confidence: 0.95,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_factors")]
    pub factors: Vec<FactorWeight>,
    #[serde(default = "default_volume_tiers")]
    pub volume_tiers: Vec<VolumeTier>,
    #[serde(default = "default_time_tiers")]
    pub time_tiers: Vec<TimeTier>,
    #[serde(default = "default_bands")]
    pub bands: Vec<ConfidenceBand>,
    #[serde(default = "default_edge_rules")]
    pub edge_rules: Vec<EdgeRule>,
    #[serde(default)]
    pub risk: RiskRulesConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            factors: default_factors(),
            volume_tiers: default_volume_tiers(),
            time_tiers: default_time_tiers(),
            bands: default_bands(),
            edge_rules: default_edge_rules(),
            risk: RiskRulesConfig::default(),
        }
    }
}

fn default_factors() -> Vec<FactorWeight> {
    vec![
        FactorWeight {
            factor: FactorKind::NewsSentiment,
            weight: 0.40,
            enabled: true,
        },
        FactorWeight {
            factor: FactorKind::Volume,
            weight: 0.35,
            enabled: true,
        },
        FactorWeight {
            factor: FactorKind::TimeToResolution,
            weight: 0.25,
            enabled: true,
        },
    ]
}

fn default_volume_tiers() -> Vec<VolumeTier> {
    vec![
        VolumeTier {
            min_volume: dec!(100000),
            score: 1.0,
            label: "high".to_string(),
        },
        VolumeTier {
            min_volume: dec!(25000),
            score: 0.7,
            label: "medium".to_string(),
        },
        VolumeTier {
            min_volume: dec!(5000),
            score: 0.4,
            label: "low".to_string(),
        },
        VolumeTier {
            min_volume: dec!(0),
            score: 0.15,
            label: "very_low".to_string(),
        },
    ]
}

fn default_time_tiers() -> Vec<TimeTier> {
    vec![
        TimeTier {
            max_days: 3.0,
            score: 0.9,
            label: "imminent".to_string(),
        },
        TimeTier {
            max_days: 14.0,
            score: 0.75,
            label: "near".to_string(),
        },
        TimeTier {
            max_days: 45.0,
            score: 0.5,
            label: "medium".to_string(),
        },
        TimeTier {
            max_days: f64::INFINITY,
            score: 0.25,
            label: "distant".to_string(),
        },
    ]
}

fn default_bands() -> Vec<ConfidenceBand> {
    vec![
        ConfidenceBand {
            min_score: 0.0,
            max_score: 20.0,
            name: "very_low".to_string(),
            recommendation: Recommendation::StrongNo,
        },
        ConfidenceBand {
            min_score: 20.0,
            max_score: 40.0,
            name: "low".to_string(),
            recommendation: Recommendation::No,
        },
        ConfidenceBand {
            min_score: 40.0,
            max_score: 60.0,
            name: "moderate".to_string(),
            recommendation: Recommendation::Hold,
        },
        ConfidenceBand {
            min_score: 60.0,
            max_score: 80.0,
            name: "high".to_string(),
            recommendation: Recommendation::Yes,
        },
        ConfidenceBand {
            min_score: 80.0,
            max_score: 100.0,
            name: "very_high".to_string(),
            recommendation: Recommendation::StrongYes,
        },
    ]
}

fn default_edge_rules() -> Vec<EdgeRule> {
    vec![
        EdgeRule {
            min_edge: 0.15,
            min_score: 70.0,
            strong: true,
        },
        EdgeRule {
            min_edge: 0.05,
            min_score: 55.0,
            strong: false,
        },
    ]
}

// =============================================================================
// Hybrid combiner
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct HybridConfig {
    /// Weight of the price-edge component
    #[serde(default = "default_price_weight")]
    pub price_weight: f64,
    /// Weight of the news component
    #[serde(default = "default_news_weight")]
    pub news_weight: f64,
    /// Applied when both components exceed 0.7
    #[serde(default = "default_agreement_bonus")]
    pub agreement_bonus: f64,
    /// Applied when the components differ by more than 0.4
    #[serde(default = "default_conflict_penalty")]
    pub conflict_penalty: f64,
    /// Applied when the news component is neutral
    #[serde(default = "default_neutral_damping")]
    pub neutral_damping: f64,
    /// Combined confidence required to trade
    #[serde(default = "default_combined_threshold")]
    pub combined_threshold: f64,
    /// Price confidence that alone suffices
    #[serde(default = "default_strong_price")]
    pub strong_price_override: f64,
    /// News confidence that, with enough articles, suffices
    #[serde(default = "default_strong_news")]
    pub strong_news_override: f64,
    #[serde(default = "default_min_news_articles")]
    pub min_news_articles: usize,
    /// Individual floors when relying on the combined path
    #[serde(default = "default_price_floor")]
    pub price_floor: f64,
    #[serde(default = "default_news_floor")]
    pub news_floor: f64,
    /// Hard ceiling on any confidence value
    #[serde(default = "default_ceiling")]
    pub ceiling: f64,
}

fn default_price_weight() -> f64 {
    0.6
}
fn default_news_weight() -> f64 {
    0.4
}
fn default_agreement_bonus() -> f64 {
    1.10
}
fn default_conflict_penalty() -> f64 {
    0.90
}
fn default_neutral_damping() -> f64 {
    0.95
}
fn default_combined_threshold() -> f64 {
    0.7
}
fn default_strong_price() -> f64 {
    0.85
}
fn default_strong_news() -> f64 {
    0.8
}
fn default_min_news_articles() -> usize {
    3
}
fn default_price_floor() -> f64 {
    0.6
}
fn default_news_floor() -> f64 {
    0.5
}
fn default_ceiling() -> f64 {
    0.95
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            price_weight: default_price_weight(),
            news_weight: default_news_weight(),
            agreement_bonus: default_agreement_bonus(),
            conflict_penalty: default_conflict_penalty(),
            neutral_damping: default_neutral_damping(),
            combined_threshold: default_combined_threshold(),
            strong_price_override: default_strong_price(),
            strong_news_override: default_strong_news(),
            min_news_articles: default_min_news_articles(),
            price_floor: default_price_floor(),
            news_floor: default_news_floor(),
            ceiling: default_ceiling(),
        }
    }
}

// =============================================================================
// News fuser
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    /// Minimum category relevance for an article to survive
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,
    /// Minimum keyword-overlap relevance against the market text
    #[serde(default = "default_market_relevance_floor")]
    pub market_relevance_floor: f64,
    /// Most relevant articles retained after filtering
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    /// Articles passed downstream on the signal
    #[serde(default = "default_top_articles")]
    pub top_articles: usize,
    /// Sentiment ratio above which the signal turns directional
    #[serde(default = "default_ratio_threshold")]
    pub ratio_threshold: f64,
    /// Confidence bonus per article beyond the first
    #[serde(default = "default_extra_article_bonus")]
    pub extra_article_bonus: f64,
    /// Cap on the per-article bonus
    #[serde(default = "default_max_article_bonus")]
    pub max_article_bonus: f64,
    /// Hard ceiling on signal confidence
    #[serde(default = "default_ceiling")]
    pub confidence_ceiling: f64,
    /// Seconds a cached signal stays fresh
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_categories")]
    pub categories: Vec<TopicCategory>,
}

fn default_relevance_threshold() -> f64 {
    0.2
}
fn default_market_relevance_floor() -> f64 {
    0.3
}
fn default_max_articles() -> usize {
    10
}
fn default_top_articles() -> usize {
    5
}
fn default_ratio_threshold() -> f64 {
    0.6
}
fn default_extra_article_bonus() -> f64 {
    0.02
}
fn default_max_article_bonus() -> f64 {
    0.1
}
fn default_cache_ttl() -> u64 {
    300
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: default_relevance_threshold(),
            market_relevance_floor: default_market_relevance_floor(),
            max_articles: default_max_articles(),
            top_articles: default_top_articles(),
            ratio_threshold: default_ratio_threshold(),
            extra_article_bonus: default_extra_article_bonus(),
            max_article_bonus: default_max_article_bonus(),
            confidence_ceiling: default_ceiling(),
            cache_ttl_secs: default_cache_ttl(),
            categories: default_categories(),
        }
    }
}

// =============================================================================
// Strategies
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrategiesConfig {
    #[serde(default)]
    pub threshold: ThresholdConfig,
    #[serde(default)]
    pub interactive: InteractiveConfig,
    #[serde(default)]
    pub expiring: ExpiringConfig,
    #[serde(default)]
    pub index: IndexFollowConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Buy the outcome when priced below this level
    pub buy_threshold: Decimal,
    /// Buy the complementary outcome when YES exceeds this level
    pub sell_threshold: Decimal,
    /// Required mispricing beyond the threshold (strictly greater)
    pub min_edge: Decimal,
    /// Gate entries through the hybrid price+news combiner
    #[serde(default = "default_true")]
    pub use_news: bool,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            buy_threshold: dec!(0.35),
            sell_threshold: dec!(0.65),
            min_edge: dec!(0.05),
            use_news: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractiveConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub price_weight: f64,
    pub volume_weight: f64,
    pub news_weight: f64,
    /// Required distance of the combined signal from 0.5
    pub signal_threshold: f64,
    pub min_confidence: f64,
    /// Global cut after ranking across all scanned markets
    pub max_results: usize,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            price_weight: 0.4,
            volume_weight: 0.3,
            news_weight: 0.3,
            signal_threshold: 0.10,
            min_confidence: 0.60,
            max_results: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpiringConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub min_hours_to_expiry: f64,
    pub max_hours_to_expiry: f64,
    pub min_volume: Decimal,
    /// Price at or above which an outcome counts as near-certain
    pub extreme_threshold: Decimal,
}

impl Default for ExpiringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_hours_to_expiry: 1.0,
            max_hours_to_expiry: 48.0,
            min_volume: dec!(5000),
            extreme_threshold: dec!(0.95),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexFollowConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Dollar deviation from target that forces an order
    pub deviation_threshold: Decimal,
}

impl Default for IndexFollowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            deviation_threshold: dec!(25),
        }
    }
}

// =============================================================================
// Evaluator & allocation
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluatorConfig {
    /// Upper bound on any position, USD
    pub max_position_size: Decimal,
    /// Absolute per-trade risk cap, USD
    pub risk_limit_per_trade: Decimal,
    /// Conservative fraction of the Kelly bet (quarter-Kelly default)
    pub kelly_fraction: f64,
    /// Risk-adjusted confidence required to trade
    pub min_confidence: f64,
    /// Expected-value floor in percentage points
    pub min_expected_value: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_position_size: dec!(1000),
            risk_limit_per_trade: dec!(100),
            kelly_fraction: 0.25,
            min_confidence: 0.65,
            min_expected_value: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllocationConfig {
    /// Deltas below this are held rather than traded, USD
    pub min_position_size: Decimal,
    /// Tracking error beyond this percentage forces a rebalance
    pub rebalance_threshold_pct: f64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            min_position_size: dec!(10),
            rebalance_threshold_pct: 5.0,
        }
    }
}

// =============================================================================
// Providers & logging
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Polymarket Gamma API base URL
    pub gamma_url: String,
    /// Markets fetched per scan
    pub market_limit: usize,
    /// News API base URL
    pub news_url: String,
    /// News API key; article search degrades to empty without one
    #[serde(default)]
    pub news_api_key: Option<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            gamma_url: "https://gamma-api.polymarket.com".to_string(),
            market_limit: 50,
            news_url: "https://newsapi.org/v2".to_string(),
            news_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Loading & validation
// =============================================================================

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                File::from(config_dir.join(
                    std::env::var("EDGEWISE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (EDGEWISE_EVALUATOR__MIN_CONFIDENCE, etc.)
            .add_source(
                Environment::with_prefix("EDGEWISE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for fw in &self.scoring.factors {
            if fw.weight < 0.0 {
                errors.push(format!("factor {} has negative weight", fw.factor));
            }
        }

        // Bands must tile 0..=100 without gaps or overlap
        let bands = &self.scoring.bands;
        if bands.is_empty() {
            errors.push("scoring.bands must not be empty".to_string());
        } else {
            if bands[0].min_score != 0.0 {
                errors.push("first confidence band must start at 0".to_string());
            }
            if bands[bands.len() - 1].max_score != 100.0 {
                errors.push("last confidence band must end at 100".to_string());
            }
            for pair in bands.windows(2) {
                if (pair[0].max_score - pair[1].min_score).abs() > f64::EPSILON {
                    errors.push(format!(
                        "confidence bands {} and {} are not contiguous",
                        pair[0].name, pair[1].name
                    ));
                }
            }
        }

        let t = &self.strategies.threshold;
        if t.buy_threshold <= Decimal::ZERO || t.buy_threshold >= Decimal::ONE {
            errors.push("threshold.buy_threshold must be between 0 and 1".to_string());
        }
        if t.sell_threshold <= Decimal::ZERO || t.sell_threshold >= Decimal::ONE {
            errors.push("threshold.sell_threshold must be between 0 and 1".to_string());
        }
        if t.buy_threshold >= t.sell_threshold {
            errors.push("threshold.buy_threshold must be below sell_threshold".to_string());
        }
        if t.min_edge < Decimal::ZERO {
            errors.push("threshold.min_edge must not be negative".to_string());
        }

        let i = &self.strategies.interactive;
        let weight_sum = i.price_weight + i.volume_weight + i.news_weight;
        if (weight_sum - 1.0).abs() > 1e-3 {
            errors.push(format!(
                "interactive signal weights sum to {weight_sum}, expected 1.0"
            ));
        }

        let e = &self.strategies.expiring;
        if e.min_hours_to_expiry >= e.max_hours_to_expiry {
            errors.push("expiring.min_hours_to_expiry must be below max_hours_to_expiry".to_string());
        }
        if e.extreme_threshold <= dec!(0.5) || e.extreme_threshold >= Decimal::ONE {
            errors.push("expiring.extreme_threshold must be between 0.5 and 1".to_string());
        }

        let ev = &self.evaluator;
        if ev.kelly_fraction <= 0.0 || ev.kelly_fraction > 1.0 {
            errors.push("evaluator.kelly_fraction must be in (0, 1]".to_string());
        }
        if ev.max_position_size <= Decimal::ZERO {
            errors.push("evaluator.max_position_size must be positive".to_string());
        }
        if ev.risk_limit_per_trade <= Decimal::ZERO {
            errors.push("evaluator.risk_limit_per_trade must be positive".to_string());
        }

        if self.allocation.min_position_size <= Decimal::ZERO {
            errors.push("allocation.min_position_size must be positive".to_string());
        }
        if self.allocation.rebalance_threshold_pct <= 0.0 {
            errors.push("allocation.rebalance_threshold_pct must be positive".to_string());
        }

        if self.scoring.risk.max_confidence >= 1.0 {
            errors.push("scoring.risk.max_confidence must stay below 1.0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
