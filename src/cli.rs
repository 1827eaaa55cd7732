//! CLI surface and composition root helpers
//!
//! Wires providers (live HTTP or fixture-backed) into the engine,
//! runs the subcommands, and renders results as tables. Nothing here
//! submits orders; every command is read-and-decide only.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::info;

use crate::adapters::{GammaMarketProvider, NewsFeedProvider};
use crate::allocation::AllocationCalculator;
use crate::config::AppConfig;
use crate::domain::{IndexComposition, MarketSnapshot, NewsArticle, Position};
use crate::error::{EdgewiseError, Result};
use crate::providers::{
    IndexProvider, MarketDataProvider, NewsProvider, PortfolioProvider, StaticIndex,
    StaticMarkets, StaticNews, StaticPortfolio,
};
use crate::scoring::{ConfidenceScorer, HybridCombiner, RiskContext, ScoreInput};
use crate::signals::NewsSignalFuser;
use crate::strategy::{
    ExpiringStrategy, IndexFollowStrategy, InteractiveStrategy, OpportunityEvaluator, ScanEngine,
    Strategy, ThresholdStrategy,
};

/// Decision engine CLI for prediction markets
#[derive(Parser, Debug)]
#[command(name = "edgewise")]
#[command(version = "0.1.0")]
#[command(about = "Prediction-market decision engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Fixture file with markets/news/positions instead of live APIs
    #[arg(short, long)]
    pub fixtures: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan markets for opportunities
    Scan {
        /// Run every opportunity through the evaluator
        #[arg(long)]
        evaluate: bool,
    },

    /// Build the news signal for a market question
    Signal {
        /// Market question text
        question: String,
    },

    /// Score one market through the confidence model
    Analyze {
        /// Market identifier
        market_id: String,
    },

    /// Compute index allocations and rebalance orders
    Rebalance,

    /// Write a synthetic fixture file for offline runs
    Fixture {
        /// Output path
        #[arg(short, long, default_value = "fixtures.json")]
        out: PathBuf,
        /// Number of synthetic markets
        #[arg(short, long, default_value = "8")]
        markets: usize,
    },
}

// =============================================================================
// Fixtures
// =============================================================================

/// Offline data set standing in for the live collaborators
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub markets: Vec<MarketSnapshot>,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub index: Option<IndexComposition>,
    #[serde(default)]
    pub total_balance: Decimal,
    #[serde(default)]
    pub available_balance: Decimal,
}

impl FixtureFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

// =============================================================================
// Composition root
// =============================================================================

/// The collaborator set a run is wired against
pub struct Providers {
    pub markets: Arc<dyn MarketDataProvider>,
    pub news: Arc<dyn NewsProvider>,
    pub index: Option<Arc<dyn IndexProvider>>,
    pub portfolio: Arc<dyn PortfolioProvider>,
}

impl Providers {
    /// Live HTTP providers from configuration
    ///
    /// There is no live portfolio or index source here; wallet and
    /// index integration belong to the surrounding system, so those
    /// default to empty.
    pub fn live(config: &AppConfig) -> Self {
        Self {
            markets: Arc::new(GammaMarketProvider::new(
                config.providers.gamma_url.clone(),
                config.providers.market_limit,
            )),
            news: Arc::new(NewsFeedProvider::new(
                config.providers.news_url.clone(),
                config.providers.news_api_key.clone(),
            )),
            index: None,
            portfolio: Arc::new(StaticPortfolio::default()),
        }
    }

    /// Fixture-backed providers for offline runs
    pub fn from_fixtures(fixtures: &FixtureFile) -> Self {
        Self {
            markets: Arc::new(StaticMarkets::new(fixtures.markets.clone())),
            news: Arc::new(StaticNews::new(fixtures.articles.clone())),
            index: fixtures
                .index
                .clone()
                .map(|c| Arc::new(StaticIndex::new(c)) as Arc<dyn IndexProvider>),
            portfolio: Arc::new(StaticPortfolio::new(
                fixtures.positions.clone(),
                fixtures.total_balance,
                fixtures.available_balance,
            )),
        }
    }
}

/// Construct the strategy set and engine from configuration
///
/// Components are built once here and injected; none of them reads
/// configuration or environment on its own.
pub fn build_engine(config: &AppConfig, providers: &Providers) -> ScanEngine {
    let fuser = Arc::new(NewsSignalFuser::new(
        providers.news.clone(),
        config.news.clone(),
    ));
    let combiner = HybridCombiner::new(config.hybrid.clone());

    let mut strategies: Vec<Arc<dyn Strategy>> = vec![
        Arc::new(ThresholdStrategy::new(
            config.strategies.threshold.clone(),
            providers.markets.clone(),
            combiner.clone(),
            Some(fuser.clone()),
        )),
        Arc::new(InteractiveStrategy::new(
            config.strategies.interactive.clone(),
            providers.markets.clone(),
            fuser.clone(),
        )),
        Arc::new(ExpiringStrategy::new(
            config.strategies.expiring.clone(),
            providers.markets.clone(),
        )),
    ];

    if let Some(index) = &providers.index {
        strategies.push(Arc::new(IndexFollowStrategy::new(
            config.strategies.index.clone(),
            index.clone(),
            providers.portfolio.clone(),
            providers.markets.clone(),
        )));
    }

    ScanEngine::new(strategies)
}

// =============================================================================
// Table rows
// =============================================================================

#[derive(Tabled)]
struct OpportunityRow {
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Strategy")]
    strategy: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Predicted")]
    predicted: String,
    #[tabled(rename = "Conf")]
    confidence: String,
    #[tabled(rename = "EV (pp)")]
    expected_value: String,
    #[tabled(rename = "Risk")]
    risk: String,
}

#[derive(Tabled)]
struct DecisionRow {
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Trade?")]
    trade: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Conf")]
    confidence: String,
    #[tabled(rename = "Reasoning")]
    reasoning: String,
}

#[derive(Tabled)]
struct AllocationRow {
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Delta")]
    delta: String,
    #[tabled(rename = "Action")]
    action: String,
}

#[derive(Tabled)]
struct BreakdownRow {
    #[tabled(rename = "Factor")]
    factor: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Weight")]
    weight: String,
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "#")]
    seq: usize,
    #[tabled(rename = "Side")]
    side: String,
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn short(id: &str) -> String {
    id.chars().take(14).collect()
}

// =============================================================================
// Command runners
// =============================================================================

/// Scan for opportunities and optionally evaluate them
pub async fn run_scan(config: &AppConfig, providers: &Providers, evaluate: bool) -> Result<()> {
    let engine = build_engine(config, providers);
    let positions = providers.portfolio.positions().await?;
    info!(
        strategies = engine.active_count(),
        positions = positions.len(),
        "Starting opportunity scan"
    );

    if evaluate {
        let evaluator = OpportunityEvaluator::new(config.evaluator.clone());
        let evaluated = engine.scan_and_evaluate(&evaluator, &positions).await;
        if evaluated.is_empty() {
            println!("No opportunities found.");
            return Ok(());
        }
        let rows: Vec<DecisionRow> = evaluated
            .iter()
            .map(|(opp, decision)| DecisionRow {
                market: short(&opp.market_id),
                trade: if decision.should_trade { "YES" } else { "no" }.to_string(),
                size: format!("${}", decision.size),
                confidence: format!("{:.2}", decision.confidence),
                reasoning: decision.reasoning_text(),
            })
            .collect();
        println!("{}", Table::new(rows));
    } else {
        let opportunities = engine.scan(&positions).await;
        if opportunities.is_empty() {
            println!("No opportunities found.");
            return Ok(());
        }
        let rows: Vec<OpportunityRow> = opportunities
            .iter()
            .map(|o| OpportunityRow {
                market: short(&o.market_id),
                strategy: o.strategy.clone(),
                outcome: o.outcome.clone(),
                price: format!("{:.2}", o.current_price),
                predicted: format!("{:.2}", o.predicted_probability),
                confidence: format!("{:.2}", o.confidence),
                expected_value: format!("{:.1}", o.expected_value),
                risk: format!("{:.2}", o.risk_score),
            })
            .collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

/// Build and print the news signal for a question
pub async fn run_signal(config: &AppConfig, providers: &Providers, question: &str) -> Result<()> {
    let fuser = NewsSignalFuser::new(providers.news.clone(), config.news.clone());
    let signal = fuser.market_signal(question, None).await;

    println!("question:   {}", signal.market_question);
    println!("direction:  {}", signal.direction);
    println!("confidence: {:.2}", signal.confidence);
    for article in &signal.articles {
        println!(
            "  [{:?} {:.2}] {}",
            article.sentiment, article.relevance, article.title
        );
    }
    Ok(())
}

/// Score one market through the full confidence model
pub async fn run_analyze(
    config: &AppConfig,
    providers: &Providers,
    market_id: &str,
) -> Result<()> {
    let market = providers.markets.fetch_market(market_id).await?;
    let fuser = NewsSignalFuser::new(providers.news.clone(), config.news.clone());
    let news = fuser.market_signal(&market.question, None).await;
    let positions = providers.portfolio.positions().await?;

    let scorer = ConfidenceScorer::new(config.scoring.clone());
    let result = scorer.score(&ScoreInput {
        news: Some(news),
        volume_24h: Some(market.volume_24h),
        days_to_resolution: market
            .hours_to_expiry(chrono::Utc::now())
            .map(|h| h / 24.0),
        predicted_probability: None,
        current_price: market.yes_price(),
    });

    let sizing_confidence = scorer.adjust_for_risk(
        result.as_confidence(),
        &RiskContext {
            open_positions: Some(positions.len()),
            volume_24h: Some(market.volume_24h),
            ..Default::default()
        },
    );

    println!("market:         {}", market.question);
    println!("score:          {:.1} / 100 ({})", result.total_score, result.band);
    println!("recommendation: {}", result.recommendation);
    println!("sizing conf:    {sizing_confidence:.2} after risk adjustment");

    let rows: Vec<BreakdownRow> = result
        .breakdown
        .iter()
        .map(|b| BreakdownRow {
            factor: b.factor.clone(),
            label: b.label.clone(),
            score: format!("{:.2}", b.score),
            weight: format!("{:.2}", b.weight),
        })
        .collect();
    if !rows.is_empty() {
        println!("{}", Table::new(rows));
    }
    Ok(())
}

/// Compute allocations against the index and print rebalance orders
pub async fn run_rebalance(config: &AppConfig, providers: &Providers) -> Result<()> {
    let Some(index) = &providers.index else {
        return Err(EdgewiseError::IndexUnavailable(
            "no index composition configured (provide one via fixtures)".to_string(),
        ));
    };

    let composition = index.composition().await?;
    let positions = providers.portfolio.positions().await?;
    let total = providers.portfolio.total_balance().await?;
    let available = providers.portfolio.available_balance().await?;

    let calculator = AllocationCalculator::new(config.allocation.clone());
    let plan = calculator.calculate_allocations(&composition, total, &positions);

    let rows: Vec<AllocationRow> = plan
        .allocations
        .iter()
        .map(|a| AllocationRow {
            market: short(&a.market_id),
            weight: format!("{:.3}", a.weight),
            target: format!("${:.2}", a.target_amount),
            current: format!("${:.2}", a.current_amount),
            delta: format!("${:.2}", a.delta),
            action: a.action.to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));
    println!(
        "tracking error: {:.2}%  needs rebalance: {}",
        plan.tracking_error, plan.needs_rebalance
    );

    if plan.needs_rebalance {
        let orders = calculator.generate_rebalance_orders(&plan.allocations, available);
        let rows: Vec<OrderRow> = orders
            .iter()
            .enumerate()
            .map(|(i, o)| OrderRow {
                seq: i + 1,
                side: o.side.to_string(),
                market: short(&o.market_id),
                amount: format!("${:.2}", o.amount),
                reason: o.reason.clone(),
            })
            .collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

/// Generate a synthetic fixture file
pub fn run_fixture(out: &Path, markets: usize) -> Result<()> {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let questions = [
        "Will the Fed cut rates in March 2026?",
        "Will Bitcoin close above 100k this quarter?",
        "Will the incumbent win the 2026 election?",
        "Will the merger be approved by the SEC?",
        "Will the championship go to game seven?",
        "Will inflation fall below 2 percent this year?",
        "Will the launch happen before June?",
        "Will the treaty be ratified in 2026?",
    ];

    let markets: Vec<MarketSnapshot> = (0..markets)
        .map(|i| {
            let yes = Decimal::from_f64_retain(rng.gen_range(0.03..0.97))
                .unwrap_or(Decimal::new(5, 1))
                .round_dp(2);
            MarketSnapshot {
                id: format!("fixture-{i}"),
                question: questions[i % questions.len()].to_string(),
                outcomes: vec!["Yes".to_string(), "No".to_string()],
                prices: vec![yes, Decimal::ONE - yes],
                volume_24h: Decimal::from(rng.gen_range(500i64..500_000)),
                end_date: Some(chrono::Utc::now() + chrono::Duration::hours(rng.gen_range(2..720))),
            }
        })
        .collect();

    let fixture = FixtureFile {
        markets,
        total_balance: Decimal::from(1000),
        available_balance: Decimal::from(400),
        ..Default::default()
    };

    std::fs::write(out, serde_json::to_string_pretty(&fixture)?)?;
    println!("wrote {}", out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fixture() -> FixtureFile {
        FixtureFile {
            markets: vec![MarketSnapshot {
                id: "m1".to_string(),
                question: "Will it happen?".to_string(),
                outcomes: vec!["Yes".to_string(), "No".to_string()],
                prices: vec![dec!(0.25), dec!(0.75)],
                volume_24h: dec!(60000),
                end_date: None,
            }],
            total_balance: dec!(1000),
            available_balance: dec!(500),
            ..Default::default()
        }
    }

    #[test]
    fn test_fixture_roundtrip() {
        let raw = serde_json::to_string(&fixture()).unwrap();
        let parsed: FixtureFile = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.markets.len(), 1);
        assert_eq!(parsed.total_balance, dec!(1000));
    }

    #[tokio::test]
    async fn test_build_engine_counts_strategies() {
        let config = AppConfig::default();
        let providers = Providers::from_fixtures(&fixture());
        let engine = build_engine(&config, &providers);
        // threshold, interactive, expiring active; no index provider
        assert_eq!(engine.active_count(), 3);
    }

    #[tokio::test]
    async fn test_scan_runs_on_fixtures() {
        let config = AppConfig::default();
        let providers = Providers::from_fixtures(&fixture());
        assert!(run_scan(&config, &providers, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_analyze_runs_on_fixtures() {
        let config = AppConfig::default();
        let providers = Providers::from_fixtures(&fixture());
        assert!(run_analyze(&config, &providers, "m1").await.is_ok());
        assert!(run_analyze(&config, &providers, "missing").await.is_err());
    }
}
