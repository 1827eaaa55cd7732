pub mod adapters;
pub mod allocation;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod providers;
pub mod scoring;
pub mod signals;
pub mod strategy;

pub use allocation::AllocationCalculator;
pub use config::AppConfig;
pub use domain::{
    AllocationPlan, AllocationTarget, IndexComposition, MarketOpportunity, MarketSnapshot,
    NewsSignal, Position, RebalanceOrder, TradingDecision,
};
pub use error::{EdgewiseError, Result};
pub use scoring::{ConfidenceScorer, HybridCombiner};
pub use signals::NewsSignalFuser;
pub use strategy::{OpportunityEvaluator, ScanEngine, Strategy};
