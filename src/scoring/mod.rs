//! Confidence scoring
//!
//! Weighted multi-factor scoring with configured threshold tables and
//! confidence bands, plus the hybrid price+news combiner used by
//! discretionary strategies.

pub mod confidence;
pub mod factors;
pub mod hybrid;

pub use confidence::{ConfidenceResult, ConfidenceScorer, Recommendation, RiskContext, ScoreInput};
pub use factors::FactorBreakdown;
pub use hybrid::{HybridAssessment, HybridCombiner};
