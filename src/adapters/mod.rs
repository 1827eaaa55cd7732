//! Concrete providers over HTTP
//!
//! Thin reqwest clients implementing the provider contracts. No retry
//! logic lives here; a failed call surfaces to the engine, which skips
//! the affected market and continues.

pub mod gamma;
pub mod newsfeed;

pub use gamma::GammaMarketProvider;
pub use newsfeed::NewsFeedProvider;
