//! Core business logic abstractions

pub mod asset;
pub mod cache;
pub mod config;
pub mod enrich;
pub mod error;
pub mod holding;
pub mod log;
pub mod quote;
pub mod quote_cache;
pub mod resolver;

// Re-export main types for cleaner imports
pub use asset::AssetClass;
pub use enrich::{EnrichedHolding, Enricher, PortfolioSummary, PortfolioView};
pub use error::QuoteError;
pub use holding::{Holding, HoldingPatch, NewHolding};
pub use quote::{Quote, QuoteProvider};
pub use quote_cache::{CacheTtl, QuoteCache};
pub use resolver::QuoteResolver;
