//! Core business logic abstractions

pub mod cache;
pub mod log;
pub mod record;
pub mod tier;

// Re-export main types for cleaner imports
pub use cache::TtlCache;
pub use record::{DataKind, MarketDataProvider, MarketRecord, RecordSource};
pub use tier::{Capability, SubscriptionTier};
