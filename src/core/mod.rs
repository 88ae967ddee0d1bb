//! Core business logic abstractions

pub mod calculator;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod fetcher;
pub mod log;
pub mod price;

// Re-export main types for cleaner imports
pub use calculator::{ElapsedYearsPolicy, ReturnMetrics};
pub use error::{CalculationError, FetchError, InputError};
pub use evaluation::{LaunchYear, RecordStatus, ReturnRecord, YearRange};
pub use price::{MarketDataProvider, PricePoint, PriceSeries};
