//! Error types shared by the fetcher, calculator and evaluation layers

use thiserror::Error;

/// Failure to obtain price data for a symbol.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The provider answered, but had no data for the request.
    #[error("No price data found for symbol: {symbol}")]
    NoData { symbol: String },

    /// The provider call itself failed (network, HTTP status, malformed body).
    #[error("Provider error for symbol {symbol}: {reason}")]
    Provider { symbol: String, reason: String },
}

impl FetchError {
    pub fn no_data(symbol: &str) -> Self {
        FetchError::NoData {
            symbol: symbol.to_string(),
        }
    }

    pub fn provider(symbol: &str, reason: impl Into<String>) -> Self {
        FetchError::Provider {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, FetchError::NoData { .. })
    }
}

/// Invalid input to the return calculator.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CalculationError {
    #[error("Start price must be positive, got {0}")]
    NonPositiveStartPrice(f64),

    #[error("End price must not be negative, got {0}")]
    NegativeEndPrice(f64),

    #[error("Elapsed years must be positive, got {0}")]
    NonPositiveYears(f64),

    #[error("Calculation input is not a finite number")]
    NonFinite,

    #[error("Price series is empty")]
    EmptySeries,

    /// `ln(end / start) / years` is too large in magnitude to exponentiate.
    #[error("Annual growth exponent {0} is out of range, the period is too short to annualize")]
    GrowthOutOfRange(f64),
}

/// Invalid user-supplied year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("End year {end_year} is before start year {start_year}")]
    InvalidRange { start_year: i32, end_year: i32 },

    #[error("Year {year} is outside the supported range {min}-{max}")]
    YearOutOfBounds { year: i32, min: i32, max: i32 },
}
