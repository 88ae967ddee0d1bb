//! Pricing abstractions and core types

use crate::core::error::FetchError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily (or coarser) bar for one instrument.
///
/// Only `date` and `adj_close` are required for return calculations; the
/// remaining fields are carried when the provider supplies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: f64,
    pub volume: Option<u64>,
}

impl PricePoint {
    /// Creates a point carrying only the adjusted close.
    pub fn adjusted(date: NaiveDate, adj_close: f64) -> Self {
        PricePoint {
            date,
            open: None,
            high: None,
            low: None,
            close: None,
            adj_close,
            volume: None,
        }
    }
}

/// Date-ascending price history for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, sorting the points by date.
    pub fn new(symbol: &str, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        PriceSeries {
            symbol: symbol.to_string(),
            points,
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Keeps only points with `start <= date < end`.
    pub fn within(self, start: NaiveDate, end: NaiveDate) -> Self {
        let points = self
            .points
            .into_iter()
            .filter(|p| p.date >= start && p.date < end)
            .collect();
        PriceSeries {
            symbol: self.symbol,
            points,
        }
    }
}

/// Source of historical adjusted prices.
///
/// Implementations must return adjusted closes (dividends and splits applied)
/// and must not cache or retry.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Entire available history for `symbol`, at any bar interval.
    async fn fetch_max_history(&self, symbol: &str) -> Result<PriceSeries, FetchError>;

    /// Daily history for `symbol` over `[start, end)`.
    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, FetchError>;
}
