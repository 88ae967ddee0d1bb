//! Per-instrument evaluation of returns over a year range.
use crate::core::calculator::{self, ElapsedYearsPolicy, ReturnMetrics};
use crate::core::config::Instrument;
use crate::core::error::{FetchError, InputError};
use crate::core::fetcher;
use crate::core::price::MarketDataProvider;
use chrono::{Datelike, NaiveDate, Utc};
use futures::future::join_all;
use serde::{Serialize, Serializer};
use std::fmt::Display;
use tracing::{debug, instrument, warn};

pub const MIN_YEAR: i32 = 1950;

/// Latest year a range may end in.
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// A validated, inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start_year: i32,
    end_year: i32,
}

impl YearRange {
    /// Range ending no later than the current year.
    pub fn new(start_year: i32, end_year: i32) -> Result<Self, InputError> {
        Self::bounded(start_year, end_year, current_year())
    }

    /// Range with both years in `MIN_YEAR..=max_year`.
    pub fn bounded(start_year: i32, end_year: i32, max_year: i32) -> Result<Self, InputError> {
        for year in [start_year, end_year] {
            if !(MIN_YEAR..=max_year).contains(&year) {
                return Err(InputError::YearOutOfBounds {
                    year,
                    min: MIN_YEAR,
                    max: max_year,
                });
            }
        }
        if end_year < start_year {
            return Err(InputError::InvalidRange {
                start_year,
                end_year,
            });
        }
        Ok(YearRange {
            start_year,
            end_year,
        })
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    /// Jan 1 of the start year.
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.start_year, 1, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Dec 31 of the end year. Used as an exclusive bound when fetching.
    pub fn end_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.end_year, 12, 31).unwrap_or(NaiveDate::MAX)
    }
}

/// Launch year column of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchYear {
    Year(i32),
    Unknown,
    Error,
}

impl Display for LaunchYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchYear::Year(year) => write!(f, "{year}"),
            LaunchYear::Unknown => write!(f, "Unknown"),
            LaunchYear::Error => write!(f, "Error"),
        }
    }
}

impl Serialize for LaunchYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LaunchYear::Year(year) => serializer.serialize_i32(*year),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

/// Terminal state of an instrument's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Neither a launch year nor prices in the window were found.
    NoLaunchData,
    /// The requested start year predates the instrument's first bar.
    PreLaunch,
    /// The launch year is known but the window has no prices.
    NoPriceData,
    Computed,
    Error,
}

/// One output row per configured instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnRecord {
    pub name: String,
    pub symbol: String,
    pub launch_year: LaunchYear,
    pub status: RecordStatus,
    pub metrics: Option<ReturnMetrics>,
    pub message: Option<String>,
}

impl ReturnRecord {
    fn not_applicable(
        instrument: &Instrument,
        launch_year: LaunchYear,
        status: RecordStatus,
        message: Option<String>,
    ) -> Self {
        ReturnRecord {
            name: instrument.name.clone(),
            symbol: instrument.symbol.clone(),
            launch_year,
            status,
            metrics: None,
            message,
        }
    }

    fn error(instrument: &Instrument, message: impl Display) -> Self {
        Self::not_applicable(
            instrument,
            LaunchYear::Error,
            RecordStatus::Error,
            Some(message.to_string()),
        )
    }

    pub fn total_return(&self) -> Option<f64> {
        self.metrics.map(|m| m.total_return)
    }

    pub fn cagr(&self) -> Option<f64> {
        self.metrics.map(|m| m.cagr)
    }

    pub fn years(&self) -> Option<f64> {
        self.metrics.map(|m| m.years)
    }
}

/// Evaluates a single instrument. Never fails: every outcome is a record.
#[instrument(
    name = "EvaluateInstrument",
    skip_all,
    fields(symbol = %instrument.symbol)
)]
pub async fn evaluate_instrument(
    provider: &(dyn MarketDataProvider + Send + Sync),
    instrument: &Instrument,
    range: YearRange,
    policy: ElapsedYearsPolicy,
) -> ReturnRecord {
    let symbol = instrument.symbol.as_str();

    let launch_year = match fetcher::get_launch_year(provider, symbol).await {
        Ok(year) => LaunchYear::Year(year),
        Err(e) => {
            debug!("Launch year lookup failed: {e}");
            LaunchYear::Unknown
        }
    };

    if let LaunchYear::Year(year) = launch_year {
        if range.start_year() < year {
            debug!(launch_year = year, "Requested start predates launch");
            return ReturnRecord::not_applicable(
                instrument,
                launch_year,
                RecordStatus::PreLaunch,
                None,
            );
        }
    }

    let (start, end) = (range.start_date(), range.end_date());
    let series = match fetcher::get_price_series(provider, symbol, start, end).await {
        Ok(series) => series,
        Err(FetchError::NoData { .. }) => {
            let status = if launch_year == LaunchYear::Unknown {
                RecordStatus::NoLaunchData
            } else {
                RecordStatus::NoPriceData
            };
            return ReturnRecord::not_applicable(
                instrument,
                launch_year,
                status,
                Some(format!("No data for {}", instrument.name)),
            );
        }
        Err(e) => {
            warn!("Price fetch failed: {e}");
            return ReturnRecord::error(instrument, e);
        }
    };

    match calculator::compute_returns(&series, (start, end), policy) {
        Ok(metrics) => ReturnRecord {
            name: instrument.name.clone(),
            symbol: instrument.symbol.clone(),
            launch_year,
            status: RecordStatus::Computed,
            metrics: Some(metrics),
            message: None,
        },
        Err(e) => {
            warn!("Return calculation failed: {e}");
            ReturnRecord::error(instrument, e)
        }
    }
}

/// Evaluates all instruments concurrently.
///
/// Returns exactly one record per instrument, in the order given.
/// `update_callback` is invoked once per finished instrument.
pub async fn evaluate_all(
    provider: &(dyn MarketDataProvider + Send + Sync),
    instruments: &[Instrument],
    range: YearRange,
    policy: ElapsedYearsPolicy,
    update_callback: &(dyn Fn() + Sync),
) -> Vec<ReturnRecord> {
    let futures = instruments.iter().map(|instrument| async move {
        let record = evaluate_instrument(provider, instrument, range, policy).await;
        update_callback();
        record
    });
    join_all(futures).await
}
