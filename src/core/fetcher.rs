//! Launch-year and price-window queries on top of a `MarketDataProvider`.
use crate::core::error::FetchError;
use crate::core::price::{MarketDataProvider, PriceSeries};
use chrono::{Datelike, NaiveDate};
use tracing::debug;

/// Returns the calendar year of the earliest bar available for `symbol`.
///
/// `FetchError::NoData` means the provider answered with an empty history;
/// `FetchError::Provider` means the lookup itself failed.
pub async fn get_launch_year(
    provider: &(dyn MarketDataProvider + Send + Sync),
    symbol: &str,
) -> Result<i32, FetchError> {
    let history = provider.fetch_max_history(symbol).await?;
    let first = history.first().ok_or_else(|| FetchError::no_data(symbol))?;
    debug!(symbol, first_date = %first.date, "Resolved launch date");
    Ok(first.date.year())
}

/// Returns the adjusted-close series for `symbol` over `[start, end)`.
///
/// Bars the provider returns outside the window are dropped. An empty window
/// is reported as `FetchError::NoData`.
pub async fn get_price_series(
    provider: &(dyn MarketDataProvider + Send + Sync),
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, FetchError> {
    let series = provider
        .fetch_range(symbol, start, end)
        .await?
        .within(start, end);
    if series.is_empty() {
        return Err(FetchError::no_data(symbol));
    }
    debug!(symbol, bars = series.len(), "Fetched price window");
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::PricePoint;
    use async_trait::async_trait;

    struct FixedProvider {
        history: Result<Vec<PricePoint>, FetchError>,
    }

    #[async_trait]
    impl MarketDataProvider for FixedProvider {
        async fn fetch_max_history(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
            self.history
                .clone()
                .map(|points| PriceSeries::new(symbol, points))
        }

        async fn fetch_range(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<PriceSeries, FetchError> {
            self.fetch_max_history(symbol).await
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn launch_year_is_year_of_earliest_bar() {
        let provider = FixedProvider {
            history: Ok(vec![
                PricePoint::adjusted(date(2001, 3, 1), 12.0),
                PricePoint::adjusted(date(1999, 3, 10), 10.0),
            ]),
        };
        assert_eq!(get_launch_year(&provider, "QQQ").await, Ok(1999));
    }

    #[tokio::test]
    async fn launch_year_distinguishes_no_data_from_failure() {
        let empty = FixedProvider {
            history: Ok(vec![]),
        };
        assert_eq!(
            get_launch_year(&empty, "NONE").await,
            Err(FetchError::no_data("NONE"))
        );

        let failing = FixedProvider {
            history: Err(FetchError::provider("BAD", "connection reset")),
        };
        let err = get_launch_year(&failing, "BAD").await.unwrap_err();
        assert!(!err.is_no_data());
    }

    #[tokio::test]
    async fn price_series_outside_window_is_no_data() {
        let provider = FixedProvider {
            history: Ok(vec![PricePoint::adjusted(date(2010, 6, 1), 50.0)]),
        };
        let result = get_price_series(&provider, "IWM", date(2020, 1, 1), date(2020, 12, 31)).await;
        assert_eq!(result, Err(FetchError::no_data("IWM")));
    }
}
