use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::error::FetchError;
use crate::core::price::{MarketDataProvider, PricePoint, PriceSeries};

const USER_AGENT: &str = "etfcagr/1.0";
const ADJUSTED_QUERY: &str = "includeAdjustedClose=true&events=div,splits";

// YahooFinanceProvider implementation for MarketDataProvider
pub struct YahooFinanceProvider {
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str) -> Self {
        YahooFinanceProvider {
            base_url: base_url.to_string(),
        }
    }

    async fn fetch_chart(&self, symbol: &str, query: &str) -> Result<PriceSeries, FetchError> {
        let url = format!(
            "{}/v8/finance/chart/{}?{}&{}",
            self.base_url, symbol, query, ADJUSTED_QUERY
        );
        debug!("Requesting chart data from {}", url);

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::provider(symbol, format!("Client error: {e}")))?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::provider(symbol, format!("Request error: {e} URL: {url}")))?;

        debug!(response = ?response, "Received Yahoo response");

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::provider(symbol, format!("Failed to read response: {e}")))?;

        let data: YahooChartResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                return Err(FetchError::provider(symbol, format!("HTTP error: {status}")));
            }
            Err(e) => {
                return Err(FetchError::provider(
                    symbol,
                    format!("Failed to parse JSON response: {e}"),
                ));
            }
        };

        if let Some(error) = data.chart.error {
            if error.code == "Not Found" {
                return Err(FetchError::no_data(symbol));
            }
            return Err(FetchError::provider(
                symbol,
                format!("{}: {}", error.code, error.description.unwrap_or_default()),
            ));
        }
        if !status.is_success() {
            return Err(FetchError::provider(symbol, format!("HTTP error: {status}")));
        }

        let item = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| FetchError::no_data(symbol))?;

        parse_chart_item(symbol, item)
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    #[serde(alias = "gmtoffset")]
    gmt_offset: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

#[derive(Deserialize, Debug)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

fn value_at<T: Copy>(values: Option<&Vec<Option<T>>>, index: usize) -> Option<T> {
    values.and_then(|v| v.get(index).copied().flatten())
}

/// Converts a chart item into a series of adjusted closes.
///
/// Bar dates are taken in the exchange's local time. Bars without an adjusted
/// close are skipped; a response with no adjusted-close indicator at all is an
/// error, the unadjusted close is never used in its place.
fn parse_chart_item(symbol: &str, item: ChartItem) -> Result<PriceSeries, FetchError> {
    let timestamps = match item.timestamp {
        Some(ts) if !ts.is_empty() => ts,
        _ => return Ok(PriceSeries::new(symbol, vec![])),
    };
    let indicators = item
        .indicators
        .ok_or_else(|| FetchError::provider(symbol, "Missing price indicators"))?;
    let adjclose = indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .and_then(|a| a.adjclose)
        .ok_or_else(|| FetchError::provider(symbol, "Adjusted close not available"))?;
    let quote = indicators.quote.first();
    let offset = item.meta.and_then(|m| m.gmt_offset).unwrap_or(0);

    let mut points = Vec::with_capacity(timestamps.len());
    for (index, ts) in timestamps.iter().enumerate() {
        let Some(adj_close) = adjclose.get(index).copied().flatten() else {
            continue;
        };
        let Some(local) = Utc.timestamp_opt(ts + offset, 0).single() else {
            debug!(ts, "Skipping bar with invalid timestamp");
            continue;
        };
        points.push(PricePoint {
            date: local.date_naive(),
            open: value_at(quote.and_then(|q| q.open.as_ref()), index),
            high: value_at(quote.and_then(|q| q.high.as_ref()), index),
            low: value_at(quote.and_then(|q| q.low.as_ref()), index),
            close: value_at(quote.and_then(|q| q.close.as_ref()), index),
            adj_close,
            volume: value_at(quote.and_then(|q| q.volume.as_ref()), index),
        });
    }

    Ok(PriceSeries::new(symbol, points))
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    #[instrument(name = "YahooMaxHistory", skip(self), fields(symbol = %symbol))]
    async fn fetch_max_history(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
        // Monthly bars are enough to find the first trading date.
        self.fetch_chart(symbol, "interval=1mo&range=max").await
    }

    #[instrument(name = "YahooPriceRange", skip(self), fields(symbol = %symbol))]
    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, FetchError> {
        let query = format!(
            "interval=1d&period1={}&period2={}",
            unix_midnight(start),
            unix_midnight(end)
        );
        self.fetch_chart(symbol, &query).await
    }
}
