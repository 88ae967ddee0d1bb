//! Total return and CAGR arithmetic.
//!
//! All functions are pure and reject inputs for which the result would be
//! undefined instead of returning `NaN` or infinity.
use crate::core::error::CalculationError;
use crate::core::price::PriceSeries;
use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::rate::cagr;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DAYS_PER_YEAR: f64 = 365.25;

/// Largest `|ln(growth factor)|` handed to the decimal power function.
/// `Decimal::MAX` is about `e^66.5`.
const MAX_GROWTH_EXPONENT: f64 = 60.0;

/// Which dates define the length of the CAGR period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElapsedYearsPolicy {
    /// Jan 1 of the start year to Dec 31 of the end year, regardless of the
    /// dates of the first and last bars actually returned.
    #[default]
    RequestedWindow,
    /// Date of the first returned bar to date of the last returned bar.
    TradingDays,
}

/// Metrics computed for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnMetrics {
    pub start_price: f64,
    pub end_price: f64,
    /// Fractional total return, `0.5` means +50%.
    pub total_return: f64,
    /// Fractional annual growth rate.
    pub cagr: f64,
    pub years: f64,
}

fn ensure_finite(values: &[f64]) -> Result<(), CalculationError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(CalculationError::NonFinite)
    }
}

/// Years between two dates using a 365.25-day year.
pub fn compute_elapsed_years(
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<f64, CalculationError> {
    let years = (end_date - start_date).num_days() as f64 / DAYS_PER_YEAR;
    if years <= 0.0 {
        return Err(CalculationError::NonPositiveYears(years));
    }
    Ok(years)
}

/// `(end - start) / start`.
pub fn compute_total_return(start_price: f64, end_price: f64) -> Result<f64, CalculationError> {
    ensure_finite(&[start_price, end_price])?;
    if start_price <= 0.0 {
        return Err(CalculationError::NonPositiveStartPrice(start_price));
    }
    Ok((end_price - start_price) / start_price)
}

/// `(end / start)^(1 / years) - 1`.
pub fn compute_cagr(start_price: f64, end_price: f64, years: f64) -> Result<f64, CalculationError> {
    ensure_finite(&[start_price, end_price, years])?;
    if years <= 0.0 {
        return Err(CalculationError::NonPositiveYears(years));
    }
    if start_price <= 0.0 {
        return Err(CalculationError::NonPositiveStartPrice(start_price));
    }
    if end_price < 0.0 {
        return Err(CalculationError::NegativeEndPrice(end_price));
    }
    if end_price == 0.0 {
        return Ok(-1.0);
    }

    let exponent = (end_price / start_price).ln() / years;
    if !exponent.is_finite() || exponent.abs() > MAX_GROWTH_EXPONENT {
        return Err(CalculationError::GrowthOutOfRange(exponent));
    }

    let begin_bal = Decimal::from_f64(start_price).ok_or(CalculationError::NonFinite)?;
    let end_bal = Decimal::from_f64(end_price).ok_or(CalculationError::NonFinite)?;
    let n_years = Decimal::from_f64(years).ok_or(CalculationError::NonFinite)?;

    let rate = cagr(begin_bal, end_bal, n_years);
    debug!("cagr: {begin_bal}, {end_bal}, {n_years} = {rate}");
    rate.to_f64().ok_or(CalculationError::NonFinite)
}

/// Computes metrics from the first and last adjusted close of `series`.
///
/// `requested` is the `(start, end)` window the series was fetched for; with
/// `ElapsedYearsPolicy::RequestedWindow` it defines the period length.
pub fn compute_returns(
    series: &PriceSeries,
    requested: (NaiveDate, NaiveDate),
    policy: ElapsedYearsPolicy,
) -> Result<ReturnMetrics, CalculationError> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(CalculationError::EmptySeries),
    };

    let years = match policy {
        ElapsedYearsPolicy::RequestedWindow => compute_elapsed_years(requested.0, requested.1)?,
        ElapsedYearsPolicy::TradingDays => compute_elapsed_years(first.date, last.date)?,
    };

    let start_price = first.adj_close;
    let end_price = last.adj_close;
    let total_return = compute_total_return(start_price, end_price)?;
    let cagr = compute_cagr(start_price, end_price, years)?;

    Ok(ReturnMetrics {
        start_price,
        end_price,
        total_return,
        cagr,
        years,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::PricePoint;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn total_return_is_fractional_change() {
        assert_eq!(compute_total_return(100.0, 150.0), Ok(0.5));
        assert_eq!(compute_total_return(100.0, 80.0), Ok(-0.2));
    }

    #[test]
    fn total_return_rejects_zero_start_price() {
        assert_eq!(
            compute_total_return(0.0, 150.0),
            Err(CalculationError::NonPositiveStartPrice(0.0))
        );
    }

    #[test]
    fn cagr_doubling_over_ten_years() {
        let rate = compute_cagr(100.0, 200.0, 10.0).unwrap();
        assert!((rate - 0.0718).abs() < 1e-4, "got {rate}");
    }

    #[test]
    fn cagr_compounds_back_to_end_price() {
        let cases = [
            (100.0, 150.0, 3.0),
            (42.5, 30.0, 2.5),
            (1.0, 1000.0, 25.0),
            (250.0, 250.0, 6.0),
        ];
        for (start, end, years) in cases {
            let rate = compute_cagr(start, end, years).unwrap();
            let compounded = start * (1.0 + rate).powf(years);
            assert!(
                ((compounded - end) / end).abs() < 1e-5,
                "{start} -> {end} over {years}y: got {compounded}"
            );
        }
    }

    #[test]
    fn cagr_rejects_invalid_inputs() {
        assert_eq!(
            compute_cagr(0.0, 100.0, 5.0),
            Err(CalculationError::NonPositiveStartPrice(0.0))
        );
        assert_eq!(
            compute_cagr(-1.0, 100.0, 5.0),
            Err(CalculationError::NonPositiveStartPrice(-1.0))
        );
        assert_eq!(
            compute_cagr(100.0, 200.0, 0.0),
            Err(CalculationError::NonPositiveYears(0.0))
        );
        assert_eq!(
            compute_cagr(100.0, 200.0, -2.0),
            Err(CalculationError::NonPositiveYears(-2.0))
        );
        assert_eq!(
            compute_cagr(100.0, -5.0, 2.0),
            Err(CalculationError::NegativeEndPrice(-5.0))
        );
        assert_eq!(
            compute_cagr(f64::NAN, 5.0, 2.0),
            Err(CalculationError::NonFinite)
        );
    }

    #[test]
    fn cagr_of_total_loss_is_minus_one() {
        assert_eq!(compute_cagr(100.0, 0.0, 4.0), Ok(-1.0));
    }

    #[test]
    fn cagr_over_a_single_day_is_out_of_range() {
        let result = compute_cagr(10.0, 13.0, 1.0 / 365.25);
        assert!(
            matches!(result, Err(CalculationError::GrowthOutOfRange(e)) if e > 60.0),
            "got {result:?}"
        );

        let result = compute_cagr(13.0, 0.1, 1.0 / 365.25);
        assert!(
            matches!(result, Err(CalculationError::GrowthOutOfRange(e)) if e < -60.0),
            "got {result:?}"
        );
    }

    #[test]
    fn cagr_large_but_representable_growth() {
        // 1.3 over ~10 weeks: e^1.37 growth per year
        let rate = compute_cagr(10.0, 13.0, 0.19).unwrap();
        assert!((10.0 * (1.0 + rate).powf(0.19) - 13.0).abs() < 1e-3, "got {rate}");
    }

    #[test]
    fn elapsed_years_uses_julian_year() {
        let years = compute_elapsed_years(date(2020, 1, 1), date(2025, 12, 31)).unwrap();
        assert!((years - 6.0).abs() < 0.01, "got {years}");
    }

    #[test]
    fn elapsed_years_rejects_reversed_dates() {
        assert!(compute_elapsed_years(date(2021, 1, 1), date(2020, 1, 1)).is_err());
        assert!(compute_elapsed_years(date(2021, 1, 1), date(2021, 1, 1)).is_err());
    }

    #[test]
    fn compute_returns_policies_differ_in_period() {
        let series = PriceSeries::new(
            "SPY",
            vec![
                PricePoint::adjusted(date(2020, 1, 2), 100.0),
                PricePoint::adjusted(date(2020, 7, 1), 120.0),
                PricePoint::adjusted(date(2021, 12, 30), 121.0),
            ],
        );
        let requested = (date(2020, 1, 1), date(2021, 12, 31));

        let windowed =
            compute_returns(&series, requested, ElapsedYearsPolicy::RequestedWindow).unwrap();
        assert_eq!(windowed.start_price, 100.0);
        assert_eq!(windowed.end_price, 121.0);
        assert!((windowed.total_return - 0.21).abs() < 1e-9);
        assert!((windowed.years - 730.0 / 365.25).abs() < 1e-9);

        let trading = compute_returns(&series, requested, ElapsedYearsPolicy::TradingDays).unwrap();
        assert!((trading.years - 728.0 / 365.25).abs() < 1e-9);
        assert!(trading.cagr > windowed.cagr);
    }

    #[test]
    fn compute_returns_rejects_single_bar_trading_days() {
        let series = PriceSeries::new("SPY", vec![PricePoint::adjusted(date(2020, 1, 2), 100.0)]);
        let result = compute_returns(
            &series,
            (date(2020, 1, 1), date(2020, 12, 31)),
            ElapsedYearsPolicy::TradingDays,
        );
        assert_eq!(result, Err(CalculationError::NonPositiveYears(0.0)));
    }

    #[test]
    fn compute_returns_adjacent_trading_days_is_an_error() {
        let series = PriceSeries::new(
            "NEW",
            vec![
                PricePoint::adjusted(date(2020, 12, 29), 10.0),
                PricePoint::adjusted(date(2020, 12, 30), 13.0),
            ],
        );
        let requested = (date(2020, 1, 1), date(2020, 12, 31));

        let result = compute_returns(&series, requested, ElapsedYearsPolicy::TradingDays);
        assert!(
            matches!(result, Err(CalculationError::GrowthOutOfRange(_))),
            "got {result:?}"
        );

        let windowed =
            compute_returns(&series, requested, ElapsedYearsPolicy::RequestedWindow).unwrap();
        assert!((windowed.total_return - 0.3).abs() < 1e-9);
    }
}
