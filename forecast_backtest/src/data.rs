//! Loading price series from files
//!
//! Two formats are supported:
//!
//! - market-chart JSON, `{"prices": [[timestamp_ms, price], ...]}`, as
//!   returned by crypto price providers for a one-year daily lookback
//! - a two-column CSV with a `date,price` header and ISO dates

use crate::error::{ForecastError, Result};
use crate::series::{DuplicateDayPolicy, Series};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Market-chart document; only the price array is used
#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<(f64, f64)>,
}

/// One CSV row
#[derive(Debug, Deserialize)]
struct PriceRow {
    date: NaiveDate,
    price: f64,
}

/// Data loader for price series
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a market-chart JSON file
    pub fn from_market_chart_json<P: AsRef<Path>>(
        path: P,
        policy: DuplicateDayPolicy,
    ) -> Result<Series> {
        let file = File::open(path.as_ref())?;
        let series = Self::market_chart_from_reader(BufReader::new(file), policy)?;
        debug!(
            path = %path.as_ref().display(),
            observations = series.len(),
            "loaded market chart"
        );
        Ok(series)
    }

    /// Parse a market-chart JSON document from any reader
    pub fn market_chart_from_reader<R: Read>(reader: R, policy: DuplicateDayPolicy) -> Result<Series> {
        let chart: MarketChart = serde_json::from_reader(reader)?;

        let points = chart
            .prices
            .iter()
            .map(|&(ms, price)| {
                if !ms.is_finite() || ms.fract() != 0.0 {
                    return Err(ForecastError::DataError(format!(
                        "timestamp is not an integer number of milliseconds: {}",
                        ms
                    )));
                }
                Ok((ms as i64, price))
            })
            .collect::<Result<Vec<_>>>()?;

        Series::from_millis(&points, policy)
    }

    /// Load a `date,price` CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Series> {
        let file = File::open(path.as_ref())?;
        let series = Self::csv_from_reader(file)?;
        debug!(
            path = %path.as_ref().display(),
            observations = series.len(),
            "loaded csv"
        );
        Ok(series)
    }

    /// Parse `date,price` CSV from any reader
    pub fn csv_from_reader<R: Read>(reader: R) -> Result<Series> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut dates = Vec::new();
        let mut values = Vec::new();
        for row in csv_reader.deserialize::<PriceRow>() {
            let row = row?;
            dates.push(row.date);
            values.push(row.price);
        }

        if dates.is_empty() {
            return Err(ForecastError::DataError(
                "CSV contains no price rows".to_string(),
            ));
        }

        Series::new(dates, values)
    }

    /// Load a series, choosing the format from the file extension.
    ///
    /// `.json` files are read as market charts, everything else as CSV.
    pub fn from_path<P: AsRef<Path>>(path: P, policy: DuplicateDayPolicy) -> Result<Series> {
        let is_json = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_market_chart_json(path, policy)
        } else {
            Self::from_csv(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_market_chart_document() {
        let json = r#"{
            "prices": [[1704067200000, 42000.5], [1704153600000, 42100.0]],
            "market_caps": [],
            "total_volumes": []
        }"#;
        let series =
            DataLoader::market_chart_from_reader(json.as_bytes(), DuplicateDayPolicy::Reject)
                .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.values(), &[42000.5, 42100.0]);
    }

    #[test]
    fn rejects_fractional_timestamps() {
        let json = r#"{"prices": [[1704067200000.5, 1.0]]}"#;
        let result = DataLoader::market_chart_from_reader(json.as_bytes(), DuplicateDayPolicy::Reject);
        assert!(matches!(result, Err(ForecastError::DataError(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        let result = DataLoader::market_chart_from_reader("{\"prices\": 3}".as_bytes(), DuplicateDayPolicy::Reject);
        assert!(matches!(result, Err(ForecastError::JsonError(_))));
    }

    #[test]
    fn parses_csv_rows() {
        let csv = "date,price\n2023-01-01,100.0\n2023-01-02, 101.5\n";
        let series = DataLoader::csv_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(series.values(), &[100.0, 101.5]);
    }

    #[test]
    fn rejects_header_only_csv() {
        let result = DataLoader::csv_from_reader("date,price\n".as_bytes());
        assert!(matches!(result, Err(ForecastError::DataError(_))));
    }
}
