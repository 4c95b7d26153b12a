use chrono::NaiveDate;
use forecast_backtest::{DataLoader, DuplicateDayPolicy, ForecastError};
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn market_chart_file(body: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "{}", body).unwrap();
    file
}

#[test]
fn test_data_loader_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,price").unwrap();
    writeln!(file, "2023-01-01,100.0").unwrap();
    writeln!(file, "2023-01-02,102.5").unwrap();
    writeln!(file, "2023-01-03,101.0").unwrap();

    let series = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.start(), day(2023, 1, 1));
    assert_eq!(series.values(), &[100.0, 102.5, 101.0]);
}

#[test]
fn test_csv_with_unordered_dates_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,price").unwrap();
    writeln!(file, "2023-01-02,100.0").unwrap();
    writeln!(file, "2023-01-01,101.0").unwrap();

    let result = DataLoader::from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));
}

#[test]
fn test_csv_with_bad_price_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,price").unwrap();
    writeln!(file, "2023-01-01,abc").unwrap();

    let result = DataLoader::from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::CsvError(_))));
}

#[test]
fn test_market_chart_with_trailing_intraday_point() {
    // Two midnights plus a "now" point on the second day
    let file = market_chart_file(
        r#"{"prices": [[1704067200000, 42000.0], [1704153600000, 42500.0], [1704200000000, 42750.0]]}"#,
    );

    let rejected = DataLoader::from_market_chart_json(file.path(), DuplicateDayPolicy::Reject);
    assert!(matches!(rejected, Err(ForecastError::DataError(_))));

    let series =
        DataLoader::from_market_chart_json(file.path(), DuplicateDayPolicy::KeepLast).unwrap();
    assert_eq!(series.dates(), &[day(2024, 1, 1), day(2024, 1, 2)]);
    assert_eq!(series.values(), &[42000.0, 42750.0]);
}

#[test]
fn test_from_path_picks_format_by_extension() {
    let json = market_chart_file(r#"{"prices": [[1704067200000, 1.0], [1704153600000, 2.0]]}"#);
    let series = DataLoader::from_path(json.path(), DuplicateDayPolicy::Reject).unwrap();
    assert_eq!(series.len(), 2);

    let mut csv = Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(csv, "date,price\n2024-01-01,1.0").unwrap();
    let series = DataLoader::from_path(csv.path(), DuplicateDayPolicy::Reject).unwrap();
    assert_eq!(series.len(), 1);
}

#[test]
fn test_missing_file() {
    let result = DataLoader::from_csv("/nonexistent/prices.csv");
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_empty_market_chart() {
    let file = market_chart_file(r#"{"prices": []}"#);
    let result = DataLoader::from_market_chart_json(file.path(), DuplicateDayPolicy::KeepLast);
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}
