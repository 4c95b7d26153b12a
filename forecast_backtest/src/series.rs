//! Ordered daily price series
//!
//! A [`Series`] is the input to every other component. It is validated once on
//! construction and never mutated afterwards.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How to treat two raw observations that fall on the same calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateDayPolicy {
    /// Fail the conversion
    #[default]
    Reject,
    /// Keep the later observation of the day
    KeepLast,
}

/// Ordered sequence of (date, value) observations with strictly increasing dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl Series {
    /// Create a series from parallel date and value vectors.
    ///
    /// Fails if the series is empty, the lengths differ, a value is not finite
    /// or the dates are not strictly increasing.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.is_empty() {
            return Err(ForecastError::InvalidSeries(
                "series must contain at least one observation".to_string(),
            ));
        }
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidSeries(format!(
                "dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidSeries(format!(
                "value at index {} is not finite: {}",
                i, values[i]
            )));
        }
        if let Some(i) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ForecastError::InvalidSeries(format!(
                "dates must be strictly increasing: {} is followed by {}",
                dates[i],
                dates[i + 1]
            )));
        }

        Ok(Self { dates, values })
    }

    /// Create a daily series starting at `start`
    pub fn from_values(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let dates = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        Self::new(dates, values)
    }

    /// Convert raw `(milliseconds since epoch, price)` pairs into a series.
    ///
    /// Each timestamp is mapped to its UTC calendar date. The raw timestamps
    /// must be strictly increasing; observations sharing a calendar day are
    /// handled according to `policy`.
    pub fn from_millis(points: &[(i64, f64)], policy: DuplicateDayPolicy) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::DataError(
                "no price observations supplied".to_string(),
            ));
        }

        let mut dates: Vec<NaiveDate> = Vec::with_capacity(points.len());
        let mut values: Vec<f64> = Vec::with_capacity(points.len());
        let mut previous_ms: Option<i64> = None;

        for &(ms, price) in points {
            if let Some(prev) = previous_ms {
                if ms <= prev {
                    return Err(ForecastError::DataError(format!(
                        "timestamps must be strictly increasing: {} is followed by {}",
                        prev, ms
                    )));
                }
            }
            previous_ms = Some(ms);

            let date = DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| {
                    ForecastError::DataError(format!("timestamp out of range: {}", ms))
                })?
                .date_naive();

            if dates.last() == Some(&date) {
                match policy {
                    DuplicateDayPolicy::Reject => {
                        return Err(ForecastError::DataError(format!(
                            "more than one observation on {}",
                            date
                        )));
                    }
                    DuplicateDayPolicy::KeepLast => {
                        if let Some(last) = values.last_mut() {
                            *last = price;
                        }
                        continue;
                    }
                }
            }

            dates.push(date);
            values.push(price);
        }

        Self::new(dates, values)
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no observations (never true for a constructed series)
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Observation dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observation values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values in an index range
    pub fn values_in(&self, range: Range<usize>) -> &[f64] {
        &self.values[range]
    }

    /// Dates in an index range
    pub fn dates_in(&self, range: Range<usize>) -> &[NaiveDate] {
        &self.dates[range]
    }

    /// First observation date
    pub fn start(&self) -> NaiveDate {
        self.dates[0]
    }

    /// Last observation date
    pub fn end(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Consecutive date pairs that are more than one day apart
    pub fn gaps(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.dates
            .windows(2)
            .filter(|w| (w[1] - w[0]).num_days() > 1)
            .map(|w| (w[0], w[1]))
            .collect()
    }

    /// Fail if the series is not gap-free at daily cadence
    pub fn ensure_daily(&self) -> Result<()> {
        match self.gaps().first() {
            None => Ok(()),
            Some((before, after)) => Err(ForecastError::InvalidSeries(format!(
                "gap in daily series between {} and {} ({} gaps total)",
                before,
                after,
                self.gaps().len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn from_values_builds_consecutive_days() {
        let series = Series::from_values(day(2024, 2, 27), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.start(), day(2024, 2, 27));
        assert_eq!(series.end(), day(2024, 3, 1));
        assert!(series.ensure_daily().is_ok());
    }

    #[test]
    fn rejects_unordered_dates() {
        let result = Series::new(vec![day(2024, 1, 2), day(2024, 1, 1)], vec![1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let result = Series::new(vec![day(2024, 1, 1), day(2024, 1, 1)], vec![1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));
    }

    #[test]
    fn rejects_non_finite_values() {
        let result = Series::new(vec![day(2024, 1, 1), day(2024, 1, 2)], vec![1.0, f64::NAN]);
        assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));
    }

    #[test]
    fn rejects_empty_series() {
        assert!(Series::new(vec![], vec![]).is_err());
    }

    #[test]
    fn reports_gaps() {
        let series = Series::new(
            vec![day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 5)],
            vec![1.0, 2.0, 3.0],
        )
        .unwrap();
        assert_eq!(series.gaps(), vec![(day(2024, 1, 2), day(2024, 1, 5))]);
        assert!(series.ensure_daily().is_err());
    }

    #[test]
    fn converts_millisecond_timestamps_to_dates() {
        // 2024-01-01T00:00:00Z and the following two midnights
        let base = 1_704_067_200_000_i64;
        let day_ms = 86_400_000_i64;
        let points = vec![(base, 42_000.0), (base + day_ms, 42_500.0), (base + 2 * day_ms, 41_900.0)];

        let series = Series::from_millis(&points, DuplicateDayPolicy::Reject).unwrap();
        assert_eq!(series.dates(), &[day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 3)]);
        assert_eq!(series.values(), &[42_000.0, 42_500.0, 41_900.0]);
    }

    #[test]
    fn same_day_observations_follow_policy() {
        let base = 1_704_067_200_000_i64;
        let points = vec![(base, 1.0), (base + 86_400_000, 2.0), (base + 86_400_000 + 3_600_000, 3.0)];

        assert!(Series::from_millis(&points, DuplicateDayPolicy::Reject).is_err());

        let series = Series::from_millis(&points, DuplicateDayPolicy::KeepLast).unwrap();
        assert_eq!(series.values(), &[1.0, 3.0]);
    }

    #[test]
    fn rejects_non_monotonic_timestamps() {
        let points = vec![(2_000, 1.0), (1_000, 2.0)];
        assert!(matches!(
            Series::from_millis(&points, DuplicateDayPolicy::KeepLast),
            Err(ForecastError::DataError(_))
        ));
    }
}
