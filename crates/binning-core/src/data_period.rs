//! Data-day classification near the date line, plus MJD date helpers.
//!
//! A data period starts at `start_time` (MJD) and spans `duration_days`
//! local data days. The boundary of a data day is the hour `min_data_hour`
//! at longitude -180 and moves one hour earlier for every 15 degrees east,
//! so a swath crossing the date line is not split between two days.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BinningError, Result};

/// MJD of 1970-01-01T00:00Z. The MJD epoch is 1858-11-17T00:00Z.
pub const UNIX_EPOCH_MJD: f64 = 40_587.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// One millisecond, in hours.
const EPS_HOURS: f64 = 1.0 / 3_600_000.0;

/// Position of an observation relative to a data period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataPeriodMembership {
    PreviousPeriods,
    CurrentPeriod,
    SubsequentPeriods,
}

/// A temporal window of whole data days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPeriod {
    start_time: f64,
    duration_days: f64,
    min_data_hour: f64,
}

impl DataPeriod {
    pub fn new(start_time: f64, duration_days: f64, min_data_hour: f64) -> Result<Self> {
        if !start_time.is_finite() {
            return Err(BinningError::invalid_parameter(
                "start_time",
                format!("must be finite, got {}", start_time),
            ));
        }
        if !(duration_days.is_finite() && duration_days > 0.0) {
            return Err(BinningError::invalid_parameter(
                "duration_days",
                format!("must be positive, got {}", duration_days),
            ));
        }
        if !min_data_hour.is_finite() {
            return Err(BinningError::invalid_parameter(
                "min_data_hour",
                format!("must be finite, got {}", min_data_hour),
            ));
        }
        Ok(Self {
            start_time,
            duration_days,
            min_data_hour,
        })
    }

    /// Period starting at midnight UTC of `start_date`.
    pub fn from_date(start_date: NaiveDate, duration_days: f64, min_data_hour: f64) -> Result<Self> {
        Self::new(mjd_from_date(start_date), duration_days, min_data_hour)
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration_days
    }

    pub fn duration_days(&self) -> f64 {
        self.duration_days
    }

    pub fn min_data_hour(&self) -> f64 {
        self.min_data_hour
    }

    /// Classify an observation at longitude `lon` (degrees) and time `time`
    /// (MJD).
    pub fn membership(&self, lon: f64, time: f64) -> DataPeriodMembership {
        let hour = 24.0 * (time - self.start_time);
        let first_hour = self.min_data_hour + (lon + 180.0) * (-24.0 / 360.0);
        let last_hour = first_hour + 24.0 * self.duration_days;

        if hour - EPS_HOURS < first_hour {
            DataPeriodMembership::PreviousPeriods
        } else if hour + EPS_HOURS > last_hour {
            DataPeriodMembership::SubsequentPeriods
        } else {
            DataPeriodMembership::CurrentPeriod
        }
    }
}

/// Half-open UTC time window `[start, end)` in MJD, bounding the
/// observations of a whole product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    start: f64,
    end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if start.is_nan() || end.is_nan() || end < start {
            return Err(BinningError::invalid_parameter(
                "time_range",
                format!("invalid range [{}, {})", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    /// Range covering whole UTC days from `start_date` through `end_date`.
    /// A missing bound leaves that side open.
    pub fn from_dates(start_date: Option<&str>, end_date: Option<&str>) -> Result<Option<Self>> {
        let start = start_date.map(parse_date).transpose()?;
        let end = end_date.map(parse_date).transpose()?;
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(BinningError::invalid_config(format!(
                    "end_date {} is before start_date {}",
                    end, start
                )));
            }
        }
        if start.is_none() && end.is_none() {
            return Ok(None);
        }

        let start = start.map_or(f64::NEG_INFINITY, mjd_from_date);
        let end = end.map_or(f64::INFINITY, |date| mjd_from_date(date) + 1.0);
        Self::new(start, end).map(Some)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

/// Modified Julian Date of an instant, with millisecond resolution.
pub fn mjd_from_datetime(time: &DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_MJD
}

/// Instant of a Modified Julian Date, `None` if out of chrono's range.
pub fn datetime_from_mjd(mjd: f64) -> Option<DateTime<Utc>> {
    if !mjd.is_finite() {
        return None;
    }
    let millis = ((mjd - UNIX_EPOCH_MJD) * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
}

/// MJD of midnight UTC on `date`.
pub fn mjd_from_date(date: NaiveDate) -> f64 {
    mjd_from_datetime(&Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| BinningError::InvalidDate {
        value: value.to_string(),
    })
}

/// MJD of midnight UTC on a `YYYY-MM-DD` date.
pub fn parse_date_mjd(value: &str) -> Result<f64> {
    parse_date(value).map(mjd_from_date)
}
