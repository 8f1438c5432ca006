//! Birth input normalization
//!
//! Turns the raw strings a client submits (date, optional clock time,
//! location, calendar type) into a validated calendar moment. Lunar input is
//! converted to the Gregorian calendar here, and the true-solar-time
//! correction is applied to the moment used for pillar math.

use crate::lunar::{self, LunarDate};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;
use xuanji_common::{Error, Result};

/// Standard meridian of China Standard Time (UTC+8)
pub const STANDARD_MERIDIAN: f64 = 120.0;

/// Minutes of clock shift per degree of longitude
const MINUTES_PER_DEGREE: f64 = 4.0;

/// Known place longitudes, matched against city first and then province
const LONGITUDES: [(&str, f64); 14] = [
    ("成都", 104.06),
    ("四川", 104.06),
    ("西安", 108.93),
    ("陕西", 108.93),
    ("北京", 116.40),
    ("上海", 121.47),
    ("广州", 113.26),
    ("广东", 113.26),
    ("深圳", 114.05),
    ("新疆", 87.62),
    ("辽宁", 123.43),
    ("台湾", 121.50),
    ("香港", 114.16),
    ("澳门", 113.54),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(alias = "male", alias = "男")]
    Male,
    #[serde(alias = "female", alias = "女")]
    Female,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "男",
            Gender::Female => "女",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalendarType {
    #[default]
    Solar,
    Lunar,
}

/// Birth place as entered (free text)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: String,
}

impl Location {
    /// Longitude in degrees east; unknown places use the standard meridian
    ///
    /// Province and city names match with or without a trailing 省/市.
    pub fn longitude(&self) -> f64 {
        let city = strip_suffix(&self.city);
        let province = strip_suffix(&self.province);

        LONGITUDES
            .iter()
            .find(|(name, _)| *name == city)
            .or_else(|| LONGITUDES.iter().find(|(name, _)| *name == province))
            .map(|(_, lon)| *lon)
            .unwrap_or(STANDARD_MERIDIAN)
    }
}

fn strip_suffix(name: &str) -> &str {
    let name = name.trim();
    name.strip_suffix('省')
        .or_else(|| name.strip_suffix('市'))
        .unwrap_or(name)
}

/// Shift between clock time and true solar time for a longitude
pub fn true_solar_offset(longitude: f64) -> Duration {
    let seconds = ((longitude - STANDARD_MERIDIAN) * MINUTES_PER_DEGREE * 60.0).round();
    Duration::seconds(seconds as i64)
}

/// Birth details as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthInput {
    /// `YYYY-MM-DD`, in the calendar named by `calendar_type`
    pub birth_date: String,
    /// `HH:mm`; ignored when `time_unknown`
    #[serde(default)]
    pub birth_time: String,
    #[serde(default)]
    pub time_unknown: bool,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub calendar_type: CalendarType,
    pub gender: Gender,
    /// Lunar input only: the month is the leap month of that year
    #[serde(default)]
    pub is_leap_month: bool,
}

/// A validated birth moment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthMoment {
    /// Gregorian birth date as entered (or converted from lunar input)
    pub solar_date: NaiveDate,
    /// Clock time as entered; `None` when unknown
    pub clock_time: Option<NaiveTime>,
    /// Moment the pillars are computed from
    ///
    /// True solar time when the correction applies, otherwise the clock
    /// time. Unknown times use noon internally and are never corrected.
    pub pillar_moment: NaiveDateTime,
    /// Set when the true-solar-time correction was applied
    pub true_solar_time: Option<NaiveDateTime>,
}

impl BirthMoment {
    pub fn time_known(&self) -> bool {
        self.clock_time.is_some()
    }
}

impl BirthInput {
    /// Validate and resolve the submitted strings
    ///
    /// **Errors:** malformed date or time, a date outside 1900-2100, or a
    /// lunar date that does not exist.
    pub fn normalize(&self, apply_true_solar_time: bool) -> Result<BirthMoment> {
        let (year, month, day) = parse_date(&self.birth_date)?;

        let solar_date = match self.calendar_type {
            CalendarType::Solar => {
                if self.is_leap_month {
                    debug!("Leap month flag ignored for solar input");
                }
                NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                    Error::InvalidInput(format!("{} is not a valid date", self.birth_date))
                })?
            }
            CalendarType::Lunar => LunarDate::new(year, month, day, self.is_leap_month)?.to_solar()?,
        };

        if solar_date < lunar::first_date()
            || chrono::Datelike::year(&solar_date) > lunar::MAX_YEAR
        {
            return Err(Error::InvalidInput(format!(
                "birth date must be between {} and {}-12-31",
                lunar::first_date(),
                lunar::MAX_YEAR
            )));
        }

        let clock_time = if self.time_unknown {
            None
        } else {
            Some(parse_time(&self.birth_time)?)
        };

        let (pillar_moment, true_solar_time) = match clock_time {
            Some(time) => {
                let clock = solar_date.and_time(time);
                if apply_true_solar_time {
                    let corrected = clock + true_solar_offset(self.location.longitude());
                    (corrected, Some(corrected))
                } else {
                    (clock, None)
                }
            }
            None => (solar_date.and_time(noon()), None),
        };

        debug!(
            solar_date = %solar_date,
            pillar_moment = %pillar_moment,
            time_known = clock_time.is_some(),
            "Normalized birth input"
        );

        Ok(BirthMoment {
            solar_date,
            clock_time,
            pillar_moment,
            true_solar_time,
        })
    }
}

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()
}

/// Parse `YYYY-MM-DD` into numeric parts (range checks happen later)
pub fn parse_date(text: &str) -> Result<(i32, u32, u32)> {
    let invalid = || Error::InvalidInput(format!("'{}' is not a YYYY-MM-DD date", text));

    let parts: Vec<&str> = text.trim().split('-').collect();
    if parts.len() != 3 {
        return Err(invalid());
    }
    let year = parts[0].parse::<i32>().map_err(|_| invalid())?;
    let month = parts[1].parse::<u32>().map_err(|_| invalid())?;
    let day = parts[2].parse::<u32>().map_err(|_| invalid())?;
    Ok((year, month, day))
}

/// Parse `HH:mm` (seconds, if present, are accepted and ignored)
pub fn parse_time(text: &str) -> Result<NaiveTime> {
    let invalid = || Error::InvalidInput(format!("'{}' is not an HH:mm time", text));

    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(invalid());
    }
    let hour = parts[0].parse::<u32>().map_err(|_| invalid())?;
    let minute = parts[1].parse::<u32>().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}
