//! Chinese lunisolar calendar, 1900 through 2100
//!
//! Month lengths and leap months come from a packed per-year table:
//! - bits 0-3: leap month number (0 = none)
//! - bits 4-15: month 12 down to month 1, set = 30 days, clear = 29 days
//! - bit 16: leap month has 30 days
//!
//! Lunar year 1900 month 1 day 1 fell on 1900-01-31.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use xuanji_common::{Error, Result};

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

const LUNAR_INFO: [u32; 201] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054d5, 0x0d260, 0x0d950, 0x16554, 0x056a0, 0x09ad0, 0x055d2,
    0x04ae0, 0x0a5b6, 0x0a4d0, 0x0d250, 0x1d255, 0x0b540, 0x0d6a0, 0x0ada2, 0x095b0, 0x14977,
    0x04970, 0x0a4b0, 0x0b4b5, 0x06a50, 0x06d40, 0x1ab54, 0x02b60, 0x09570, 0x052f2, 0x04970,
    0x06566, 0x0d4a0, 0x0ea50, 0x16a95, 0x05ad0, 0x02b60, 0x186e3, 0x092e0, 0x1c8d7, 0x0c950,
    0x0d4a0, 0x1d8a6, 0x0b550, 0x056a0, 0x1a5b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0b557,
    0x06ca0, 0x0b550, 0x15355, 0x04da0, 0x0a5b0, 0x14573, 0x052b0, 0x0a9a8, 0x0e950, 0x06aa0,
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05260, 0x0f263, 0x0d950, 0x05b57, 0x056a0,
    0x096d0, 0x04dd5, 0x04ad0, 0x0a4d0, 0x0d4d4, 0x0d250, 0x0d558, 0x0b540, 0x0b6a0, 0x195a6,
    0x095b0, 0x049b0, 0x0a974, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0af46, 0x0ab60, 0x09570,
    0x04af5, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06b58, 0x05ac0, 0x0ab60, 0x096d5, 0x092e0,
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5,
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930,
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530,
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45,
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0,
    0x14b63, 0x09370, 0x049f8, 0x04970, 0x064b0, 0x168a6, 0x0ea50, 0x06b20, 0x1a6c4, 0x0aae0,
    0x092e0, 0x0d2e3, 0x0c960, 0x0d557, 0x0d4a0, 0x0da50, 0x05d55, 0x056a0, 0x0a6d0, 0x055d4,
    0x052d0, 0x0a9b8, 0x0a950, 0x0b4a0, 0x0b6a6, 0x0ad50, 0x055a0, 0x0aba4, 0x0a5b0, 0x052b0,
    0x0b273, 0x06930, 0x07337, 0x06aa0, 0x0ad50, 0x14b55, 0x04b60, 0x0a570, 0x054e4, 0x0d160,
    0x0e968, 0x0d520, 0x0daa0, 0x16aa6, 0x056d0, 0x04ae0, 0x0a9d4, 0x0a2d0, 0x0d150, 0x0f252,
    0x0d520,
];

/// First Gregorian date covered by the table (lunar 1900-01-01)
pub fn first_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 31).unwrap_or_default()
}

fn year_info(year: i32) -> u32 {
    LUNAR_INFO[(year - MIN_YEAR) as usize]
}

/// Leap month number of a lunar year, or 0
pub fn leap_month(year: i32) -> u32 {
    year_info(year) & 0xf
}

fn leap_month_days(year: i32) -> i64 {
    match (leap_month(year), year_info(year) & 0x10000) {
        (0, _) => 0,
        (_, 0) => 29,
        _ => 30,
    }
}

/// Days in a regular (non-leap) lunar month
pub fn month_days(year: i32, month: u32) -> i64 {
    if year_info(year) & (0x10000 >> month) != 0 {
        30
    } else {
        29
    }
}

fn year_days(year: i32) -> i64 {
    (1..=12).map(|m| month_days(year, m)).sum::<i64>() + leap_month_days(year)
}

fn check_year(year: i32) -> Result<()> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "lunar year {} outside supported range {}-{}",
            year, MIN_YEAR, MAX_YEAR
        )))
    }
}

/// A date in the Chinese lunisolar calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub is_leap_month: bool,
}

impl LunarDate {
    /// Validated lunar date
    ///
    /// Fails when the year is out of range, the month is not 1-12, the
    /// requested leap month does not exist that year, or the day exceeds
    /// the month's length.
    pub fn new(year: i32, month: u32, day: u32, is_leap_month: bool) -> Result<LunarDate> {
        check_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidInput(format!("lunar month {} out of range", month)));
        }
        if is_leap_month && leap_month(year) != month {
            return Err(Error::InvalidInput(format!(
                "lunar year {} has no leap month {}",
                year, month
            )));
        }
        let length = if is_leap_month {
            leap_month_days(year)
        } else {
            month_days(year, month)
        };
        if day == 0 || day as i64 > length {
            return Err(Error::InvalidInput(format!(
                "lunar day {} out of range for month with {} days",
                day, length
            )));
        }
        Ok(LunarDate {
            year,
            month,
            day,
            is_leap_month,
        })
    }

    /// Convert a Gregorian date
    ///
    /// **Algorithm:** count days from 1900-01-31, subtract whole lunar years,
    /// then walk months, inserting the leap month right after its namesake.
    pub fn from_solar(date: NaiveDate) -> Result<LunarDate> {
        let mut offset = (date - first_date()).num_days();
        if offset < 0 {
            return Err(Error::InvalidInput(format!(
                "date {} precedes the lunar table",
                date
            )));
        }

        let mut year = MIN_YEAR;
        loop {
            check_year(year)?;
            let days = year_days(year);
            if offset < days {
                break;
            }
            offset -= days;
            year += 1;
        }

        let leap = leap_month(year);
        let mut month = 1;
        loop {
            let days = month_days(year, month);
            if offset < days {
                return Ok(LunarDate {
                    year,
                    month,
                    day: offset as u32 + 1,
                    is_leap_month: false,
                });
            }
            offset -= days;

            if month == leap {
                let days = leap_month_days(year);
                if offset < days {
                    return Ok(LunarDate {
                        year,
                        month,
                        day: offset as u32 + 1,
                        is_leap_month: true,
                    });
                }
                offset -= days;
            }
            month += 1;
        }
    }

    /// Convert back to the Gregorian calendar
    pub fn to_solar(&self) -> Result<NaiveDate> {
        let checked = LunarDate::new(self.year, self.month, self.day, self.is_leap_month)?;

        let mut offset: i64 = (MIN_YEAR..checked.year).map(year_days).sum();
        let leap = leap_month(checked.year);
        for m in 1..checked.month {
            offset += month_days(checked.year, m);
            if m == leap {
                offset += leap_month_days(checked.year);
            }
        }
        if checked.is_leap_month {
            offset += month_days(checked.year, checked.month);
        }
        offset += checked.day as i64 - 1;

        Ok(first_date() + Duration::days(offset))
    }
}

const DIGITS: [char; 10] = ['〇', '一', '二', '三', '四', '五', '六', '七', '八', '九'];
const MONTH_NAMES: [&str; 12] = [
    "正", "二", "三", "四", "五", "六", "七", "八", "九", "十", "冬", "腊",
];

fn day_name(day: u32) -> String {
    const UNITS: [&str; 10] = ["", "一", "二", "三", "四", "五", "六", "七", "八", "九"];
    match day {
        1..=9 => format!("初{}", UNITS[day as usize]),
        10 => "初十".to_string(),
        11..=19 => format!("十{}", UNITS[(day - 10) as usize]),
        20 => "二十".to_string(),
        21..=29 => format!("廿{}", UNITS[(day - 20) as usize]),
        30 => "三十".to_string(),
        _ => day.to_string(),
    }
}

/// Traditional form, e.g. `一九九〇年五月廿三` or `二〇二三年闰二月初一`
impl fmt::Display for LunarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in self.year.to_string().chars() {
            let c = digit
                .to_digit(10)
                .map(|d| DIGITS[d as usize])
                .unwrap_or(digit);
            write!(f, "{}", c)?;
        }
        let month = MONTH_NAMES
            .get((self.month as usize).wrapping_sub(1))
            .copied()
            .unwrap_or("?");
        write!(
            f,
            "年{}{}月{}",
            if self.is_leap_month { "闰" } else { "" },
            month,
            day_name(self.day)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_year_dates() {
        let cases = [
            (1901, date(1901, 2, 19)),
            (1950, date(1950, 2, 17)),
            (1990, date(1990, 1, 27)),
            (2000, date(2000, 2, 5)),
            (2020, date(2020, 1, 25)),
            (2023, date(2023, 1, 22)),
            (2024, date(2024, 2, 10)),
            (2025, date(2025, 1, 29)),
            (2050, date(2050, 1, 23)),
            (2100, date(2100, 2, 9)),
        ];
        for (year, expected) in cases {
            let first = LunarDate::new(year, 1, 1, false).unwrap();
            assert_eq!(first.to_solar().unwrap(), expected, "lunar new year {}", year);
            assert_eq!(LunarDate::from_solar(expected).unwrap(), first);
        }
    }

    #[test]
    fn test_from_solar_regular_and_leap() {
        let d = LunarDate::from_solar(date(1990, 6, 15)).unwrap();
        assert_eq!((d.year, d.month, d.day, d.is_leap_month), (1990, 5, 23, false));

        let d = LunarDate::from_solar(date(2023, 3, 22)).unwrap();
        assert_eq!((d.year, d.month, d.day, d.is_leap_month), (2023, 2, 1, true));

        let d = LunarDate::from_solar(date(2020, 5, 23)).unwrap();
        assert_eq!((d.year, d.month, d.day, d.is_leap_month), (2020, 4, 1, true));

        let d = LunarDate::from_solar(date(2024, 2, 9)).unwrap();
        assert_eq!((d.year, d.month, d.day), (2023, 12, 30));
    }

    #[test]
    fn test_round_trip_across_range() {
        let mut day = date(1900, 1, 31);
        let end = date(2101, 1, 28);
        while day <= end {
            let lunar = LunarDate::from_solar(day).unwrap();
            assert_eq!(lunar.to_solar().unwrap(), day);
            day += Duration::days(37);
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(LunarDate::from_solar(date(1900, 1, 30)).is_err());
        assert!(LunarDate::from_solar(date(2101, 1, 29)).is_err());
        assert!(LunarDate::from_solar(date(2101, 1, 28)).is_ok());
        assert!(LunarDate::new(1899, 1, 1, false).is_err());
    }

    #[test]
    fn test_invalid_lunar_dates() {
        assert!(LunarDate::new(2023, 13, 1, false).is_err());
        assert!(LunarDate::new(2023, 3, 1, true).is_err());
        assert!(LunarDate::new(2023, 2, 1, true).is_ok());
        assert!(LunarDate::new(2023, 1, 31, false).is_err());
        assert!(LunarDate::new(2023, 1, 0, false).is_err());
    }

    #[test]
    fn test_display() {
        let d = LunarDate::new(1990, 5, 23, false).unwrap();
        assert_eq!(d.to_string(), "一九九〇年五月廿三");
        let d = LunarDate::new(2023, 2, 1, true).unwrap();
        assert_eq!(d.to_string(), "二〇二三年闰二月初一");
        let d = LunarDate::new(2024, 12, 10, false).unwrap();
        assert_eq!(d.to_string(), "二〇二四年腊月初十");
        let d = LunarDate::new(2024, 11, 20, false).unwrap();
        assert_eq!(d.to_string(), "二〇二四年冬月二十");
    }

    #[test]
    fn test_day_names() {
        assert_eq!(day_name(1), "初一");
        assert_eq!(day_name(15), "十五");
        assert_eq!(day_name(21), "廿一");
        assert_eq!(day_name(30), "三十");
    }
}
