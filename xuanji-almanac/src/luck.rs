//! Luck cycle: Da Yun (大运) decades and Liu Nian (流年) years
//!
//! **Direction:** forward when a yang year stem meets a male chart or a yin
//! year stem meets a female chart; backward otherwise.
//!
//! **Start offset:** the span between birth and the adjacent jie (next jie when
//! forward, previous jie when backward) is converted at the traditional rate
//! of three days per year: one day is four months, one two-hour period is ten
//! days.

use crate::chart::{BranchBrief, StemInfo};
use crate::ganzhi::{GanZhi, Stem};
use crate::input::Gender;
use crate::pillars::FourPillars;
use crate::solar_terms::{next_jie, previous_jie};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

pub const DECADE_COUNT: usize = 8;
pub const YEARS_PER_DECADE: i32 = 10;

/// Time from birth until the first decade begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartOffset {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiuNian {
    pub index: usize,
    pub year: i32,
    pub age: i32,
    pub gan_zhi: GanZhi,
    pub gan: StemInfo,
    pub zhi: BranchBrief,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaYun {
    pub index: usize,
    pub start_age: i32,
    pub start_year: i32,
    pub end_year: i32,
    pub gan_zhi: GanZhi,
    pub gan: StemInfo,
    pub zhi: BranchBrief,
    pub liu_nian: Vec<LiuNian>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LuckCycle {
    pub forward: bool,
    pub start_offset: StartOffset,
    /// Gregorian date the first decade begins
    pub start_date: NaiveDate,
    pub decades: Vec<DaYun>,
}

/// Two-hour period index used for the offset; 23:00 counts as the last of the day
fn period_index(moment: NaiveDateTime) -> i64 {
    if moment.hour() == 23 {
        11
    } else {
        ((moment.hour() as i64 + 1) / 2) % 12
    }
}

/// Convert the birth-to-jie span into years, months and days
pub fn start_offset(start: NaiveDateTime, end: NaiveDateTime) -> StartOffset {
    let mut day_diff = (end.date() - start.date()).num_days();
    let mut period_diff = period_index(end) - period_index(start);
    if period_diff < 0 {
        period_diff += 12;
        day_diff -= 1;
    }

    let month_from_periods = period_diff * 10 / 30;
    let total_months = day_diff * 4 + month_from_periods;
    let days = period_diff * 10 - month_from_periods * 30;

    StartOffset {
        years: (total_months / 12).max(0) as u32,
        months: (total_months % 12).max(0) as u32,
        days: days.max(0) as u32,
    }
}

fn add_offset(date: NaiveDate, offset: StartOffset) -> NaiveDate {
    let after_years = date
        .checked_add_months(Months::new(offset.years * 12))
        .unwrap_or(date);
    let after_months = after_years
        .checked_add_months(Months::new(offset.months))
        .unwrap_or(after_years);
    after_months + Duration::days(offset.days as i64)
}

fn liu_nian(index: usize, year: i32, age: i32, day_master: Stem) -> LiuNian {
    let gan_zhi = GanZhi::of_year(year);
    LiuNian {
        index,
        year,
        age,
        gan_zhi,
        gan: StemInfo::relative_to(gan_zhi.stem, day_master),
        zhi: BranchBrief::from(gan_zhi.branch),
    }
}

/// Expand the eight luck decades for a chart
///
/// `birth` must be the same moment the pillars were computed from.
pub fn luck_cycle(birth: NaiveDateTime, pillars: &FourPillars, gender: Gender) -> LuckCycle {
    let forward = pillars.year.stem.is_yang() == (gender == Gender::Male);

    let offset = if forward {
        start_offset(birth, next_jie(birth).at)
    } else {
        start_offset(previous_jie(birth).at, birth)
    };
    let start_date = add_offset(birth.date(), offset);

    let birth_year = birth.year();
    let first_start_year = start_date.year();
    let day_master = pillars.day.stem;

    let decades = (1..=DECADE_COUNT)
        .map(|i| {
            let start_year = first_start_year + (i as i32 - 1) * YEARS_PER_DECADE;
            let start_age = start_year - birth_year + 1;
            let step = if forward { i as i64 } else { -(i as i64) };
            let gan_zhi = pillars.month.offset(step);

            DaYun {
                index: i - 1,
                start_age,
                start_year,
                end_year: start_year + YEARS_PER_DECADE - 1,
                gan_zhi,
                gan: StemInfo::relative_to(gan_zhi.stem, day_master),
                zhi: BranchBrief::from(gan_zhi.branch),
                liu_nian: (0..YEARS_PER_DECADE)
                    .map(|k| liu_nian(k as usize, start_year + k, start_age + k, day_master))
                    .collect(),
            }
        })
        .collect();

    LuckCycle {
        forward,
        start_offset: offset,
        start_date,
        decades,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pillars::{four_pillars, ZiHourMode};

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn cycle(birth: NaiveDateTime, gender: Gender) -> LuckCycle {
        let pillars = four_pillars(birth, true, ZiHourMode::SameDay);
        luck_cycle(birth, &pillars, gender)
    }

    #[test]
    fn test_start_offset_conversion() {
        // 22 days and two periods: 88 months, 20 days
        let offset = start_offset(at(1990, 6, 15, 14, 15), at(1990, 7, 7, 17, 0));
        assert_eq!(offset, StartOffset { years: 7, months: 4, days: 20 });
    }

    #[test]
    fn test_start_offset_borrows_a_day() {
        // End period earlier in the day than the start period
        let offset = start_offset(at(2000, 1, 1, 20, 0), at(2000, 1, 4, 2, 0));
        // 2 days + (1 - 10 + 12 = 3 periods) → 8 months + 1 month, 0 days
        assert_eq!(offset, StartOffset { years: 0, months: 9, days: 0 });
    }

    #[test]
    fn test_forward_male_1990() {
        let luck = cycle(at(1990, 6, 15, 14, 15), Gender::Male);
        assert!(luck.forward);
        assert_eq!(luck.start_offset, StartOffset { years: 7, months: 4, days: 20 });
        assert_eq!(luck.start_date, NaiveDate::from_ymd_opt(1997, 11, 4).unwrap());

        let first = &luck.decades[0];
        assert_eq!(first.index, 0);
        assert_eq!(first.start_year, 1997);
        assert_eq!(first.start_age, 8);
        assert_eq!(first.end_year, 2006);
        assert_eq!(first.gan_zhi.to_string(), "癸未");
        assert_eq!(first.liu_nian[0].gan_zhi.to_string(), "丁丑");
        assert_eq!(first.liu_nian[0].age, 8);
    }

    #[test]
    fn test_backward_female_1990() {
        let luck = cycle(at(1990, 6, 15, 14, 15), Gender::Female);
        assert!(!luck.forward);
        // 壬午 walks back to 辛巳
        assert_eq!(luck.decades[0].gan_zhi.to_string(), "辛巳");
        assert_eq!(luck.decades[1].gan_zhi.to_string(), "庚辰");
    }

    #[test]
    fn test_decades_and_years_strictly_increase() {
        for (birth, gender) in [
            (at(1985, 11, 3, 6, 40), Gender::Female),
            (at(2003, 2, 3, 23, 10), Gender::Male),
            (at(1972, 8, 8, 0, 5), Gender::Male),
        ] {
            let luck = cycle(birth, gender);
            assert_eq!(luck.decades.len(), DECADE_COUNT);
            for pair in luck.decades.windows(2) {
                assert!(pair[1].start_year > pair[0].start_year);
                assert_eq!(pair[1].start_year - pair[0].start_year, 10);
            }
            for decade in &luck.decades {
                assert_eq!(decade.liu_nian.len(), 10);
                for pair in decade.liu_nian.windows(2) {
                    assert!(pair[1].year > pair[0].year);
                }
                assert_eq!(decade.liu_nian[0].year, decade.start_year);
                assert_eq!(decade.liu_nian[9].year, decade.end_year);
            }
        }
    }

    #[test]
    fn test_ten_gods_relative_to_day_master() {
        let luck = cycle(at(1990, 6, 15, 14, 15), Gender::Male);
        // Day master 辛; 癸 is its 食神
        assert_eq!(luck.decades[0].gan.ten_god.label(), "食神");
    }
}
