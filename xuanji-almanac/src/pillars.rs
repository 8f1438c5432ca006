//! Four Pillars (四柱) from a calendar moment
//!
//! - Year: switches at the exact 立春 instant, not at January 1st or the
//!   lunar new year
//! - Month: branch from the most recent jie term, stem by the 五虎遁 rule
//! - Day: continuous sexagenary day count on the civil date
//! - Hour: two-hour branch, stem by the 五鼠遁 rule

use crate::ganzhi::{Branch, GanZhi, Stem};
use crate::solar_terms::{li_chun, previous_jie};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Offset aligning `num_days_from_ce` with the sexagenary day count
const DAY_CYCLE_OFFSET: i64 = 14;

/// Treatment of births between 23:00 and midnight (late 子 hour)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiHourMode {
    /// Day pillar stays on the civil date; the hour stem follows the next day
    #[default]
    SameDay,
    /// Day pillar advances to the next day at 23:00
    NextDay,
}

/// Four stem-branch pairs; `hour` is `None` when the birth time is unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FourPillars {
    pub year: GanZhi,
    pub month: GanZhi,
    pub day: GanZhi,
    pub hour: Option<GanZhi>,
}

impl FourPillars {
    /// Known pillars in year, month, day, hour order
    pub fn known(&self) -> Vec<GanZhi> {
        let mut pillars = vec![self.year, self.month, self.day];
        pillars.extend(self.hour);
        pillars
    }
}

/// Sexagenary day of a civil date
pub fn day_pillar(date: NaiveDate) -> GanZhi {
    GanZhi::from_index(date.num_days_from_ce() as i64 + DAY_CYCLE_OFFSET)
}

/// Year pillar, switching at the 立春 instant
pub fn year_pillar(moment: NaiveDateTime) -> GanZhi {
    let year = if moment >= li_chun(moment.year()) {
        moment.year()
    } else {
        moment.year() - 1
    };
    GanZhi::of_year(year)
}

/// Month pillar from the most recent jie and the year stem
pub fn month_pillar(moment: NaiveDateTime, year: GanZhi) -> GanZhi {
    let branch = previous_jie(moment).term.month_branch();
    let months_since_yin = (branch.index() + 12 - Branch::Yin.index()) % 12;
    let stem = Stem::from_index(year.stem.index() * 2 + 2 + months_since_yin);
    GanZhi { stem, branch }
}

/// Hour pillar from the clock hour and the stem of the day the hour belongs to
pub fn hour_pillar(hour: u32, day_stem: Stem) -> GanZhi {
    let branch = Branch::from_hour(hour);
    let stem = Stem::from_index((day_stem.index() % 5) * 2 + branch.index());
    GanZhi { stem, branch }
}

/// Compute all four pillars
///
/// **Algorithm:**
/// 1. Year pillar against 立春 of the moment's Gregorian year
/// 2. Month pillar from the previous jie
/// 3. Day pillar on the civil date, advanced at 23:00 in `NextDay` mode
/// 4. Hour pillar (if known); the late 子 hour always takes its stem from the next day
pub fn four_pillars(moment: NaiveDateTime, time_known: bool, mode: ZiHourMode) -> FourPillars {
    let year = year_pillar(moment);
    let month = month_pillar(moment, year);

    let late_zi = moment.hour() == 23;
    let civil_date = moment.date();
    let next_date = civil_date + Duration::days(1);

    let day = match (late_zi, mode) {
        (true, ZiHourMode::NextDay) => day_pillar(next_date),
        _ => day_pillar(civil_date),
    };

    let hour = time_known.then(|| {
        let hour_day = if late_zi { next_date } else { civil_date };
        hour_pillar(moment.hour(), day_pillar(hour_day).stem)
    });

    FourPillars {
        year,
        month,
        day,
        hour,
    }
}
