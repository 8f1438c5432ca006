//! The 24 solar terms (节气) and jie boundaries
//!
//! Each term is the instant the apparent solar longitude reaches a multiple of
//! 15°. The twelve "jie" terms (odd multiples of 15°, starting with 小寒 at
//! 285°) open the solar months used by the month pillar and the luck cycle;
//! 立春 (315°) opens the BaZi year.

use crate::astro::{instant_of_solar_longitude, normalize_degrees, solar_longitude_at, TROPICAL_YEAR};
use crate::ganzhi::Branch;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Solar terms in Gregorian calendar order, starting from 小寒
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolarTerm {
    #[serde(rename = "小寒")]
    XiaoHan,
    #[serde(rename = "大寒")]
    DaHan,
    #[serde(rename = "立春")]
    LiChun,
    #[serde(rename = "雨水")]
    YuShui,
    #[serde(rename = "惊蛰")]
    JingZhe,
    #[serde(rename = "春分")]
    ChunFen,
    #[serde(rename = "清明")]
    QingMing,
    #[serde(rename = "谷雨")]
    GuYu,
    #[serde(rename = "立夏")]
    LiXia,
    #[serde(rename = "小满")]
    XiaoMan,
    #[serde(rename = "芒种")]
    MangZhong,
    #[serde(rename = "夏至")]
    XiaZhi,
    #[serde(rename = "小暑")]
    XiaoShu,
    #[serde(rename = "大暑")]
    DaShu,
    #[serde(rename = "立秋")]
    LiQiu,
    #[serde(rename = "处暑")]
    ChuShu,
    #[serde(rename = "白露")]
    BaiLu,
    #[serde(rename = "秋分")]
    QiuFen,
    #[serde(rename = "寒露")]
    HanLu,
    #[serde(rename = "霜降")]
    ShuangJiang,
    #[serde(rename = "立冬")]
    LiDong,
    #[serde(rename = "小雪")]
    XiaoXue,
    #[serde(rename = "大雪")]
    DaXue,
    #[serde(rename = "冬至")]
    DongZhi,
}

const TERM_NAMES: [&str; 24] = [
    "小寒", "大寒", "立春", "雨水", "惊蛰", "春分", "清明", "谷雨", "立夏", "小满", "芒种", "夏至",
    "小暑", "大暑", "立秋", "处暑", "白露", "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至",
];

/// Longitude of 小寒, the first term of the Gregorian year
const FIRST_TERM_LONGITUDE: f64 = 285.0;

/// Longitude of 立春, which opens the 寅 month
const LICHUN_LONGITUDE: f64 = 315.0;

impl SolarTerm {
    pub const ALL: [SolarTerm; 24] = [
        SolarTerm::XiaoHan,
        SolarTerm::DaHan,
        SolarTerm::LiChun,
        SolarTerm::YuShui,
        SolarTerm::JingZhe,
        SolarTerm::ChunFen,
        SolarTerm::QingMing,
        SolarTerm::GuYu,
        SolarTerm::LiXia,
        SolarTerm::XiaoMan,
        SolarTerm::MangZhong,
        SolarTerm::XiaZhi,
        SolarTerm::XiaoShu,
        SolarTerm::DaShu,
        SolarTerm::LiQiu,
        SolarTerm::ChuShu,
        SolarTerm::BaiLu,
        SolarTerm::QiuFen,
        SolarTerm::HanLu,
        SolarTerm::ShuangJiang,
        SolarTerm::LiDong,
        SolarTerm::XiaoXue,
        SolarTerm::DaXue,
        SolarTerm::DongZhi,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        TERM_NAMES[self.index()]
    }

    /// Target apparent solar longitude in degrees
    pub fn longitude(self) -> f64 {
        normalize_degrees(FIRST_TERM_LONGITUDE + 15.0 * self.index() as f64)
    }

    /// Term at a longitude that is a multiple of 15°
    pub fn from_longitude(longitude: f64) -> SolarTerm {
        let steps = (normalize_degrees(longitude - FIRST_TERM_LONGITUDE) / 15.0).round() as usize;
        Self::ALL[steps % 24]
    }

    /// Jie terms open a solar month; the others (zhongqi) fall mid-month
    pub fn is_jie(self) -> bool {
        self.index() % 2 == 0
    }

    /// Instant of this term within a Gregorian year, China Standard Time
    pub fn instant(self, year: i32) -> NaiveDateTime {
        // Terms fall roughly 15.2 days apart from about January 6th
        let guess = NaiveDate::from_ymd_opt(year, 1, 6)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
            + Duration::minutes((self.index() as f64 * TROPICAL_YEAR / 24.0 * 1440.0) as i64);
        instant_of_solar_longitude(self.longitude(), guess)
    }

    /// Month branch opened by a jie term (立春 → 寅, 惊蛰 → 卯, …, 小寒 → 丑)
    pub fn month_branch(self) -> Branch {
        let months_since_lichun = (normalize_degrees(self.longitude() - LICHUN_LONGITUDE) / 30.0) as usize;
        Branch::from_index(2 + months_since_lichun)
    }
}

/// A solar term together with the instant it occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarTermInstant {
    pub term: SolarTerm,
    pub at: NaiveDateTime,
}

/// 立春 instant of a Gregorian year; the BaZi year changes here
pub fn li_chun(year: i32) -> NaiveDateTime {
    SolarTerm::LiChun.instant(year)
}

/// Most recent jie at or before `moment`
///
/// **Algorithm:**
/// 1. Find the solar longitude at `moment`
/// 2. Round down to the previous jie longitude (15° + k·30°)
/// 3. Solve for that longitude starting from the proportional estimate
pub fn previous_jie(moment: NaiveDateTime) -> SolarTermInstant {
    let longitude = solar_longitude_at(moment);
    let target = normalize_degrees(15.0 + 30.0 * (normalize_degrees(longitude - 15.0) / 30.0).floor());
    let found = solve_near(target, moment, -normalize_degrees(longitude - target));

    // Rounding at the exact boundary can land a hair after the moment
    if found > moment {
        let earlier = normalize_degrees(target - 30.0);
        return SolarTermInstant {
            term: SolarTerm::from_longitude(earlier),
            at: solve_near(earlier, moment, -30.0),
        };
    }

    SolarTermInstant {
        term: SolarTerm::from_longitude(target),
        at: found,
    }
}

/// First jie strictly after `moment`
pub fn next_jie(moment: NaiveDateTime) -> SolarTermInstant {
    let previous = previous_jie(moment);
    let target = normalize_degrees(previous.term.longitude() + 30.0);
    let elapsed = normalize_degrees(solar_longitude_at(moment) - previous.term.longitude());
    SolarTermInstant {
        term: SolarTerm::from_longitude(target),
        at: solve_near(target, moment, 30.0 - elapsed),
    }
}

fn solve_near(target: f64, moment: NaiveDateTime, degrees_ahead: f64) -> NaiveDateTime {
    let days = degrees_ahead / 360.0 * TROPICAL_YEAR;
    let guess = moment + Duration::minutes((days * 1440.0) as i64);
    instant_of_solar_longitude(target, guess)
}
