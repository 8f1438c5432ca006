//! Apparent solar longitude and the instants the Sun reaches a given longitude
//!
//! The Sun's position comes from a truncated VSOP87 series for the Earth
//! (heliocentric longitude and radius), corrected to the apparent geocentric
//! longitude with the FK5 frame shift, nutation in longitude and annual
//! aberration. Accuracy is well under a minute of time for solar-term instants
//! between 1900 and 2100, which is all the pillar boundaries need.
//!
//! Civil instants are expressed as China Standard Time (UTC+8) naive
//! datetimes; `ΔT` converts between Terrestrial Time and UT.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

/// J2000.0 epoch as a Julian Day
const J2000: f64 = 2_451_545.0;

/// Mean tropical year in days
pub const TROPICAL_YEAR: f64 = 365.2422;

/// China Standard Time offset from UT, in hours
const CST_OFFSET_HOURS: f64 = 8.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

// Truncated VSOP87 Earth series: (A, B, C) → A·cos(B + C·τ), τ in Julian millennia
const L0: [(f64, f64, f64); 64] = [
    (175347046.0, 0.0, 0.0),
    (3341656.0, 4.6692568, 6283.07585),
    (34894.0, 4.6261, 12566.1517),
    (3497.0, 2.7441, 5753.3849),
    (3418.0, 2.8289, 3.5231),
    (3136.0, 3.6277, 77713.7715),
    (2676.0, 4.4181, 7860.4194),
    (2343.0, 6.1352, 3930.2097),
    (1324.0, 0.7425, 11506.7698),
    (1273.0, 2.0371, 529.691),
    (1199.0, 1.1096, 1577.3435),
    (990.0, 5.233, 5884.927),
    (902.0, 2.045, 26.298),
    (857.0, 3.508, 398.149),
    (780.0, 1.179, 5223.694),
    (753.0, 2.533, 5507.553),
    (505.0, 4.583, 18849.228),
    (492.0, 4.205, 775.523),
    (357.0, 2.92, 0.067),
    (317.0, 5.849, 11790.629),
    (284.0, 1.899, 796.298),
    (271.0, 0.315, 10977.079),
    (243.0, 0.345, 5486.778),
    (206.0, 4.806, 2544.314),
    (205.0, 1.869, 5573.143),
    (202.0, 2.458, 6069.777),
    (156.0, 0.833, 213.299),
    (132.0, 3.411, 2942.463),
    (126.0, 1.083, 20.775),
    (115.0, 0.645, 0.98),
    (103.0, 0.636, 4694.003),
    (102.0, 0.976, 15720.839),
    (102.0, 4.267, 7.114),
    (99.0, 6.21, 2146.17),
    (98.0, 0.68, 155.42),
    (86.0, 5.98, 161000.69),
    (85.0, 1.3, 6275.96),
    (85.0, 3.67, 71430.7),
    (80.0, 1.81, 17260.15),
    (79.0, 3.04, 12036.46),
    (75.0, 1.76, 5088.63),
    (74.0, 3.5, 3154.69),
    (74.0, 4.68, 801.82),
    (70.0, 0.83, 9437.76),
    (62.0, 3.98, 8827.39),
    (61.0, 1.82, 7084.9),
    (57.0, 2.78, 6286.6),
    (56.0, 4.39, 14143.5),
    (56.0, 3.47, 6279.55),
    (52.0, 0.19, 12139.55),
    (52.0, 1.33, 1748.02),
    (51.0, 0.28, 5856.48),
    (49.0, 0.49, 1194.45),
    (41.0, 5.37, 8429.24),
    (41.0, 2.4, 19651.05),
    (39.0, 6.17, 10447.39),
    (37.0, 6.04, 10213.29),
    (37.0, 2.57, 1059.38),
    (36.0, 1.71, 2352.87),
    (36.0, 1.78, 6812.77),
    (33.0, 0.59, 17789.85),
    (30.0, 0.44, 83996.85),
    (30.0, 2.74, 1349.87),
    (25.0, 3.16, 4690.48),
];
const L1: [(f64, f64, f64); 34] = [
    (628331966747.0, 0.0, 0.0),
    (206059.0, 2.678235, 6283.07585),
    (4303.0, 2.6351, 12566.1517),
    (425.0, 1.59, 3.523),
    (119.0, 5.796, 26.298),
    (109.0, 2.966, 1577.344),
    (93.0, 2.59, 18849.23),
    (72.0, 1.14, 529.69),
    (68.0, 1.87, 398.15),
    (67.0, 4.41, 5507.55),
    (59.0, 2.89, 5223.69),
    (56.0, 2.17, 155.42),
    (45.0, 0.4, 796.3),
    (36.0, 0.47, 775.52),
    (29.0, 2.65, 7.11),
    (21.0, 5.34, 0.98),
    (19.0, 1.85, 5486.78),
    (19.0, 4.97, 213.3),
    (17.0, 2.99, 6275.96),
    (16.0, 0.03, 2544.31),
    (16.0, 1.43, 2146.17),
    (15.0, 1.21, 10977.08),
    (12.0, 2.83, 1748.02),
    (12.0, 3.26, 5088.63),
    (12.0, 5.27, 1194.45),
    (12.0, 2.08, 4694.0),
    (11.0, 0.77, 553.57),
    (10.0, 1.3, 6286.6),
    (10.0, 4.24, 1349.87),
    (9.0, 2.7, 242.73),
    (9.0, 5.64, 951.72),
    (8.0, 5.3, 2352.87),
    (6.0, 2.65, 9437.76),
    (6.0, 4.67, 4690.48),
];
const L2: [(f64, f64, f64); 20] = [
    (52919.0, 0.0, 0.0),
    (8720.0, 1.0721, 6283.0758),
    (309.0, 0.867, 12566.152),
    (27.0, 0.05, 3.52),
    (16.0, 5.19, 26.3),
    (16.0, 3.68, 155.42),
    (10.0, 0.76, 18849.23),
    (9.0, 2.06, 77713.77),
    (7.0, 0.83, 775.52),
    (5.0, 4.66, 1577.34),
    (4.0, 1.03, 7.11),
    (4.0, 3.44, 5573.14),
    (3.0, 5.14, 796.3),
    (3.0, 6.05, 5507.55),
    (3.0, 1.19, 242.73),
    (3.0, 6.12, 529.69),
    (3.0, 0.31, 398.15),
    (3.0, 2.28, 553.57),
    (2.0, 4.38, 5223.69),
    (2.0, 3.75, 0.98),
];
const L3: [(f64, f64, f64); 7] = [
    (289.0, 5.844, 6283.076),
    (35.0, 0.0, 0.0),
    (17.0, 5.49, 12566.15),
    (3.0, 5.2, 155.42),
    (1.0, 4.72, 3.52),
    (1.0, 5.3, 18849.23),
    (1.0, 5.97, 242.73),
];
const L4: [(f64, f64, f64); 3] = [
    (114.0, 3.142, 0.0),
    (8.0, 4.13, 6283.08),
    (1.0, 3.84, 12566.15),
];
const L5: [(f64, f64, f64); 1] = [
    (1.0, 3.14, 0.0),
];
const R0: [(f64, f64, f64); 6] = [
    (100013989.0, 0.0, 0.0),
    (1670700.0, 3.0984635, 6283.07585),
    (13956.0, 3.05525, 12566.1517),
    (3084.0, 5.1985, 77713.7715),
    (1628.0, 1.1739, 5753.3849),
    (1576.0, 2.8469, 7860.4194),
];
const R1: [(f64, f64, f64); 2] = [
    (103019.0, 1.10749, 6283.07585),
    (1721.0, 1.0644, 12566.1517),
];

fn series(terms: &[(f64, f64, f64)], tau: f64) -> f64 {
    terms.iter().map(|(a, b, c)| a * (b + c * tau).cos()).sum()
}

/// Wrap an angle in degrees into `[0, 360)`
pub fn normalize_degrees(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Wrap an angle in degrees into `[-180, 180)`
pub fn normalize_pm180(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

/// Julian Day of a Gregorian calendar instant (no time zone applied)
pub fn julian_day(moment: NaiveDateTime) -> f64 {
    let mut year = moment.year() as f64;
    let mut month = moment.month() as f64;
    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }
    let century = (year / 100.0).floor();
    let gregorian = 2.0 - century + (century / 4.0).floor();
    let day_fraction = (moment.hour() as f64
        + moment.minute() as f64 / 60.0
        + moment.second() as f64 / 3600.0)
        / 24.0;

    (365.25 * (year + 4716.0)).floor()
        + (30.6001 * (month + 1.0)).floor()
        + moment.day() as f64
        + gregorian
        - 1524.5
        + day_fraction
}

/// Gregorian calendar instant of a Julian Day, rounded to the second
pub fn from_julian_day(jd: f64) -> NaiveDateTime {
    let epoch = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap_or_default();
    let seconds = ((jd - J2000) * SECONDS_PER_DAY).round() as i64;
    epoch + Duration::seconds(seconds)
}

/// ΔT = TT − UT in seconds (Espenak & Meeus polynomial fits)
pub fn delta_t_seconds(year: f64) -> f64 {
    if year < 1920.0 {
        let t = year - 1900.0;
        -2.79 + 1.494119 * t - 0.0598939 * t.powi(2) + 0.0061966 * t.powi(3)
            - 0.000197 * t.powi(4)
    } else if year < 1941.0 {
        let t = year - 1920.0;
        21.20 + 0.84493 * t - 0.076100 * t.powi(2) + 0.0020936 * t.powi(3)
    } else if year < 1961.0 {
        let t = year - 1950.0;
        29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
    } else if year < 1986.0 {
        let t = year - 1975.0;
        45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
    } else if year < 2005.0 {
        let t = year - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t.powi(2)
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if year < 2050.0 {
        let t = year - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t.powi(2)
    } else {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - year)
    }
}

/// Apparent geocentric ecliptic longitude of the Sun, degrees in `[0, 360)`
///
/// `jde` is a Julian Ephemeris Day (Terrestrial Time).
pub fn apparent_solar_longitude(jde: f64) -> f64 {
    let tau = (jde - J2000) / 365_250.0;

    let l = (series(&L0, tau)
        + series(&L1, tau) * tau
        + series(&L2, tau) * tau.powi(2)
        + series(&L3, tau) * tau.powi(3)
        + series(&L4, tau) * tau.powi(4)
        + series(&L5, tau) * tau.powi(5))
        / 1e8;
    let r = (series(&R0, tau) + series(&R1, tau) * tau) / 1e8;

    // Heliocentric Earth → geocentric Sun
    let geometric = l.to_degrees() + 180.0;

    let t = tau * 10.0;
    let omega = (125.04452 - 1934.136261 * t).to_radians();
    let sun_mean = (280.4665 + 36000.7698 * t).to_radians();
    let moon_mean = (218.3165 + 481267.8813 * t).to_radians();
    let nutation_arcsec = -17.20 * omega.sin() - 1.32 * (2.0 * sun_mean).sin()
        - 0.23 * (2.0 * moon_mean).sin()
        + 0.21 * (2.0 * omega).sin();

    let fk5_arcsec = -0.09033;
    let aberration_arcsec = -20.4898 / r;

    normalize_degrees(geometric + (fk5_arcsec + nutation_arcsec + aberration_arcsec) / 3600.0)
}

/// Convert a China Standard Time instant to a Julian Ephemeris Day
fn cst_to_jde(moment: NaiveDateTime) -> f64 {
    let jd_ut = julian_day(moment) - CST_OFFSET_HOURS / 24.0;
    jd_ut + delta_t_seconds(moment.year() as f64) / SECONDS_PER_DAY
}

/// Apparent solar longitude at a China Standard Time instant
pub fn solar_longitude_at(moment: NaiveDateTime) -> f64 {
    apparent_solar_longitude(cst_to_jde(moment))
}

/// Instant (China Standard Time) at which the Sun reaches `target` degrees
///
/// **Algorithm:** Newton iteration on the Julian Ephemeris Day, using the mean
/// solar motion (360° per tropical year) as the derivative. Starts from
/// `near`, which must lie within half a year of the answer. Converges in
/// three or four steps.
pub fn instant_of_solar_longitude(target: f64, near: NaiveDateTime) -> NaiveDateTime {
    let mut jde = cst_to_jde(near);
    for _ in 0..30 {
        let diff = normalize_pm180(target - apparent_solar_longitude(jde));
        jde += diff / 360.0 * TROPICAL_YEAR;
        if diff.abs() < 1e-9 {
            break;
        }
    }

    let approx_year = 2000.0 + (jde - J2000) / 365.25;
    let jd_ut = jde - delta_t_seconds(approx_year) / SECONDS_PER_DAY;
    from_julian_day(jd_ut + CST_OFFSET_HOURS / 24.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn assert_close(actual: NaiveDateTime, expected: NaiveDateTime, tolerance_secs: i64) {
        let delta = (actual - expected).num_seconds().abs();
        assert!(
            delta <= tolerance_secs,
            "expected {} got {} (off by {}s)",
            expected,
            actual,
            delta
        );
    }

    #[test]
    fn test_julian_day_reference_points() {
        assert!((julian_day(at(2000, 1, 1, 12, 0, 0)) - 2_451_545.0).abs() < 1e-9);
        assert!((julian_day(at(1987, 6, 19, 12, 0, 0)) - 2_446_966.0).abs() < 1e-9);
        assert!((julian_day(at(1900, 1, 1, 0, 0, 0)) - 2_415_020.5).abs() < 1e-9);
    }

    #[test]
    fn test_julian_day_inverse() {
        let moment = at(1990, 6, 15, 14, 30, 0);
        assert_eq!(from_julian_day(julian_day(moment)), moment);
    }

    #[test]
    fn test_delta_t_plausible() {
        assert!((delta_t_seconds(2000.0) - 63.86).abs() < 0.01);
        let dt_1990 = delta_t_seconds(1990.0);
        assert!(dt_1990 > 56.0 && dt_1990 < 58.0, "ΔT(1990) = {}", dt_1990);
        assert!(delta_t_seconds(1900.0).abs() < 3.0);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_degrees(-30.0), 330.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(normalize_pm180(350.0), -10.0);
        assert_eq!(normalize_pm180(-190.0), 170.0);
    }

    #[test]
    fn test_vernal_equinox_longitude() {
        // March equinox 2024-03-20 03:06 UT (11:06 CST)
        let lon = solar_longitude_at(at(2024, 3, 20, 11, 6, 0));
        assert!(normalize_pm180(lon).abs() < 0.01, "longitude {}", lon);
    }

    #[test]
    fn test_published_solar_term_instants() {
        // Published instants, China Standard Time
        let cases = [
            (315.0, at(2024, 2, 4, 16, 26, 53)),
            (285.0, at(2024, 1, 6, 4, 49, 9)),
            (75.0, at(2024, 6, 5, 12, 9, 40)),
            (315.0, at(2000, 2, 4, 20, 40, 24)),
            (315.0, at(2023, 2, 4, 10, 42, 21)),
        ];
        for (target, expected) in cases {
            let found = instant_of_solar_longitude(target, expected - Duration::days(5));
            assert_close(found, expected, 60);
        }
    }
}
