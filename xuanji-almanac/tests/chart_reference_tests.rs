//! End-to-end chart properties over the public almanac API

use xuanji_almanac::flying_star::center_star;
use xuanji_almanac::{
    build_chart, BirthInput, CalendarType, Chart, ChartOptions, FlyingStarGrid, Gender, Location,
    ZiHourMode,
};

fn clock_options(mode: ZiHourMode) -> ChartOptions {
    ChartOptions {
        true_solar_time: false,
        zi_hour_mode: mode,
    }
}

fn input(date: &str, time: &str, gender: Gender) -> BirthInput {
    BirthInput {
        birth_date: date.to_string(),
        birth_time: time.to_string(),
        time_unknown: false,
        location: Location::default(),
        calendar_type: CalendarType::Solar,
        gender,
        is_leap_month: false,
    }
}

fn names(chart: &Chart) -> Vec<String> {
    chart.gan_zhi().iter().map(|g| g.to_string()).collect()
}

#[test]
fn test_reference_chart_from_json() {
    let input: BirthInput = serde_json::from_str(
        r#"{
            "birthDate": "1990-06-15",
            "birthTime": "14:30",
            "location": {"province": "北京市", "city": "北京", "district": "朝阳"},
            "gender": "male"
        }"#,
    )
    .unwrap();
    let chart = build_chart(&input, &ChartOptions::default()).unwrap();

    assert_eq!(names(&chart), vec!["庚午", "壬午", "辛亥", "乙未"]);
    assert!(chart.luck_start.forward);
    assert_eq!(chart.da_yun.len(), 8);
    assert_eq!(chart.da_yun[0].gan_zhi.to_string(), "癸未");
    assert_eq!(chart.da_yun[0].start_year, 1997);
    assert_eq!(chart.da_yun[0].start_age, 8);
}

#[test]
fn test_reference_chart_is_reproducible() {
    let birth = input("1990-06-15", "14:30", Gender::Male);
    let first = build_chart(&birth, &ChartOptions::default()).unwrap();
    let second = build_chart(&birth, &ChartOptions::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_earliest_supported_date() {
    let rejected = build_chart(&input("1900-01-30", "10:00", Gender::Male), &ChartOptions::default());
    assert!(rejected.is_err());

    let chart = build_chart(&input("1900-01-31", "10:00", Gender::Male), &ChartOptions::default()).unwrap();
    assert_eq!((chart.lunar_date.year, chart.lunar_date.month, chart.lunar_date.day), (1900, 1, 1));
    assert_eq!(chart.gan_zhi().len(), 4);
    assert_eq!(chart.element_counts.total(), 8);
}

#[test]
fn test_female_chart_runs_backward() {
    let mut female = input("1990-06-15", "14:30", Gender::Female);
    female.location = Location {
        province: "北京".to_string(),
        city: "北京".to_string(),
        district: String::new(),
    };
    let chart = build_chart(&female, &ChartOptions::default()).unwrap();

    assert!(!chart.luck_start.forward);
    assert_eq!(chart.da_yun[0].gan_zhi.to_string(), "辛巳");
    assert_eq!(chart.da_yun[1].gan_zhi.to_string(), "庚辰");
}

#[test]
fn test_year_and_month_change_at_li_chun() {
    // 立春 2024 falls at 16:27 China Standard Time on 4 February
    let before = build_chart(
        &input("2024-02-04", "16:00", Gender::Male),
        &clock_options(ZiHourMode::SameDay),
    )
    .unwrap();
    let after = build_chart(
        &input("2024-02-04", "17:00", Gender::Male),
        &clock_options(ZiHourMode::SameDay),
    )
    .unwrap();

    assert_eq!(before.pillars.year.gan_zhi.to_string(), "癸卯");
    assert_eq!(before.pillars.month.gan_zhi.to_string(), "乙丑");
    assert_eq!(after.pillars.year.gan_zhi.to_string(), "甲辰");
    assert_eq!(after.pillars.month.gan_zhi.to_string(), "丙寅");
    assert_eq!(before.pillars.day.gan_zhi, after.pillars.day.gan_zhi);
}

#[test]
fn test_late_zi_hour_modes() {
    let birth = input("2024-02-10", "23:30", Gender::Male);

    let same_day = build_chart(&birth, &clock_options(ZiHourMode::SameDay)).unwrap();
    assert_eq!(same_day.pillars.day.gan_zhi.to_string(), "甲辰");
    assert_eq!(same_day.pillars.time.as_ref().unwrap().gan_zhi.to_string(), "丙子");

    let next_day = build_chart(&birth, &clock_options(ZiHourMode::NextDay)).unwrap();
    assert_eq!(next_day.pillars.day.gan_zhi.to_string(), "乙巳");
    assert_eq!(next_day.pillars.time.as_ref().unwrap().gan_zhi.to_string(), "丙子");
}

#[test]
fn test_tally_is_two_per_known_pillar() {
    for (date, time, unknown) in [
        ("1900-03-01", "00:10", false),
        ("1949-10-01", "15:00", false),
        ("1984-02-04", "23:59", false),
        ("2000-01-01", "", true),
        ("2098-06-30", "12:00", false),
    ] {
        let mut birth = input(date, time, Gender::Female);
        birth.time_unknown = unknown;
        let chart = build_chart(&birth, &ChartOptions::default()).unwrap();
        let known = chart.gan_zhi().len() as u32;
        assert_eq!(known, if unknown { 3 } else { 4 }, "{}", date);
        assert_eq!(chart.element_counts.total(), known * 2, "{}", date);
    }
}

#[test]
fn test_luck_cycle_years_increase() {
    let chart = build_chart(&input("1975-11-20", "06:45", Gender::Male), &ChartOptions::default()).unwrap();
    let mut previous_year = 1975;
    for decade in &chart.da_yun {
        assert_eq!(decade.end_year, decade.start_year + 9);
        assert_eq!(decade.liu_nian.len(), 10);
        for year in &decade.liu_nian {
            assert!(year.year > previous_year);
            assert_eq!(year.age, year.year - 1975 + 1);
            previous_year = year.year;
        }
    }
}

#[test]
fn test_flying_star_grid_always_permutation() {
    for year in 1900..=2100 {
        let grid = FlyingStarGrid::for_year(year);
        assert!(grid.is_permutation(), "{}", year);
        assert!((1..=9).contains(&center_star(year)));
    }
    assert_eq!(center_star(2018), 9);
    assert_eq!(center_star(2026), 1);
}
