//! Deterministic BaZi chart assembly
//!
//! Builds the complete chart skeleton from a birth input: four annotated
//! pillars, day master, Five-Element tally, lunar date and luck cycle.
//! Interpretive fields (life stage, spirit tags, strength, favorable elements,
//! narrative) start empty and are only ever filled by the narrative merge.

use crate::ganzhi::{Branch, Element, GanZhi, Stem, TenGod};
use crate::input::{BirthInput, CalendarType, Gender, Location};
use crate::luck::{luck_cycle, DaYun, StartOffset};
use crate::lunar::LunarDate;
use crate::pillars::{four_pillars, ZiHourMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use xuanji_common::Result;

/// Stem annotated with its element and Ten God relative to the day master
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StemInfo {
    #[serde(rename = "char")]
    pub stem: Stem,
    pub element: Element,
    pub ten_god: TenGod,
}

impl StemInfo {
    pub fn relative_to(stem: Stem, day_master: Stem) -> StemInfo {
        StemInfo {
            stem,
            element: stem.element(),
            ten_god: TenGod::between(day_master, stem),
        }
    }
}

/// Branch with its element only (luck-cycle entries)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchBrief {
    #[serde(rename = "char")]
    pub branch: Branch,
    pub element: Element,
}

impl From<Branch> for BranchBrief {
    fn from(branch: Branch) -> Self {
        BranchBrief {
            branch,
            element: branch.element(),
        }
    }
}

/// Branch with its element and annotated hidden stems
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    #[serde(rename = "char")]
    pub branch: Branch,
    pub element: Element,
    pub hidden: Vec<StemInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pillar {
    pub gan_zhi: GanZhi,
    pub gan: StemInfo,
    pub zhi: BranchInfo,
    pub na_yin: String,
    /// 十二长生 stage, supplied by the narrative
    pub life_stage: String,
    /// 神煞 tags, supplied by the narrative
    pub shen_sha: Vec<String>,
    pub kong_wang: bool,
}

impl Pillar {
    /// Annotate a stem-branch pair against the day pillar
    pub fn annotate(gan_zhi: GanZhi, day: GanZhi) -> Pillar {
        let day_master = day.stem;
        let void = day.void_branches();

        Pillar {
            gan_zhi,
            gan: StemInfo::relative_to(gan_zhi.stem, day_master),
            zhi: BranchInfo {
                branch: gan_zhi.branch,
                element: gan_zhi.branch.element(),
                hidden: gan_zhi
                    .branch
                    .hidden_stems()
                    .iter()
                    .map(|&s| StemInfo::relative_to(s, day_master))
                    .collect(),
            },
            na_yin: gan_zhi.nayin().to_string(),
            life_stage: String::new(),
            shen_sha: Vec::new(),
            kong_wang: void.contains(&gan_zhi.branch),
        }
    }
}

/// The four pillar positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PillarSlot {
    Year,
    Month,
    Day,
    Time,
}

impl PillarSlot {
    pub const ALL: [PillarSlot; 4] = [
        PillarSlot::Year,
        PillarSlot::Month,
        PillarSlot::Day,
        PillarSlot::Time,
    ];

    /// JSON key of the slot (`year`, `month`, `day`, `time`)
    pub fn key(self) -> &'static str {
        match self {
            PillarSlot::Year => "year",
            PillarSlot::Month => "month",
            PillarSlot::Day => "day",
            PillarSlot::Time => "time",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PillarSlot::Year => "年柱",
            PillarSlot::Month => "月柱",
            PillarSlot::Day => "日柱",
            PillarSlot::Time => "时柱",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pillars {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub time: Option<Pillar>,
}

impl Pillars {
    pub fn get(&self, slot: PillarSlot) -> Option<&Pillar> {
        match slot {
            PillarSlot::Year => Some(&self.year),
            PillarSlot::Month => Some(&self.month),
            PillarSlot::Day => Some(&self.day),
            PillarSlot::Time => self.time.as_ref(),
        }
    }

    pub fn get_mut(&mut self, slot: PillarSlot) -> Option<&mut Pillar> {
        match slot {
            PillarSlot::Year => Some(&mut self.year),
            PillarSlot::Month => Some(&mut self.month),
            PillarSlot::Day => Some(&mut self.day),
            PillarSlot::Time => self.time.as_mut(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMaster {
    #[serde(rename = "char")]
    pub stem: Stem,
    pub element: Element,
    /// Strength label, supplied by the narrative
    pub strength: String,
}

/// Count of each element across the known pillars' stems and branches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementTally {
    #[serde(rename = "金")]
    pub metal: u32,
    #[serde(rename = "木")]
    pub wood: u32,
    #[serde(rename = "水")]
    pub water: u32,
    #[serde(rename = "火")]
    pub fire: u32,
    #[serde(rename = "土")]
    pub earth: u32,
}

/// Fixed order used for display and tie-breaking
pub const TALLY_ORDER: [Element; 5] = [
    Element::Metal,
    Element::Wood,
    Element::Water,
    Element::Fire,
    Element::Earth,
];

impl ElementTally {
    /// Tally the stem and branch of every given pillar
    pub fn count(pillars: &[GanZhi]) -> ElementTally {
        let mut tally = ElementTally::default();
        for gz in pillars {
            tally.add(gz.stem.element());
            tally.add(gz.branch.element());
        }
        tally
    }

    fn slot(&mut self, element: Element) -> &mut u32 {
        match element {
            Element::Metal => &mut self.metal,
            Element::Wood => &mut self.wood,
            Element::Water => &mut self.water,
            Element::Fire => &mut self.fire,
            Element::Earth => &mut self.earth,
        }
    }

    pub fn add(&mut self, element: Element) {
        *self.slot(element) += 1;
    }

    pub fn get(&self, element: Element) -> u32 {
        match element {
            Element::Metal => self.metal,
            Element::Wood => self.wood,
            Element::Water => self.water,
            Element::Fire => self.fire,
            Element::Earth => self.earth,
        }
    }

    pub fn total(&self) -> u32 {
        TALLY_ORDER.iter().map(|&e| self.get(e)).sum()
    }

    /// Most frequent element; ties resolve in 金木水火土 order
    pub fn strongest(&self) -> Element {
        TALLY_ORDER
            .iter()
            .copied()
            .fold(TALLY_ORDER[0], |best, e| {
                if self.get(e) > self.get(best) {
                    e
                } else {
                    best
                }
            })
    }

    /// Least frequent element; ties resolve in 金木水火土 order
    pub fn weakest(&self) -> Element {
        TALLY_ORDER
            .iter()
            .copied()
            .fold(TALLY_ORDER[0], |best, e| {
                if self.get(e) < self.get(best) {
                    e
                } else {
                    best
                }
            })
    }
}

/// `金:2, 木:1, 水:2, 火:2, 土:1`
impl fmt::Display for ElementTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = TALLY_ORDER
            .iter()
            .map(|&e| format!("{}:{}", e, self.get(e)))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthAnalysis {
    /// 0-100; `None` until supplied
    pub score: Option<u32>,
    pub level: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiveElementsAnalysis {
    pub personality: String,
    pub health: String,
}

/// Summary of the luck-cycle timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LuckStart {
    pub forward: bool,
    pub offset: StartOffset,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub gender: Gender,
    pub calendar_type: CalendarType,
    /// `YYYY-MM-DD`
    pub solar_date: String,
    pub lunar_date: LunarDate,
    pub lunar_date_string: String,
    /// `HH:mm`, or `Unknown`
    pub solar_time: String,
    /// Corrected `HH:mm` when true solar time was applied
    pub true_solar_time: Option<String>,
    pub location: Location,
    pub pillars: Pillars,
    pub day_master: DayMaster,
    pub element_counts: ElementTally,
    pub luck_start: LuckStart,
    pub da_yun: Vec<DaYun>,
    pub strength_analysis: StrengthAnalysis,
    pub favorable_elements: Vec<Element>,
    pub five_elements_analysis: Option<FiveElementsAnalysis>,
}

impl Chart {
    /// Stem-branch of each known pillar, year first
    pub fn gan_zhi(&self) -> Vec<GanZhi> {
        PillarSlot::ALL
            .iter()
            .filter_map(|&slot| self.pillars.get(slot))
            .map(|p| p.gan_zhi)
            .collect()
    }
}

/// Chart computation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub true_solar_time: bool,
    pub zi_hour_mode: ZiHourMode,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            true_solar_time: true,
            zi_hour_mode: ZiHourMode::SameDay,
        }
    }
}

/// Build the deterministic chart for a birth input
///
/// **Errors:** only malformed or out-of-range input (`Error::InvalidInput`).
pub fn build_chart(input: &BirthInput, options: &ChartOptions) -> Result<Chart> {
    let moment = input.normalize(options.true_solar_time)?;
    let raw = four_pillars(moment.pillar_moment, moment.time_known(), options.zi_hour_mode);

    let pillars = Pillars {
        year: Pillar::annotate(raw.year, raw.day),
        month: Pillar::annotate(raw.month, raw.day),
        day: Pillar::annotate(raw.day, raw.day),
        time: raw.hour.map(|h| Pillar::annotate(h, raw.day)),
    };

    let element_counts = ElementTally::count(&raw.known());
    let luck = luck_cycle(moment.pillar_moment, &raw, input.gender);
    let lunar_date = LunarDate::from_solar(moment.solar_date)?;

    debug!(
        pillars = ?raw.known().iter().map(|g| g.to_string()).collect::<Vec<_>>(),
        tally = %element_counts,
        "Built chart skeleton"
    );

    Ok(Chart {
        gender: input.gender,
        calendar_type: input.calendar_type,
        solar_date: moment.solar_date.format("%Y-%m-%d").to_string(),
        lunar_date,
        lunar_date_string: lunar_date.to_string(),
        solar_time: moment
            .clock_time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
        true_solar_time: moment
            .true_solar_time
            .map(|t| t.format("%H:%M").to_string()),
        location: input.location.clone(),
        day_master: DayMaster {
            stem: raw.day.stem,
            element: raw.day.stem.element(),
            strength: String::new(),
        },
        pillars,
        element_counts,
        luck_start: LuckStart {
            forward: luck.forward,
            offset: luck.start_offset,
            start_date: luck.start_date,
        },
        da_yun: luck.decades,
        strength_analysis: StrengthAnalysis::default(),
        favorable_elements: Vec::new(),
        five_elements_analysis: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beijing_input(time: &str, unknown: bool) -> BirthInput {
        BirthInput {
            birth_date: "1990-06-15".to_string(),
            birth_time: time.to_string(),
            time_unknown: unknown,
            location: Location {
                province: "北京".to_string(),
                city: "北京".to_string(),
                district: "朝阳".to_string(),
            },
            calendar_type: CalendarType::Solar,
            gender: Gender::Male,
            is_leap_month: false,
        }
    }

    #[test]
    fn test_reference_chart_pillars() {
        let chart = build_chart(&beijing_input("14:30", false), &ChartOptions::default()).unwrap();
        let names: Vec<String> = chart.gan_zhi().iter().map(|g| g.to_string()).collect();
        assert_eq!(names, vec!["庚午", "壬午", "辛亥", "乙未"]);
        assert_eq!(chart.day_master.stem, Stem::Xin);
        assert_eq!(chart.day_master.element, Element::Metal);
        assert_eq!(chart.solar_time, "14:30");
        assert_eq!(chart.true_solar_time.as_deref(), Some("14:15"));
        assert_eq!(chart.lunar_date_string, "一九九〇年五月廿三");
    }

    #[test]
    fn test_reference_chart_tally_and_nayin() {
        let chart = build_chart(&beijing_input("14:30", false), &ChartOptions::default()).unwrap();
        let tally = chart.element_counts;
        assert_eq!((tally.metal, tally.fire, tally.water, tally.wood, tally.earth), (2, 2, 2, 1, 1));
        assert_eq!(tally.total(), 8);
        assert_eq!(tally.strongest(), Element::Metal);
        assert_eq!(tally.weakest(), Element::Wood);

        assert_eq!(chart.pillars.year.na_yin, "路旁土");
        assert_eq!(chart.pillars.month.na_yin, "杨柳木");
        assert_eq!(chart.pillars.day.na_yin, "钗钏金");
        assert_eq!(chart.pillars.time.as_ref().unwrap().na_yin, "沙中金");
    }

    #[test]
    fn test_annotations_empty_before_merge() {
        let chart = build_chart(&beijing_input("14:30", false), &ChartOptions::default()).unwrap();
        for slot in PillarSlot::ALL {
            let pillar = chart.pillars.get(slot).unwrap();
            assert!(pillar.life_stage.is_empty());
            assert!(pillar.shen_sha.is_empty());
            assert!(!pillar.kong_wang, "{} should not be void", slot.key());
        }
        assert!(chart.day_master.strength.is_empty());
        assert!(chart.favorable_elements.is_empty());
        assert_eq!(chart.strength_analysis.score, None);
        assert!(chart.five_elements_analysis.is_none());
    }

    #[test]
    fn test_unknown_time_omits_hour_pillar() {
        let chart = build_chart(&beijing_input("", true), &ChartOptions::default()).unwrap();
        assert!(chart.pillars.time.is_none());
        assert_eq!(chart.element_counts.total(), 6);
        assert_eq!(chart.solar_time, "Unknown");
        assert_eq!(chart.true_solar_time, None);
    }

    #[test]
    fn test_hidden_stems_and_ten_gods() {
        let chart = build_chart(&beijing_input("14:30", false), &ChartOptions::default()).unwrap();
        // 午 hides 丁 己; against 辛 they are 七杀 and 偏印
        let hidden = &chart.pillars.year.zhi.hidden;
        assert_eq!(hidden.len(), 2);
        assert_eq!(hidden[0].ten_god, TenGod::SevenKillings);
        assert_eq!(hidden[1].ten_god, TenGod::IndirectResource);
        assert_eq!(chart.pillars.day.gan.ten_god, TenGod::Companion);
        assert_eq!(chart.pillars.month.gan.ten_god, TenGod::HurtingOfficer);
    }

    #[test]
    fn test_kong_wang_marks_void_branch() {
        // Day 辛亥 sits in the 甲辰 xun: 寅 and 卯 are void
        let day: GanZhi = "辛亥".parse().unwrap();
        assert!(Pillar::annotate("丁卯".parse().unwrap(), day).kong_wang);
        assert!(!Pillar::annotate("丁未".parse().unwrap(), day).kong_wang);
    }

    #[test]
    fn test_tally_ties_follow_fixed_order() {
        let tally = ElementTally {
            metal: 1,
            wood: 2,
            water: 2,
            fire: 1,
            earth: 2,
        };
        assert_eq!(tally.strongest(), Element::Wood);
        assert_eq!(tally.weakest(), Element::Metal);
        assert_eq!(tally.to_string(), "金:1, 木:2, 水:2, 火:1, 土:2");
    }

    #[test]
    fn test_chart_json_field_names() {
        let chart = build_chart(&beijing_input("14:30", false), &ChartOptions::default()).unwrap();
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["pillars"]["year"]["gan"]["char"], "庚");
        assert_eq!(json["pillars"]["year"]["gan"]["tenGod"], "劫财");
        assert_eq!(json["pillars"]["day"]["naYin"], "钗钏金");
        assert_eq!(json["elementCounts"]["金"], 2);
        assert_eq!(json["dayMaster"]["char"], "辛");
        assert_eq!(json["daYun"][0]["ganZhi"], "癸未");
        assert_eq!(json["daYun"][0]["liuNian"][0]["ganZhi"], "丁丑");
        assert_eq!(json["solarDate"], "1990-06-15");
        assert!(json["fiveElementsAnalysis"].is_null());
    }

    #[test]
    fn test_lunar_calendar_input_matches_solar() {
        let mut lunar = beijing_input("14:30", false);
        lunar.calendar_type = CalendarType::Lunar;
        lunar.birth_date = "1990-05-23".to_string();
        let from_lunar = build_chart(&lunar, &ChartOptions::default()).unwrap();
        let from_solar = build_chart(&beijing_input("14:30", false), &ChartOptions::default()).unwrap();
        assert_eq!(from_lunar.gan_zhi(), from_solar.gan_zhi());
        assert_eq!(from_lunar.solar_date, "1990-06-15");
    }

    #[test]
    fn test_malformed_date_rejected() {
        let mut bad = beijing_input("14:30", false);
        bad.birth_date = "1990-13-01".to_string();
        assert!(build_chart(&bad, &ChartOptions::default()).is_err());
    }
}
