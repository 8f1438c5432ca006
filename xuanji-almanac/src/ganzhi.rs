//! Heavenly stems, earthly branches, Five Elements and Ten Gods
//!
//! Fixed lookup tables for the sexagenary cycle:
//! - Stem/branch → element (22 entries)
//! - Stem pair → Ten God (closed-form polarity/offset rule)
//! - Branch → hidden stems (ordered by dominance)
//! - Stem-branch pair → NaYin (sound element)
//! - Xun (ten-day cycle) → void branches
//!
//! Stem indices: 甲(0) 乙(1) 丙(2) 丁(3) 戊(4) 己(5) 庚(6) 辛(7) 壬(8) 癸(9)
//! Branch indices: 子(0) 丑(1) 寅(2) 卯(3) 辰(4) 巳(5) 午(6) 未(7) 申(8) 酉(9) 戌(10) 亥(11)

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Five Elements, in generating-cycle order
///
/// The discriminant is the element index used by the Ten-God rule:
/// Wood=0, Fire=1, Earth=2, Metal=3, Water=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    #[serde(rename = "木")]
    Wood = 0,
    #[serde(rename = "火")]
    Fire = 1,
    #[serde(rename = "土")]
    Earth = 2,
    #[serde(rename = "金")]
    Metal = 3,
    #[serde(rename = "水")]
    Water = 4,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Element {
        Self::ALL[index % 5]
    }

    /// Chinese character for the element (木火土金水)
    pub fn symbol(self) -> char {
        match self {
            Element::Wood => '木',
            Element::Fire => '火',
            Element::Earth => '土',
            Element::Metal => '金',
            Element::Water => '水',
        }
    }

    /// Parse an element from its Chinese character or English name
    ///
    /// Case-insensitive for English names. Unknown input returns `None`.
    pub fn from_name(name: &str) -> Option<Element> {
        let trimmed = name.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::ALL.iter().copied().find(|e| e.symbol() == c);
        }
        match trimmed.to_lowercase().as_str() {
            "wood" => Some(Element::Wood),
            "fire" => Some(Element::Fire),
            "earth" => Some(Element::Earth),
            "metal" => Some(Element::Metal),
            "water" => Some(Element::Water),
            _ => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The ten heavenly stems (天干)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stem {
    #[serde(rename = "甲")]
    Jia,
    #[serde(rename = "乙")]
    Yi,
    #[serde(rename = "丙")]
    Bing,
    #[serde(rename = "丁")]
    Ding,
    #[serde(rename = "戊")]
    Wu,
    #[serde(rename = "己")]
    Ji,
    #[serde(rename = "庚")]
    Geng,
    #[serde(rename = "辛")]
    Xin,
    #[serde(rename = "壬")]
    Ren,
    #[serde(rename = "癸")]
    Gui,
}

const STEM_CHARS: [char; 10] = ['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];

impl Stem {
    pub const ALL: [Stem; 10] = [
        Stem::Jia,
        Stem::Yi,
        Stem::Bing,
        Stem::Ding,
        Stem::Wu,
        Stem::Ji,
        Stem::Geng,
        Stem::Xin,
        Stem::Ren,
        Stem::Gui,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Stem {
        Self::ALL[index % 10]
    }

    pub fn from_char(c: char) -> Option<Stem> {
        STEM_CHARS.iter().position(|&s| s == c).map(Self::from_index)
    }

    pub fn symbol(self) -> char {
        STEM_CHARS[self.index()]
    }

    /// Stems come in yang/yin pairs sharing one element
    pub fn element(self) -> Element {
        Element::from_index(self.index() / 2)
    }

    /// Even positions in the 10-stem cycle are yang
    pub fn is_yang(self) -> bool {
        self.index() % 2 == 0
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The twelve earthly branches (地支)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Branch {
    #[serde(rename = "子")]
    Zi,
    #[serde(rename = "丑")]
    Chou,
    #[serde(rename = "寅")]
    Yin,
    #[serde(rename = "卯")]
    Mao,
    #[serde(rename = "辰")]
    Chen,
    #[serde(rename = "巳")]
    Si,
    #[serde(rename = "午")]
    Wu,
    #[serde(rename = "未")]
    Wei,
    #[serde(rename = "申")]
    Shen,
    #[serde(rename = "酉")]
    You,
    #[serde(rename = "戌")]
    Xu,
    #[serde(rename = "亥")]
    Hai,
}

const BRANCH_CHARS: [char; 12] = [
    '子', '丑', '寅', '卯', '辰', '巳', '午', '未', '申', '酉', '戌', '亥',
];

const BRANCH_ELEMENTS: [Element; 12] = [
    Element::Water, // 子
    Element::Earth, // 丑
    Element::Wood,  // 寅
    Element::Wood,  // 卯
    Element::Earth, // 辰
    Element::Fire,  // 巳
    Element::Fire,  // 午
    Element::Earth, // 未
    Element::Metal, // 申
    Element::Metal, // 酉
    Element::Earth, // 戌
    Element::Water, // 亥
];

/// Hidden stems (藏干) per branch, main qi first
const HIDDEN_STEMS: [&[Stem]; 12] = [
    &[Stem::Gui],                     // 子
    &[Stem::Ji, Stem::Gui, Stem::Xin], // 丑
    &[Stem::Jia, Stem::Bing, Stem::Wu], // 寅
    &[Stem::Yi],                      // 卯
    &[Stem::Wu, Stem::Yi, Stem::Gui], // 辰
    &[Stem::Bing, Stem::Geng, Stem::Wu], // 巳
    &[Stem::Ding, Stem::Ji],          // 午
    &[Stem::Ji, Stem::Ding, Stem::Yi], // 未
    &[Stem::Geng, Stem::Ren, Stem::Wu], // 申
    &[Stem::Xin],                     // 酉
    &[Stem::Wu, Stem::Xin, Stem::Ding], // 戌
    &[Stem::Ren, Stem::Jia],          // 亥
];

impl Branch {
    pub const ALL: [Branch; 12] = [
        Branch::Zi,
        Branch::Chou,
        Branch::Yin,
        Branch::Mao,
        Branch::Chen,
        Branch::Si,
        Branch::Wu,
        Branch::Wei,
        Branch::Shen,
        Branch::You,
        Branch::Xu,
        Branch::Hai,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Branch {
        Self::ALL[index % 12]
    }

    pub fn from_char(c: char) -> Option<Branch> {
        BRANCH_CHARS.iter().position(|&b| b == c).map(Self::from_index)
    }

    pub fn symbol(self) -> char {
        BRANCH_CHARS[self.index()]
    }

    pub fn element(self) -> Element {
        BRANCH_ELEMENTS[self.index()]
    }

    /// Hidden stems ordered by dominance (cardinal branches hold one)
    pub fn hidden_stems(self) -> &'static [Stem] {
        HIDDEN_STEMS[self.index()]
    }

    /// Branch governing a clock hour; 23:00 already belongs to 子
    pub fn from_hour(hour: u32) -> Branch {
        Self::from_index(((hour as usize) + 1) / 2)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Element of any stem or branch character
///
/// Unknown characters yield `None`, never an error.
pub fn element_of_char(c: char) -> Option<Element> {
    Stem::from_char(c)
        .map(Stem::element)
        .or_else(|| Branch::from_char(c).map(Branch::element))
}

/// Ten Gods (十神): relationship of a stem to the day master
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenGod {
    #[serde(rename = "比肩")]
    Companion,
    #[serde(rename = "劫财")]
    RobWealth,
    #[serde(rename = "食神")]
    EatingGod,
    #[serde(rename = "伤官")]
    HurtingOfficer,
    #[serde(rename = "偏财")]
    IndirectWealth,
    #[serde(rename = "正财")]
    DirectWealth,
    #[serde(rename = "七杀")]
    SevenKillings,
    #[serde(rename = "正官")]
    DirectOfficer,
    #[serde(rename = "偏印")]
    IndirectResource,
    #[serde(rename = "正印")]
    DirectResource,
}

impl TenGod {
    /// Relationship of `other` to `day_master`
    ///
    /// **Algorithm:**
    /// 1. `diff = (other element − day element + 5) mod 5`
    /// 2. diff selects the pair: 0 peers, 1 output, 2 wealth, 3 power, 4 resource
    /// 3. equal polarity picks the first label of the pair, opposite the second
    pub fn between(day_master: Stem, other: Stem) -> TenGod {
        let diff = (other.element().index() + 5 - day_master.element().index()) % 5;
        let same_polarity = day_master.is_yang() == other.is_yang();

        match (diff, same_polarity) {
            (0, true) => TenGod::Companion,
            (0, false) => TenGod::RobWealth,
            (1, true) => TenGod::EatingGod,
            (1, false) => TenGod::HurtingOfficer,
            (2, true) => TenGod::IndirectWealth,
            (2, false) => TenGod::DirectWealth,
            (3, true) => TenGod::SevenKillings,
            (3, false) => TenGod::DirectOfficer,
            (4, true) => TenGod::IndirectResource,
            _ => TenGod::DirectResource,
        }
    }

    /// Chinese label (比肩, 劫财, …)
    pub fn label(self) -> &'static str {
        match self {
            TenGod::Companion => "比肩",
            TenGod::RobWealth => "劫财",
            TenGod::EatingGod => "食神",
            TenGod::HurtingOfficer => "伤官",
            TenGod::IndirectWealth => "偏财",
            TenGod::DirectWealth => "正财",
            TenGod::SevenKillings => "七杀",
            TenGod::DirectOfficer => "正官",
            TenGod::IndirectResource => "偏印",
            TenGod::DirectResource => "正印",
        }
    }
}

impl fmt::Display for TenGod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ten God for two stem characters; `None` if either is not a stem
pub fn ten_god_of_chars(day_master: char, other: char) -> Option<TenGod> {
    Some(TenGod::between(
        Stem::from_char(day_master)?,
        Stem::from_char(other)?,
    ))
}

/// NaYin names, one per consecutive pair of the 60-term cycle
const NAYIN: [&str; 30] = [
    "海中金", "炉中火", "大林木", "路旁土", "剑锋金", "山头火",
    "涧下水", "城头土", "白蜡金", "杨柳木", "泉中水", "屋上土",
    "霹雳火", "松柏木", "长流水", "沙中金", "山下火", "平地木",
    "壁上土", "金箔金", "覆灯火", "天河水", "大驿土", "钗钏金",
    "桑柘木", "大溪水", "沙中土", "天上火", "石榴木", "大海水",
];

/// A stem-branch pair from the 60-term sexagenary cycle
///
/// Serialized as its two-character form, e.g. `"庚午"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GanZhi {
    pub stem: Stem,
    pub branch: Branch,
}

impl GanZhi {
    /// Build a pair; `None` when the polarities differ (e.g. 甲丑 is not in the cycle)
    pub fn new(stem: Stem, branch: Branch) -> Option<GanZhi> {
        (stem.index() % 2 == branch.index() % 2).then_some(GanZhi { stem, branch })
    }

    /// Pair at a cycle position (甲子 = 0); wraps modulo 60
    pub fn from_index(index: i64) -> GanZhi {
        let i = index.rem_euclid(60) as usize;
        GanZhi {
            stem: Stem::from_index(i),
            branch: Branch::from_index(i),
        }
    }

    /// Position in the 60-term cycle (甲子 = 0, 癸亥 = 59)
    pub fn index(self) -> usize {
        (6 * self.stem.index() as i64 - 5 * self.branch.index() as i64).rem_euclid(60) as usize
    }

    /// Pair `steps` positions further along the cycle (negative walks backwards)
    pub fn offset(self, steps: i64) -> GanZhi {
        Self::from_index(self.index() as i64 + steps)
    }

    /// Stem-branch of a Gregorian year number (year pillar before the 立春 adjustment)
    pub fn of_year(year: i32) -> GanZhi {
        Self::from_index(year as i64 - 4)
    }

    pub fn nayin(self) -> &'static str {
        NAYIN[self.index() / 2]
    }

    /// The two void (空亡) branches of this pair's xun
    ///
    /// Each xun pairs ten stems with ten branches, leaving two branches
    /// without a stem.
    pub fn void_branches(self) -> [Branch; 2] {
        let xun_start = self.index() - self.stem.index();
        [
            Branch::from_index(xun_start + 10),
            Branch::from_index(xun_start + 11),
        ]
    }
}

impl fmt::Display for GanZhi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

impl FromStr for GanZhi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(g), Some(z), None) => {
                let stem = Stem::from_char(g).ok_or_else(|| format!("'{}' is not a stem", g))?;
                let branch =
                    Branch::from_char(z).ok_or_else(|| format!("'{}' is not a branch", z))?;
                GanZhi::new(stem, branch)
                    .ok_or_else(|| format!("{}{} is not in the sexagenary cycle", g, z))
            }
            _ => Err(format!("'{}' is not a two-character stem-branch pair", s)),
        }
    }
}

impl Serialize for GanZhi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GanZhi {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference table: rows are the day master 甲..癸, columns the other stem 甲..癸
    const TEN_GOD_TABLE: [[&str; 10]; 10] = [
        ["比肩", "劫财", "食神", "伤官", "偏财", "正财", "七杀", "正官", "偏印", "正印"],
        ["劫财", "比肩", "伤官", "食神", "正财", "偏财", "正官", "七杀", "正印", "偏印"],
        ["偏印", "正印", "比肩", "劫财", "食神", "伤官", "偏财", "正财", "七杀", "正官"],
        ["正印", "偏印", "劫财", "比肩", "伤官", "食神", "正财", "偏财", "正官", "七杀"],
        ["七杀", "正官", "偏印", "正印", "比肩", "劫财", "食神", "伤官", "偏财", "正财"],
        ["正官", "七杀", "正印", "偏印", "劫财", "比肩", "伤官", "食神", "正财", "偏财"],
        ["偏财", "正财", "七杀", "正官", "偏印", "正印", "比肩", "劫财", "食神", "伤官"],
        ["正财", "偏财", "正官", "七杀", "正印", "偏印", "劫财", "比肩", "伤官", "食神"],
        ["食神", "伤官", "偏财", "正财", "七杀", "正官", "偏印", "正印", "比肩", "劫财"],
        ["伤官", "食神", "正财", "偏财", "正官", "七杀", "正印", "偏印", "劫财", "比肩"],
    ];

    #[test]
    fn test_ten_god_all_pairs_match_reference() {
        for (d, row) in TEN_GOD_TABLE.iter().enumerate() {
            for (o, expected) in row.iter().enumerate() {
                let got = TenGod::between(Stem::from_index(d), Stem::from_index(o));
                assert_eq!(
                    got.label(),
                    *expected,
                    "day {} other {}",
                    Stem::from_index(d),
                    Stem::from_index(o)
                );
            }
        }
    }

    #[test]
    fn test_ten_god_depends_only_on_diff_and_polarity() {
        for d in Stem::ALL {
            for o in Stem::ALL {
                for d2 in Stem::ALL {
                    for o2 in Stem::ALL {
                        let diff = |a: Stem, b: Stem| (b.element().index() + 5 - a.element().index()) % 5;
                        let same = |a: Stem, b: Stem| a.is_yang() == b.is_yang();
                        if diff(d, o) == diff(d2, o2) && same(d, o) == same(d2, o2) {
                            assert_eq!(TenGod::between(d, o), TenGod::between(d2, o2));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_ten_god_of_chars_unknown() {
        assert_eq!(ten_god_of_chars('甲', '丙'), Some(TenGod::EatingGod));
        assert_eq!(ten_god_of_chars('甲', '子'), None);
        assert_eq!(ten_god_of_chars('x', '甲'), None);
    }

    #[test]
    fn test_element_table() {
        let expected = [
            ('甲', Element::Wood), ('乙', Element::Wood), ('丙', Element::Fire),
            ('丁', Element::Fire), ('戊', Element::Earth), ('己', Element::Earth),
            ('庚', Element::Metal), ('辛', Element::Metal), ('壬', Element::Water),
            ('癸', Element::Water), ('子', Element::Water), ('丑', Element::Earth),
            ('寅', Element::Wood), ('卯', Element::Wood), ('辰', Element::Earth),
            ('巳', Element::Fire), ('午', Element::Fire), ('未', Element::Earth),
            ('申', Element::Metal), ('酉', Element::Metal), ('戌', Element::Earth),
            ('亥', Element::Water),
        ];
        for (c, element) in expected {
            assert_eq!(element_of_char(c), Some(element), "char {}", c);
        }
        assert_eq!(element_of_char('木'), None);
        assert_eq!(element_of_char('a'), None);
    }

    #[test]
    fn test_hidden_stems_non_empty_and_signature_branches() {
        for branch in Branch::ALL {
            assert!(!branch.hidden_stems().is_empty(), "{} has no hidden stems", branch);
        }
        assert_eq!(Branch::Yin.hidden_stems()[0], Stem::Jia);
        for branch in [Branch::Zi, Branch::Yin, Branch::Mao, Branch::Wu, Branch::Shen, Branch::You, Branch::Hai] {
            assert_eq!(
                branch.hidden_stems()[0].element(),
                branch.element(),
                "main qi of {} should share its element",
                branch
            );
        }
        for branch in [Branch::Zi, Branch::Mao, Branch::You] {
            assert_eq!(branch.hidden_stems().len(), 1);
        }
    }

    #[test]
    fn test_ganzhi_index_round_trip() {
        for i in 0..60 {
            assert_eq!(GanZhi::from_index(i).index(), i as usize);
        }
        assert_eq!(GanZhi::from_index(18).to_string(), "壬午");
        assert_eq!(GanZhi::of_year(1990).to_string(), "庚午");
        assert_eq!(GanZhi::of_year(2024).to_string(), "甲辰");
    }

    #[test]
    fn test_ganzhi_parse() {
        assert_eq!("辛亥".parse::<GanZhi>().unwrap().index(), 47);
        assert!("甲丑".parse::<GanZhi>().is_err());
        assert!("甲".parse::<GanZhi>().is_err());
        assert!("甲子丑".parse::<GanZhi>().is_err());
    }

    #[test]
    fn test_ganzhi_serde() {
        let gz: GanZhi = "乙未".parse().unwrap();
        let json = serde_json::to_string(&gz).unwrap();
        assert_eq!(json, "\"乙未\"");
        let back: GanZhi = serde_json::from_str(&json).unwrap();
        assert_eq!(back, gz);
    }

    #[test]
    fn test_nayin() {
        assert_eq!("甲子".parse::<GanZhi>().unwrap().nayin(), "海中金");
        assert_eq!("庚午".parse::<GanZhi>().unwrap().nayin(), "路旁土");
        assert_eq!("辛亥".parse::<GanZhi>().unwrap().nayin(), "钗钏金");
        assert_eq!("癸亥".parse::<GanZhi>().unwrap().nayin(), "大海水");
    }

    #[test]
    fn test_void_branches() {
        // 甲子 xun leaves 戌亥 void
        assert_eq!(
            "乙丑".parse::<GanZhi>().unwrap().void_branches(),
            [Branch::Xu, Branch::Hai]
        );
        // 甲辰 xun leaves 寅卯 void
        assert_eq!(
            "辛亥".parse::<GanZhi>().unwrap().void_branches(),
            [Branch::Yin, Branch::Mao]
        );
    }

    #[test]
    fn test_branch_from_hour() {
        assert_eq!(Branch::from_hour(0), Branch::Zi);
        assert_eq!(Branch::from_hour(23), Branch::Zi);
        assert_eq!(Branch::from_hour(1), Branch::Chou);
        assert_eq!(Branch::from_hour(14), Branch::Wei);
        assert_eq!(Branch::from_hour(22), Branch::Hai);
    }

    #[test]
    fn test_element_from_name() {
        assert_eq!(Element::from_name("木"), Some(Element::Wood));
        assert_eq!(Element::from_name(" Water "), Some(Element::Water));
        assert_eq!(Element::from_name("METAL"), Some(Element::Metal));
        assert_eq!(Element::from_name("木火"), None);
        assert_eq!(Element::from_name(""), None);
    }
}
