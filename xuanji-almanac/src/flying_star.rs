//! Annual Flying Star (玄空飞星) grid
//!
//! The center star of a year counts down from 9 (2018 was a 9 year) and the
//! remaining stars fly through the Lo Shu sequence of palaces, each one step
//! higher than the last with 9 wrapping to 1.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Year whose center star was 9
const EPOCH_YEAR: i32 = 2018;

/// The nine palaces of the Lo Shu grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Center,
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

/// Order in which the stars fly, starting from the center
pub const FLIGHT_PATH: [Direction; 9] = [
    Direction::Center,
    Direction::NorthWest,
    Direction::West,
    Direction::NorthEast,
    Direction::South,
    Direction::North,
    Direction::SouthWest,
    Direction::East,
    Direction::SouthEast,
];

/// Display layout with south at the top: SE S SW / E C W / NE N NW
pub const GRID_LAYOUT: [[Direction; 3]; 3] = [
    [Direction::SouthEast, Direction::South, Direction::SouthWest],
    [Direction::East, Direction::Center, Direction::West],
    [Direction::NorthEast, Direction::North, Direction::NorthWest],
];

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::Center,
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// JSON key (`center`, `north`, …, `southwest`)
    pub fn key(self) -> &'static str {
        match self {
            Direction::Center => "center",
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::NorthEast => "northeast",
            Direction::NorthWest => "northwest",
            Direction::SouthEast => "southeast",
            Direction::SouthWest => "southwest",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Center => "中宫",
            Direction::North => "正北",
            Direction::South => "正南",
            Direction::East => "正东",
            Direction::West => "正西",
            Direction::NorthEast => "东北",
            Direction::NorthWest => "西北",
            Direction::SouthEast => "东南",
            Direction::SouthWest => "西南",
        }
    }

    pub fn from_key(key: &str) -> Option<Direction> {
        let key = key.trim().to_lowercase().replace(['-', '_', ' '], "");
        Self::ALL.iter().copied().find(|d| d.key() == key)
    }
}

/// Star number per palace for one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlyingStarGrid {
    pub year: i32,
    pub stars: BTreeMap<Direction, u8>,
}

/// Star in the center palace for a year
pub fn center_star(year: i32) -> u8 {
    (9 - (year - EPOCH_YEAR).rem_euclid(9)) as u8
}

impl FlyingStarGrid {
    /// Fly the stars for a year
    pub fn for_year(year: i32) -> FlyingStarGrid {
        let center = center_star(year);
        let stars = FLIGHT_PATH
            .iter()
            .enumerate()
            .map(|(step, &direction)| {
                let star = (center as usize - 1 + step) % 9 + 1;
                (direction, star as u8)
            })
            .collect();
        FlyingStarGrid { year, stars }
    }

    pub fn star_at(&self, direction: Direction) -> u8 {
        self.stars.get(&direction).copied().unwrap_or_default()
    }

    /// Palace holding a given star
    pub fn direction_of(&self, star: u8) -> Option<Direction> {
        self.stars
            .iter()
            .find(|&(_, &s)| s == star)
            .map(|(&d, _)| d)
    }

    /// Parse a `{direction: star}` object from an untrusted source
    ///
    /// Returns `None` unless all nine keys are present and the values form a
    /// permutation of 1-9. Integral floats and numeric strings are accepted.
    pub fn from_json_map(year: i32, map: &Map<String, Value>) -> Option<FlyingStarGrid> {
        let mut stars = BTreeMap::new();
        for (key, value) in map {
            let direction = Direction::from_key(key)?;
            let star = match value {
                Value::Number(n) => n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }?;
            if !(1..=9).contains(&star) {
                return None;
            }
            stars.insert(direction, star as u8);
        }

        let grid = FlyingStarGrid { year, stars };
        grid.is_permutation().then_some(grid)
    }

    /// Every palace filled and every star 1-9 used exactly once
    pub fn is_permutation(&self) -> bool {
        let mut seen = [false; 9];
        for direction in Direction::ALL {
            match self.stars.get(&direction) {
                Some(&star) if (1..=9).contains(&star) && !seen[star as usize - 1] => {
                    seen[star as usize - 1] = true;
                }
                _ => return false,
            }
        }
        true
    }
}

/// Three text rows, south at the top, e.g. `东南2 正南7 西南9`
impl fmt::Display for FlyingStarGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in GRID_LAYOUT.iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .map(|&d| format!("{}{}", d.label(), self.star_at(d)))
                .collect();
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

/// Traditional meaning of one of the nine stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarDetail {
    pub number: u8,
    pub name: &'static str,
    pub theme: &'static str,
    pub description: &'static str,
}

pub const STAR_DETAILS: [StarDetail; 9] = [
    StarDetail {
        number: 1,
        name: "一白贪狼星",
        theme: "桃花/人缘",
        description: "在家居风水中指代与水有关的物品，主人事、缘桃花，所有人与人之间的缘份，贵人等。",
    },
    StarDetail {
        number: 2,
        name: "二黑巨门星",
        theme: "疾病/晦气",
        description: "主宰小疾病、身体不适等。需注意身心健康，宜静不宜动。",
    },
    StarDetail {
        number: 3,
        name: "三碧禄存星",
        theme: "是非/争吵",
        description: "与破败的木制品、干枯的植物有关，主事是非口舌、小人、争吵、官讼、盗窃破财等。",
    },
    StarDetail {
        number: 4,
        name: "四绿文曲星",
        theme: "文昌/学业",
        description: "在家居风水中和图书、旺盛的植物有关，主宰读书、考试、文职等工作。",
    },
    StarDetail {
        number: 5,
        name: "五黄廉贞星",
        theme: "灾祸/重病",
        description: "代表潮湿阴寒的物品或地方，主事一切大灾祸，严重的疾病。需特别小心化解。",
    },
    StarDetail {
        number: 6,
        name: "六白武曲星",
        theme: "偏财/权力",
        description: "在家居风水中和金属、电器有关，主宰权力、偏财运等。",
    },
    StarDetail {
        number: 7,
        name: "七赤破军星",
        theme: "升官/变动",
        description: "在家居风水中和金属刀具有关，主宰升职、运气提升，但也伴随变动与竞争。",
    },
    StarDetail {
        number: 8,
        name: "八白左辅星",
        theme: "正财/大财",
        description: "在家居风水中和陶瓷制品有关，主宰一切钱财、正财运等。为当旺财星。",
    },
    StarDetail {
        number: 9,
        name: "九紫右弼星",
        theme: "喜庆/姻缘",
        description: "在家居风水中和炉灶、厨房有关，主宰喜庆吉事，如搬家、开市、添丁、结婚等喜庆事。",
    },
];

pub fn star_detail(star: u8) -> Option<&'static StarDetail> {
    STAR_DETAILS.get((star as usize).checked_sub(1)?)
}

/// Star that governs wealth
pub const WEALTH_STAR: u8 = 8;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_center_star() {
        assert_eq!(center_star(2018), 9);
        assert_eq!(center_star(2024), 3);
        assert_eq!(center_star(2026), 1);
        assert_eq!(center_star(2027), 9);
        assert_eq!(center_star(2017), 1);
        assert_eq!(center_star(1990), 1);
    }

    #[test]
    fn test_grid_2024() {
        let grid = FlyingStarGrid::for_year(2024);
        let expected = [
            (Direction::Center, 3),
            (Direction::NorthWest, 4),
            (Direction::West, 5),
            (Direction::NorthEast, 6),
            (Direction::South, 7),
            (Direction::North, 8),
            (Direction::SouthWest, 9),
            (Direction::East, 1),
            (Direction::SouthEast, 2),
        ];
        for (direction, star) in expected {
            assert_eq!(grid.star_at(direction), star, "{}", direction.key());
        }
        assert_eq!(grid.direction_of(WEALTH_STAR), Some(Direction::North));
    }

    #[test]
    fn test_every_year_is_a_permutation() {
        for year in 1900..=2100 {
            assert!(FlyingStarGrid::for_year(year).is_permutation(), "year {}", year);
        }
    }

    #[test]
    fn test_from_json_map_valid() {
        let remote = json!({
            "center": 3, "northwest": 4, "west": 5, "northeast": 6, "south": 7,
            "north": "8", "southwest": 9.0, "east": 1, "south_east": 2
        });
        let grid = FlyingStarGrid::from_json_map(2024, remote.as_object().unwrap()).unwrap();
        assert_eq!(grid, FlyingStarGrid::for_year(2024));
    }

    #[test]
    fn test_from_json_map_rejects_malformed() {
        let duplicate = json!({
            "center": 3, "northwest": 3, "west": 5, "northeast": 6, "south": 7,
            "north": 8, "southwest": 9, "east": 1, "southeast": 2
        });
        assert!(FlyingStarGrid::from_json_map(2024, duplicate.as_object().unwrap()).is_none());

        let missing = json!({"center": 3});
        assert!(FlyingStarGrid::from_json_map(2024, missing.as_object().unwrap()).is_none());

        let unknown_key = json!({"middle": 3});
        assert!(FlyingStarGrid::from_json_map(2024, unknown_key.as_object().unwrap()).is_none());

        let out_of_range = json!({
            "center": 0, "northwest": 4, "west": 5, "northeast": 6, "south": 7,
            "north": 8, "southwest": 9, "east": 1, "southeast": 2
        });
        assert!(FlyingStarGrid::from_json_map(2024, out_of_range.as_object().unwrap()).is_none());

        let wrong_type = json!({
            "center": [3], "northwest": 4, "west": 5, "northeast": 6, "south": 7,
            "north": 8, "southwest": 9, "east": 1, "southeast": 2
        });
        assert!(FlyingStarGrid::from_json_map(2024, wrong_type.as_object().unwrap()).is_none());
    }

    #[test]
    fn test_direction_keys() {
        assert_eq!(Direction::from_key("NorthEast"), Some(Direction::NorthEast));
        assert_eq!(Direction::from_key("north-west"), Some(Direction::NorthWest));
        assert_eq!(Direction::from_key("up"), None);
        for direction in Direction::ALL {
            let json = serde_json::to_value(direction).unwrap();
            assert_eq!(json, direction.key());
        }
    }

    #[test]
    fn test_display_layout() {
        let text = FlyingStarGrid::for_year(2024).to_string();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows, vec!["东南2 正南7 西南9", "正东1 中宫3 正西5", "东北6 正北8 西北4"]);
    }

    #[test]
    fn test_star_details() {
        assert_eq!(star_detail(1).unwrap().name, "一白贪狼星");
        assert_eq!(star_detail(8).unwrap().theme, "正财/大财");
        assert!(star_detail(0).is_none());
        assert!(star_detail(10).is_none());
        for (i, detail) in STAR_DETAILS.iter().enumerate() {
            assert_eq!(detail.number as usize, i + 1);
        }
    }
}
