//! # Xuanji Almanac
//!
//! Deterministic calendar and metaphysics computations:
//! - Stems, branches, Five Elements, Ten Gods, NaYin ([`ganzhi`])
//! - Solar position and the 24 solar terms ([`astro`], [`solar_terms`])
//! - Chinese lunisolar calendar 1900-2100 ([`lunar`])
//! - Four Pillars and the Da Yun luck cycle ([`pillars`], [`luck`])
//! - Chart skeleton assembly from a birth input ([`chart`])
//! - Annual Flying Star grid ([`flying_star`])
//! - Western zodiac signs ([`zodiac`])
//!
//! Nothing here performs I/O; every function is a pure computation.

pub mod astro;
pub mod chart;
pub mod flying_star;
pub mod ganzhi;
pub mod input;
pub mod luck;
pub mod lunar;
pub mod pillars;
pub mod solar_terms;
pub mod zodiac;

pub use chart::{build_chart, Chart, ChartOptions, ElementTally, PillarSlot};
pub use flying_star::{Direction, FlyingStarGrid};
pub use ganzhi::{element_of_char, Branch, Element, GanZhi, Stem, TenGod};
pub use input::{BirthInput, CalendarType, Gender, Location};
pub use pillars::ZiHourMode;
pub use zodiac::{ForecastPeriod, ZodiacSign};
