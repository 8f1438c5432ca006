//! Western zodiac signs and forecast periods

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    pub fn chinese_name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "白羊座",
            ZodiacSign::Taurus => "金牛座",
            ZodiacSign::Gemini => "双子座",
            ZodiacSign::Cancer => "巨蟹座",
            ZodiacSign::Leo => "狮子座",
            ZodiacSign::Virgo => "处女座",
            ZodiacSign::Libra => "天秤座",
            ZodiacSign::Scorpio => "天蝎座",
            ZodiacSign::Sagittarius => "射手座",
            ZodiacSign::Capricorn => "摩羯座",
            ZodiacSign::Aquarius => "水瓶座",
            ZodiacSign::Pisces => "双鱼座",
        }
    }

    pub fn date_range(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "3月21日-4月19日",
            ZodiacSign::Taurus => "4月20日-5月20日",
            ZodiacSign::Gemini => "5月21日-6月21日",
            ZodiacSign::Cancer => "6月22日-7月22日",
            ZodiacSign::Leo => "7月23日-8月22日",
            ZodiacSign::Virgo => "8月23日-9月22日",
            ZodiacSign::Libra => "9月23日-10月23日",
            ZodiacSign::Scorpio => "10月24日-11月22日",
            ZodiacSign::Sagittarius => "11月23日-12月21日",
            ZodiacSign::Capricorn => "12月22日-1月19日",
            ZodiacSign::Aquarius => "1月20日-2月18日",
            ZodiacSign::Pisces => "2月19日-3月20日",
        }
    }

    /// Accepts the English name (any case) or the Chinese name
    pub fn parse(name: &str) -> Option<ZodiacSign> {
        let name = name.trim();
        Self::ALL.iter().copied().find(|sign| {
            sign.chinese_name() == name || format!("{:?}", sign).eq_ignore_ascii_case(name)
        })
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.chinese_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastPeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ForecastPeriod {
    /// English word used in the forecast prompt
    pub fn as_str(self) -> &'static str {
        match self {
            ForecastPeriod::Daily => "daily",
            ForecastPeriod::Weekly => "weekly",
            ForecastPeriod::Monthly => "monthly",
            ForecastPeriod::Yearly => "yearly",
        }
    }

    pub fn chinese_label(self) -> &'static str {
        match self {
            ForecastPeriod::Daily => "今日",
            ForecastPeriod::Weekly => "本周",
            ForecastPeriod::Monthly => "本月",
            ForecastPeriod::Yearly => "本年",
        }
    }
}
