//! Prompt text and response schemas sent to the model
//!
//! Prompts carry every locally computed fact the model needs so that its
//! prose agrees with the deterministic chart and grid.

use serde_json::{json, Value};
use xuanji_almanac::chart::Chart;
use xuanji_almanac::{ElementTally, FlyingStarGrid, ForecastPeriod, ZodiacSign};

/// Personality hints per element (strongest, weakest)
const PERSONALITY_RULES: &str = "\
- 木最强：不会主动表露自己的心声，重实干，性格敏感，内敛
- 木最弱：外表看起来有些弱，但内在有韧性，认死理，容易钻牛角尖
- 火最强：有才华，有情调，有冲劲，有爆发力，性格容易急躁
- 火最弱：思维敏捷，性格偏冷，偏消极
- 土最强：内在有原则，形式灵活多变，群策群力，如有冲突内在原则会转变成为固执己见
- 土最弱：会审时度势，自我调节能力强，但往往容易受环境影响，缺乏主见，稳定性不高
- 金最强：敢于创新，忠诚义气，执行力强，有戾气，喜欢硬碰硬
- 金最弱：不善拐弯，容易在无意中得罪人
- 水最强：聪明，灵活，点子多，人缘好
- 水最弱：乖巧，胆小，有耐心";

/// Organ associations per element (excess, deficiency)
const HEALTH_RULES: &str = "\
- 金关联：肺部、呼吸道 (强: 肺部呼吸道本身问题; 弱: 容易发炎)
- 木关联：肝胆 (强: 肝胆本身问题; 弱: 肝胆引发的间接症状)
- 水关联：肾脏、泌尿系统 (强: 脏器本身问题; 弱: 精神方面问题)
- 火关联：心脏、血液 (强: 心血管机能较弱; 弱: 心气不稳、血压不稳、贫血、易疲累)
- 土关联：肠胃和皮肤 (强: 胃肠机能本身问题; 弱: 胃肠方面的炎症和病变问题)";

fn pillar_or_unknown(chart: &Chart, index: usize) -> String {
    chart
        .gan_zhi()
        .get(index)
        .map(|g| g.to_string())
        .unwrap_or_else(|| "不详 (Unknown)".to_string())
}

/// Chart interpretation prompt
pub fn chart_prompt(chart: &Chart) -> String {
    let tally: ElementTally = chart.element_counts;
    let hour = if chart.pillars.time.is_some() {
        pillar_or_unknown(chart, 3)
    } else {
        "不详 (Unknown)".to_string()
    };

    format!(
        "你是一位精通子平八字的命理大师。

**排盘信息:**
- 年柱: {year}
- 月柱: {month}
- 日柱: {day}
- 时柱: {hour}
- 五行统计: {tally}
- 五行最强: {strongest}，五行最弱: {weakest}
- 性别: {gender}

**任务:**
1. 标注各柱相对于日主({day_master})的\"十二长生\"状态。
2. 识别关键神煞（如天乙贵人、桃花、驿马、空亡等）。
3. 判定日主身强身弱，计算得分(0-100)，判定格局。
4. 给出喜用神。
5. **生成五行性格和健康分析**：根据五行最强和最弱的元素，基于以下规则生成分析文案，并适当扩展使其通顺自然。

**性格规则参考**:
{personality}

**健康规则参考**:
{health}",
        year = pillar_or_unknown(chart, 0),
        month = pillar_or_unknown(chart, 1),
        day = pillar_or_unknown(chart, 2),
        hour = hour,
        tally = tally,
        strongest = tally.strongest(),
        weakest = tally.weakest(),
        gender = chart.gender.label(),
        day_master = chart.day_master.stem,
        personality = PERSONALITY_RULES,
        health = HEALTH_RULES,
    )
}

fn pillar_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "lifeStage": {"type": "STRING"},
            "shenSha": {"type": "ARRAY", "items": {"type": "STRING"}}
        }
    })
}

/// Response schema for [`chart_prompt`]
pub fn chart_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "pillarAnalysis": {
                "type": "OBJECT",
                "properties": {
                    "year": pillar_schema(),
                    "month": pillar_schema(),
                    "day": pillar_schema(),
                    "time": pillar_schema()
                }
            },
            "strengthAnalysis": {
                "type": "OBJECT",
                "properties": {
                    "score": {"type": "NUMBER"},
                    "level": {"type": "STRING"},
                    "details": {"type": "STRING"}
                }
            },
            "favorableElements": {"type": "ARRAY", "items": {"type": "STRING"}},
            "fiveElementsAnalysis": {
                "type": "OBJECT",
                "properties": {
                    "personality": {"type": "STRING"},
                    "health": {"type": "STRING"}
                }
            }
        },
        "required": ["strengthAnalysis", "fiveElementsAnalysis"]
    })
}

/// Flying-star advice prompt; the grid itself is fixed locally
pub fn flying_stars_prompt(grid: &FlyingStarGrid) -> String {
    format!(
        "Generate a Flying Star Feng Shui analysis for the year {year}.
The annual star grid (south at the top) is:
{grid}
Return JSON with:
- stars: A dictionary mapping directions to star numbers (1-9). Keys MUST be: 'center', 'north', 'south', 'east', 'west', 'northeast', 'northwest', 'southeast', 'southwest'.
- advice: general advice string in Simplified Chinese
- cures: string describing cures in Simplified Chinese
- wealthDirection: string direction (e.g. 西南) in Simplified Chinese",
        year = grid.year,
        grid = grid,
    )
}

pub const FLOOR_PLAN_PROMPT: &str = "Analyze this floor plan image. Identify the bounding box of the **indoor living space** (walls).
Exclude outdoor areas, gardens, large whitespace margins, and text legends.
Focus ONLY on the main architectural interior.
Return a JSON object with keys: ymin, xmin, ymax, xmax.
These values should be integers from 0 to 100, representing the percentage of the image height/width.
Example: {\"ymin\": 10, \"xmin\": 15, \"ymax\": 90, \"xmax\": 85}";

pub fn floor_plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "ymin": {"type": "INTEGER"},
            "xmin": {"type": "INTEGER"},
            "ymax": {"type": "INTEGER"},
            "xmax": {"type": "INTEGER"}
        }
    })
}

pub fn horoscope_prompt(sign: ZodiacSign, period: ForecastPeriod) -> String {
    format!(
        "Generate a {period} horoscope forecast for {sign} in Simplified Chinese. Return JSON:
- sign: string
- forecast: string (approx 50 words, encouraging)
- luckyColor: string
- luckyNumber: string",
        period = period.as_str(),
        sign = sign.chinese_name(),
    )
}

pub fn room_edit_instruction(instruction: &str) -> String {
    format!(
        "Edit this image based on the following instruction: {}",
        instruction.trim()
    )
}
