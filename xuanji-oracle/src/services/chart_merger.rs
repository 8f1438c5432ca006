//! Merge a model narrative into a locally computed chart
//!
//! Merge strategy: a narrative field overwrites the chart's annotation only
//! when it is present and well formed. Stems, branches, elements, tallies,
//! NaYin, void flags and the luck cycle are never touched.

use crate::schema::{elements_at, object_at, score_at, string_at, string_list_at, Field};
use serde_json::Value;
use tracing::debug;
use xuanji_almanac::chart::{Chart, FiveElementsAnalysis};
use xuanji_almanac::{Element, PillarSlot};

/// Per-pillar annotations from the narrative
#[derive(Debug, Clone, PartialEq)]
pub struct PillarNarrative {
    pub life_stage: Field<String>,
    pub shen_sha: Field<Vec<String>>,
}

/// Parsed chart narrative; every field independently optional
#[derive(Debug, Clone, PartialEq)]
pub struct ChartNarrative {
    pub pillars: Vec<(PillarSlot, PillarNarrative)>,
    pub strength_score: Field<u32>,
    pub strength_level: Field<String>,
    pub strength_details: Field<String>,
    pub favorable_elements: Field<Vec<Element>>,
    pub personality: Field<String>,
    pub health: Field<String>,
}

impl ChartNarrative {
    /// Read a narrative out of an untrusted reply
    ///
    /// Never fails: anything missing or malformed reads as absent.
    pub fn parse(reply: &Value) -> ChartNarrative {
        let pillars = PillarSlot::ALL
            .iter()
            .filter(|slot| object_at(reply, &["pillarAnalysis", slot.key()]).is_present())
            .map(|&slot| {
                let key = slot.key();
                (
                    slot,
                    PillarNarrative {
                        life_stage: string_at(reply, &["pillarAnalysis", key, "lifeStage"]),
                        shen_sha: string_list_at(reply, &["pillarAnalysis", key, "shenSha"]),
                    },
                )
            })
            .collect();

        ChartNarrative {
            pillars,
            strength_score: score_at(reply, &["strengthAnalysis", "score"]),
            strength_level: string_at(reply, &["strengthAnalysis", "level"]),
            strength_details: string_at(reply, &["strengthAnalysis", "details"]),
            favorable_elements: elements_at(reply, &["favorableElements"]),
            personality: string_at(reply, &["fiveElementsAnalysis", "personality"]),
            health: string_at(reply, &["fiveElementsAnalysis", "health"]),
        }
    }
}

/// Apply a narrative onto a chart
///
/// **Algorithm:**
/// 1. For each pillar the chart has, copy `lifeStage` and `shenSha` when present
///    (a time-pillar narrative is dropped when the hour is unknown)
/// 2. Copy strength score, level and details; the level also becomes the
///    day master's strength label
/// 3. Copy favorable elements
/// 4. Set the five-elements analysis when either text is present
pub fn merge_narrative(chart: &mut Chart, narrative: ChartNarrative) {
    for (slot, pillar_narrative) in narrative.pillars {
        let Some(pillar) = chart.pillars.get_mut(slot) else {
            debug!(slot = slot.key(), "Dropping narrative for a pillar the chart lacks");
            continue;
        };
        if let Field::Present(stage) = pillar_narrative.life_stage {
            pillar.life_stage = stage;
        }
        if let Field::Present(shen_sha) = pillar_narrative.shen_sha {
            pillar.shen_sha = shen_sha;
        }
    }

    if let Field::Present(score) = narrative.strength_score {
        chart.strength_analysis.score = Some(score);
    }
    if let Field::Present(level) = narrative.strength_level {
        chart.day_master.strength = level.clone();
        chart.strength_analysis.level = level;
    }
    if let Field::Present(details) = narrative.strength_details {
        chart.strength_analysis.details = details;
    }
    if let Field::Present(elements) = narrative.favorable_elements {
        chart.favorable_elements = elements;
    }

    if narrative.personality.is_present() || narrative.health.is_present() {
        chart.five_elements_analysis = Some(FiveElementsAnalysis {
            personality: narrative.personality.unwrap_or_default(),
            health: narrative.health.unwrap_or_default(),
        });
    }
}
