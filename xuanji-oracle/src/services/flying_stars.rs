//! Annual Flying Star report
//!
//! The grid is always the locally flown one. A grid echoed back by the model
//! is only compared against it and logged when it disagrees.

use super::GenerationError;
use crate::inference::{InferenceClient, InferenceError, InferenceRequest};
use crate::prompts::flying_stars_prompt;
use crate::schema::{object_at, string_at, Field};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use xuanji_almanac::flying_star::{
    center_star, star_detail, StarDetail, GRID_LAYOUT, WEALTH_STAR,
};
use xuanji_almanac::{Direction, FlyingStarGrid};

/// One cell of the 3x3 display grid
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PalaceView {
    pub direction: Direction,
    pub label: &'static str,
    pub star: u8,
    pub detail: Option<StarDetail>,
}

/// Locally computed grid, ready for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarGridView {
    pub year: i32,
    pub center_star: u8,
    pub stars: BTreeMap<Direction, u8>,
    /// Rows south-first, matching [`GRID_LAYOUT`]
    pub palaces: Vec<PalaceView>,
    /// Palace holding the wealth star
    pub wealth_palace: Option<&'static str>,
}

impl StarGridView {
    pub fn for_year(year: i32) -> StarGridView {
        StarGridView::from_grid(&FlyingStarGrid::for_year(year))
    }

    fn from_grid(grid: &FlyingStarGrid) -> StarGridView {
        let palaces = GRID_LAYOUT
            .iter()
            .flatten()
            .map(|&direction| {
                let star = grid.star_at(direction);
                PalaceView {
                    direction,
                    label: direction.label(),
                    star,
                    detail: star_detail(star).copied(),
                }
            })
            .collect();

        StarGridView {
            year: grid.year,
            center_star: center_star(grid.year),
            stars: grid.stars.clone(),
            palaces,
            wealth_palace: grid.direction_of(WEALTH_STAR).map(|d| d.label()),
        }
    }
}

/// Grid plus model advice
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlyingStarReport {
    #[serde(flatten)]
    pub grid: StarGridView,
    pub advice: String,
    pub cures: String,
    pub wealth_direction: String,
    /// `None` when the model sent no usable grid
    pub remote_grid_agrees: Option<bool>,
}

pub struct FlyingStarAdvisor {
    client: Arc<dyn InferenceClient>,
}

impl FlyingStarAdvisor {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }

    /// Local grid annotated with advice for the year
    ///
    /// **Algorithm:**
    /// 1. Fail with `MissingCredential` if no credential is configured
    /// 2. Fly the stars locally
    /// 3. Ask the model for advice, cures and the wealth direction
    /// 4. Compare any echoed grid with the local one
    /// 5. Fall back to the wealth-star palace when no direction came back
    pub async fn report(&self, year: i32) -> Result<FlyingStarReport, GenerationError> {
        if !self.client.has_credential() {
            return Err(InferenceError::MissingCredential.into());
        }

        let grid = FlyingStarGrid::for_year(year);
        let request = InferenceRequest::json_text(flying_stars_prompt(&grid), None);
        let reply = self.client.generate(request).await?.json()?;

        let remote_grid_agrees = compare_remote_grid(&grid, &reply);
        let view = StarGridView::from_grid(&grid);
        let wealth_direction = match string_at(&reply, &["wealthDirection"]) {
            Field::Present(direction) => direction,
            Field::Absent => view.wealth_palace.unwrap_or_default().to_string(),
        };

        info!(year, center = view.center_star, "Flying star report ready");

        Ok(FlyingStarReport {
            grid: view,
            advice: string_at(&reply, &["advice"]).unwrap_or_default(),
            cures: string_at(&reply, &["cures"]).unwrap_or_default(),
            wealth_direction,
            remote_grid_agrees,
        })
    }
}

fn compare_remote_grid(local: &FlyingStarGrid, reply: &Value) -> Option<bool> {
    let map = object_at(reply, &["stars"]).into_option()?;
    let Some(remote) = FlyingStarGrid::from_json_map(local.year, map) else {
        warn!(year = local.year, "Model returned an invalid star grid; ignoring it");
        return None;
    };

    let agrees = remote == *local;
    if !agrees {
        warn!(
            year = local.year,
            local = %local,
            remote = %remote,
            "Model star grid disagrees with the computed grid; keeping computed grid"
        );
    }
    Some(agrees)
}
