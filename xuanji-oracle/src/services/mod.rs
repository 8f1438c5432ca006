//! Generators behind the HTTP surface
//!
//! Each generator combines a local computation from `xuanji-almanac` with
//! at most one model request. The model never overrides a locally computed
//! value; its reply only fills annotation fields.

pub mod chart_interpreter;
pub mod chart_merger;
pub mod flying_stars;
pub mod floor_plan;
pub mod horoscope;
pub mod image;
pub mod room_design;
pub mod store;

use crate::inference::InferenceError;
use thiserror::Error;

pub use chart_interpreter::ChartInterpreter;
pub use chart_merger::{merge_narrative, ChartNarrative};
pub use flying_stars::{FlyingStarAdvisor, FlyingStarReport, StarGridView};
pub use floor_plan::{BoundingBox, CropTransform, FloorPlanAnalysis, FloorPlanAnalyzer};
pub use horoscope::{HoroscopeForecast, HoroscopeGenerator};
pub use image::ImagePayload;
pub use room_design::RoomDesigner;
pub use store::{catalog, find_product, Product};

/// Generator failure
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Remote call failed or no credential is configured
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// Caller input rejected before any remote call
    #[error(transparent)]
    Input(#[from] xuanji_common::Error),
}
