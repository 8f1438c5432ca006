//! Floor-plan bounding box and crop transform
//!
//! Box coordinates are integer percentages of the image height and width.

use super::image::ImagePayload;
use super::GenerationError;
use crate::inference::{InferenceClient, InferenceError, InferenceRequest};
use crate::prompts::{floor_plan_schema, FLOOR_PLAN_PROMPT};
use crate::schema::integer_at;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub ymin: u32,
    pub xmin: u32,
    pub ymax: u32,
    pub xmax: u32,
}

impl BoundingBox {
    pub const FULL_FRAME: BoundingBox = BoundingBox {
        ymin: 0,
        xmin: 0,
        ymax: 100,
        xmax: 100,
    };

    pub fn width(&self) -> u32 {
        self.xmax.saturating_sub(self.xmin)
    }

    pub fn height(&self) -> u32 {
        self.ymax.saturating_sub(self.ymin)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Read a box from a reply, clamping each edge to 0-100
    ///
    /// Returns `None` when an edge is missing or the box has no area.
    pub fn from_reply(reply: &Value) -> Option<BoundingBox> {
        let edge = |key: &str| integer_at(reply, &[key]).into_option().map(|v| v.clamp(0, 100) as u32);
        let bbox = BoundingBox {
            ymin: edge("ymin")?,
            xmin: edge("xmin")?,
            ymax: edge("ymax")?,
            xmax: edge("xmax")?,
        };
        (!bbox.is_degenerate()).then_some(bbox)
    }

    /// CSS-style transform that makes this box fill its container
    ///
    /// `natural_size` is the image's pixel `(width, height)`; the aspect
    /// ratio of the cropped area is only known when it is given.
    pub fn crop_transform(&self, natural_size: Option<(u32, u32)>) -> CropTransform {
        let (w, h) = if self.is_degenerate() {
            (100.0, 100.0)
        } else {
            (f64::from(self.width()), f64::from(self.height()))
        };

        let aspect_ratio = natural_size
            .filter(|&(nw, nh)| nw > 0 && nh > 0)
            .map(|(nw, nh)| (f64::from(nw) * w / 100.0) / (f64::from(nh) * h / 100.0));

        CropTransform {
            width_pct: 100.0 / w * 100.0,
            height_pct: 100.0 / h * 100.0,
            translate_x_pct: -f64::from(self.xmin),
            translate_y_pct: -f64::from(self.ymin),
            aspect_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropTransform {
    /// Image width relative to the container
    pub width_pct: f64,
    pub height_pct: f64,
    /// Relative to the image's own size
    pub translate_x_pct: f64,
    pub translate_y_pct: f64,
    pub aspect_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanAnalysis {
    pub bounding_box: BoundingBox,
    /// True when the full frame was substituted for an unusable reply
    pub fallback: bool,
    pub crop: CropTransform,
}

impl FloorPlanAnalysis {
    /// Analysis from a raw reply; anything unusable becomes the flagged full frame
    pub fn from_reply(reply: Option<&Value>, natural_size: Option<(u32, u32)>) -> FloorPlanAnalysis {
        let (bounding_box, fallback) = match reply.and_then(BoundingBox::from_reply) {
            Some(bbox) => (bbox, false),
            None => {
                warn!("Unusable floor-plan box; using the full frame");
                (BoundingBox::FULL_FRAME, true)
            }
        };
        FloorPlanAnalysis {
            bounding_box,
            fallback,
            crop: bounding_box.crop_transform(natural_size),
        }
    }
}

pub struct FloorPlanAnalyzer {
    client: Arc<dyn InferenceClient>,
}

impl FloorPlanAnalyzer {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }

    /// Estimate the indoor living-space box of a floor plan
    ///
    /// Transport failures are errors; a non-JSON or degenerate reply is not.
    pub async fn analyze(
        &self,
        image: &ImagePayload,
        natural_size: Option<(u32, u32)>,
    ) -> Result<FloorPlanAnalysis, GenerationError> {
        if !self.client.has_credential() {
            return Err(InferenceError::MissingCredential.into());
        }

        let request =
            InferenceRequest::json_image(image.to_part(), FLOOR_PLAN_PROMPT, Some(floor_plan_schema()));
        let response = self.client.generate(request).await?;

        let reply = match response.json() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "Floor-plan reply is not JSON");
                None
            }
        };

        let analysis = FloorPlanAnalysis::from_reply(reply.as_ref(), natural_size);
        info!(
            bbox = ?analysis.bounding_box,
            fallback = analysis.fallback,
            "Floor plan analyzed"
        );
        Ok(analysis)
    }
}
