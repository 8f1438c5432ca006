//! Floor-plan analysis endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::tracked;
use crate::services::{FloorPlanAnalysis, ImagePayload};
use crate::view_state::ViewKind;
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanRequest {
    /// Data URL, or bare base64 with `mimeType`
    pub image: String,
    pub mime_type: Option<String>,
    /// Pixel size of the uploaded image, for the crop aspect ratio
    pub natural_width: Option<u32>,
    pub natural_height: Option<u32>,
}

/// POST /api/floor-plan
pub async fn analyze_floor_plan(
    State(state): State<AppState>,
    payload: Result<Json<FloorPlanRequest>, JsonRejection>,
) -> ApiResult<Json<FloorPlanAnalysis>> {
    let Json(request) = payload?;
    let image = ImagePayload::from_request(&request.image, request.mime_type.as_deref())?;
    let natural_size = request.natural_width.zip(request.natural_height);

    let analysis = tracked(
        &state,
        ViewKind::FloorPlan,
        state.floor_plans.analyze(&image, natural_size),
    )
    .await?;
    Ok(Json(analysis))
}

pub fn floor_plan_routes() -> Router<AppState> {
    Router::new().route("/api/floor-plan", post(analyze_floor_plan))
}
