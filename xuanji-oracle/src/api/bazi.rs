//! BaZi chart endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::info;
use xuanji_almanac::{BirthInput, Chart};

use super::tracked;
use crate::view_state::ViewKind;
use crate::{ApiResult, AppState};

/// POST /api/bazi/chart
///
/// Deterministic chart merged with the model narrative.
pub async fn chart(
    State(state): State<AppState>,
    payload: Result<Json<BirthInput>, JsonRejection>,
) -> ApiResult<Json<Chart>> {
    let Json(input) = payload?;
    info!(date = %input.birth_date, calendar = ?input.calendar_type, "Chart requested");

    let chart = tracked(&state, ViewKind::Chart, state.charts.interpret(&input)).await?;
    Ok(Json(chart))
}

/// POST /api/bazi/skeleton
///
/// Deterministic chart only; works without an API key.
pub async fn skeleton(
    State(state): State<AppState>,
    payload: Result<Json<BirthInput>, JsonRejection>,
) -> ApiResult<Json<Chart>> {
    let Json(input) = payload?;
    Ok(Json(state.charts.skeleton(&input)?))
}

pub fn bazi_routes() -> Router<AppState> {
    Router::new()
        .route("/api/bazi/chart", post(chart))
        .route("/api/bazi/skeleton", post(skeleton))
}
