//! Flying Star endpoints

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};

use super::tracked;
use crate::services::{FlyingStarReport, StarGridView};
use crate::view_state::ViewKind;
use crate::{ApiError, ApiResult, AppState};

/// Years accepted by the star endpoints
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1000..=9999;

fn checked_year(path: Result<Path<i32>, PathRejection>) -> ApiResult<i32> {
    let Path(year) = path?;
    if !YEAR_RANGE.contains(&year) {
        return Err(ApiError::BadRequest(format!(
            "Year {} outside {}-{}",
            year,
            YEAR_RANGE.start(),
            YEAR_RANGE.end()
        )));
    }
    Ok(year)
}

/// GET /api/stars/:year
pub async fn star_report(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<FlyingStarReport>> {
    let year = checked_year(path)?;
    let report = tracked(&state, ViewKind::Stars, state.stars.report(year)).await?;
    Ok(Json(report))
}

/// GET /api/stars/:year/grid
///
/// Locally computed grid and star meanings; never calls the model.
pub async fn star_grid(path: Result<Path<i32>, PathRejection>) -> ApiResult<Json<StarGridView>> {
    let year = checked_year(path)?;
    Ok(Json(StarGridView::for_year(year)))
}

pub fn star_routes() -> Router<AppState> {
    Router::new()
        .route("/api/stars/:year", get(star_report))
        .route("/api/stars/:year/grid", get(star_grid))
}
