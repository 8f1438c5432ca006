//! Horoscope endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use xuanji_almanac::{ForecastPeriod, ZodiacSign};

use super::tracked;
use crate::services::HoroscopeForecast;
use crate::view_state::ViewKind;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct HoroscopeRequest {
    /// English or Chinese sign name
    pub sign: String,
    #[serde(default)]
    pub period: ForecastPeriod,
}

/// POST /api/horoscope
pub async fn horoscope(
    State(state): State<AppState>,
    payload: Result<Json<HoroscopeRequest>, JsonRejection>,
) -> ApiResult<Json<HoroscopeForecast>> {
    let Json(request) = payload?;
    let sign = ZodiacSign::parse(&request.sign)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown zodiac sign: {}", request.sign)))?;

    let forecast = tracked(
        &state,
        ViewKind::Horoscope,
        state.horoscopes.forecast(sign, request.period),
    )
    .await?;
    Ok(Json(forecast))
}

pub fn horoscope_routes() -> Router<AppState> {
    Router::new().route("/api/horoscope", post(horoscope))
}
