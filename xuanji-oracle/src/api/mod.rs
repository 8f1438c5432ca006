//! HTTP API handlers for xuanji-oracle

pub mod bazi;
pub mod design;
pub mod floor_plan;
pub mod health;
pub mod horoscope;
pub mod stars;
pub mod store;
pub mod views;

pub use bazi::bazi_routes;
pub use design::design_routes;
pub use floor_plan::floor_plan_routes;
pub use health::health_routes;
pub use horoscope::horoscope_routes;
pub use stars::star_routes;
pub use store::store_routes;
pub use views::view_routes;

use crate::services::GenerationError;
use crate::view_state::ViewKind;
use crate::{ApiError, ApiResult, AppState};
use serde::Serialize;
use std::future::Future;

/// Run one generation under a view's state machine
///
/// **Algorithm:**
/// 1. Claim the view (409 if it is already loading)
/// 2. Await the generator
/// 3. Record `Ready(data)` or `Failed(message)`; superseded outcomes are dropped
///
/// If the handler future is dropped while awaiting, the ticket marks the view failed.
pub(crate) async fn tracked<T, F>(state: &AppState, view: ViewKind, work: F) -> ApiResult<T>
where
    T: Serialize,
    F: Future<Output = Result<T, GenerationError>>,
{
    let ticket = state.views.begin(view)?;

    match work.await {
        Ok(value) => {
            let data = serde_json::to_value(&value)?;
            ticket.complete(data);
            Ok(value)
        }
        Err(e) => {
            let err = ApiError::from(e);
            if err.status().is_server_error() {
                *state.last_error.write().await = Some(err.to_string());
            }
            ticket.fail(err.to_string());
            Err(err)
        }
    }
}
