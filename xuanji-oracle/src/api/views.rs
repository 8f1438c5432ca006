//! View state inspection and reset

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::view_state::{ViewKind, ViewState};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub view: ViewKind,
    #[serde(flatten)]
    pub state: ViewState,
}

fn view_kind(key: &str) -> ApiResult<ViewKind> {
    ViewKind::from_key(key).ok_or_else(|| ApiError::NotFound(format!("Unknown view: {}", key)))
}

/// GET /api/views/:view
pub async fn get_view(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<ViewResponse>> {
    let view = view_kind(&key)?;
    Ok(Json(ViewResponse {
        view,
        state: state.views.get(view),
    }))
}

/// DELETE /api/views/:view
///
/// Returns the view to idle; a request still in flight is superseded.
pub async fn reset_view(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<ViewResponse>> {
    let view = view_kind(&key)?;
    state.views.reset(view);
    Ok(Json(ViewResponse {
        view,
        state: ViewState::Idle,
    }))
}

pub fn view_routes() -> Router<AppState> {
    Router::new().route("/api/views/:view", get(get_view).delete(reset_view))
}
