//! Room design (image edit) endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::tracked;
use crate::services::ImagePayload;
use crate::view_state::ViewKind;
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignEditRequest {
    /// Data URL, or bare base64 with `mimeType`
    pub image: String,
    pub mime_type: Option<String>,
    pub instruction: String,
}

#[derive(Debug, Serialize)]
pub struct DesignEditResponse {
    /// `data:<mime>;base64,...`
    pub image: String,
}

/// POST /api/design/edit
pub async fn edit_room(
    State(state): State<AppState>,
    payload: Result<Json<DesignEditRequest>, JsonRejection>,
) -> ApiResult<Json<DesignEditResponse>> {
    let Json(request) = payload?;
    let image = ImagePayload::from_request(&request.image, request.mime_type.as_deref())?;

    let edited = tracked(
        &state,
        ViewKind::Design,
        state.designer.edit(&image, &request.instruction),
    )
    .await?;
    Ok(Json(DesignEditResponse { image: edited }))
}

pub fn design_routes() -> Router<AppState> {
    Router::new().route("/api/design/edit", post(edit_room))
}
