use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::series::{project_aligned, project_series, AlignedReading, SeriesTriple};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct AlignedResponse {
    pub readings: Vec<AlignedReading>,
}

pub(crate) async fn get_series(State(state): State<AppState>) -> AppResult<Json<SeriesTriple>> {
    let feeds = state
        .thingspeak
        .fetch_feeds()
        .await
        .map_err(AppError::upstream)?;
    Ok(Json(project_series(&feeds, &state.fields)))
}

pub(crate) async fn get_aligned(State(state): State<AppState>) -> AppResult<Json<AlignedResponse>> {
    let feeds = state
        .thingspeak
        .fetch_feeds()
        .await
        .map_err(AppError::upstream)?;
    Ok(Json(AlignedResponse {
        readings: project_aligned(&feeds, &state.fields),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/data", get(get_series))
        .route("/data/aligned", get(get_aligned))
}
