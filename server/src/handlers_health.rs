use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::Json;

use crate::errors::ApiError;
use crate::handler_utils::read_registry;
use crate::models::{LiveResponse, ReadyChecks, ReadyResponse};
use crate::state::AppState;

pub(crate) async fn live(State(state): State<AppState>) -> Json<LiveResponse> {
    Json(LiveResponse {
        status: "live",
        uptime_ms: state.started_at.elapsed().as_millis() as u64,
    })
}

pub(crate) async fn ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, ApiError> {
    let storage_available = state.storage_available.load(Ordering::Relaxed);
    let (samples, dimension) = read_registry(&state, |registry| {
        Ok((registry.len()?, registry.dimension()?))
    })
    .await?;

    if !storage_available {
        return Err(ApiError::not_ready("face document is not writable"));
    }

    Ok(Json(ReadyResponse {
        status: "ready",
        uptime_ms: state.started_at.elapsed().as_millis() as u64,
        checks: ReadyChecks {
            storage_available,
            samples,
            dimension,
        },
    }))
}
