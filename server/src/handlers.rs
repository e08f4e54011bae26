use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::errors::{map_json_rejection, ApiError};
use crate::handler_utils::{
    canonical_name, canonical_personnel_id, lookup_personnel_id, read_registry, resolve_threshold,
    validate_embedding, write_registry,
};
pub(crate) use crate::handlers_health::{live, ready};
use crate::models::{
    DeleteRequest, DeleteResponse, IdentitiesResponse, OkResponse, RecognizeRequest,
    RecognizeResponse, RegisterRequest, RegisterResponse, ReloadResponse, RenameRequest,
    RenameResponse, SamplesResponse,
};
use crate::state::AppState;

pub(crate) async fn register_face(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let Json(payload) = payload.map_err(map_json_rejection)?;
    let name = canonical_name(&payload.name)?;
    let personnel_id = canonical_personnel_id(payload.personnel_id);
    validate_embedding(&payload.embedding, &state.config)?;

    let receipt = write_registry(&state, move |registry| {
        registry.enroll(&name, &payload.embedding, personnel_id)
    })
    .await?;

    tracing::info!(
        identity = %receipt.identity,
        sample_count = receipt.sample_count,
        "face registered"
    );
    Ok(Json(RegisterResponse {
        ok: true,
        name: receipt.identity.name,
        personnel_id: receipt.identity.personnel_id,
        sample_count: receipt.sample_count,
    }))
}

pub(crate) async fn recognize_face(
    State(state): State<AppState>,
    payload: Result<Json<RecognizeRequest>, JsonRejection>,
) -> Result<Json<RecognizeResponse>, ApiError> {
    let Json(payload) = payload.map_err(map_json_rejection)?;
    validate_embedding(&payload.embedding, &state.config)?;
    let threshold = resolve_threshold(payload.threshold, &state.config)?;

    let found = read_registry(&state, move |registry| {
        registry.best_match(&payload.embedding, threshold)
    })
    .await?;

    let Some(found) = found else {
        return Ok(Json(RecognizeResponse {
            ok: true,
            ..RecognizeResponse::default()
        }));
    };
    Ok(Json(RecognizeResponse {
        ok: true,
        recognized: true,
        name: Some(found.name),
        personnel_id: found.personnel_id,
        score: Some(found.score),
    }))
}

pub(crate) async fn list_identities(
    State(state): State<AppState>,
) -> Result<Json<IdentitiesResponse>, ApiError> {
    let summary = read_registry(&state, |registry| registry.summarize()).await?;
    Ok(Json(IdentitiesResponse {
        ok: true,
        faces: summary.into_iter().map(Into::into).collect(),
    }))
}

pub(crate) async fn list_samples(
    State(state): State<AppState>,
) -> Result<Json<SamplesResponse>, ApiError> {
    let faces = read_registry(&state, |registry| registry.list()).await?;
    Ok(Json(SamplesResponse { ok: true, faces }))
}

pub(crate) async fn rename_identity(
    State(state): State<AppState>,
    payload: Result<Json<RenameRequest>, JsonRejection>,
) -> Result<Json<RenameResponse>, ApiError> {
    let Json(payload) = payload.map_err(map_json_rejection)?;
    let old_name = payload.old_name;
    let old_personnel_id = lookup_personnel_id(payload.old_personnel_id);
    let new_name = canonical_name(&payload.new_name)?;
    let new_personnel_id = canonical_personnel_id(payload.new_personnel_id);

    let changed = write_registry(&state, move |registry| {
        registry.rename(
            &old_name,
            old_personnel_id.as_deref(),
            &new_name,
            new_personnel_id,
        )
    })
    .await?;

    Ok(Json(RenameResponse { ok: true, changed }))
}

pub(crate) async fn delete_identity(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Json(payload) = payload.map_err(map_json_rejection)?;
    let name = payload.name;
    let personnel_id = lookup_personnel_id(payload.personnel_id);

    let removed = write_registry(&state, move |registry| {
        registry.delete(&name, personnel_id.as_deref())
    })
    .await?;

    Ok(Json(DeleteResponse { ok: true, removed }))
}

pub(crate) async fn clear_faces(
    State(state): State<AppState>,
) -> Result<Json<OkResponse>, ApiError> {
    write_registry(&state, |registry| registry.clear()).await?;
    Ok(Json(OkResponse { ok: true }))
}

pub(crate) async fn reload_faces(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, ApiError> {
    let samples = write_registry(&state, |registry| registry.reload()).await?;
    Ok(Json(ReloadResponse { ok: true, samples }))
}
