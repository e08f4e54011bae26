use std::sync::atomic::Ordering;
use std::sync::Arc;

use facevault_core::{FaceRegistry, RegistryError};
use tokio::task;

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::state::AppState;

pub(crate) fn canonical_name(name: &str) -> Result<String, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid_argument("name is required"));
    }
    Ok(trimmed.to_string())
}

/// Trims a personnel id; blank ids are treated as absent.
pub(crate) fn canonical_personnel_id(personnel_id: Option<String>) -> Option<String> {
    personnel_id
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Lookup keys are compared exactly against stored identities; only an empty
/// id is read as absent.
pub(crate) fn lookup_personnel_id(personnel_id: Option<String>) -> Option<String> {
    personnel_id.filter(|value| !value.is_empty())
}

pub(crate) fn validate_embedding(embedding: &[f32], config: &AppConfig) -> Result<(), ApiError> {
    if embedding.len() > config.max_dimension {
        return Err(ApiError::invalid_argument(format!(
            "embedding dimension {} exceeds configured maximum {}",
            embedding.len(),
            config.max_dimension
        )));
    }
    Ok(())
}

pub(crate) fn resolve_threshold(
    threshold: Option<f32>,
    config: &AppConfig,
) -> Result<f32, ApiError> {
    let threshold = threshold.unwrap_or(config.match_threshold);
    if !threshold.is_finite() {
        return Err(ApiError::invalid_argument("threshold must be a finite number"));
    }
    Ok(threshold)
}

/// Runs a read-only registry call on the blocking pool.
pub(crate) async fn read_registry<T>(
    state: &AppState,
    operation: impl FnOnce(&FaceRegistry) -> Result<T, RegistryError> + Send + 'static,
) -> Result<T, ApiError>
where
    T: Send + 'static,
{
    Ok(spawn_registry_task(state, operation).await??)
}

/// Runs a mutating registry call on the blocking pool and tracks whether the
/// face document is still writable.
pub(crate) async fn write_registry<T>(
    state: &AppState,
    operation: impl FnOnce(&FaceRegistry) -> Result<T, RegistryError> + Send + 'static,
) -> Result<T, ApiError>
where
    T: Send + 'static,
{
    match spawn_registry_task(state, operation).await? {
        Ok(value) => {
            state.storage_available.store(true, Ordering::Relaxed);
            Ok(value)
        }
        Err(error @ RegistryError::Persistence(_)) => {
            state.storage_available.store(false, Ordering::Relaxed);
            tracing::error!(%error, "face document marked unwritable");
            Err(error.into())
        }
        Err(error) => Err(error.into()),
    }
}

async fn spawn_registry_task<T>(
    state: &AppState,
    operation: impl FnOnce(&FaceRegistry) -> Result<T, RegistryError> + Send + 'static,
) -> Result<Result<T, RegistryError>, ApiError>
where
    T: Send + 'static,
{
    let registry = Arc::clone(&state.registry);
    task::spawn_blocking(move || operation(&registry))
        .await
        .map_err(|_| ApiError::internal("face registry worker task failed"))
}
