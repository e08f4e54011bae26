use facevault_core::{FaceRecord, IdentitySummary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) personnel_id: Option<String>,
    pub(crate) embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterResponse {
    pub(crate) ok: bool,
    pub(crate) name: String,
    pub(crate) personnel_id: Option<String>,
    pub(crate) sample_count: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecognizeRequest {
    pub(crate) embedding: Vec<f32>,
    #[serde(default)]
    pub(crate) threshold: Option<f32>,
}

#[derive(Debug, Serialize, Default)]
pub(crate) struct RecognizeResponse {
    pub(crate) ok: bool,
    pub(crate) recognized: bool,
    pub(crate) name: Option<String>,
    pub(crate) personnel_id: Option<String>,
    pub(crate) score: Option<f32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdentityEntry {
    pub(crate) name: String,
    pub(crate) personnel_id: Option<String>,
    pub(crate) samples: usize,
}

impl From<IdentitySummary> for IdentityEntry {
    fn from(value: IdentitySummary) -> Self {
        Self {
            name: value.name,
            personnel_id: value.personnel_id,
            samples: value.sample_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct IdentitiesResponse {
    pub(crate) ok: bool,
    pub(crate) faces: Vec<IdentityEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SamplesResponse {
    pub(crate) ok: bool,
    pub(crate) faces: Vec<FaceRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RenameRequest {
    pub(crate) old_name: String,
    #[serde(default)]
    pub(crate) old_personnel_id: Option<String>,
    pub(crate) new_name: String,
    #[serde(default)]
    pub(crate) new_personnel_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenameResponse {
    pub(crate) ok: bool,
    pub(crate) changed: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteRequest {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) personnel_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteResponse {
    pub(crate) ok: bool,
    pub(crate) removed: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct OkResponse {
    pub(crate) ok: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReloadResponse {
    pub(crate) ok: bool,
    pub(crate) samples: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct LiveResponse {
    pub(crate) status: &'static str,
    pub(crate) uptime_ms: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReadyChecks {
    pub(crate) storage_available: bool,
    pub(crate) samples: usize,
    pub(crate) dimension: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReadyResponse {
    pub(crate) status: &'static str,
    pub(crate) uptime_ms: u64,
    pub(crate) checks: ReadyChecks,
}
