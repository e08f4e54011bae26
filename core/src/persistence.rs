use std::error::Error;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::record::FaceRecord;

mod fsync;

use fsync::{ensure_parent_dir, sync_parent_dir, write_file};

pub const DEFAULT_DB_FILENAME: &str = "faces.json";

#[derive(Debug, Deserialize)]
struct FaceDocument {
    #[serde(default)]
    faces: Vec<FaceRecord>,
}

#[derive(Debug, Serialize)]
struct FaceDocumentRef<'a> {
    faces: &'a [FaceRecord],
}

#[derive(Debug)]
pub enum PersistenceError {
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Serde(error) => Some(error),
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// When true, the document and its directory are fsynced before returning.
    pub sync_on_write: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            sync_on_write: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The document existed and parsed.
    Loaded(Vec<FaceRecord>),
    /// The document was missing and an empty one was written.
    Initialized,
    /// The document could not be read or parsed; the store starts empty.
    Recovered { reason: String },
}

impl LoadOutcome {
    pub fn into_records(self) -> Vec<FaceRecord> {
        match self {
            Self::Loaded(records) => records,
            Self::Initialized | Self::Recovered { .. } => Vec::new(),
        }
    }
}

/// Reads the face document at `path`.
///
/// Read and parse failures never surface as errors: they yield
/// [`LoadOutcome::Recovered`] with an empty store and leave the file on disk
/// untouched. The only error is failing to create a missing document.
pub fn load_faces(path: &Path, options: SaveOptions) -> Result<LoadOutcome, PersistenceError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            save_faces(path, &[], options)?;
            return Ok(LoadOutcome::Initialized);
        }
        Err(error) => {
            return Ok(LoadOutcome::Recovered {
                reason: format!("failed to read face document: {error}"),
            })
        }
    };

    match serde_json::from_str::<FaceDocument>(&raw) {
        Ok(document) => Ok(LoadOutcome::Loaded(document.faces)),
        Err(error) => Ok(LoadOutcome::Recovered {
            reason: format!("failed to parse face document: {error}"),
        }),
    }
}

/// Replaces the face document at `path` with `records`.
///
/// The document is written to a sibling temp file and renamed over the
/// target, so readers never observe a truncated document.
pub fn save_faces(
    path: &Path,
    records: &[FaceRecord],
    options: SaveOptions,
) -> Result<(), PersistenceError> {
    ensure_parent_dir(path)?;

    let bytes = serde_json::to_vec_pretty(&FaceDocumentRef { faces: records })?;
    let temp_path = temp_path_for(path);
    write_file(&temp_path, &bytes, options.sync_on_write)?;
    if let Err(error) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(error.into());
    }
    if options.sync_on_write {
        sync_parent_dir(path)?;
    }
    Ok(())
}

/// Sibling temp file unique to this process and call, so concurrent writers
/// of one document never share a temp file.
fn temp_path_for(path: &Path) -> PathBuf {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_DB_FILENAME.to_string());
    path.with_file_name(format!(
        ".{file_name}.{}.{sequence}.tmp",
        std::process::id()
    ))
}
