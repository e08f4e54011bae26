use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use crate::matcher::{best_match, FaceMatch};
use crate::persistence::{
    load_faces, save_faces, LoadOutcome, PersistenceError, SaveOptions, DEFAULT_DB_FILENAME,
};
use crate::record::{
    normalize_personnel_id, summarize, FaceRecord, Identity, IdentitySummary, ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub path: PathBuf,
    pub sync_on_write: bool,
    /// Pins the embedding dimension; when `None` the first enrolled sample
    /// fixes it.
    pub expected_dimension: Option<usize>,
}

impl RegistryConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync_on_write: true,
            expected_dimension: None,
        }
    }

    pub fn in_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(DEFAULT_DB_FILENAME))
    }

    fn save_options(&self) -> SaveOptions {
        SaveOptions {
            sync_on_write: self.sync_on_write,
        }
    }
}

#[derive(Debug)]
pub enum RegistryError {
    Validation(ValidationError),
    Persistence(PersistenceError),
    LockPoisoned,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(error) => write!(f, "validation error: {error}"),
            Self::Persistence(error) => write!(f, "persistence error: {error}"),
            Self::LockPoisoned => write!(f, "face registry lock poisoned"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(error) => Some(error),
            Self::Persistence(error) => Some(error),
            Self::LockPoisoned => None,
        }
    }
}

impl From<ValidationError> for RegistryError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistenceError> for RegistryError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollReceipt {
    pub identity: Identity,
    /// Samples held by the identity after this enrollment.
    pub sample_count: usize,
}

/// Shared handle over the persisted face document.
///
/// Readers work on an immutable snapshot. Every mutation holds `write_lock`
/// across read-modify-write-persist and publishes the new snapshot only once
/// the document has been written, so a failed write changes nothing.
#[derive(Debug)]
pub struct FaceRegistry {
    config: RegistryConfig,
    snapshot: RwLock<Arc<Vec<FaceRecord>>>,
    write_lock: Mutex<()>,
}

impl FaceRegistry {
    /// Loads the document at `config.path`, creating it when missing.
    pub fn open(config: RegistryConfig) -> Result<Self, PersistenceError> {
        let records = load_logged(&config)?;
        Ok(Self {
            config,
            snapshot: RwLock::new(Arc::new(records)),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Returns the current record set without copying it.
    pub fn snapshot(&self) -> Result<Arc<Vec<FaceRecord>>, RegistryError> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| RegistryError::LockPoisoned)?;
        Ok(Arc::clone(&snapshot))
    }

    pub fn len(&self) -> Result<usize, RegistryError> {
        Ok(self.snapshot()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.snapshot()?.is_empty())
    }

    /// Dimension new enrollments must have, if one is fixed yet.
    pub fn dimension(&self) -> Result<Option<usize>, RegistryError> {
        if let Some(expected) = self.config.expected_dimension {
            return Ok(Some(expected));
        }
        Ok(self.snapshot()?.first().map(FaceRecord::dimension))
    }

    pub fn list(&self) -> Result<Vec<FaceRecord>, RegistryError> {
        Ok(self.snapshot()?.as_ref().clone())
    }

    pub fn summarize(&self) -> Result<Vec<IdentitySummary>, RegistryError> {
        Ok(summarize(&self.snapshot()?))
    }

    pub fn best_match(
        &self,
        query: &[f32],
        threshold: f32,
    ) -> Result<Option<FaceMatch>, RegistryError> {
        Ok(best_match(&self.snapshot()?, query, threshold))
    }

    /// Normalizes `embedding` and appends it as a new sample. Re-enrolling an
    /// identity adds another sample.
    pub fn enroll(
        &self,
        name: &str,
        embedding: &[f32],
        personnel_id: Option<String>,
    ) -> Result<EnrollReceipt, RegistryError> {
        let record = FaceRecord::new(name, embedding, personnel_id)?;
        let expected_dimension = self.config.expected_dimension;

        self.mutate(move |records| {
            let expected =
                expected_dimension.or_else(|| records.first().map(FaceRecord::dimension));
            if let Some(expected) = expected {
                if record.dimension() != expected {
                    return Err(ValidationError::DimensionMismatch {
                        expected,
                        got: record.dimension(),
                    }
                    .into());
                }
            }

            let identity = record.identity();
            records.push(record);
            let sample_count = records
                .iter()
                .filter(|existing| identity.matches(existing))
                .count();
            tracing::debug!(%identity, sample_count, "enrolled face sample");
            Ok((
                EnrollReceipt {
                    identity,
                    sample_count,
                },
                true,
            ))
        })
    }

    pub fn clear(&self) -> Result<(), RegistryError> {
        self.mutate(|records| {
            let removed = records.len();
            records.clear();
            tracing::info!(removed, "cleared face registry");
            Ok(((), true))
        })
    }

    /// Rewrites the identity fields of every sample of `(old_name,
    /// old_personnel_id)`. Returns the number of samples changed; the document
    /// is only written when that is nonzero.
    pub fn rename(
        &self,
        old_name: &str,
        old_personnel_id: Option<&str>,
        new_name: &str,
        new_personnel_id: Option<String>,
    ) -> Result<usize, RegistryError> {
        if new_name.trim().is_empty() {
            return Err(ValidationError::BlankName.into());
        }
        let new_personnel_id = normalize_personnel_id(new_personnel_id);

        self.mutate(|records| {
            let mut changed = 0usize;
            for record in records
                .iter_mut()
                .filter(|record| record.belongs_to(old_name, old_personnel_id))
            {
                record.name = new_name.to_string();
                record.personnel_id = new_personnel_id.clone();
                changed += 1;
            }
            if changed > 0 {
                tracing::info!(old_name, new_name, changed, "renamed identity");
            }
            Ok((changed, changed > 0))
        })
    }

    /// Removes every sample of `(name, personnel_id)`. Returns the number
    /// removed; the document is only written when that is nonzero.
    pub fn delete(&self, name: &str, personnel_id: Option<&str>) -> Result<usize, RegistryError> {
        self.mutate(|records| {
            let before = records.len();
            records.retain(|record| !record.belongs_to(name, personnel_id));
            let removed = before - records.len();
            if removed > 0 {
                tracing::info!(name, removed, "deleted identity");
            }
            Ok((removed, removed > 0))
        })
    }

    /// Re-reads the document from disk, with the same recovery rules as
    /// [`FaceRegistry::open`]. Returns the number of samples loaded.
    pub fn reload(&self) -> Result<usize, RegistryError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RegistryError::LockPoisoned)?;
        let records = load_logged(&self.config)?;
        let count = records.len();
        self.publish(records)?;
        Ok(count)
    }

    fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut Vec<FaceRecord>) -> Result<(T, bool), RegistryError>,
    ) -> Result<T, RegistryError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RegistryError::LockPoisoned)?;

        let mut records = self.snapshot()?.as_ref().clone();
        let (output, dirty) = apply(&mut records)?;
        if dirty {
            if let Err(error) = save_faces(&self.config.path, &records, self.config.save_options())
            {
                tracing::error!(
                    path = %self.config.path.display(),
                    %error,
                    "failed to persist face document"
                );
                return Err(error.into());
            }
            self.publish(records)?;
        }
        Ok(output)
    }

    fn publish(&self, records: Vec<FaceRecord>) -> Result<(), RegistryError> {
        let mut snapshot = self
            .snapshot
            .write()
            .map_err(|_| RegistryError::LockPoisoned)?;
        *snapshot = Arc::new(records);
        Ok(())
    }
}

fn load_logged(config: &RegistryConfig) -> Result<Vec<FaceRecord>, PersistenceError> {
    let path = config.path.display();
    let outcome = load_faces(&config.path, config.save_options())?;
    match &outcome {
        LoadOutcome::Loaded(records) => {
            tracing::info!(%path, samples = records.len(), "loaded face document");
        }
        LoadOutcome::Initialized => {
            tracing::info!(%path, "created empty face document");
        }
        LoadOutcome::Recovered { reason } => {
            tracing::warn!(%path, %reason, "face document unreadable; starting empty");
        }
    }
    Ok(outcome.into_records())
}
