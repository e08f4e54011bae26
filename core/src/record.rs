use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vector::{normalize, VectorError};

/// One enrolled sample: an identity plus a unit-norm embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personnel_id: Option<String>,
    pub embedding: Vec<f32>,
}

impl FaceRecord {
    /// Validates the identity and normalizes `embedding` to unit length.
    pub fn new(
        name: impl Into<String>,
        embedding: &[f32],
        personnel_id: Option<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        let embedding = normalize(embedding)?;

        Ok(Self {
            name,
            personnel_id: normalize_personnel_id(personnel_id),
            embedding,
        })
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// Identity equality: names equal, and personnel ids equal where absent
    /// only matches absent.
    pub fn belongs_to(&self, name: &str, personnel_id: Option<&str>) -> bool {
        self.name == name && self.personnel_id.as_deref() == personnel_id
    }

    pub fn identity(&self) -> Identity {
        Identity {
            name: self.name.clone(),
            personnel_id: self.personnel_id.clone(),
        }
    }
}

/// The grouping key shared by every sample of one person.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personnel_id: Option<String>,
}

impl Identity {
    pub fn new(name: impl Into<String>, personnel_id: Option<String>) -> Self {
        Self {
            name: name.into(),
            personnel_id,
        }
    }

    pub fn matches(&self, record: &FaceRecord) -> bool {
        record.belongs_to(&self.name, self.personnel_id.as_deref())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.personnel_id {
            Some(personnel_id) => write!(f, "{} ({personnel_id})", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentitySummary {
    pub name: String,
    pub personnel_id: Option<String>,
    pub sample_count: usize,
}

/// Groups records by identity and counts samples.
///
/// Output is sorted by `(name, personnel_id)` with an absent personnel id
/// ordered as the empty string; when both appear for one name, absent comes
/// first.
pub fn summarize(records: &[FaceRecord]) -> Vec<IdentitySummary> {
    let mut grouped: BTreeMap<(&str, Option<&str>), usize> = BTreeMap::new();
    for record in records {
        *grouped
            .entry((record.name.as_str(), record.personnel_id.as_deref()))
            .or_insert(0) += 1;
    }

    grouped
        .into_iter()
        .map(|((name, personnel_id), sample_count)| IdentitySummary {
            name: name.to_string(),
            personnel_id: personnel_id.map(str::to_string),
            sample_count,
        })
        .collect()
}

/// Treats an empty personnel id as absent.
pub fn normalize_personnel_id(personnel_id: Option<String>) -> Option<String> {
    personnel_id.filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    BlankName,
    EmptyEmbedding,
    NonFiniteValue { index: usize },
    ZeroNorm,
    DimensionMismatch { expected: usize, got: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be empty"),
            Self::EmptyEmbedding => write!(f, "embedding must not be empty"),
            Self::NonFiniteValue { index } => {
                write!(f, "embedding contains non-finite value at index {index}")
            }
            Self::ZeroNorm => write!(f, "embedding has zero norm"),
            Self::DimensionMismatch { expected, got } => {
                write!(
                    f,
                    "invalid embedding dimension: expected {expected}, got {got}"
                )
            }
        }
    }
}

impl Error for ValidationError {}

impl From<VectorError> for ValidationError {
    fn from(value: VectorError) -> Self {
        match value {
            VectorError::EmptyVector => Self::EmptyEmbedding,
            VectorError::ZeroNorm => Self::ZeroNorm,
            VectorError::NonFinite { index, .. } => Self::NonFiniteValue { index },
            VectorError::DimensionMismatch { left, right } => Self::DimensionMismatch {
                expected: left,
                got: right,
            },
        }
    }
}

#[cfg(test)]
mod tests;
