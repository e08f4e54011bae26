//! Enrollment and recognition flows over external collaborators.
//!
//! The core never decodes images. An [`EmbeddingExtractor`] turns image bytes
//! into an embedding, and an [`ImageArchiver`] keeps a copy for display. Archiving
//! is best effort: its outcome is reported, never raised.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::matcher::FaceMatch;
use crate::registry::{EnrollReceipt, FaceRegistry, RegistryError};

mod archiver;

pub use archiver::{sanitize_label, DirectoryArchiver};

/// Pixel-space face box as `(x1, y1)`-`(x2, y2)` corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Found {
        embedding: Vec<f32>,
        bbox: BoundingBox,
    },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// The bytes could not be decoded as an image.
    UndecodableImage(String),
    /// The model failed while producing an embedding.
    Backend(String),
}

impl fmt::Display for ExtractorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndecodableImage(message) => write!(f, "undecodable image: {message}"),
            Self::Backend(message) => write!(f, "embedding backend failed: {message}"),
        }
    }
}

impl Error for ExtractorError {}

pub trait EmbeddingExtractor: Send + Sync {
    fn extract(&self, image: &[u8]) -> Result<Extraction, ExtractorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveCategory {
    Registered,
    Recognized,
}

impl ArchiveCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Recognized => "recognized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Saved(String),
    Skipped { reason: String },
}

impl ArchiveOutcome {
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Saved(reference) => Some(reference),
            Self::Skipped { .. } => None,
        }
    }
}

pub trait ImageArchiver: Send + Sync {
    fn archive(
        &self,
        image: &[u8],
        bbox: BoundingBox,
        label: &str,
        category: ArchiveCategory,
    ) -> ArchiveOutcome;
}

/// Archiver that keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopArchiver;

impl ImageArchiver for NoopArchiver {
    fn archive(&self, _: &[u8], _: BoundingBox, _: &str, _: ArchiveCategory) -> ArchiveOutcome {
        ArchiveOutcome::Skipped {
            reason: "archiving disabled".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum PipelineError {
    NoFaceDetected,
    Extractor(ExtractorError),
    Registry(RegistryError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFaceDetected => write!(f, "no face detected"),
            Self::Extractor(error) => write!(f, "{error}"),
            Self::Registry(error) => write!(f, "{error}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoFaceDetected => None,
            Self::Extractor(error) => Some(error),
            Self::Registry(error) => Some(error),
        }
    }
}

impl From<ExtractorError> for PipelineError {
    fn from(value: ExtractorError) -> Self {
        Self::Extractor(value)
    }
}

impl From<RegistryError> for PipelineError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub receipt: EnrollReceipt,
    pub bbox: BoundingBox,
    pub archive: ArchiveOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recognition {
    NoFace,
    Unrecognized {
        bbox: BoundingBox,
    },
    Recognized {
        face_match: FaceMatch,
        bbox: BoundingBox,
        archive: ArchiveOutcome,
    },
}

pub struct FacePipeline<E, A> {
    registry: Arc<FaceRegistry>,
    extractor: E,
    archiver: A,
}

impl<E, A> FacePipeline<E, A>
where
    E: EmbeddingExtractor,
    A: ImageArchiver,
{
    pub fn new(registry: Arc<FaceRegistry>, extractor: E, archiver: A) -> Self {
        Self {
            registry,
            extractor,
            archiver,
        }
    }

    pub fn registry(&self) -> &FaceRegistry {
        &self.registry
    }

    /// Extracts the face in `image` and enrolls it under `name`.
    pub fn register(
        &self,
        name: &str,
        personnel_id: Option<String>,
        image: &[u8],
    ) -> Result<Registration, PipelineError> {
        let (embedding, bbox) = match self.extractor.extract(image)? {
            Extraction::Found { embedding, bbox } => (embedding, bbox),
            Extraction::NotFound => return Err(PipelineError::NoFaceDetected),
        };

        let receipt = self.registry.enroll(name, &embedding, personnel_id)?;
        let archive = self.archiver.archive(
            image,
            bbox,
            &receipt.identity.name,
            ArchiveCategory::Registered,
        );
        log_skipped(&archive);

        Ok(Registration {
            receipt,
            bbox,
            archive,
        })
    }

    /// Extracts the face in `image` and looks it up. A missing face is a
    /// normal outcome, not an error.
    pub fn recognize(&self, image: &[u8], threshold: f32) -> Result<Recognition, PipelineError> {
        let (embedding, bbox) = match self.extractor.extract(image)? {
            Extraction::Found { embedding, bbox } => (embedding, bbox),
            Extraction::NotFound => return Ok(Recognition::NoFace),
        };

        let Some(face_match) = self.registry.best_match(&embedding, threshold)? else {
            return Ok(Recognition::Unrecognized { bbox });
        };
        let archive =
            self.archiver
                .archive(image, bbox, &face_match.name, ArchiveCategory::Recognized);
        log_skipped(&archive);

        Ok(Recognition::Recognized {
            face_match,
            bbox,
            archive,
        })
    }
}

fn log_skipped(outcome: &ArchiveOutcome) {
    if let ArchiveOutcome::Skipped { reason } = outcome {
        tracing::debug!(%reason, "image archive skipped");
    }
}
