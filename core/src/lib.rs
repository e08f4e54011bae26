#![forbid(unsafe_code)]
//! Core primitives for FaceVault.
//!
//! Holds the persisted set of enrolled face samples, the identity operations
//! on it, and the cosine-similarity lookup used for recognition.

pub mod matcher;
pub mod persistence;
pub mod pipeline;
pub mod record;
pub mod registry;
pub mod vector;

pub use matcher::{best_match, FaceMatch, DEFAULT_MATCH_THRESHOLD};
pub use persistence::{
    load_faces, save_faces, LoadOutcome, PersistenceError, SaveOptions, DEFAULT_DB_FILENAME,
};
pub use pipeline::{
    ArchiveCategory, ArchiveOutcome, BoundingBox, DirectoryArchiver, EmbeddingExtractor,
    Extraction, ExtractorError, FacePipeline, ImageArchiver, NoopArchiver, PipelineError,
    Recognition, Registration,
};
pub use record::{summarize, FaceRecord, Identity, IdentitySummary, ValidationError};
pub use registry::{EnrollReceipt, FaceRegistry, RegistryConfig, RegistryError};
pub use vector::{dot_product, euclidean_norm, normalize, VectorError};
