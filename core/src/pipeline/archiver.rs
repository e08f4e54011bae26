use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{ArchiveCategory, ArchiveOutcome, BoundingBox, ImageArchiver};

/// Stores submitted image bytes as-is under
/// `<root>/<category>/<label>/<timestamp>.<extension>`.
#[derive(Debug)]
pub struct DirectoryArchiver {
    root: PathBuf,
    url_prefix: String,
    extension: String,
    sequence: AtomicU64,
}

impl DirectoryArchiver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            url_prefix: "/data".to_string(),
            extension: "jpg".to_string(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn with_url_prefix(mut self, url_prefix: impl Into<String>) -> Self {
        self.url_prefix = url_prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    fn file_stem(&self) -> String {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}_{:09}_{sequence}",
            elapsed.as_secs(),
            elapsed.subsec_nanos()
        )
    }
}

impl ImageArchiver for DirectoryArchiver {
    fn archive(
        &self,
        image: &[u8],
        _bbox: BoundingBox,
        label: &str,
        category: ArchiveCategory,
    ) -> ArchiveOutcome {
        let label = sanitize_label(label);
        let folder = self.root.join(category.as_str()).join(&label);
        if let Err(error) = fs::create_dir_all(&folder) {
            return ArchiveOutcome::Skipped {
                reason: format!("failed to create {}: {error}", folder.display()),
            };
        }

        let file_name = format!("{}.{}", self.file_stem(), self.extension);
        let path = folder.join(&file_name);
        if let Err(error) = fs::write(&path, image) {
            return ArchiveOutcome::Skipped {
                reason: format!("failed to write {}: {error}", path.display()),
            };
        }

        ArchiveOutcome::Saved(format!(
            "{}/{}/{label}/{file_name}",
            self.url_prefix,
            category.as_str()
        ))
    }
}

/// Maps an identity label to a safe path segment: characters outside
/// `[A-Za-z0-9_-]` become `_`, leading and trailing `_`/`-` are dropped, and
/// an empty result becomes `unknown`.
pub fn sanitize_label(label: &str) -> String {
    let replaced: String = label
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = replaced.trim_matches(|ch| ch == '_' || ch == '-');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}
