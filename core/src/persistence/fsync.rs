use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::PersistenceError;

pub(super) fn ensure_parent_dir(path: &Path) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub(super) fn write_file(path: &Path, bytes: &[u8], sync: bool) -> Result<(), PersistenceError> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    if sync {
        file.sync_all()?;
    }
    Ok(())
}

#[cfg(unix)]
pub(super) fn sync_parent_dir(path: &Path) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        File::open(parent)?.sync_all()?;
    }
    Ok(())
}

// Directories cannot be opened for syncing on every platform.
#[cfg(not(unix))]
pub(super) fn sync_parent_dir(_path: &Path) -> Result<(), PersistenceError> {
    Ok(())
}
