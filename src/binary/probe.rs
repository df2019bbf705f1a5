//! Cheap filesystem check for candidate binaries.

use std::fs;
use std::path::Path;

/// Whether `path` names a non-empty regular file.
///
/// Symlinks are followed, so a dangling link is rejected. Execute permission and
/// binary format are not checked; that is left to verification. Never fails:
/// any I/O error counts as "not executable".
pub fn is_executable(path: impl AsRef<Path>) -> bool {
    match fs::metadata(path.as_ref()) {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}
