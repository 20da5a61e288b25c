//! Filesystem utilities for atomic operations.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Atomically rename a file, with fallback for platforms where rename fails if target exists.
///
/// On some platforms (notably Windows), `fs::rename` fails if the destination already exists.
/// The destination is removed and the rename retried; if that also fails the temp file is
/// cleaned up.
pub fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

/// Copy `source` to `destination` through a temp file in the destination directory.
///
/// Readers of `destination` see either the old file or the complete copy, never a
/// partial one. Returns the number of bytes copied.
pub fn copy_atomic(source: &Path, destination: &Path) -> io::Result<u64> {
    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?
        .as_nanos();
    let temp_path = parent.join(format!(".taxdesk-copy-{}.tmp", nanos));

    let bytes = match fs::copy(source, &temp_path) {
        Ok(bytes) => bytes,
        Err(err) => {
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }
    };
    rename_with_fallback(&temp_path, destination)?;
    Ok(bytes)
}
