//! Directory scanning for source photos.

use std::path::{Path, PathBuf};

use anyhow::{Result, ensure};
use walkdir::{DirEntry, WalkDir};

const SUPPORTED_EXTS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Return `true` if `path` has an extension the decoder handles.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTS.iter().any(|e| *e == ext)
        })
}

/// Recursively collect image files under `roots`, skipping hidden
/// dot-directories below each root. Results are sorted for a stable input
/// order.
pub fn scan_photos(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    for root in roots {
        ensure!(
            root.exists() && root.is_dir(),
            "photo path {} is not a directory",
            root.display()
        );
    }

    let mut out = Vec::new();
    for root in roots {
        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !should_skip_dir(e))
            .flatten()
        {
            let path = entry.path();
            if path.is_file() && is_supported_image(path) {
                out.push(path.to_path_buf());
            }
        }
    }
    out.sort();
    Ok(out)
}

fn should_skip_dir(entry: &DirEntry) -> bool {
    // Never skip the root; tempfile roots can be dot-dirs.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'))
}
