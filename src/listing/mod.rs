//! Directory listing with extension and name filters.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::FrameIoResult;

/// Extensions treated as video files.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "mov", "avi", "webm", "mpg", "mpeg", "m4v", "flv", "wmv", "3gp", "ts", "m2ts",
];

/// Extensions treated as still images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tif", "tiff", "gif"];

/// Listing filters.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ListingOpts {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Case-insensitive file name substring; `"*"` matches everything.
    pub filter: String,
    /// Keep at most this many paths after sorting; `0` keeps all.
    pub cap: usize,
}

impl Default for ListingOpts {
    fn default() -> Self {
        Self {
            recursive: false,
            filter: "*".to_owned(),
            cap: 0,
        }
    }
}

/// Result of a listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Listing {
    /// Absolute paths, sorted lexicographically.
    pub paths: Vec<PathBuf>,
    /// `paths.len()`.
    pub count: usize,
}

/// List files under `root/subfolder` whose extension is in `extensions` (lower-case, no dot).
///
/// A missing directory yields an empty listing. Paths are sorted before `cap` is applied.
pub fn list_files(
    root: &Path,
    subfolder: &str,
    extensions: &[&str],
    opts: &ListingOpts,
) -> FrameIoResult<Listing> {
    let target = std::path::absolute(root.join(subfolder))
        .with_context(|| format!("resolve listing directory under '{}'", root.display()))?;
    if !target.is_dir() {
        tracing::debug!(dir = %target.display(), "listing directory does not exist");
        return Ok(Listing::default());
    }

    let needle = (opts.filter != "*").then(|| opts.filter.to_lowercase());
    let max_depth = if opts.recursive { usize::MAX } else { 1 };

    let mut paths = Vec::new();
    for entry in walkdir::WalkDir::new(&target).min_depth(1).max_depth(max_depth) {
        let entry = entry.with_context(|| format!("walk '{}'", target.display()))?;
        if !entry.path().is_file() {
            continue;
        }
        if !has_extension(entry.path(), extensions) {
            continue;
        }
        if let Some(needle) = &needle {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if !name.contains(needle.as_str()) {
                continue;
            }
        }
        paths.push(entry.into_path());
    }

    paths.sort();
    if opts.cap > 0 {
        paths.truncate(opts.cap);
    }
    let count = paths.len();
    Ok(Listing { paths, count })
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|e| extensions.contains(&e.as_str()))
}

#[cfg(test)]
#[path = "../../tests/unit/listing/listing.rs"]
mod tests;
