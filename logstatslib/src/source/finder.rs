//! Log file discovery with glob pattern support.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::LogStatsError;
use crate::Result;

/// Find log files for a path argument.
///
/// The argument may be a concrete file path, a directory (all regular files
/// under it are collected, hidden directories skipped), or a glob pattern
/// (`logs/*.log`). A pattern that matches nothing yields an empty list — the
/// pass then simply accepts zero entries. The only hard error is a glob
/// pattern that does not parse.
pub fn find_log_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(pattern);

    let mut files = if path.is_dir() {
        collect_dir_files(path)
    } else {
        expand_glob(pattern)?
    };

    // Sort for deterministic output
    files.sort();
    Ok(files)
}

fn collect_dir_files(root: &Path) -> Vec<PathBuf> {
    let walker = WalkDir::new(root).follow_links(true).into_iter();

    walker
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if entry.file_type().is_dir() {
                let name = entry.file_name().to_str().unwrap_or("");
                return !name.starts_with('.');
            }
            true
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(%err, "skipping unreadable path while scanning for log files");
                None
            }
        })
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.path().to_path_buf())
        .collect()
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|err| LogStatsError::InvalidGlob {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })?;

    Ok(paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(%err, "skipping unreadable path while scanning for log files");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect())
}
