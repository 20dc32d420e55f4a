//! Replay discovery
//!
//! Picks which replay dumps to analyze. Directory scanning is passed in as a
//! function so path resolution can be exercised without touching the disk.

use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("No replay directory configured (pass a replay path, --replay-dir or set [input].replay_dir)")]
    NoReplayDir,

    #[error("No *.{extension} replays found in {dir:?}")]
    NoReplays { dir: PathBuf, extension: String },

    #[error("IO error while scanning replays: {0}")]
    Io(#[from] io::Error),
}

/// The most recently modified replay dump in `dir` with the given extension
pub fn most_recent_replay(dir: &Path, extension: &str) -> Result<PathBuf, LocateError> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if !matches_extension || !entry.file_type()?.is_file() {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        match &newest {
            Some((best, _)) if *best >= modified => {}
            _ => newest = Some((modified, path)),
        }
    }

    match newest {
        Some((modified, path)) => {
            let modified: DateTime<Local> = modified.into();
            log::info!(
                "Most recent replay: {:?} (modified {})",
                path,
                modified.format("%Y-%m-%d %H:%M:%S")
            );
            Ok(path)
        }
        None => Err(LocateError::NoReplays {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        }),
    }
}

/// Explicit paths win; otherwise fall back to `locate` on the replay directory
pub fn resolve_replays<F>(
    explicit: &[PathBuf],
    replay_dir: Option<&Path>,
    locate: F,
) -> Result<Vec<PathBuf>, LocateError>
where
    F: FnOnce(&Path) -> Result<PathBuf, LocateError>,
{
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }

    let dir = replay_dir.ok_or(LocateError::NoReplayDir)?;
    Ok(vec![locate(dir)?])
}
