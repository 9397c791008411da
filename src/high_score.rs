//! Best score on this machine: one integer in a small text file, read once
//! at start-up.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const FILE_NAME: &str = ".galaxy_shooter_score";

/// Default location: the platform data dir, falling back to `$HOME`, then
/// the working directory.
pub fn default_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("galaxy_shooter").join("high_score"))
        .or_else(|| dirs::home_dir().map(|home| home.join(FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(FILE_NAME))
}

/// Missing or garbled files read as 0.
pub fn load(path: &Path) -> u32 {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

pub fn save(path: &Path, score: u32) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, score.to_string())
}

/// Persist `score` if it beats `best`; returns the new best.
pub fn record(path: &Path, best: u32, score: u32) -> u32 {
    if score <= best {
        return best;
    }
    match save(path, score) {
        Ok(()) => log::info!("New high score {score} written to {}", path.display()),
        Err(e) => log::warn!("Could not write high score to {}: {e}", path.display()),
    }
    score
}
