//! Leaderboard persistence
//!
//! Every save lands in a local JSON backup first, then goes to the durable
//! backend when one is configured.  Failures never escape: a failed
//! durable save just reports `false`.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Extra attempts made by `Leaderboard::load_scores` before falling back
pub const DURABLE_LOAD_RETRIES: u32 = 2;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub player_name: String,
    pub score: u32,
    pub stage: u32,
    /// Unix timestamp (ms)
    pub timestamp: u64,
    /// ISO-8601 UTC rendering of `timestamp`
    #[serde(default)]
    pub date: String,
}

impl ScoreRecord {
    pub fn new(score: u32, stage: u32, player_name: &str, student_id: &str, timestamp: u64) -> Self {
        Self {
            student_id: student_id.to_string(),
            player_name: player_name.to_string(),
            score,
            stage,
            timestamp,
            date: iso8601_utc(timestamp),
        }
    }
}

/// What the game core needs from score persistence.
pub trait ScoreStore: Send + Sync {
    /// Persist a run.  Returns whether a durable (non-local) save
    /// succeeded; never fails past this boundary.
    fn save_score(&self, score: u32, stage: u32, player_name: &str, student_id: &str) -> bool;

    /// Best scores first, at most `limit` of them.
    fn load_scores(&self, limit: usize) -> Vec<ScoreRecord>;
}

/// A place records can be written to and read back from.
pub trait ScoreBackend: Send + Sync {
    fn push(&self, record: &ScoreRecord) -> Result<(), StoreError>;
    fn fetch(&self, limit: usize) -> Result<Vec<ScoreRecord>, StoreError>;
}

// ── JSON file backend ─────────────────────────────────────────────────────────

/// All records in one pretty-printed JSON array.  Reads and writes share
/// one lock, so a reader never sees a file mid-rewrite.
pub struct JsonFileBackend {
    path: PathBuf,
    file_lock: Mutex<()>,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.file_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("score file lock poisoned".to_string()))
    }

    /// Every stored record in insertion order; a missing file is empty.
    pub fn read_all(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        let _guard = self.lock()?;
        self.read_unlocked()
    }

    fn read_unlocked(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&json).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, records: &[ScoreRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl ScoreBackend for JsonFileBackend {
    fn push(&self, record: &ScoreRecord) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let mut records = self.read_unlocked()?;
        records.push(record.clone());
        self.write_all(&records)
    }

    fn fetch(&self, limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        let mut records = self.read_all()?;
        sort_by_score(&mut records);
        records.truncate(limit);
        Ok(records)
    }
}

// ── Leaderboard (local backup + optional durable store) ─────────────────────

pub struct Leaderboard {
    local: JsonFileBackend,
    durable: Option<Box<dyn ScoreBackend>>,
    max_retries: u32,
}

impl Leaderboard {
    /// Local-only leaderboard: every save reports `false`.
    pub fn local_only(backup_path: impl Into<PathBuf>) -> Self {
        Self {
            local: JsonFileBackend::new(backup_path),
            durable: None,
            max_retries: DURABLE_LOAD_RETRIES,
        }
    }

    pub fn with_durable(backup_path: impl Into<PathBuf>, durable: Box<dyn ScoreBackend>) -> Self {
        Self {
            local: JsonFileBackend::new(backup_path),
            durable: Some(durable),
            max_retries: DURABLE_LOAD_RETRIES,
        }
    }

    fn local_top(&self, limit: usize) -> Vec<ScoreRecord> {
        match self.local.fetch(limit) {
            Ok(records) => records,
            Err(e) => {
                log::error!("Local score backup unreadable: {e}");
                Vec::new()
            }
        }
    }
}

impl ScoreStore for Leaderboard {
    fn save_score(&self, score: u32, stage: u32, player_name: &str, student_id: &str) -> bool {
        let record = ScoreRecord::new(score, stage, player_name, student_id, now_unix_ms());

        match self.local.push(&record) {
            Ok(()) => log::info!("Score {score} saved locally"),
            Err(e) => log::error!("Local score backup failed: {e}"),
        }

        let Some(durable) = &self.durable else {
            log::warn!("No durable score store configured; saved locally only");
            return false;
        };

        match durable.push(&record) {
            Ok(()) => {
                log::info!("Score {score} saved to durable store");
                true
            }
            Err(e) => {
                log::error!("Durable score save failed: {e}");
                false
            }
        }
    }

    fn load_scores(&self, limit: usize) -> Vec<ScoreRecord> {
        let Some(durable) = &self.durable else {
            log::warn!("No durable score store configured; using local backup");
            return self.local_top(limit);
        };

        for attempt in 0..=self.max_retries {
            match durable.fetch(limit) {
                Ok(records) if records.is_empty() => {
                    log::warn!("Durable store returned no scores; using local backup");
                    return self.local_top(limit);
                }
                Ok(mut records) => {
                    sort_by_score(&mut records);
                    log::info!("Loaded {} scores from durable store", records.len());
                    return records;
                }
                Err(e) => {
                    log::error!("Durable score load failed (attempt {}): {e}", attempt + 1);
                }
            }
        }
        self.local_top(limit)
    }
}

// ── Detached saves ───────────────────────────────────────────────────────────

/// Outcome of a save running on a background thread.  Dropping it detaches
/// the save; it still runs to completion.
pub struct PendingSave {
    rx: Receiver<bool>,
}

impl PendingSave {
    /// `Some(durable)` once the save has finished, `None` while it runs.
    /// A save thread that died reports `Some(false)`.
    pub fn poll(&self) -> Option<bool> {
        match self.rx.try_recv() {
            Ok(durable) => Some(durable),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(false),
        }
    }

    /// Block until the save has finished.
    pub fn wait(self) -> bool {
        self.rx.recv().unwrap_or(false)
    }
}

/// Run `save_score` on its own thread and return immediately.
pub fn save_detached(
    store: Arc<dyn ScoreStore>,
    score: u32,
    stage: u32,
    player_name: String,
    student_id: String,
) -> PendingSave {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("score-save".to_string())
        .spawn(move || {
            let durable = store.save_score(score, stage, &player_name, &student_id);
            // Receiver may already be gone; the save itself is what matters
            let _ = tx.send(durable);
        });
    if let Err(e) = spawned {
        log::error!("Could not start score save thread: {e}");
    }
    PendingSave { rx }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn sort_by_score(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| b.score.cmp(&a.score));
}

pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ` for a Unix timestamp in milliseconds.
pub fn iso8601_utc(timestamp_ms: u64) -> String {
    let secs = timestamp_ms / 1000;
    let millis = timestamp_ms % 1000;
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (hour, minute, second) = (rem / 3600, rem % 3600 / 60, rem % 60);

    // Days since 1970-01-01 to a proleptic Gregorian date
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };

    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{millis:03}Z")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_dates() {
        assert_eq!(iso8601_utc(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso8601_utc(951_782_400_000), "2000-02-29T00:00:00.000Z");
        assert_eq!(iso8601_utc(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn record_uses_camel_case() {
        let record = ScoreRecord::new(120, 3, "Ada", "S-1", 0);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"studentId\":\"S-1\""));
        assert!(json.contains("\"playerName\":\"Ada\""));
        assert!(json.contains("\"date\":\"1970-01-01T00:00:00.000Z\""));
    }
}
