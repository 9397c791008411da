use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use galaxy_shooter::score_store::*;
use galaxy_shooter::StoreError;

use tempfile::TempDir;

/// Durable backend that is always down.
struct Offline {
    fetches: Arc<AtomicUsize>,
}

impl ScoreBackend for Offline {
    fn push(&self, _record: &ScoreRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn fetch(&self, _limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("offline".to_string()))
    }
}

fn record(score: u32) -> ScoreRecord {
    ScoreRecord::new(score, 1, "p", "s", 0)
}

#[test]
fn json_backend_reads_missing_file_as_empty() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("none.json"));
    assert!(backend.read_all().unwrap().is_empty());
    assert!(backend.fetch(5).unwrap().is_empty());
}

#[test]
fn json_backend_sorts_best_first_and_limits() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("nested").join("scores.json"));
    for score in [40, 90, 10, 70] {
        backend.push(&record(score)).unwrap();
    }

    let top: Vec<u32> = backend.fetch(3).unwrap().iter().map(|r| r.score).collect();
    assert_eq!(top, vec![90, 70, 40]);
    // Stored in insertion order
    let all: Vec<u32> = backend.read_all().unwrap().iter().map(|r| r.score).collect();
    assert_eq!(all, vec![40, 90, 10, 70]);
}

#[test]
fn json_backend_reports_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scores.json");
    fs::write(&path, "not json").unwrap();
    let err = JsonFileBackend::new(&path).read_all().unwrap_err();
    assert!(matches!(err, StoreError::Json { .. }));
}

#[test]
fn local_only_save_is_not_durable_but_is_kept() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backup.json");
    let board = Leaderboard::local_only(&path);

    assert!(!board.save_score(120, 3, "Ada", "S-1"));

    let loaded = board.load_scores(10);
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].score, 120);
    assert_eq!(loaded[0].stage, 3);
    assert_eq!(loaded[0].player_name, "Ada");
    assert_eq!(loaded[0].student_id, "S-1");
    assert!(loaded[0].date.ends_with('Z'));

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"playerName\": \"Ada\""));
}

#[test]
fn durable_save_reports_true() {
    let dir = TempDir::new().unwrap();
    let shared = dir.path().join("shared.json");
    let board = Leaderboard::with_durable(
        dir.path().join("backup.json"),
        Box::new(JsonFileBackend::new(&shared)),
    );

    assert!(board.save_score(50, 2, "", ""));
    assert!(board.save_score(80, 3, "", ""));

    let scores: Vec<u32> = board.load_scores(10).iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![80, 50]);
    assert_eq!(JsonFileBackend::new(&shared).read_all().unwrap().len(), 2);
}

#[test]
fn offline_durable_store_falls_back_to_the_backup() {
    let dir = TempDir::new().unwrap();
    let backup = dir.path().join("backup.json");
    let fetches = Arc::new(AtomicUsize::new(0));
    let board = Leaderboard::with_durable(
        &backup,
        Box::new(Offline {
            fetches: Arc::clone(&fetches),
        }),
    );

    assert!(!board.save_score(30, 1, "Bo", "S-2"));
    assert!(!board.save_score(60, 2, "Bo", "S-2"));
    assert!(backup.exists());

    let scores: Vec<u32> = board.load_scores(1).iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![60]);
    // One try plus the retries
    assert_eq!(fetches.load(Ordering::SeqCst), 1 + DURABLE_LOAD_RETRIES as usize);
}

#[test]
fn empty_durable_store_falls_back_to_the_backup() {
    let dir = TempDir::new().unwrap();
    let backup = dir.path().join("backup.json");
    JsonFileBackend::new(&backup).push(&record(25)).unwrap();
    let board = Leaderboard::with_durable(
        &backup,
        Box::new(JsonFileBackend::new(dir.path().join("shared.json"))),
    );

    let scores: Vec<u32> = board.load_scores(5).iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![25]);
}

#[test]
fn detached_save_reports_back() {
    let dir = TempDir::new().unwrap();
    let board: Arc<dyn ScoreStore> = Arc::new(Leaderboard::local_only(dir.path().join("b.json")));

    let pending = save_detached(Arc::clone(&board), 77, 4, "Cy".to_string(), String::new());
    assert!(!pending.wait());
    assert_eq!(board.load_scores(1)[0].score, 77);
}

#[test]
fn reads_never_see_a_half_written_file() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("scores.json"));

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for score in 0..200 {
                backend.push(&record(score)).unwrap();
            }
        });

        let mut seen = 0;
        for _ in 0..200 {
            let all = backend.read_all().unwrap();
            assert!(all.len() >= seen);
            seen = all.len();
            backend.fetch(5).unwrap();
        }
    });

    assert_eq!(backend.read_all().unwrap().len(), 200);
}
