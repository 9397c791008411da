mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use galaxy_shooter::entities::ControlIntent;
use galaxy_shooter::high_score;
use galaxy_shooter::score_store::{JsonFileBackend, Leaderboard, ScoreStore};
use galaxy_shooter::{GameConfig, GameSession, Phase, SessionIdentity};

use display::{Banner, Hud};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// Leaderboard rows shown on the title screen
const MENU_TOP_SCORES: usize = 5;

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// Frames between automatic shots while Space stays down (≈5 shots/sec).
const FIRE_COOLDOWN: u32 = 12;

/// Frames a press or repeat keeps a key down.  Terminals without release
/// events rely on OS key repeat (≥ 15 Hz) to refresh it inside ≈133 ms.
const HOLD_WINDOW: u64 = 8;

/// Still down as of `frame`?
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "galaxy_shooter")]
#[command(about = "Descending-wave arcade shooter for the terminal")]
struct Args {
    /// Pilot name recorded with each score
    #[arg(long, default_value = "")]
    name: String,

    /// Student identifier recorded with each score
    #[arg(long = "student-id", default_value = "")]
    student_id: String,

    /// JSON file overriding gameplay tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Local score backup file
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Shared leaderboard file; saves count as durable only when this is set
    #[arg(long = "shared-scores")]
    shared_scores: Option<PathBuf>,

    /// High-score file (defaults to the platform data directory)
    #[arg(long = "high-score-file")]
    high_score_file: Option<PathBuf>,

    /// Write logs here (the terminal itself is busy drawing the game)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Seed the RNG for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn build_store(args: &Args) -> Arc<dyn ScoreStore> {
    let backup = args
        .scores
        .clone()
        .unwrap_or_else(|| high_score::default_path().with_file_name("scores.json"));
    match &args.shared_scores {
        Some(shared) => Arc::new(Leaderboard::with_durable(
            backup,
            Box::new(JsonFileBackend::new(shared)),
        )),
        None => Arc::new(Leaderboard::local_only(backup)),
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    high_score: u32,
    identity: &SessionIdentity,
    store: &dyn ScoreStore,
) -> std::io::Result<MenuResult> {
    let top_scores = store.load_scores(MENU_TOP_SCORES);
    display::draw_menu(out, high_score, identity, &top_scores)?;

    loop {
        let Ok(event) = rx.recv() else {
            // Input thread is gone; nothing can start a game any more
            return Ok(MenuResult::Quit);
        };
        if let Event::Key(KeyEvent { code, kind, modifiers, .. }) = event {
            if kind == KeyEventKind::Release {
                continue;
            }
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Play until the user leaves.  `Ok(true)` quits the program, `Ok(false)`
/// returns to the title menu.
///
/// Held keys (move, fire) are tracked per frame in `key_frame` and folded
/// into one `ControlIntent`, so moving and firing combine.  Pause, restart
/// and quit act on the press itself.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut GameSession<Hud>,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
    clock: Instant,
    high_score_path: &Path,
) -> std::io::Result<bool> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut fire_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let mut overlay_drawn: Option<(Phase, Banner)> = None;
    let mut score_recorded = false;

    session.observer_mut().banner = Banner::None;
    session.start(now_ms(clock));

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let mut intent = ControlIntent::default();

        // ── Input ─────────────────────────────────────────────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            if session.phase() != Phase::GameOver {
                                return Ok(true);
                            }
                            // The menu lists this run, so its save must land first
                            session.wait_for_save();
                            return Ok(false);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => intent.pause = true,
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if session.phase() == Phase::GameOver =>
                        {
                            session.observer_mut().banner = Banner::None;
                            session.restart(now_ms(clock));
                            score_recorded = false;
                            key_frame.clear();
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Held-key intent ───────────────────────────────────────────────────
        intent.left = is_held(&key_frame, &KeyCode::Left, frame)
            || is_held(&key_frame, &KeyCode::Char('a'), frame)
            || is_held(&key_frame, &KeyCode::Char('A'), frame);
        intent.right = is_held(&key_frame, &KeyCode::Right, frame)
            || is_held(&key_frame, &KeyCode::Char('d'), frame)
            || is_held(&key_frame, &KeyCode::Char('D'), frame);
        if fire_cooldown == 0 && is_held(&key_frame, &KeyCode::Char(' '), frame) {
            intent.fire = true;
            fire_cooldown = FIRE_COOLDOWN;
        }
        fire_cooldown = fire_cooldown.saturating_sub(1);

        let advanced = session.frame(&intent, now_ms(clock), rng);

        if session.phase() == Phase::GameOver && !score_recorded {
            let hud = session.observer_mut();
            hud.high_score = high_score::record(high_score_path, hud.high_score, hud.score);
            score_recorded = true;
        }

        if advanced {
            display::render_frame(out, session)?;
            overlay_drawn = None;
        } else {
            // Paused / stage clear / game over: keep the last frame and
            // draw the overlay once on top of it
            let overlay = (session.phase(), session.observer().banner);
            if overlay_drawn != Some(overlay) {
                display::render_overlay(out, session)?;
                overlay_drawn = Some(overlay);
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

fn now_ms(clock: Instant) -> u64 {
    clock.elapsed().as_millis() as u64
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let store = build_store(&args);
    let high_score_path = args
        .high_score_file
        .clone()
        .unwrap_or_else(high_score::default_path);
    let identity = SessionIdentity {
        player_name: args.name.clone(),
        student_id: args.student_id.clone(),
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ask for press/repeat/release kinds; unsupported terminals just refuse
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread; the loops only drain the channel
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let hud = Hud {
        high_score: high_score::load(&high_score_path),
        ..Hud::default()
    };
    let mut session = GameSession::new(config, identity, Arc::clone(&store), hud, &mut rng);

    let result = run(
        &mut out,
        &rx,
        &mut session,
        store.as_ref(),
        &mut rng,
        &high_score_path,
    );

    // Restore the terminal even when the loop failed
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    // A score save may still be in flight; let it land before exiting
    session.wait_for_save();

    result.context("terminal i/o failed")
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &mut GameSession<Hud>,
    store: &dyn ScoreStore,
    rng: &mut StdRng,
    high_score_path: &Path,
) -> std::io::Result<()> {
    let clock = Instant::now();

    loop {
        let high_score = session.observer().high_score;
        match show_menu(out, rx, high_score, session.identity(), store)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                let quit = game_loop(out, session, rx, rng, clock, high_score_path)?;
                if quit {
                    break;
                }
            }
        }
    }
    Ok(())
}
