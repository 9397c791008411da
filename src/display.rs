/// Terminal front end drawing: every crossterm call the game makes.
///
/// The playfield is scaled onto the terminal grid inside a border.  Game
/// entities arrive through the library renderer as coloured rectangles;
/// the HUD and overlays are drawn on top from the `Hud` observer state.

use std::io::{self, Write};

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use galaxy_shooter::entities::ColorTag;
use galaxy_shooter::geometry::Rect;
use galaxy_shooter::render::{self, RenderTarget};
use galaxy_shooter::score_store::ScoreRecord;
use galaxy_shooter::session::{GameObserver, GameSession, Phase, SessionIdentity};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_STAGE: Color = Color::Green;
const C_HUD_LIVES: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

fn terminal_color(tag: ColorTag) -> Color {
    match tag {
        ColorTag::Cyan => Color::Cyan,
        ColorTag::Yellow => Color::Yellow,
        ColorTag::Orange => Color::DarkYellow,
        ColorTag::Red => Color::Red,
        ColorTag::Green => Color::Green,
        ColorTag::White => Color::White,
    }
}

/// Stars are the only white entities; everything else is solid.
fn glyph(tag: ColorTag) -> &'static str {
    match tag {
        ColorTag::White => "·",
        _ => "█",
    }
}

pub fn display_name(identity: &SessionIdentity) -> (&str, &str) {
    let name = if identity.player_name.trim().is_empty() {
        "Unknown"
    } else {
        identity.player_name.as_str()
    };
    let id = if identity.student_id.trim().is_empty() {
        "N/A"
    } else {
        identity.student_id.as_str()
    };
    (name, id)
}

// ── HUD state (fed by the session's notifications) ────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Banner {
    #[default]
    None,
    StageClear(u32),
    /// `new_best` is judged against the best as it stood before this run
    GameOver { score: u32, stage: u32, new_best: bool },
}

#[derive(Debug, Default)]
pub struct Hud {
    pub score: u32,
    pub lives: u32,
    pub stage: u32,
    pub high_score: u32,
    pub banner: Banner,
}

impl GameObserver for Hud {
    fn score_changed(&mut self, score: u32) {
        self.score = score;
    }

    fn stage_changed(&mut self, stage: u32) {
        self.stage = stage;
    }

    fn lives_changed(&mut self, lives: u32) {
        self.lives = lives;
    }

    fn stage_clear_shown(&mut self, stage: u32) {
        self.banner = Banner::StageClear(stage);
    }

    fn stage_clear_hidden(&mut self) {
        self.banner = Banner::None;
    }

    fn game_over_shown(&mut self, score: u32, stage: u32) {
        let new_best = score > self.high_score;
        self.banner = Banner::GameOver { score, stage, new_best };
    }
}

// ── Terminal render target ────────────────────────────────────────────────────

/// Maps playfield units onto the bordered terminal area.
struct TerminalTarget<'a, W: Write> {
    out: &'a mut W,
    width: u16,
    height: u16,
    scale_x: f32,
    scale_y: f32,
    /// First queueing failure; reported once the frame is done
    error: Option<io::Error>,
}

impl<'a, W: Write> TerminalTarget<'a, W> {
    fn new(out: &'a mut W, width: u16, height: u16, field_w: f32, field_h: f32) -> Self {
        let cols = width.saturating_sub(2).max(1) as f32;
        let rows = height.saturating_sub(4).max(1) as f32;
        Self {
            out,
            width,
            height,
            scale_x: cols / field_w,
            scale_y: rows / field_h,
            error: None,
        }
    }

    fn cols(&self) -> i32 {
        self.width.saturating_sub(2) as i32
    }

    fn rows(&self) -> i32 {
        self.height.saturating_sub(4) as i32
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            self.error.get_or_insert(e);
        }
    }

    fn finish(self) -> io::Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn queue_cells(&mut self, rect: Rect, color: ColorTag) -> io::Result<()> {
        let c0 = (rect.x * self.scale_x).floor() as i32;
        let c1 = ((rect.right() * self.scale_x).ceil() as i32 - 1).max(c0);
        let r0 = (rect.y * self.scale_y).floor() as i32;
        let r1 = ((rect.bottom() * self.scale_y).ceil() as i32 - 1).max(r0);

        let (c0, c1) = (c0.max(0), c1.min(self.cols() - 1));
        let (r0, r1) = (r0.max(0), r1.min(self.rows() - 1));
        if c0 > c1 || r0 > r1 {
            return Ok(());
        }

        let run = glyph(color).repeat((c1 - c0 + 1) as usize);
        self.out.queue(style::SetForegroundColor(terminal_color(color)))?;
        for row in r0..=r1 {
            self.out.queue(cursor::MoveTo(1 + c0 as u16, 2 + row as u16))?;
            self.out.queue(Print(&run))?;
        }
        Ok(())
    }
}

impl<W: Write> RenderTarget for TerminalTarget<'_, W> {
    fn begin_frame(&mut self) {
        let cleared = self
            .out
            .queue(terminal::Clear(terminal::ClearType::All))
            .map(|_| ());
        self.record(cleared);
        let border = draw_border(&mut *self.out, self.width, self.height);
        self.record(border);
    }

    fn fill_rect(&mut self, rect: Rect, color: ColorTag) {
        let result = self.queue_cells(rect, color);
        self.record(result);
    }

    fn end_frame(&mut self) {}
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one complete frame: world, HUD, and any active overlay.
pub fn render_frame<W: Write>(out: &mut W, session: &GameSession<Hud>) -> io::Result<()> {
    let (width, height) = terminal::size()?;
    let config = session.config();

    let mut target = TerminalTarget::new(
        out,
        width,
        height,
        config.playfield_width,
        config.playfield_height,
    );
    render::draw(&mut target, session.world());
    target.finish()?;

    draw_hud(out, session.observer(), session.identity(), width)?;
    draw_controls_hint(out, height)?;
    draw_overlay(out, session, width, height)?;

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()
}

/// Draw only the overlay for the current phase over whatever frame is
/// already on screen.
pub fn render_overlay<W: Write>(out: &mut W, session: &GameSession<Hud>) -> io::Result<()> {
    let (width, height) = terminal::size()?;
    draw_hud(out, session.observer(), session.identity(), width)?;
    draw_overlay(out, session, width, height)?;
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Top bar on row 1, bottom bar two rows above the hint line
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (top row) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    hud: &Hud,
    identity: &SessionIdentity,
    width: u16,
) -> io::Result<()> {
    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;

    // Left: score and best
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    let best = hud.high_score.max(hud.score);
    out.queue(Print(format!("Score:{:>6}  Hi:{:>6}", hud.score, best)))?;

    // Centre: stage and pilot
    let (name, _) = display_name(identity);
    let stage_str = format!("[ STAGE {} ] {}", hud.stage, name);
    let sx = (width / 2).saturating_sub(stage_str.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(sx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_STAGE))?;
    out.queue(Print(&stage_str))?;

    // Right: lives
    let lives_str = format!("Lives:{}", "♥".repeat(hud.lives as usize));
    let rx = width.saturating_sub(lives_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Fire   P : Pause   Q : Quit"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_overlay<W: Write>(
    out: &mut W,
    session: &GameSession<Hud>,
    width: u16,
    height: u16,
) -> io::Result<()> {
    let hud = session.observer();
    match (session.phase(), hud.banner) {
        (Phase::GameOver, Banner::GameOver { score, stage, new_best }) => {
            draw_game_over(out, hud, score, stage, new_best, width, height)
        }
        (Phase::StageClear, Banner::StageClear(stage)) => {
            let next = format!("Get ready for stage {stage}");
            draw_box(
                out,
                &[
                    ("╔════════════════════╗", Color::Green),
                    ("║   STAGE  CLEAR!    ║", Color::Green),
                    ("╚════════════════════╝", Color::Green),
                    (next.as_str(), Color::White),
                ],
                width,
                height,
            )
        }
        (Phase::Paused, _) => draw_box(
            out,
            &[
                ("╔════════════════════╗", Color::Cyan),
                ("║       PAUSED       ║", Color::Cyan),
                ("╚════════════════════╝", Color::Cyan),
                ("P - Resume  Q - Quit", Color::White),
            ],
            width,
            height,
        ),
        _ => Ok(()),
    }
}

fn draw_box<W: Write>(
    out: &mut W,
    lines: &[(&str, Color)],
    width: u16,
    height: u16,
) -> io::Result<()> {
    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

fn draw_game_over<W: Write>(
    out: &mut W,
    hud: &Hud,
    score: u32,
    stage: u32,
    new_best: bool,
    width: u16,
    height: u16,
) -> io::Result<()> {
    let score_line = format!("Final Score: {:>6}", score);
    let stage_line = format!("Reached Stage: {:>4}", stage);
    let best_line = if new_best {
        format!("★ NEW BEST: {:>6} ★", score)
    } else {
        format!("Best Score:  {:>6}", hud.high_score)
    };
    let best_color = if new_best { Color::Yellow } else { Color::DarkGrey };

    draw_box(
        out,
        &[
            ("╔════════════════════╗", Color::Red),
            ("║    GAME  OVER      ║", Color::Red),
            ("╚════════════════════╝", Color::Red),
            (score_line.as_str(), Color::Yellow),
            (stage_line.as_str(), Color::Green),
            (best_line.as_str(), best_color),
            ("R - Play Again  Q - Menu", Color::White),
        ],
        width,
        height,
    )
}

// ── Menu ──────────────────────────────────────────────────────────────────────

pub fn draw_menu<W: Write>(
    out: &mut W,
    high_score: u32,
    identity: &SessionIdentity,
    top_scores: &[ScoreRecord],
) -> io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;
    let left = cx.saturating_sub(14);

    let title = "★  GALAXY  SHOOTER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(8),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if high_score > 0 {
        let hs_str = format!("Best Score: {}", high_score);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs_str.chars().count() as u16 / 2),
            cy.saturating_sub(7),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    let (name, id) = display_name(identity);
    out.queue(cursor::MoveTo(left, cy.saturating_sub(5)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(format!("Pilot: {name}  ({id})")))?;

    out.queue(cursor::MoveTo(left, cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Top pilots:"))?;
    if top_scores.is_empty() {
        out.queue(cursor::MoveTo(left, cy.saturating_sub(2)))?;
        out.queue(Print("  no scores yet"))?;
    }
    for (i, record) in top_scores.iter().enumerate() {
        let pilot = if record.player_name.is_empty() {
            "Unknown"
        } else {
            record.player_name.as_str()
        };
        out.queue(cursor::MoveTo(left, cy.saturating_sub(2) + i as u16))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(format!(
            "{:>2}. {:<12} {:>6}  stage {}",
            i + 1,
            pilot,
            record.score,
            record.stage
        )))?;
    }

    out.queue(cursor::MoveTo(left, cy + 5))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("[Enter] Start   [Q] Quit"))?;

    out.queue(cursor::MoveTo(left, cy + 7))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("← → / A D : Move   SPACE : Fire   P : Pause"))?;

    out.queue(style::ResetColor)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hud_with_best(high_score: u32) -> Hud {
        Hud {
            high_score,
            ..Hud::default()
        }
    }

    #[test]
    fn tying_the_best_is_not_a_new_best() {
        let mut hud = hud_with_best(150);
        hud.game_over_shown(150, 4);
        assert_eq!(hud.banner, Banner::GameOver { score: 150, stage: 4, new_best: false });
    }

    #[test]
    fn beating_the_best_is_a_new_best() {
        let mut hud = hud_with_best(150);
        hud.game_over_shown(151, 4);
        assert_eq!(hud.banner, Banner::GameOver { score: 151, stage: 4, new_best: true });
    }

    #[test]
    fn first_ever_zero_score_is_not_a_best() {
        let mut hud = hud_with_best(0);
        hud.game_over_shown(0, 1);
        assert_eq!(hud.banner, Banner::GameOver { score: 0, stage: 1, new_best: false });
    }

    #[test]
    fn empty_identity_shows_placeholders() {
        assert_eq!(display_name(&SessionIdentity::default()), ("Unknown", "N/A"));
    }
}
