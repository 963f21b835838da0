/// Rendering layer: all terminal I/O lives here.
///
/// The world is drawn as a top-down radar centred on the player with their
/// heading pointing up. No game logic is performed; this module only
/// translates simulation state into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::{Quat, Vec3};

use career_quest::compute::Simulation;
use career_quest::entities::{EffectKind, GameStatus, ProjectileOwner};
use career_quest::profile::GameKind;
use career_quest::services::HudFrame;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_QUIZ: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_HOSTILE: Color = Color::Red;
const C_SHOT_PLAYER: Color = Color::Cyan;
const C_SHOT_HOSTILE: Color = Color::Magenta;
const C_EFFECT: Color = Color::DarkYellow;
const C_DESTINATION: Color = Color::Green;
const C_HINT: Color = Color::DarkGrey;
const C_OVERLAY: Color = Color::White;

/// Screen cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 2.0;

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, sim: &Simulation, hud: &HudFrame) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let view = Radar::new(sim, width, height);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, width, height)?;
    draw_hud(out, sim.profile().kind, hud, width)?;
    draw_world(out, sim, &view)?;
    draw_controls_hint(out, sim, height)?;

    if sim.quiz().current().is_some() {
        draw_question(out, sim, hud, width, height)?;
    }
    if hud.status.is_terminal() {
        draw_game_over(out, hud, width, height)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Radar projection ──────────────────────────────────────────────────────────

struct Radar {
    origin: Vec3,
    /// Rotates world offsets into the player's frame.
    rotation: Quat,
    /// World units per column.
    scale: f32,
    cx: i32,
    cy: i32,
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
}

impl Radar {
    fn new(sim: &Simulation, width: u16, height: u16) -> Radar {
        let player = &sim.state().player;
        // The spawn ring sits just inside the top edge.
        let range = sim.profile().spawn.outer_radius * 1.2;
        Radar::centred(player.position, player.yaw, range, width, height)
    }

    /// A radar of `range` world units from the centre to the top edge,
    /// filling everything inside the border and below the HUD row.
    fn centred(origin: Vec3, yaw: f32, range: f32, width: u16, height: u16) -> Radar {
        let half_rows = (height as f32 - 5.0).max(1.0) / 2.0;
        Radar {
            origin,
            rotation: Quat::from_rotation_y(-yaw),
            scale: range / (half_rows * CELL_ASPECT),
            cx: width as i32 / 2,
            cy: height as i32 / 2,
            left: 1,
            right: width as i32 - 2,
            top: 2,
            bottom: height as i32 - 3,
        }
    }

    /// Cell for a world position, if it falls on the radar.
    fn project(&self, position: Vec3) -> Option<(u16, u16)> {
        let (col, row) = self.raw(position);
        let inside = col >= self.left && col <= self.right && row >= self.top && row <= self.bottom;
        inside.then_some((col as u16, row as u16))
    }

    /// Like `project`, but pinned to the edge when off screen. `None` when
    /// the terminal is too small to leave any radar cells.
    fn project_clamped(&self, position: Vec3) -> Option<(u16, u16)> {
        if self.left > self.right || self.top > self.bottom {
            return None;
        }
        let (col, row) = self.raw(position);
        Some((
            col.clamp(self.left, self.right) as u16,
            row.clamp(self.top, self.bottom) as u16,
        ))
    }

    fn raw(&self, position: Vec3) -> (i32, i32) {
        let local = self.rotation * (position - self.origin);
        let col = self.cx + (local.x / self.scale).round() as i32;
        let row = self.cy + (local.z / (self.scale * CELL_ASPECT)).round() as i32;
        (col, row)
    }
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1: top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2: bottom bar
    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, kind: GameKind, hud: &HudFrame, width: u16) -> std::io::Result<()> {
    // Score, left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}", hud.score)))?;

    // Mini-game, centre
    let (title, color) = match kind {
        GameKind::Naval => ("[ NAVAL ]", Color::Blue),
        GameKind::Air => ("[ AIR ]", Color::Cyan),
        GameKind::Armor => ("[ ARMOR ]", Color::Green),
    };
    let tx = (width / 2).saturating_sub(title.len() as u16 / 2);
    out.queue(cursor::MoveTo(tx, 0))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(title))?;

    // Questions + health bar, right-aligned
    let quiz_tag = format!("Q {}/{}  ", hud.questions_answered, hud.questions_total);
    let filled = (hud.health_percent as usize + 5) / 10;
    let bar = format!(
        "HP [{}{}] {:>3}%",
        "█".repeat(filled.min(10)),
        " ".repeat(10 - filled.min(10)),
        hud.health_percent
    );
    let right_len = quiz_tag.chars().count() + bar.chars().count();
    let rx = width.saturating_sub(right_len as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_QUIZ))?;
    out.queue(Print(&quiz_tag))?;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(&bar))?;

    Ok(())
}

// ── World ─────────────────────────────────────────────────────────────────────

fn draw_world<W: Write>(out: &mut W, sim: &Simulation, view: &Radar) -> std::io::Result<()> {
    let state = sim.state();

    // Destination stays visible as an edge marker when out of range.
    if let Some((col, row)) = view.project_clamped(sim.profile().destination.position) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_DESTINATION))?;
        out.queue(Print("⚑"))?;
    }

    out.queue(style::SetForegroundColor(C_EFFECT))?;
    for particle in &state.particles {
        let glyph = match particle.kind {
            EffectKind::Explosion | EffectKind::Destruction => "✶",
            EffectKind::Splash | EffectKind::GroundBurst => "~",
            EffectKind::SonicBoom => "○",
            EffectKind::MuzzleFlash | EffectKind::Trail => continue,
        };
        if let Some((col, row)) = view.project(particle.position) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print(glyph))?;
        }
    }

    for projectile in &state.projectiles {
        let Some((col, row)) = view.project(projectile.position) else {
            continue;
        };
        out.queue(cursor::MoveTo(col, row))?;
        match projectile.owner {
            ProjectileOwner::Player => {
                out.queue(style::SetForegroundColor(C_SHOT_PLAYER))?;
                out.queue(Print("•"))?;
            }
            ProjectileOwner::Hostile(_) => {
                out.queue(style::SetForegroundColor(C_SHOT_HOSTILE))?;
                out.queue(Print("*"))?;
            }
        }
    }

    out.queue(style::SetForegroundColor(C_HOSTILE))?;
    for hostile in &state.hostiles {
        if let Some((col, row)) = view.project(hostile.position) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print("◆"))?;
        }
    }

    out.queue(cursor::MoveTo(view.cx as u16, view.cy as u16))?;
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    out.queue(Print("▲"))?;

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, sim: &Simulation, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    let boost = if sim.profile().player.movement.boost.is_some() {
        "  B : Boost"
    } else {
        ""
    };
    out.queue(Print(format!(
        "W S A D : Steer   SPACE : Fire{}   N : Question   Q : Quit   ⚑ {:.0}m",
        boost,
        sim.distance_to_destination()
    )))?;
    Ok(())
}

// ── Quiz overlay ──────────────────────────────────────────────────────────────

fn draw_question<W: Write>(
    out: &mut W,
    sim: &Simulation,
    hud: &HudFrame,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let Some(active) = sim.quiz().current() else {
        return Ok(());
    };
    let inner = (width as usize).saturating_sub(8).clamp(20, 72);

    let mut lines: Vec<(String, Color)> = Vec::new();
    let title = match hud.countdown {
        Some(seconds) => format!("Question {}  ({}s)", active.number + 1, seconds),
        None => format!("Question {}", active.number + 1),
    };
    lines.push((title, C_HUD_QUIZ));
    lines.push((clip(&active.question.prompt, inner), C_OVERLAY));
    lines.push((String::new(), C_OVERLAY));
    for (i, option) in active.displayed_options().enumerate() {
        lines.push((clip(&format!("[{}] {}", i + 1, option.text), inner), Color::Yellow));
    }

    let left = (width / 2).saturating_sub(inner as u16 / 2 + 2);
    let top = (height / 2).saturating_sub(lines.len() as u16 / 2 + 1);

    out.queue(style::SetForegroundColor(C_OVERLAY))?;
    out.queue(cursor::MoveTo(left, top))?;
    out.queue(Print(format!("╔{}╗", "═".repeat(inner + 2))))?;
    for (i, (text, color)) in lines.iter().enumerate() {
        out.queue(cursor::MoveTo(left, top + 1 + i as u16))?;
        out.queue(style::SetForegroundColor(C_OVERLAY))?;
        out.queue(Print("║ "))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<width$}", text, width = inner)))?;
        out.queue(style::SetForegroundColor(C_OVERLAY))?;
        out.queue(Print(" ║"))?;
    }
    out.queue(cursor::MoveTo(left, top + 1 + lines.len() as u16))?;
    out.queue(Print(format!("╚{}╝", "═".repeat(inner + 2))))?;

    Ok(())
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, hud: &HudFrame, width: u16, height: u16) -> std::io::Result<()> {
    let (lines, color): (&[&str], Color) = match hud.status {
        GameStatus::Victory => (
            &[
                "╔════════════════════╗",
                "║      VICTORY!      ║",
                "╚════════════════════╝",
            ],
            Color::Green,
        ),
        _ => (
            &[
                "╔════════════════════╗",
                "║    GAME  OVER      ║",
                "╚════════════════════╝",
            ],
            Color::Red,
        ),
    };
    let score_line = format!("Final Score: {:>6}", hud.score);
    let quiz_line = format!("Questions answered: {}", hud.questions_answered);
    let hint = "R - Play Again  Q - Quit";

    let cx = width / 2;
    let total_rows = lines.len() + 3;
    let start_row = (height / 2).saturating_sub(total_rows as u16 / 2);

    for (i, msg) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(*msg))?;
    }

    let trailer: [(&str, Color); 3] = [
        (score_line.as_str(), Color::Yellow),
        (quiz_line.as_str(), C_HUD_QUIZ),
        (hint, Color::White),
    ];
    for (i, (text, color)) in trailer.iter().enumerate() {
        let row = start_row + (lines.len() + i) as u16;
        let col = cx.saturating_sub(text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*text))?;
    }

    Ok(())
}
