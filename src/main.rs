mod display;

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, stdout, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use career_quest::clock::FrameClock;
use career_quest::compute::Simulation;
use career_quest::error::GameError;
use career_quest::headless::{self, Summary};
use career_quest::input::InputState;
use career_quest::logging;
use career_quest::profile::{GameKind, GameProfile};
use career_quest::quiz::QuestionDeck;
use career_quest::services::{
    fetch_in_background, spawn_answer_log, ChannelRecommendations, HudSlot, QuestionDir,
    QuestionRequest, Services, SessionId,
};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Longest step the simulation takes after a stall.
const MAX_DELTA: f32 = 0.1;

/// Step used by the headless run.
const HEADLESS_STEP: Duration = Duration::from_micros(16_667);

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// Returns true if any of `keys` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|key| {
        key_frame
            .get(key)
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    })
}

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Game {
    Naval,
    Air,
    Armor,
}

impl From<Game> for GameKind {
    fn from(game: Game) -> GameKind {
        match game {
            Game::Naval => GameKind::Naval,
            Game::Air => GameKind::Air,
            Game::Armor => GameKind::Armor,
        }
    }
}

/// Quiz-interrupted combat mini-games for the career quest.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Which mini-game to play
    #[arg(short, long, value_enum, default_value_t = Game::Naval)]
    game: Game,

    /// Load the game profile from a JSON file instead
    #[arg(long)]
    profile_file: Option<PathBuf>,

    /// Session token from the emotion check-in
    #[arg(long, env = "CAREER_QUEST_SESSION")]
    session: Option<String>,

    /// Directory holding emotional.json, reasoning.json and academic.json
    #[arg(long, default_value = "demos/questions")]
    questions: PathBuf,

    /// Append answer submissions to this file as JSON lines
    #[arg(long)]
    answers: Option<PathBuf>,

    /// Write logs to this file (the terminal belongs to the game)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Run this many ticks with scripted input and print a summary
    #[arg(long)]
    headless: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

// ── Set-up ────────────────────────────────────────────────────────────────────

fn load_profile(args: &Args) -> Result<GameProfile, GameError> {
    let profile = match &args.profile_file {
        Some(path) => GameProfile::from_json_str(&fs::read_to_string(path)?)?,
        None => GameProfile::for_kind(args.game.into()),
    };
    profile.validate()?;
    Ok(profile)
}

/// Kick off the question fetch for one run.
fn question_deck(args: &Args, profile: &GameProfile, session: &SessionId) -> QuestionDeck {
    let request = QuestionRequest {
        category: profile.quiz.category,
        count: profile.quiz.question_count,
        session: Some(session.clone()),
    };
    let source = QuestionDir {
        root: args.questions.clone(),
    };
    QuestionDeck::Pending(fetch_in_background(source, request))
}

/// The outbound services, plus the answer-log worker to join on exit.
fn services(args: &Args, hud: &HudSlot) -> Result<(Services, JoinHandle<()>), GameError> {
    let (answers, worker) = match &args.answers {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            spawn_answer_log(file)
        }
        None => spawn_answer_log(io::sink()),
    };

    let (tx, rx) = mpsc::channel::<SessionId>();
    thread::spawn(move || {
        for session in rx {
            debug!("recommendation queued for session {}", session);
        }
    });

    let services = Services {
        answers: Box::new(answers),
        recommendations: Box::new(ChannelRecommendations::new(tx)),
        hud: Box::new(hud.clone()),
    };
    Ok((services, worker))
}

// ── Headless run ──────────────────────────────────────────────────────────────

fn print_summary(summary: &Summary) {
    let hud = &summary.hud;
    println!(
        "{:?} after {:.1}s: score {}, health {}%, questions {}/{}, kills {}",
        hud.status,
        summary.elapsed,
        hud.score,
        hud.health_percent,
        hud.questions_answered,
        hud.questions_total,
        summary.kills
    );
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which keys are still "fresh"
/// (within `HOLD_WINDOW` frames) and build one `InputState` from them, so
/// steering, boosting and firing can all be held at once.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events → keys are removed on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire naturally after `HOLD_WINDOW` frames of
///   silence.
fn game_loop<W: Write>(
    out: &mut W,
    sim: &mut Simulation,
    hud: &HudSlot,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
    mut restart: impl FnMut() -> QuestionDeck,
) -> io::Result<()> {
    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut clock = FrameClock::new(MAX_DELTA);
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                // Press: record key + handle one-shot actions
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(());
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') if sim.status().is_terminal() => {
                            info!("restarting");
                            sim.restart(restart(), rng);
                            clock = FrameClock::new(MAX_DELTA);
                        }
                        KeyCode::Char('n') | KeyCode::Char('N') => {
                            sim.show_next_question(rng);
                        }
                        KeyCode::Char(c @ '1'..='9') => {
                            let display_index = c as usize - '1' as usize;
                            sim.select_answer(display_index);
                        }
                        _ => {}
                    }
                }
                // Repeat: refresh timestamp so key stays "held"
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                // Release: remove key immediately (keyboard-enhancement path)
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Build this frame's input from held keys ───────────────────────────
        let input = InputState {
            forward: is_held(&key_frame, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')], frame),
            reverse: is_held(&key_frame, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')], frame),
            left: is_held(&key_frame, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame),
            right: is_held(&key_frame, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame),
            fire: is_held(&key_frame, &[KeyCode::Char(' ')], frame),
            boost: is_held(&key_frame, &[KeyCode::Char('b'), KeyCode::Char('B')], frame),
        };

        let step = clock.tick();
        sim.advance(step.delta, &input, rng);

        display::render(out, sim, &hud.latest())?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), GameError> {
    let log_file = args.log_file.as_ref().map(File::create).transpose()?;
    logging::init(args.verbose, log_file);

    let session = SessionId::parse(args.session.as_deref())?;
    let profile = load_profile(&args)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let hud = HudSlot::default();
    let deck = question_deck(&args, &profile, &session);
    let (services, answer_log) = services(&args, &hud)?;
    let mut sim = Simulation::new(profile.clone(), session.clone(), deck, services, &mut rng)?;

    let result = match args.headless {
        Some(ticks) => {
            print_summary(&headless::run(&mut sim, ticks, HEADLESS_STEP, &mut rng));
            Ok(())
        }
        None => {
            let restart = || question_deck(&args, &profile, &session);
            run_terminal(&mut sim, &hud, &mut rng, restart)
        }
    };

    // Dropping the simulation closes the answer channel; wait for the log
    // to drain before exiting.
    drop(sim);
    if answer_log.join().is_err() {
        warn!("answer log worker panicked");
    }
    result?;
    Ok(())
}

fn run_terminal(
    sim: &mut Simulation,
    hud: &HudSlot,
    rng: &mut StdRng,
    restart: impl FnMut() -> QuestionDeck,
) -> io::Result<()> {
    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = game_loop(&mut out, sim, hud, &rx, rng, restart);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

