/// The per-tick pipeline and the `Simulation` that owns one mini-game run.
///
/// `tick` is the combat half: it mutates an explicit `SimulationState` in a
/// fixed stage order and reports what happened as events. `Simulation`
/// wraps it with the quiz controller, the win/loss check and the outbound
/// services. All randomness comes through the injected `rng` so callers
/// control determinism (tests use a seeded `StdRng`).
use log::{debug, info};
use rand::Rng;

use crate::ai;
use crate::collisions;
use crate::entities::{EffectKind, GameStatus, KillCause, SimEvent, SimulationState};
use crate::error::ProfileError;
use crate::input::{apply_motion, resolve_motion, InputState};
use crate::outcome;
use crate::particles;
use crate::profile::GameProfile;
use crate::projectiles;
use crate::quiz::{QuestionDeck, QuizController, Resolution};
use crate::services::{HudFrame, Services, SessionId};
use crate::spawner;

// ── Combat tick ──────────────────────────────────────────────────────────────

/// Advance combat by `delta` seconds.
///
/// `question_active` blocks the player's weapon; movement and the rest of
/// the world carry on.
pub fn tick(
    state: &mut SimulationState,
    profile: &GameProfile,
    input: &InputState,
    question_active: bool,
    delta: f32,
    rng: &mut impl Rng,
) -> Vec<SimEvent> {
    let mut events = Vec::new();

    // ── 1. Player motion ─────────────────────────────────────────────────────
    let motion = resolve_motion(&state.player, &profile.player.movement, input, delta);
    apply_motion(&mut state.player, &motion);
    if let Some(boost) = profile.player.movement.boost.filter(|_| motion.boosting) {
        if rng.gen_bool((boost.burst_rate * delta).clamp(0.0, 1.0) as f64) {
            let position = state.player.position;
            particles::emit(&mut state.particles, EffectKind::SonicBoom, position, rng);
        }
    }

    // ── 2. Player weapon ─────────────────────────────────────────────────────
    if input.fire && !question_active {
        projectiles::fire_player_weapon(state, profile, rng, &mut events);
    }

    // ── 3. Hostile AI ────────────────────────────────────────────────────────
    ai::run(state, profile, delta, rng, &mut events);

    // ── 4. Projectiles ───────────────────────────────────────────────────────
    projectiles::advance(state, delta, rng);

    // ── 5. Collisions, then out-of-play culling ──────────────────────────────
    collisions::resolve_projectile_hits(state, profile, rng, &mut events);
    collisions::resolve_contacts(state, profile, rng, &mut events);
    projectiles::cull(state, rng, &mut events);

    // ── 6. Effects ───────────────────────────────────────────────────────────
    particles::advance(&mut state.particles, delta);

    // ── 7. Spawning ──────────────────────────────────────────────────────────
    spawner::run(state, profile, delta, rng, &mut events);

    events
}

/// Hostiles destroyed by player fire among `events`.
pub fn kills_in(events: &[SimEvent]) -> u32 {
    events
        .iter()
        .filter(|e| {
            matches!(
                e,
                SimEvent::HostileDestroyed {
                    cause: KillCause::Projectile,
                    ..
                }
            )
        })
        .count() as u32
}

// ── Simulation ───────────────────────────────────────────────────────────────

pub struct Simulation {
    profile: GameProfile,
    state: SimulationState,
    quiz: QuizController,
    services: Services,
    /// Events raised between ticks (start-up wave, answer clicks).
    pending: Vec<SimEvent>,
}

impl Simulation {
    pub fn new(
        profile: GameProfile,
        session: SessionId,
        deck: QuestionDeck,
        services: Services,
        rng: &mut impl Rng,
    ) -> Result<Simulation, ProfileError> {
        profile.validate()?;
        let quiz = QuizController::new(profile.quiz, session, deck);
        let mut sim = Simulation {
            state: SimulationState::new(&profile),
            profile,
            quiz,
            services,
            pending: Vec::new(),
        };
        sim.seed(rng);
        Ok(sim)
    }

    fn seed(&mut self, rng: &mut impl Rng) {
        spawner::seed_initial(&mut self.state, &self.profile, rng, &mut self.pending);
        info!(
            "{:?} run started with {} hostiles",
            self.profile.kind,
            self.state.hostiles.len()
        );
        self.push_hud();
    }

    /// Throw away the run and start over with a fresh question list.
    pub fn restart(&mut self, deck: QuestionDeck, rng: &mut impl Rng) {
        let session = self.quiz.session().clone();
        self.state = SimulationState::new(&self.profile);
        self.quiz = QuizController::new(self.profile.quiz, session, deck);
        self.pending.clear();
        self.seed(rng);
    }

    /// One frame. Returns everything that happened since the previous call.
    pub fn advance(&mut self, delta: f32, input: &InputState, rng: &mut impl Rng) -> Vec<SimEvent> {
        let mut events = std::mem::take(&mut self.pending);
        if self.state.status.is_terminal() {
            self.push_hud();
            return events;
        }

        self.state.elapsed += delta;

        let mut kills = 0;
        if self.quiz.pauses_combat() {
            debug!("combat paused for question");
        } else {
            let combat = tick(
                &mut self.state,
                &self.profile,
                input,
                self.quiz.question_active(),
                delta,
                rng,
            );
            kills = kills_in(&combat);
            events.extend(combat);
        }

        self.quiz.advance(
            delta,
            kills,
            &mut self.state.player,
            self.services.answers.as_mut(),
            rng,
            &mut events,
        );

        if outcome::apply(&mut self.state, &self.profile.destination, &mut events) == Some(GameStatus::Victory) {
            self.services.recommendations.request(self.quiz.session());
        }

        self.push_hud();
        events
    }

    /// The learner picked the option drawn at `display_index`.
    pub fn select_answer(&mut self, display_index: usize) -> Option<Resolution> {
        if self.state.status.is_terminal() {
            return None;
        }
        let resolution = self.quiz.select(
            display_index,
            &mut self.state.player,
            self.services.answers.as_mut(),
            &mut self.pending,
        );
        self.push_hud();
        resolution
    }

    /// Manual "show next question". Ignored while a question is already up
    /// or the list is used up.
    pub fn show_next_question(&mut self, rng: &mut impl Rng) -> bool {
        if self.state.status.is_terminal() {
            return false;
        }
        self.quiz.request_question(rng, &mut self.pending)
    }

    /// Finish the question fetch before the first tick so a scripted run
    /// sees the same questions whatever the thread timing.
    pub fn wait_for_questions(&mut self) {
        self.quiz.wait_for_questions();
        self.push_hud();
    }

    pub fn hud_frame(&self) -> HudFrame {
        HudFrame {
            score: self.state.player.score,
            health_percent: self.state.player.health.percent(),
            questions_answered: self.quiz.answered(),
            questions_total: self.quiz.total().unwrap_or(0),
            countdown: self.quiz.countdown(),
            status: self.state.status,
        }
    }

    fn push_hud(&mut self) {
        let frame = self.hud_frame();
        self.services.hud.update(&frame);
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Direct access for scripted set-ups.
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn profile(&self) -> &GameProfile {
        &self.profile
    }

    pub fn quiz(&self) -> &QuizController {
        &self.quiz
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    /// Distance left to the destination.
    pub fn distance_to_destination(&self) -> f32 {
        self.state.player.position.distance(self.profile.destination.position)
    }
}
