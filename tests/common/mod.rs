//! Shared fixtures: seeded RNG, recording service doubles and small world
//! builders.
#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use career_quest::compute::Simulation;
use career_quest::entities::{EntityId, Health, Hostile, Projectile, ProjectileOwner, SimulationState};
use career_quest::profile::{GameKind, GameProfile, SpawnGate, WeaponSpec};
use career_quest::question::{AnswerOption, Effects, Question, QuestionId};
use career_quest::quiz::QuestionDeck;
use career_quest::services::{
    AnswerSink, AnswerSubmission, HudSlot, RecommendationSource, Services, SessionId,
};

pub const DT: f32 = 1.0 / 60.0;

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

pub fn session() -> SessionId {
    SessionId::parse(Some("session-1")).expect("valid session token")
}

// ── Recording services ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingAnswers(pub Rc<RefCell<Vec<AnswerSubmission>>>);

impl RecordingAnswers {
    pub fn submitted(&self) -> Vec<AnswerSubmission> {
        self.0.borrow().clone()
    }
}

impl AnswerSink for RecordingAnswers {
    fn submit(&mut self, submission: AnswerSubmission) {
        self.0.borrow_mut().push(submission);
    }
}

#[derive(Clone, Default)]
pub struct RecordingRecommendations(pub Rc<RefCell<Vec<SessionId>>>);

impl RecordingRecommendations {
    pub fn requested(&self) -> Vec<SessionId> {
        self.0.borrow().clone()
    }
}

impl RecommendationSource for RecordingRecommendations {
    fn request(&mut self, session: &SessionId) {
        self.0.borrow_mut().push(session.clone());
    }
}

/// A `Write` target the answer-log worker thread can share with the test.
#[derive(Clone, Default)]
pub struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().expect("buffer lock").clone()).expect("utf8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Handles onto everything a simulation sends out.
#[derive(Clone, Default)]
pub struct Recorders {
    pub answers: RecordingAnswers,
    pub recommendations: RecordingRecommendations,
    pub hud: HudSlot,
}

impl Recorders {
    pub fn services(&self) -> Services {
        Services {
            answers: Box::new(self.answers.clone()),
            recommendations: Box::new(self.recommendations.clone()),
            hud: Box::new(self.hud.clone()),
        }
    }
}

// ── Questions ─────────────────────────────────────────────────────────────────

/// `count` four-option questions numbered from 1. Option `i` carries the
/// effect `{"pick": i}`; option 0 is correct when `graded`.
pub fn numbered_questions(count: usize, graded: bool) -> Vec<Question> {
    (1..=count)
        .map(|n| Question {
            id: Some(QuestionId(n.to_string())),
            prompt: format!("Question number {n}?"),
            options: (0..4)
                .map(|i| {
                    let mut effects = Effects::new();
                    effects.insert("pick".to_string(), i.into());
                    AnswerOption {
                        text: format!("Answer {n}.{i}"),
                        effects,
                    }
                })
                .collect(),
            correct: graded.then_some(0),
        })
        .collect()
}

pub fn ready_deck(count: usize, graded: bool) -> QuestionDeck {
    QuestionDeck::Ready(numbered_questions(count, graded))
}

// ── Worlds ────────────────────────────────────────────────────────────────────

/// A built-in profile that never spawns anything on its own.
pub fn quiet_profile(kind: GameKind) -> GameProfile {
    let mut profile = GameProfile::for_kind(kind);
    profile.spawn.gate = SpawnGate::Chance { per_second: 0.0 };
    profile.spawn.initial = None;
    profile
}

/// A quiet profile whose quiz never fires by itself.
pub fn no_quiz_profile(kind: GameKind) -> GameProfile {
    let mut profile = quiet_profile(kind);
    profile.quiz.trigger_interval = 1.0e6;
    profile.quiz.kill_trigger = None;
    profile
}

pub fn simulation(profile: GameProfile, deck: QuestionDeck) -> (Simulation, Recorders, StdRng) {
    let recorders = Recorders::default();
    let mut rng = seeded_rng();
    let sim = Simulation::new(profile, session(), deck, recorders.services(), &mut rng)
        .expect("built-in profiles are valid");
    (sim, recorders, rng)
}

pub fn add_hostile(state: &mut SimulationState, profile: &GameProfile, position: Vec3) -> EntityId {
    let id = state.allocate_id();
    state.hostiles.push(Hostile {
        id,
        position,
        velocity: Vec3::ZERO,
        yaw: 0.0,
        health: Health::full(profile.hostile.max_health),
        last_attack: 0.0,
    });
    id
}

pub fn add_projectile(
    state: &mut SimulationState,
    owner: ProjectileOwner,
    position: Vec3,
    velocity: Vec3,
    weapon: WeaponSpec,
) -> EntityId {
    let id = state.allocate_id();
    state.projectiles.push(Projectile {
        id,
        owner,
        position,
        velocity,
        age: 0.0,
        weapon,
    });
    id
}
