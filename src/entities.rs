/// All simulation entity types: pure data, no per-frame logic.
use glam::{Quat, Vec3};

use crate::profile::{GameProfile, WeaponSpec};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    Victory,
    Defeat,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Running)
    }
}

// ── Health ───────────────────────────────────────────────────────────────────

/// Hit points clamped to `0..=max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    current: i32,
    max: i32,
}

impl Health {
    pub fn full(max: i32) -> Health {
        Health { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }

    /// Subtract `amount`, never dropping below zero. Returns what is left.
    pub fn damage(&mut self, amount: i32) -> i32 {
        self.current = (self.current - amount).max(0);
        self.current
    }

    /// Add `amount`, never exceeding the maximum.
    pub fn heal(&mut self, amount: i32) -> i32 {
        self.current = (self.current + amount).min(self.max);
        self.current
    }

    /// Whole percentage for the HUD bar.
    pub fn percent(&self) -> u8 {
        if self.max <= 0 {
            return 0;
        }
        ((self.current.clamp(0, self.max) * 100) / self.max) as u8
    }
}

// ── Orientation helpers ──────────────────────────────────────────────────────

/// Unit vector an entity with this yaw is facing. Yaw 0 looks down -Z.
pub fn forward(yaw: f32) -> Vec3 {
    Quat::from_rotation_y(yaw) * Vec3::NEG_Z
}

/// Yaw that makes [`forward`] point along `direction` in the ground plane.
pub fn yaw_towards(direction: Vec3) -> f32 {
    (-direction.x).atan2(-direction.z)
}

/// Turn a point in an entity's local frame into world space.
pub fn local_to_world(origin: Vec3, yaw: f32, offset: Vec3) -> Vec3 {
    origin + Quat::from_rotation_y(yaw) * offset
}

/// Ground-plane direction and distance from `from` to `to`.
pub fn planar_bearing(from: Vec3, to: Vec3) -> (Vec3, f32) {
    let mut delta = to - from;
    delta.y = 0.0;
    let distance = delta.length();
    (delta.normalize_or_zero(), distance)
}

// ── Player & hostiles ────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub position: Vec3,
    pub yaw: f32,
    /// Visual roll while turning; derived from input, never authoritative.
    pub bank: f32,
    pub velocity: Vec3,
    pub health: Health,
    pub score: u32,
    /// Elapsed time of the last shot.
    pub last_fire: Option<f32>,
}

#[derive(Clone, Debug)]
pub struct Hostile {
    pub id: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub health: Health,
    /// Elapsed time of the last attack; starts at zero like a fresh cooldown.
    pub last_attack: f32,
}

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileOwner {
    Player,
    Hostile(EntityId),
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub id: EntityId,
    pub owner: ProjectileOwner,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds since launch.
    pub age: f32,
    pub weapon: WeaponSpec,
}

impl Projectile {
    pub fn is_player_fired(&self) -> bool {
        self.owner == ProjectileOwner::Player
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalReason {
    Hit,
    Expired,
    OutOfBounds,
    /// Dropped below the ground or water line.
    Grounded,
}

// ── Particles ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    MuzzleFlash,
    Trail,
    Explosion,
    Destruction,
    Splash,
    GroundBurst,
    SonicBoom,
}

/// Short-lived cosmetic point. Has no gameplay effect.
#[derive(Clone, Debug)]
pub struct Particle {
    pub kind: EffectKind,
    pub position: Vec3,
    pub velocity: Option<Vec3>,
    /// Vertical acceleration, negative pulls down.
    pub gravity: f32,
    pub life: f32,
    pub max_life: f32,
}

impl Particle {
    /// 1.0 when fresh, 0.0 when about to be culled; drives opacity/scale.
    pub fn fade(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

// ── Events ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KillCause {
    Projectile,
    Contact,
}

/// Things that happened during one tick, in the order they happened.
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    HostileSpawned { id: EntityId, position: Vec3 },
    /// Left play out of range; no score.
    HostileDespawned { id: EntityId },
    HostileHit { id: EntityId, damage: i32, remaining: i32 },
    HostileDestroyed { id: EntityId, cause: KillCause },
    ProjectileFired { id: EntityId, owner: ProjectileOwner },
    ProjectileRemoved { id: EntityId, reason: RemovalReason },
    PlayerHit { damage: i32, remaining: i32 },
    QuestionShown { number: usize, display_order: Vec<usize> },
    AnswerResolved {
        number: usize,
        canonical: usize,
        forced: bool,
        correct: Option<bool>,
    },
    QuestionClosed { number: usize },
    Victory,
    Defeat,
}

// ── Master simulation state ──────────────────────────────────────────────────

/// Everything one running mini-game owns.
///
/// Only the tick pipeline mutates the collections: the spawner appends
/// hostiles, weapons append projectiles, the collision resolver and culls
/// remove them.
#[derive(Clone, Debug)]
pub struct SimulationState {
    pub player: Player,
    pub hostiles: Vec<Hostile>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub status: GameStatus,
    /// Seconds since the run started, summed from tick deltas.
    pub elapsed: f32,
    /// Hostiles destroyed by player fire.
    pub kills: u32,
    next_id: u64,
}

impl SimulationState {
    pub fn new(profile: &GameProfile) -> SimulationState {
        let movement = &profile.player.movement;
        SimulationState {
            player: Player {
                position: Vec3::new(0.0, movement.altitude, 0.0),
                yaw: 0.0,
                bank: 0.0,
                velocity: Vec3::ZERO,
                health: Health::full(profile.player.max_health),
                score: 0,
                last_fire: None,
            },
            hostiles: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            status: GameStatus::Running,
            elapsed: 0.0,
            kills: 0,
            next_id: 1,
        }
    }

    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn hostile(&self, id: EntityId) -> Option<&Hostile> {
        self.hostiles.iter().find(|h| h.id == id)
    }
}
