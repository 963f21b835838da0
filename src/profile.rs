/// Per-mini-game tuning tables.
///
/// The three mini-games run the same simulation; everything that differs
/// between them (speeds, weapons, AI model, spawn cadence, quiz rules) lives
/// in a [`GameProfile`]. All rates are per second and all lengths in world
/// units.
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::question::QuestionCategory;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Naval,
    Air,
    Armor,
}

// ── Player ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoostSpec {
    /// Added on top of the cruise speed while the boost key is held.
    pub extra_speed: f32,
    /// Expected cosmetic bursts per second while boosting.
    pub burst_rate: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementSpec {
    pub speed: f32,
    /// Fraction of `speed` used when reversing.
    pub reverse_scale: f32,
    /// Radians per second.
    pub turn_rate: f32,
    /// Height the player is pinned to every tick.
    pub altitude: f32,
    /// Largest visual bank angle; zero disables banking.
    pub max_bank: f32,
    pub boost: Option<BoostSpec>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub max_health: i32,
    /// Minimum seconds between two player shots.
    pub fire_cooldown: f32,
    pub movement: MovementSpec,
    pub weapon: WeaponSpec,
}

// ── Weapons ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HomingSpec {
    /// Targets farther than this are ignored.
    pub activation_radius: f32,
    /// Multiplied by delta to give the per-tick lerp factor.
    pub turn_rate: f32,
}

/// Where a projectile stops being worth simulating.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bounds {
    /// Farther than `radius` from the player.
    FromPlayer { radius: f32 },
    /// Outside the square `|x|, |z| <= half_extent` around the origin.
    World { half_extent: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub speed: f32,
    pub damage: i32,
    /// A target closer than this to the projectile is hit.
    pub hit_radius: f32,
    /// Downward acceleration; zero for self-propelled missiles.
    pub gravity: f32,
    /// Seconds before the projectile is culled.
    pub max_lifetime: f32,
    pub bounds: Bounds,
    /// Projectiles below this height hit the ground or water.
    pub ground_level: Option<f32>,
    pub homing: Option<HomingSpec>,
    /// Launch point in the firer's local frame (forward is -Z).
    pub muzzle_offset: Vec3,
    /// Leave a smoke/flame trail particle every tick.
    pub trail: bool,
}

// ── Hostiles ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Steering {
    /// Velocity snaps to the bearing: cruise speed beyond `hold_radius`,
    /// ramming speed inside the `ram_inner..ram_outer` band.
    Pursuit {
        cruise_speed: f32,
        hold_radius: f32,
        ram_speed: f32,
        ram_inner: f32,
        ram_outer: f32,
    },
    /// Velocity eases toward the bearing at `speed`.
    Chase { speed: f32, response: f32 },
    /// Approach beyond `engagement_radius`, orbit tangentially inside it.
    Circle {
        engagement_radius: f32,
        approach_speed: f32,
        orbit_speed: f32,
        response: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttackTrigger {
    /// Attack at most once every `seconds`.
    Cooldown { seconds: f32 },
    /// Attack with probability `per_second * delta` each tick.
    Chance { per_second: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttackEffect {
    Projectile { weapon: WeaponSpec },
    /// Direct damage roll without a projectile.
    Strafe { hit_chance: f64, damage: i32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackSpec {
    pub min_range: f32,
    pub max_range: f32,
    pub trigger: AttackTrigger,
    pub effect: AttackEffect,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostileSpec {
    pub max_health: i32,
    pub kill_score: u32,
    /// Hostiles this far from the player leave play without score.
    pub despawn_distance: f32,
    pub steering: Steering,
    pub attack: AttackSpec,
}

// ── Spawning ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnGate {
    Chance { per_second: f32 },
    /// Fires on the tick whose step crosses a whole multiple of `seconds`.
    Every { seconds: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitialWave {
    pub count: usize,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnSpec {
    pub gate: SpawnGate,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub max_hostiles: usize,
    pub initial: Option<InitialWave>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactSpec {
    pub radius: f32,
    /// Lump damage the player takes; the hostile is destroyed outright.
    pub damage: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DestinationSpec {
    pub position: Vec3,
    pub radius: f32,
}

// ── Quiz ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scoring {
    /// No right answer; every answer earns `points`.
    Preference { points: u32 },
    /// A match earns `points` and heals `health_bonus`; a miss costs
    /// `health_penalty`. Questions without a correct index count as a match.
    Graded {
        points: u32,
        health_bonus: i32,
        health_penalty: i32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizSpec {
    pub category: QuestionCategory,
    /// How many questions to request from the bank.
    pub question_count: usize,
    /// Stop asking after this many even if more were fetched.
    pub question_limit: Option<usize>,
    /// Seconds of idle play between questions.
    pub trigger_interval: f32,
    /// Also ask after this many hostiles are destroyed.
    pub kill_trigger: Option<u32>,
    pub pause_combat: bool,
    /// Whole seconds before a random answer is forced.
    pub answer_timeout: Option<u32>,
    /// Seconds the answer feedback stays up before play resumes.
    pub resolve_delay: f32,
    pub scoring: Scoring,
}

// ── Profile ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameProfile {
    pub kind: GameKind,
    pub player: PlayerSpec,
    pub hostile: HostileSpec,
    pub spawn: SpawnSpec,
    pub contact: Option<ContactSpec>,
    pub destination: DestinationSpec,
    pub quiz: QuizSpec,
}

impl GameProfile {
    pub fn for_kind(kind: GameKind) -> GameProfile {
        match kind {
            GameKind::Naval => GameProfile::naval(),
            GameKind::Air => GameProfile::air(),
            GameKind::Armor => GameProfile::armor(),
        }
    }

    /// Pirate hunt on open water: arcing cannonballs, ramming pirates,
    /// emotional questions that never pause the fight.
    pub fn naval() -> GameProfile {
        let cannonball = WeaponSpec {
            speed: 150.0,
            damage: 1,
            hit_radius: 9.0,
            gravity: 108.0,
            max_lifetime: 10.0,
            bounds: Bounds::World { half_extent: 1000.0 },
            ground_level: Some(-5.0),
            homing: None,
            muzzle_offset: Vec3::new(0.0, 3.0, -15.0),
            trail: false,
        };
        let pirate_cannonball = WeaponSpec {
            speed: 90.0,
            damage: 5,
            hit_radius: 10.0,
            muzzle_offset: Vec3::new(0.0, 3.0, 0.0),
            ..cannonball
        };
        GameProfile {
            kind: GameKind::Naval,
            player: PlayerSpec {
                max_health: 100,
                fire_cooldown: 0.35,
                movement: MovementSpec {
                    speed: 36.0,
                    reverse_scale: 0.5,
                    turn_rate: 1.8,
                    altitude: 0.0,
                    max_bank: 0.0,
                    boost: None,
                },
                weapon: cannonball,
            },
            hostile: HostileSpec {
                max_health: 3,
                kill_score: 75,
                despawn_distance: 1500.0,
                steering: Steering::Pursuit {
                    cruise_speed: 27.0,
                    hold_radius: 15.0,
                    ram_speed: 36.0,
                    ram_inner: 10.0,
                    ram_outer: 20.0,
                },
                attack: AttackSpec {
                    min_range: 15.0,
                    max_range: 120.0,
                    trigger: AttackTrigger::Chance { per_second: 0.72 },
                    effect: AttackEffect::Projectile {
                        weapon: pirate_cannonball,
                    },
                },
            },
            spawn: SpawnSpec {
                gate: SpawnGate::Chance { per_second: 0.18 },
                inner_radius: 150.0,
                outer_radius: 250.0,
                max_hostiles: 6,
                initial: Some(InitialWave {
                    count: 2,
                    inner_radius: 100.0,
                    outer_radius: 150.0,
                }),
            },
            contact: None,
            destination: DestinationSpec {
                position: Vec3::new(0.0, 0.0, -900.0),
                radius: 80.0,
            },
            quiz: QuizSpec {
                category: QuestionCategory::Emotional,
                question_count: 10,
                question_limit: None,
                trigger_interval: 3.0,
                kill_trigger: None,
                pause_combat: false,
                answer_timeout: None,
                resolve_delay: 1.5,
                scoring: Scoring::Preference { points: 100 },
            },
        }
    }

    /// Jet sortie at fixed altitude: homing missiles, chasing fighters that
    /// strafe, reasoning questions that pause the sortie.
    pub fn air() -> GameProfile {
        GameProfile {
            kind: GameKind::Air,
            player: PlayerSpec {
                max_health: 100,
                fire_cooldown: 0.3,
                movement: MovementSpec {
                    speed: 80.0,
                    reverse_scale: 1.0,
                    turn_rate: 1.5,
                    altitude: 200.0,
                    max_bank: 0.3,
                    boost: Some(BoostSpec {
                        extra_speed: 150.0,
                        burst_rate: 6.0,
                    }),
                },
                weapon: WeaponSpec {
                    speed: 250.0,
                    damage: 50,
                    hit_radius: 8.0,
                    gravity: 0.0,
                    max_lifetime: 10.0,
                    bounds: Bounds::FromPlayer { radius: 1000.0 },
                    ground_level: None,
                    homing: Some(HomingSpec {
                        activation_radius: 400.0,
                        turn_rate: 4.0,
                    }),
                    muzzle_offset: Vec3::new(0.0, -1.5, -10.0),
                    trail: true,
                },
            },
            hostile: HostileSpec {
                max_health: 100,
                kill_score: 100,
                despawn_distance: 1500.0,
                steering: Steering::Chase {
                    speed: 40.0,
                    response: 1.0,
                },
                attack: AttackSpec {
                    min_range: 0.0,
                    max_range: 100.0,
                    trigger: AttackTrigger::Cooldown { seconds: 2.0 },
                    effect: AttackEffect::Strafe {
                        hit_chance: 0.3,
                        damage: 5,
                    },
                },
            },
            spawn: SpawnSpec {
                gate: SpawnGate::Every { seconds: 8.0 },
                inner_radius: 300.0,
                outer_radius: 500.0,
                max_hostiles: 5,
                initial: None,
            },
            contact: Some(ContactSpec {
                radius: 15.0,
                damage: 20,
            }),
            destination: DestinationSpec {
                position: Vec3::new(0.0, 200.0, -2000.0),
                radius: 200.0,
            },
            quiz: QuizSpec {
                category: QuestionCategory::Reasoning,
                question_count: 10,
                question_limit: Some(10),
                trigger_interval: 3.0,
                kill_trigger: Some(2),
                pause_combat: true,
                answer_timeout: None,
                resolve_delay: 1.0,
                scoring: Scoring::Graded {
                    points: 50,
                    health_bonus: 10,
                    health_penalty: 10,
                },
            },
        }
    }

    /// Tank push to the safe zone: homing shells, circling enemy tanks,
    /// timed academic questions.
    pub fn armor() -> GameProfile {
        let shell = WeaponSpec {
            speed: 150.0,
            damage: 50,
            hit_radius: 8.0,
            gravity: 0.0,
            max_lifetime: 10.0,
            bounds: Bounds::FromPlayer { radius: 500.0 },
            ground_level: Some(0.0),
            homing: Some(HomingSpec {
                activation_radius: 300.0,
                turn_rate: 3.0,
            }),
            muzzle_offset: Vec3::new(0.0, 8.5, -21.0),
            trail: true,
        };
        GameProfile {
            kind: GameKind::Armor,
            player: PlayerSpec {
                max_health: 100,
                fire_cooldown: 0.5,
                movement: MovementSpec {
                    speed: 50.0,
                    reverse_scale: 1.0,
                    turn_rate: 2.0,
                    altitude: 0.0,
                    max_bank: 0.0,
                    boost: None,
                },
                weapon: shell,
            },
            hostile: HostileSpec {
                max_health: 100,
                kill_score: 100,
                despawn_distance: 800.0,
                steering: Steering::Circle {
                    engagement_radius: 80.0,
                    approach_speed: 30.0,
                    orbit_speed: 25.0,
                    response: 2.0,
                },
                attack: AttackSpec {
                    min_range: 0.0,
                    max_range: 150.0,
                    trigger: AttackTrigger::Cooldown { seconds: 2.0 },
                    effect: AttackEffect::Projectile {
                        weapon: WeaponSpec {
                            speed: 100.0,
                            damage: 15,
                            homing: None,
                            muzzle_offset: Vec3::new(0.0, 6.5, 0.0),
                            ..shell
                        },
                    },
                },
            },
            spawn: SpawnSpec {
                gate: SpawnGate::Every { seconds: 6.0 },
                inner_radius: 200.0,
                outer_radius: 350.0,
                max_hostiles: 4,
                initial: None,
            },
            contact: Some(ContactSpec {
                radius: 15.0,
                damage: 20,
            }),
            destination: DestinationSpec {
                position: Vec3::new(0.0, 0.0, -1500.0),
                radius: 120.0,
            },
            quiz: QuizSpec {
                category: QuestionCategory::Academic,
                question_count: 15,
                question_limit: Some(15),
                trigger_interval: 3.0,
                kill_trigger: Some(2),
                pause_combat: true,
                answer_timeout: Some(10),
                resolve_delay: 1.0,
                scoring: Scoring::Graded {
                    points: 50,
                    health_bonus: 10,
                    health_penalty: 10,
                },
            },
        }
    }

    /// Load a full profile from JSON and check it.
    pub fn from_json_str(json: &str) -> Result<GameProfile, ProfileError> {
        let profile: GameProfile = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Reject parameter sets that would break the simulation's guarantees.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let spawn = &self.spawn;
        if spawn.max_hostiles == 0 {
            return Err(ProfileError::NoHostileSlots);
        }
        check_bands(spawn.inner_radius, spawn.outer_radius)?;
        if let Some(wave) = &spawn.initial {
            check_bands(wave.inner_radius, wave.outer_radius)?;
        }
        if let Some(contact) = &self.contact {
            let nearest = spawn
                .initial
                .map_or(spawn.inner_radius, |w| w.inner_radius.min(spawn.inner_radius));
            if nearest <= contact.radius {
                return Err(ProfileError::SpawnInsideContact {
                    inner: nearest,
                    contact: contact.radius,
                });
            }
        }
        positive("player.movement.speed", self.player.movement.speed)?;
        positive("player.weapon.speed", self.player.weapon.speed)?;
        positive("player.weapon.hit_radius", self.player.weapon.hit_radius)?;
        positive("player.weapon.max_lifetime", self.player.weapon.max_lifetime)?;
        positive("hostile.despawn_distance", self.hostile.despawn_distance)?;
        positive("quiz.trigger_interval", self.quiz.trigger_interval)?;
        at_least_one("quiz.kill_trigger", self.quiz.kill_trigger)?;
        at_least_one("quiz.answer_timeout", self.quiz.answer_timeout)?;
        if let AttackEffect::Projectile { weapon } = &self.hostile.attack.effect {
            positive("hostile.attack.weapon.speed", weapon.speed)?;
            positive("hostile.attack.weapon.hit_radius", weapon.hit_radius)?;
        }
        Ok(())
    }
}

fn check_bands(inner: f32, outer: f32) -> Result<(), ProfileError> {
    positive("spawn inner radius", inner)?;
    if inner >= outer {
        return Err(ProfileError::EmptySpawnBand { inner, outer });
    }
    Ok(())
}

fn at_least_one(field: &'static str, value: Option<u32>) -> Result<(), ProfileError> {
    match value {
        Some(0) => Err(ProfileError::ZeroCount { field }),
        _ => Ok(()),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ProfileError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ProfileError::NonPositive { field, value })
    }
}
