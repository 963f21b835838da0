/// Projectile physics and homing.
///
/// Integration is explicit Euler scaled by delta. Homing is deliberately
/// arcade: the velocity is linearly interpolated toward the bearing of the
/// nearest opposing entity, which curves the flight over a fraction of a
/// second instead of snapping onto the target.
use glam::Vec3;
use log::debug;
use rand::Rng;

use crate::entities::{
    forward, local_to_world, EffectKind, EntityId, Projectile, ProjectileOwner, RemovalReason, SimEvent,
    SimulationState,
};
use crate::particles;
use crate::profile::{Bounds, GameProfile, HomingSpec, WeaponSpec};

/// Put a new projectile into play.
pub fn launch(
    state: &mut SimulationState,
    owner: ProjectileOwner,
    position: Vec3,
    velocity: Vec3,
    weapon: WeaponSpec,
    events: &mut Vec<SimEvent>,
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
    events.push(SimEvent::ProjectileFired { id, owner });
    id
}

/// Fire the player's weapon along their heading if the cooldown allows.
pub fn fire_player_weapon(
    state: &mut SimulationState,
    profile: &GameProfile,
    rng: &mut impl Rng,
    events: &mut Vec<SimEvent>,
) -> Option<EntityId> {
    let spec = &profile.player;
    if let Some(last) = state.player.last_fire {
        if state.elapsed - last < spec.fire_cooldown {
            return None;
        }
    }
    let player = &state.player;
    let weapon = spec.weapon;
    let origin = local_to_world(player.position, player.yaw, weapon.muzzle_offset);
    let velocity = forward(player.yaw) * weapon.speed;
    state.player.last_fire = Some(state.elapsed);
    particles::emit(&mut state.particles, EffectKind::MuzzleFlash, origin, rng);
    Some(launch(state, ProjectileOwner::Player, origin, velocity, weapon, events))
}

/// Closest candidate to `from`, with its distance.
pub fn nearest_target(from: Vec3, candidates: impl IntoIterator<Item = Vec3>) -> Option<(Vec3, f32)> {
    candidates
        .into_iter()
        .map(|p| (p, p.distance(from)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Ease `velocity` toward the bearing of `target`, keeping `speed` as the
/// goal magnitude.
pub fn steer_towards(velocity: Vec3, position: Vec3, target: Vec3, speed: f32, homing: &HomingSpec, delta: f32) -> Vec3 {
    let desired = (target - position).normalize_or_zero() * speed;
    velocity.lerp(desired, (delta * homing.turn_rate).min(1.0))
}

/// Advance one projectile's kinematics.
pub fn integrate(projectile: &mut Projectile, delta: f32) {
    projectile.age += delta;
    projectile.velocity.y -= projectile.weapon.gravity * delta;
    projectile.position += projectile.velocity * delta;
}

/// Why this projectile should leave play now, if it should.
pub fn expiry(projectile: &Projectile, player_position: Vec3) -> Option<RemovalReason> {
    let weapon = &projectile.weapon;
    if let Some(ground) = weapon.ground_level {
        if projectile.position.y < ground {
            return Some(RemovalReason::Grounded);
        }
    }
    if projectile.age > weapon.max_lifetime {
        return Some(RemovalReason::Expired);
    }
    let outside = match weapon.bounds {
        Bounds::FromPlayer { radius } => projectile.position.distance(player_position) > radius,
        Bounds::World { half_extent } => {
            projectile.position.x.abs() > half_extent || projectile.position.z.abs() > half_extent
        }
    };
    outside.then_some(RemovalReason::OutOfBounds)
}

/// Homing correction then integration for every live projectile.
pub fn advance(state: &mut SimulationState, delta: f32, rng: &mut impl Rng) {
    // Target positions as of the start of this stage.
    let hostile_positions: Vec<Vec3> = state.hostiles.iter().map(|h| h.position).collect();
    let player_position = state.player.position;

    for projectile in state.projectiles.iter_mut() {
        if let Some(homing) = projectile.weapon.homing {
            let target = match projectile.owner {
                ProjectileOwner::Player => nearest_target(projectile.position, hostile_positions.iter().copied()),
                ProjectileOwner::Hostile(_) => nearest_target(projectile.position, [player_position]),
            };
            if let Some((target, distance)) = target {
                if distance < homing.activation_radius {
                    projectile.velocity = steer_towards(
                        projectile.velocity,
                        projectile.position,
                        target,
                        projectile.weapon.speed,
                        &homing,
                        delta,
                    );
                }
            }
        }
        integrate(projectile, delta);
        if projectile.weapon.trail {
            particles::emit(&mut state.particles, EffectKind::Trail, projectile.position, rng);
        }
    }
}

/// Remove projectiles that expired, left bounds or hit the ground.
/// Runs after collision resolution, so a projectile consumed by a hit is
/// already gone and cannot be removed a second time.
pub fn cull(state: &mut SimulationState, rng: &mut impl Rng, events: &mut Vec<SimEvent>) {
    let player_position = state.player.position;
    let pool = &mut state.particles;
    state.projectiles.retain(|projectile| {
        let Some(reason) = expiry(projectile, player_position) else {
            return true;
        };
        if reason == RemovalReason::Grounded {
            let mut impact = projectile.position;
            if let Some(ground) = projectile.weapon.ground_level {
                impact.y = ground.max(0.0);
            }
            let effect = if projectile.weapon.gravity > 0.0 {
                EffectKind::Splash
            } else {
                EffectKind::GroundBurst
            };
            particles::emit(pool, effect, impact, rng);
        }
        debug!("projectile {:?} removed: {:?}", projectile.id, reason);
        events.push(SimEvent::ProjectileRemoved {
            id: projectile.id,
            reason,
        });
        false
    });
}
