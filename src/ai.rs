/// Hostile AI: steering, facing, attacks and out-of-range despawn.
///
/// Decisions for every hostile are taken first against the positions at the
/// start of the stage, then applied, so no hostile reacts to another one
/// that already moved this tick.
use glam::Vec3;
use log::debug;
use rand::Rng;

use crate::entities::{
    local_to_world, planar_bearing, yaw_towards, EffectKind, EntityId, ProjectileOwner, SimEvent,
    SimulationState,
};
use crate::particles;
use crate::profile::{AttackEffect, AttackSpec, AttackTrigger, GameProfile, Steering};
use crate::projectiles;

/// New velocity for a hostile at `position` moving at `velocity`, given the
/// bearing and distance to the player.
pub fn steer(steering: &Steering, velocity: Vec3, bearing: Vec3, distance: f32, delta: f32) -> Vec3 {
    match *steering {
        Steering::Pursuit {
            cruise_speed,
            hold_radius,
            ram_speed,
            ram_inner,
            ram_outer,
        } => {
            let mut next = velocity;
            if distance > hold_radius {
                next = bearing * cruise_speed;
            }
            if distance > ram_inner && distance < ram_outer {
                next = bearing * ram_speed;
            }
            next
        }
        Steering::Chase { speed, response } => velocity.lerp(bearing * speed, (delta * response).min(1.0)),
        Steering::Circle {
            engagement_radius,
            approach_speed,
            orbit_speed,
            response,
        } => {
            let t = (delta * response).min(1.0);
            if distance > engagement_radius {
                velocity.lerp(bearing * approach_speed, t)
            } else {
                let tangent = Vec3::new(-bearing.z, 0.0, bearing.x);
                velocity.lerp(tangent * orbit_speed, t)
            }
        }
    }
}

/// Whether the attack trigger fires this tick. Updates nothing.
fn wants_attack(attack: &AttackSpec, distance: f32, last_attack: f32, elapsed: f32, delta: f32, rng: &mut impl Rng) -> bool {
    if distance <= attack.min_range || distance >= attack.max_range {
        return false;
    }
    match attack.trigger {
        AttackTrigger::Cooldown { seconds } => elapsed - last_attack > seconds,
        AttackTrigger::Chance { per_second } => rng.gen_bool((per_second * delta).clamp(0.0, 1.0) as f64),
    }
}

struct Decision {
    velocity: Vec3,
    yaw: f32,
    attack: bool,
    despawn: bool,
}

pub fn run(state: &mut SimulationState, profile: &GameProfile, delta: f32, rng: &mut impl Rng, events: &mut Vec<SimEvent>) {
    let spec = &profile.hostile;
    let player_position = state.player.position;

    // Decide.
    let decisions: Vec<Decision> = state
        .hostiles
        .iter()
        .map(|hostile| {
            let (bearing, distance) = planar_bearing(hostile.position, player_position);
            if distance > spec.despawn_distance {
                return Decision {
                    velocity: hostile.velocity,
                    yaw: hostile.yaw,
                    attack: false,
                    despawn: true,
                };
            }
            Decision {
                velocity: steer(&spec.steering, hostile.velocity, bearing, distance, delta),
                yaw: if distance > 0.0 { yaw_towards(bearing) } else { hostile.yaw },
                attack: wants_attack(&spec.attack, distance, hostile.last_attack, state.elapsed, delta, rng),
                despawn: false,
            }
        })
        .collect();

    // Apply.
    let mut attackers: Vec<(EntityId, Vec3, f32)> = Vec::new();
    for (hostile, decision) in state.hostiles.iter_mut().zip(&decisions) {
        if decision.despawn {
            continue;
        }
        hostile.velocity = decision.velocity;
        hostile.position += decision.velocity * delta;
        hostile.yaw = decision.yaw;
        if decision.attack {
            hostile.last_attack = state.elapsed;
            attackers.push((hostile.id, hostile.position, hostile.yaw));
        }
    }

    let mut index = 0;
    state.hostiles.retain(|hostile| {
        let keep = !decisions[index].despawn;
        index += 1;
        if !keep {
            debug!("hostile {:?} out of range, despawned", hostile.id);
            events.push(SimEvent::HostileDespawned { id: hostile.id });
        }
        keep
    });

    for (id, position, yaw) in attackers {
        attack(state, &spec.attack.effect, id, position, yaw, rng, events);
    }
}

fn attack(
    state: &mut SimulationState,
    effect: &AttackEffect,
    id: EntityId,
    position: Vec3,
    yaw: f32,
    rng: &mut impl Rng,
    events: &mut Vec<SimEvent>,
) {
    match *effect {
        AttackEffect::Projectile { weapon } => {
            let origin = local_to_world(position, yaw, weapon.muzzle_offset);
            // Aimed at where the player is now; no lead.
            let velocity = (state.player.position - origin).normalize_or_zero() * weapon.speed;
            particles::emit(&mut state.particles, EffectKind::MuzzleFlash, origin, rng);
            projectiles::launch(state, ProjectileOwner::Hostile(id), origin, velocity, weapon, events);
        }
        AttackEffect::Strafe { hit_chance, damage } => {
            if rng.gen_bool(hit_chance.clamp(0.0, 1.0)) {
                let remaining = state.player.health.damage(damage);
                particles::emit(&mut state.particles, EffectKind::Explosion, state.player.position, rng);
                events.push(SimEvent::PlayerHit { damage, remaining });
            }
        }
    }
}
