/// Collision resolution: projectile hits and player/hostile ramming.
///
/// All tests are sphere-distance checks. A projectile is consumed by the
/// first opposing entity it is found touching, and a hostile is removed from
/// the live set the moment its health runs out, so later projectiles in the
/// same pass can neither hit nor credit it again.
use log::{debug, info};
use rand::Rng;

use crate::entities::{EffectKind, EntityId, KillCause, ProjectileOwner, RemovalReason, SimEvent, SimulationState};
use crate::particles;
use crate::profile::GameProfile;

pub fn resolve_projectile_hits(
    state: &mut SimulationState,
    profile: &GameProfile,
    rng: &mut impl Rng,
    events: &mut Vec<SimEvent>,
) {
    let mut consumed: Vec<EntityId> = Vec::new();

    for projectile in &state.projectiles {
        let weapon = &projectile.weapon;
        match projectile.owner {
            ProjectileOwner::Player => {
                let Some(index) = state
                    .hostiles
                    .iter()
                    .position(|h| h.position.distance(projectile.position) < weapon.hit_radius)
                else {
                    continue;
                };
                consumed.push(projectile.id);

                let hostile = &mut state.hostiles[index];
                let remaining = hostile.health.damage(weapon.damage);
                let id = hostile.id;
                let position = hostile.position;
                events.push(SimEvent::HostileHit {
                    id,
                    damage: weapon.damage,
                    remaining,
                });
                particles::emit(&mut state.particles, EffectKind::Explosion, projectile.position, rng);

                if remaining <= 0 {
                    state.hostiles.remove(index);
                    state.player.score += profile.hostile.kill_score;
                    state.kills += 1;
                    particles::emit(&mut state.particles, EffectKind::Destruction, position, rng);
                    info!("hostile {:?} destroyed, score {}", id, state.player.score);
                    events.push(SimEvent::HostileDestroyed {
                        id,
                        cause: KillCause::Projectile,
                    });
                }
            }
            ProjectileOwner::Hostile(_) => {
                if state.player.position.distance(projectile.position) >= weapon.hit_radius {
                    continue;
                }
                consumed.push(projectile.id);
                let remaining = state.player.health.damage(weapon.damage);
                particles::emit(&mut state.particles, EffectKind::Explosion, projectile.position, rng);
                debug!("player hit for {}, {} left", weapon.damage, remaining);
                events.push(SimEvent::PlayerHit {
                    damage: weapon.damage,
                    remaining,
                });
            }
        }
    }

    if consumed.is_empty() {
        return;
    }
    state.projectiles.retain(|p| !consumed.contains(&p.id));
    for id in consumed {
        events.push(SimEvent::ProjectileRemoved {
            id,
            reason: RemovalReason::Hit,
        });
    }
}

/// Hostiles that touch the player deal lump damage and are wrecked.
/// No score is awarded for a collision kill.
pub fn resolve_contacts(
    state: &mut SimulationState,
    profile: &GameProfile,
    rng: &mut impl Rng,
    events: &mut Vec<SimEvent>,
) {
    let Some(contact) = profile.contact else {
        return;
    };
    let player_position = state.player.position;
    let player = &mut state.player;
    let pool = &mut state.particles;
    state.hostiles.retain(|hostile| {
        if hostile.position.distance(player_position) >= contact.radius {
            return true;
        }
        let remaining = player.health.damage(contact.damage);
        particles::emit(pool, EffectKind::Destruction, hostile.position, rng);
        debug!("hostile {:?} rammed the player", hostile.id);
        events.push(SimEvent::PlayerHit {
            damage: contact.damage,
            remaining,
        });
        events.push(SimEvent::HostileDestroyed {
            id: hostile.id,
            cause: KillCause::Contact,
        });
        false
    });
}
