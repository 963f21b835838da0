use approx::assert_relative_eq;
use glam::Vec3;

use career_quest::collisions;
use career_quest::entities::{ProjectileOwner, RemovalReason, SimEvent, SimulationState};
use career_quest::profile::{GameKind, HomingSpec};
use career_quest::projectiles;

mod common;
use common::{add_hostile, add_projectile, quiet_profile, seeded_rng, DT};

fn angle_to(velocity: Vec3, from: Vec3, target: Vec3) -> f32 {
    velocity.angle_between(target - from)
}

#[test]
fn each_homing_step_turns_toward_a_close_hostile() {
    let profile = quiet_profile(GameKind::Air);
    let homing = profile.player.weapon.homing.expect("air missiles home");
    let position = Vec3::ZERO;
    // Hostile 50 units away, inside the 400 activation radius.
    let target = Vec3::new(30.0, 0.0, -40.0);
    let mut velocity = Vec3::NEG_Z * 250.0;
    let mut last = angle_to(velocity, position, target);
    for _ in 0..5 {
        velocity = projectiles::steer_towards(velocity, position, target, 250.0, &homing, DT);
        let angle = angle_to(velocity, position, target);
        assert!(angle < last, "angle {angle} did not drop below {last}");
        last = angle;
    }
}

#[test]
fn homing_missile_converges_on_the_nearest_hostile() {
    let profile = quiet_profile(GameKind::Air);
    let mut state = SimulationState::new(&profile);
    let player = state.player.position;
    // Far enough out that the missile out-turns the line of sight.
    let target = add_hostile(&mut state, &profile, player + Vec3::new(180.0, 0.0, -240.0));
    let weapon = profile.player.weapon;
    add_projectile(
        &mut state,
        ProjectileOwner::Player,
        player,
        Vec3::NEG_Z * weapon.speed,
        weapon,
    );
    let mut rng = seeded_rng();

    let target_pos = state.hostile(target).expect("spawned").position;
    let mut last = angle_to(state.projectiles[0].velocity, state.projectiles[0].position, target_pos);
    for _ in 0..5 {
        projectiles::advance(&mut state, DT, &mut rng);
        let p = &state.projectiles[0];
        let angle = angle_to(p.velocity, p.position, target_pos);
        assert!(angle < last, "angle {angle} did not drop below {last}");
        last = angle;
    }
}

#[test]
fn homing_ignores_targets_beyond_activation_radius() {
    let homing = HomingSpec {
        activation_radius: 400.0,
        turn_rate: 4.0,
    };
    let nearest = projectiles::nearest_target(Vec3::ZERO, [Vec3::new(500.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 450.0)]);
    let (_, distance) = nearest.expect("two candidates");
    assert_relative_eq!(distance, 450.0);
    assert!(distance > homing.activation_radius);
    assert!(projectiles::nearest_target(Vec3::ZERO, Vec::new()).is_none());
}

#[test]
fn steering_factor_is_capped() {
    let homing = HomingSpec {
        activation_radius: 400.0,
        turn_rate: 4.0,
    };
    // A huge delta snaps straight onto the bearing instead of overshooting.
    let v = projectiles::steer_towards(Vec3::NEG_Z * 10.0, Vec3::ZERO, Vec3::X * 5.0, 10.0, &homing, 5.0);
    assert_relative_eq!(v.x, 10.0, epsilon = 1e-5);
    assert_relative_eq!(v.z, 0.0, epsilon = 1e-5);
}

#[test]
fn cannonballs_arc_under_gravity() {
    let profile = quiet_profile(GameKind::Naval);
    let mut state = SimulationState::new(&profile);
    let weapon = profile.player.weapon;
    add_projectile(
        &mut state,
        ProjectileOwner::Player,
        Vec3::new(0.0, 3.0, -15.0),
        Vec3::NEG_Z * weapon.speed,
        weapon,
    );
    let mut rng = seeded_rng();
    let mut last_vy = 0.0;
    for _ in 0..10 {
        projectiles::advance(&mut state, DT, &mut rng);
        let vy = state.projectiles[0].velocity.y;
        assert!(vy < last_vy);
        last_vy = vy;
    }
}

#[test]
fn expiry_reasons() {
    let profile = quiet_profile(GameKind::Armor);
    let mut state = SimulationState::new(&profile);
    let weapon = profile.player.weapon;
    add_projectile(&mut state, ProjectileOwner::Player, Vec3::new(0.0, -1.0, 0.0), Vec3::ZERO, weapon);
    add_projectile(&mut state, ProjectileOwner::Player, Vec3::new(600.0, 5.0, 0.0), Vec3::ZERO, weapon);
    add_projectile(&mut state, ProjectileOwner::Player, Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, weapon);
    state.projectiles[2].age = 11.0;

    let player = state.player.position;
    let reasons: Vec<_> = state
        .projectiles
        .iter()
        .map(|p| projectiles::expiry(p, player))
        .collect();
    assert_eq!(
        reasons,
        vec![
            Some(RemovalReason::Grounded),
            Some(RemovalReason::OutOfBounds),
            Some(RemovalReason::Expired)
        ]
    );
}

#[test]
fn player_fire_respects_the_cooldown() {
    let profile = quiet_profile(GameKind::Naval);
    let mut state = SimulationState::new(&profile);
    let mut rng = seeded_rng();
    let mut events = Vec::new();

    assert!(projectiles::fire_player_weapon(&mut state, &profile, &mut rng, &mut events).is_some());
    state.elapsed += 0.1;
    assert!(projectiles::fire_player_weapon(&mut state, &profile, &mut rng, &mut events).is_none());
    state.elapsed += profile.player.fire_cooldown;
    assert!(projectiles::fire_player_weapon(&mut state, &profile, &mut rng, &mut events).is_some());
    assert_eq!(state.projectiles.len(), 2);

    // Launched from the bow, heading forward.
    let shot = &state.projectiles[0];
    assert_relative_eq!(shot.position.z, -15.0, epsilon = 1e-4);
    assert!(shot.velocity.z < 0.0);
}

#[test]
fn projectile_that_hits_and_expires_is_removed_exactly_once() {
    let profile = quiet_profile(GameKind::Armor);
    let mut state = SimulationState::new(&profile);
    let hostile = add_hostile(&mut state, &profile, Vec3::new(0.0, 2.0, -100.0));
    let weapon = profile.player.weapon;
    let shot = add_projectile(
        &mut state,
        ProjectileOwner::Player,
        Vec3::new(0.0, 2.0, -100.0),
        Vec3::ZERO,
        weapon,
    );
    // Also past its lifetime.
    state.projectiles[0].age = 20.0;
    let mut rng = seeded_rng();
    let mut events = Vec::new();

    collisions::resolve_projectile_hits(&mut state, &profile, &mut rng, &mut events);
    projectiles::cull(&mut state, &mut rng, &mut events);
    collisions::resolve_projectile_hits(&mut state, &profile, &mut rng, &mut events);
    projectiles::cull(&mut state, &mut rng, &mut events);

    let removals: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, SimEvent::ProjectileRemoved { id, .. } if *id == shot))
        .collect();
    assert_eq!(
        removals,
        vec![&SimEvent::ProjectileRemoved {
            id: shot,
            reason: RemovalReason::Hit
        }]
    );
    assert_eq!(
        state.hostile(hostile).expect("still alive").health.current(),
        profile.hostile.max_health - weapon.damage
    );
}

#[test]
fn grounded_shells_leave_a_ground_burst() {
    let profile = quiet_profile(GameKind::Armor);
    let mut state = SimulationState::new(&profile);
    add_projectile(
        &mut state,
        ProjectileOwner::Player,
        Vec3::new(0.0, -0.5, -50.0),
        Vec3::ZERO,
        profile.player.weapon,
    );
    let mut rng = seeded_rng();
    let mut events = Vec::new();
    projectiles::cull(&mut state, &mut rng, &mut events);

    assert!(state.projectiles.is_empty());
    assert!(!state.particles.is_empty());
    assert!(matches!(
        events[0],
        SimEvent::ProjectileRemoved {
            reason: RemovalReason::Grounded,
            ..
        }
    ));
}
