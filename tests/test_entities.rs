use std::f32::consts::{FRAC_PI_2, PI};

use approx::assert_relative_eq;
use glam::Vec3;
use rstest::rstest;

use career_quest::entities::*;
use career_quest::profile::{GameKind, GameProfile};

// ── Health ────────────────────────────────────────────────────────────────────

#[test]
fn damage_saturates_at_zero() {
    let mut health = Health::full(100);
    assert_eq!(health.damage(50), 50);
    assert_eq!(health.damage(50), 0);
    assert_eq!(health.damage(50), 0);
    assert!(health.is_depleted());
}

#[test]
fn heal_is_capped_at_max() {
    let mut health = Health::full(100);
    health.damage(5);
    assert_eq!(health.heal(10), 100);
    assert_eq!(health.max(), 100);
}

#[test]
fn percent_tracks_current_over_max() {
    let mut health = Health::full(3);
    assert_eq!(health.percent(), 100);
    health.damage(1);
    assert_eq!(health.percent(), 66);
    health.damage(5);
    assert_eq!(health.percent(), 0);
}

// ── Orientation ──────────────────────────────────────────────────────────────

#[test]
fn yaw_zero_faces_negative_z() {
    let f = forward(0.0);
    assert_relative_eq!(f.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(f.z, -1.0, epsilon = 1e-6);
}

#[rstest]
#[case(0.0)]
#[case(FRAC_PI_2)]
#[case(-FRAC_PI_2)]
#[case(PI - 0.1)]
#[case(1.0)]
fn yaw_towards_inverts_forward(#[case] yaw: f32) {
    let back = yaw_towards(forward(yaw));
    assert_relative_eq!(back, yaw, epsilon = 1e-5);
}

#[test]
fn local_offset_rotates_with_yaw() {
    // Muzzle 10 ahead; turned a quarter left, ahead is -X.
    let p = local_to_world(Vec3::new(5.0, 0.0, 5.0), FRAC_PI_2, Vec3::new(0.0, 3.0, -10.0));
    assert_relative_eq!(p.x, -5.0, epsilon = 1e-4);
    assert_relative_eq!(p.y, 3.0, epsilon = 1e-4);
    assert_relative_eq!(p.z, 5.0, epsilon = 1e-4);
}

#[test]
fn planar_bearing_ignores_height() {
    let (dir, dist) = planar_bearing(Vec3::new(0.0, 200.0, 0.0), Vec3::new(30.0, 0.0, 40.0));
    assert_relative_eq!(dist, 50.0);
    assert_relative_eq!(dir.y, 0.0);
    assert_relative_eq!(dir.length(), 1.0, epsilon = 1e-6);
}

// ── State ────────────────────────────────────────────────────────────────────

#[rstest]
#[case(GameKind::Naval)]
#[case(GameKind::Air)]
#[case(GameKind::Armor)]
fn new_state_starts_at_altitude_with_full_health(#[case] kind: GameKind) {
    let profile = GameProfile::for_kind(kind);
    let state = SimulationState::new(&profile);
    assert_eq!(state.player.position.y, profile.player.movement.altitude);
    assert_eq!(state.player.health.current(), profile.player.max_health);
    assert_eq!(state.status, GameStatus::Running);
    assert!(state.hostiles.is_empty());
    assert!(state.projectiles.is_empty());
}

#[test]
fn allocated_ids_are_unique() {
    let mut state = SimulationState::new(&GameProfile::naval());
    let a = state.allocate_id();
    let b = state.allocate_id();
    assert_ne!(a, b);
}

#[test]
fn state_clone_is_independent() {
    let original = SimulationState::new(&GameProfile::naval());
    let mut cloned = original.clone();
    cloned.player.score = 999;
    cloned.player.health.damage(10);
    assert_eq!(original.player.score, 0);
    assert_eq!(original.player.health.current(), 100);
}

#[test]
fn terminal_statuses() {
    assert!(!GameStatus::Running.is_terminal());
    assert!(GameStatus::Victory.is_terminal());
    assert!(GameStatus::Defeat.is_terminal());
}

#[test]
fn particle_fade_runs_from_one_to_zero() {
    let mut p = Particle {
        kind: EffectKind::Explosion,
        position: Vec3::ZERO,
        velocity: None,
        gravity: 0.0,
        life: 1.0,
        max_life: 1.0,
    };
    assert_relative_eq!(p.fade(), 1.0);
    p.life = 0.25;
    assert_relative_eq!(p.fade(), 0.25);
    p.life = -1.0;
    assert_relative_eq!(p.fade(), 0.0);
}
