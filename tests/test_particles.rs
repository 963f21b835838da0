use glam::Vec3;

use career_quest::entities::EffectKind;
use career_quest::particles::{self, MAX_PARTICLES};

mod common;
use common::seeded_rng;

#[test]
fn bursts_expire() {
    let mut rng = seeded_rng();
    let mut pool = Vec::new();
    particles::emit(&mut pool, EffectKind::Explosion, Vec3::ZERO, &mut rng);
    assert!(!pool.is_empty());

    let mut culled = 0;
    for _ in 0..120 {
        culled += particles::advance(&mut pool, 1.0 / 60.0);
    }
    assert!(pool.is_empty());
    assert!(culled > 0);
}

#[test]
fn pool_is_capped_oldest_first() {
    let mut rng = seeded_rng();
    let mut pool = Vec::new();
    particles::emit(&mut pool, EffectKind::MuzzleFlash, Vec3::new(1.0, 0.0, 0.0), &mut rng);
    for _ in 0..20 {
        particles::emit(&mut pool, EffectKind::Destruction, Vec3::ZERO, &mut rng);
    }
    assert_eq!(pool.len(), MAX_PARTICLES);
    assert!(pool.iter().all(|p| p.kind == EffectKind::Destruction));
}

#[test]
fn gravity_pulls_debris_down() {
    let mut rng = seeded_rng();
    let mut pool = Vec::new();
    particles::emit(&mut pool, EffectKind::Splash, Vec3::ZERO, &mut rng);
    let before: Vec<f32> = pool.iter().filter_map(|p| p.velocity).map(|v| v.y).collect();
    particles::advance(&mut pool, 0.1);
    let after: Vec<f32> = pool.iter().filter_map(|p| p.velocity).map(|v| v.y).collect();
    for (b, a) in before.iter().zip(&after) {
        assert!(a < b);
    }
}
