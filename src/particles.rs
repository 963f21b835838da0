/// Particle/effect lifecycle: spawn a burst, decay it, cull it.
///
/// Particles are cosmetic, but they are created every tick by trails and
/// every hit by explosions, so the pool is hard-capped: when a burst would
/// overflow it the oldest particles are dropped first.
use glam::Vec3;
use rand::Rng;

use crate::entities::{EffectKind, Particle};

pub const MAX_PARTICLES: usize = 600;

struct Burst {
    count: usize,
    min_life: f32,
    max_life: f32,
    /// Scale of the random velocity; zero means the particle stays put.
    speed: f32,
    gravity: f32,
    /// Spray upward only (water splash).
    upward: bool,
}

fn burst(kind: EffectKind) -> Burst {
    match kind {
        EffectKind::MuzzleFlash => Burst {
            count: 6,
            min_life: 0.15,
            max_life: 0.3,
            speed: 10.0,
            gravity: 0.0,
            upward: false,
        },
        EffectKind::Trail => Burst {
            count: 1,
            min_life: 1.0,
            max_life: 1.0,
            speed: 0.0,
            gravity: 0.0,
            upward: false,
        },
        EffectKind::Explosion => Burst {
            count: 20,
            min_life: 0.5,
            max_life: 1.0,
            speed: 20.0,
            gravity: -20.0,
            upward: false,
        },
        EffectKind::Destruction => Burst {
            count: 60,
            min_life: 0.8,
            max_life: 1.5,
            speed: 30.0,
            gravity: -30.0,
            upward: false,
        },
        EffectKind::Splash => Burst {
            count: 15,
            min_life: 0.5,
            max_life: 0.5,
            speed: 60.0,
            gravity: -360.0,
            upward: true,
        },
        EffectKind::GroundBurst => Burst {
            count: 25,
            min_life: 0.6,
            max_life: 1.0,
            speed: 25.0,
            gravity: -40.0,
            upward: true,
        },
        EffectKind::SonicBoom => Burst {
            count: 1,
            min_life: 0.5,
            max_life: 0.5,
            speed: 0.0,
            gravity: 0.0,
            upward: false,
        },
    }
}

/// Spawn the particles for one effect at `position`.
pub fn emit(particles: &mut Vec<Particle>, kind: EffectKind, position: Vec3, rng: &mut impl Rng) {
    let spec = burst(kind);
    for _ in 0..spec.count {
        let life = if spec.max_life > spec.min_life {
            rng.gen_range(spec.min_life..spec.max_life)
        } else {
            spec.min_life
        };
        let velocity = (spec.speed > 0.0).then(|| {
            let y = if spec.upward {
                rng.gen_range(0.0..1.0)
            } else {
                rng.gen_range(-0.5..0.5)
            };
            Vec3::new(rng.gen_range(-0.5..0.5), y, rng.gen_range(-0.5..0.5)) * 2.0 * spec.speed
        });
        particles.push(Particle {
            kind,
            position,
            velocity,
            gravity: spec.gravity,
            life,
            max_life: life,
        });
    }

    if particles.len() > MAX_PARTICLES {
        let excess = particles.len() - MAX_PARTICLES;
        particles.drain(..excess);
    }
}

/// Age every particle by `delta` and drop the expired ones.
/// Returns how many were culled.
pub fn advance(particles: &mut Vec<Particle>, delta: f32) -> usize {
    for particle in particles.iter_mut() {
        particle.life -= delta;
        if let Some(velocity) = particle.velocity.as_mut() {
            velocity.y += particle.gravity * delta;
            particle.position += *velocity * delta;
        }
    }
    let before = particles.len();
    particles.retain(|p| p.life > 0.0);
    before - particles.len()
}
