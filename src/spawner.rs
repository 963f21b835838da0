/// Hostile spawner.
///
/// New hostiles appear on a ring around the player, never inside the inner
/// radius, and never while the live count is at the profile's maximum.
use std::f32::consts::TAU;

use glam::Vec3;
use log::debug;
use rand::Rng;

use crate::entities::{Health, Hostile, SimEvent, SimulationState};
use crate::profile::{GameProfile, SpawnGate};

/// Does the gate open on this tick? A periodic gate opens on the tick that
/// crosses a multiple of its period.
pub fn gate_open(gate: &SpawnGate, elapsed: f32, delta: f32, rng: &mut impl Rng) -> bool {
    match *gate {
        SpawnGate::Chance { per_second } => {
            let p = (per_second * delta).clamp(0.0, 1.0);
            rng.gen_bool(p as f64)
        }
        SpawnGate::Every { seconds } => {
            seconds > 0.0 && (elapsed / seconds).floor() > ((elapsed - delta) / seconds).floor()
        }
    }
}

/// Random point on the ring `inner..outer` around `center`, at `altitude`.
pub fn ring_position(center: Vec3, inner: f32, outer: f32, altitude: f32, rng: &mut impl Rng) -> Vec3 {
    let angle = rng.gen_range(0.0..TAU);
    let radius = rng.gen_range(inner..outer);
    Vec3::new(
        center.x + angle.cos() * radius,
        altitude,
        center.z + angle.sin() * radius,
    )
}

fn push_hostile(state: &mut SimulationState, profile: &GameProfile, position: Vec3, events: &mut Vec<SimEvent>) {
    let id = state.allocate_id();
    state.hostiles.push(Hostile {
        id,
        position,
        velocity: Vec3::ZERO,
        yaw: 0.0,
        health: Health::full(profile.hostile.max_health),
        last_attack: 0.0,
    });
    debug!("hostile {:?} spawned at {:.0?} ({} live)", id, position, state.hostiles.len());
    events.push(SimEvent::HostileSpawned { id, position });
}

/// Place the opening wave, spread evenly in angle.
pub fn seed_initial(state: &mut SimulationState, profile: &GameProfile, rng: &mut impl Rng, events: &mut Vec<SimEvent>) {
    let Some(wave) = profile.spawn.initial else {
        return;
    };
    let center = state.player.position;
    let altitude = profile.player.movement.altitude;
    for i in 0..wave.count.min(profile.spawn.max_hostiles) {
        let angle = i as f32 / 3.0 * TAU;
        let radius = rng.gen_range(wave.inner_radius..wave.outer_radius);
        let position = Vec3::new(
            center.x + angle.cos() * radius,
            altitude,
            center.z + angle.sin() * radius,
        );
        push_hostile(state, profile, position, events);
    }
}

/// Per-tick spawn step. Silently does nothing at the hostile bound.
pub fn run(state: &mut SimulationState, profile: &GameProfile, delta: f32, rng: &mut impl Rng, events: &mut Vec<SimEvent>) {
    let spawn = &profile.spawn;
    if state.hostiles.len() >= spawn.max_hostiles {
        return;
    }
    if !gate_open(&spawn.gate, state.elapsed, delta, rng) {
        return;
    }
    let position = ring_position(
        state.player.position,
        spawn.inner_radius,
        spawn.outer_radius,
        profile.player.movement.altitude,
        rng,
    );
    push_hostile(state, profile, position, events);
}
