/// Movement & input resolution.
///
/// Maps the held-key snapshot to the player's next pose. Nothing here reads
/// a clock or touches the rest of the world.
use glam::Vec3;

use crate::entities::{forward, Player};
use crate::profile::MovementSpec;

/// Which controls are held this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub reverse: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub boost: bool,
}

/// The player's pose after one tick of input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub position: Vec3,
    pub yaw: f32,
    pub bank: f32,
    pub velocity: Vec3,
    pub boosting: bool,
}

/// Bank decays by this factor per 1/60 s when no turn key is held.
const BANK_DECAY_PER_FRAME: f32 = 0.95;

pub fn resolve_motion(player: &Player, spec: &MovementSpec, input: &InputState, delta: f32) -> Motion {
    // Turning is immediate: yaw changes directly, no angular inertia.
    let mut yaw = player.yaw;
    if input.left {
        yaw += spec.turn_rate * delta;
    }
    if input.right {
        yaw -= spec.turn_rate * delta;
    }

    let bank = if input.left && !input.right {
        (player.bank + delta).min(spec.max_bank)
    } else if input.right && !input.left {
        (player.bank - delta).max(-spec.max_bank)
    } else {
        player.bank * BANK_DECAY_PER_FRAME.powf(delta * 60.0)
    };

    let heading = forward(yaw);
    let mut throttle = 0.0;
    if input.forward {
        throttle += 1.0;
    }
    if input.reverse {
        throttle -= spec.reverse_scale;
    }
    let mut velocity = heading * spec.speed * throttle;

    let boosting = input.boost && spec.boost.is_some();
    if let Some(boost) = spec.boost.filter(|_| input.boost) {
        velocity += heading * boost.extra_speed;
    }

    let mut position = player.position + velocity * delta;
    position.y = spec.altitude;

    Motion {
        position,
        yaw,
        bank,
        velocity,
        boosting,
    }
}

pub fn apply_motion(player: &mut Player, motion: &Motion) {
    player.position = motion.position;
    player.yaw = motion.yaw;
    player.bank = motion.bank;
    player.velocity = motion.velocity;
}
