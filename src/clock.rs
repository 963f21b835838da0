/// Frame timing for callers that drive the simulation from wall time.
use std::time::{Duration, Instant};

/// One step's worth of time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    pub delta: f32,
    pub elapsed: f32,
}

/// Turns wall-clock instants into tick deltas. A stall (debugger, suspended
/// terminal) is clamped to `max_delta` so nothing tunnels through a target.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last: Instant,
    max_delta: f32,
    elapsed: f32,
}

impl FrameClock {
    pub fn new(max_delta: f32) -> FrameClock {
        FrameClock {
            last: Instant::now(),
            max_delta,
            elapsed: 0.0,
        }
    }

    /// Time since the previous call.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let step = now.duration_since(self.last);
        self.last = now;
        self.advance_by(step)
    }

    /// Step by a known amount instead of reading the wall clock.
    pub fn advance_by(&mut self, step: Duration) -> FrameTime {
        let delta = step.as_secs_f32().min(self.max_delta);
        self.elapsed += delta;
        FrameTime {
            delta,
            elapsed: self.elapsed,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}
