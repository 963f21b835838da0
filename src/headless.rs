/// Scripted runs without a terminal.
///
/// The autopilot holds forward and fire and answers every question with the
/// first option on screen. Time advances in fixed steps and the question
/// fetch is settled before the first tick, so a run is fully determined by
/// its profile, question list and RNG seed.
use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::clock::FrameClock;
use crate::compute::Simulation;
use crate::entities::SimEvent;
use crate::input::InputState;
use crate::services::HudFrame;

/// Where a scripted run ended up.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub hud: HudFrame,
    /// Simulated seconds.
    pub elapsed: f32,
    pub kills: u32,
    pub ticks: u32,
}

/// Run at most `ticks` steps of `step`, stopping early on victory or defeat.
pub fn run(sim: &mut Simulation, ticks: u32, step: Duration, rng: &mut impl Rng) -> Summary {
    sim.wait_for_questions();

    let mut clock = FrameClock::new(step.as_secs_f32());
    let input = InputState {
        forward: true,
        fire: true,
        ..InputState::default()
    };

    let mut taken = 0;
    while taken < ticks && !sim.status().is_terminal() {
        let frame = clock.advance_by(step);
        let events = sim.advance(frame.delta, &input, rng);
        taken += 1;
        for event in &events {
            if let SimEvent::QuestionShown { number, .. } = event {
                debug!("autopilot answering question {}", number + 1);
            }
        }
        if sim.quiz().current().is_some() {
            sim.select_answer(0);
        }
    }

    Summary {
        hud: sim.hud_frame(),
        elapsed: clock.elapsed(),
        kills: sim.state().kills,
        ticks: taken,
    }
}
