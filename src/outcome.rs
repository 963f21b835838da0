/// Win/loss evaluation.
use log::info;

use crate::entities::{GameStatus, SimEvent, SimulationState};
use crate::profile::DestinationSpec;

/// Status the run should be in, judged from the current state.
/// Defeat is checked first so dying on the finish line still loses.
pub fn evaluate(state: &SimulationState, destination: &DestinationSpec) -> GameStatus {
    if state.status.is_terminal() {
        return state.status;
    }
    if state.player.health.is_depleted() {
        return GameStatus::Defeat;
    }
    if state.player.position.distance(destination.position) < destination.radius {
        return GameStatus::Victory;
    }
    GameStatus::Running
}

/// Move to a terminal status at most once. Returns the new status when this
/// call was the transition.
pub fn apply(
    state: &mut SimulationState,
    destination: &DestinationSpec,
    events: &mut Vec<SimEvent>,
) -> Option<GameStatus> {
    if state.status.is_terminal() {
        return None;
    }
    let status = evaluate(state, destination);
    match status {
        GameStatus::Running => return None,
        GameStatus::Victory => {
            info!("victory after {:.1}s, score {}", state.elapsed, state.player.score);
            events.push(SimEvent::Victory);
        }
        GameStatus::Defeat => {
            info!("defeat after {:.1}s, score {}", state.elapsed, state.player.score);
            events.push(SimEvent::Defeat);
        }
    }
    state.status = status;
    Some(status)
}
