use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{GameId, StepId};

/// Composite key used in the completed-games map, e.g. `"3-2"` for
/// step 3, game 2. This is the wire format clients key their UI state on.
pub fn game_key(step_id: StepId, game_id: GameId) -> String {
    format!("{}-{}", step_id, game_id)
}

/// A player's progression through the hunt.
///
/// `current_clue` is `None` once the last step has been passed; there is no
/// separate "finished" flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub current_clue: Option<StepId>,
    pub completed_clues: Vec<StepId>,
    pub completed_tasks: Vec<StepId>,
    /// Keyed by [`game_key`], value is always `true` once present
    pub completed_games: BTreeMap<String, bool>,
    pub current_game_index: usize,
    pub last_updated: i64,
}

impl Progress {
    pub fn is_step_completed(&self, step_id: StepId) -> bool {
        self.completed_clues.contains(&step_id)
    }

    pub fn is_game_completed(&self, step_id: StepId, game_id: GameId) -> bool {
        self.completed_games.contains_key(&game_key(step_id, game_id))
    }

    pub fn is_finished(&self) -> bool {
        self.current_clue.is_none()
    }
}

/// Derived view of where a player stands inside the step/game state machine.
///
/// Transitions only move forward: games advance the index within a step,
/// completing the last game exposes the final-answer gate, and a correct
/// answer moves to the next step at index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Playing the game at `game_index` of step `step_id`
    InStep { step_id: StepId, game_index: usize },
    /// Every game of `step_id` is done; the final-answer gate is open
    AwaitingAnswer { step_id: StepId },
    /// No step remains in the catalog
    Finished,
}

impl Phase {
    /// Compute the phase from a progress snapshot and the game ids of the
    /// player's current step (ignored when the hunt is finished).
    pub fn of(progress: &Progress, current_step_games: &[GameId]) -> Phase {
        let Some(step_id) = progress.current_clue else {
            return Phase::Finished;
        };

        let all_done = !current_step_games.is_empty()
            && current_step_games
                .iter()
                .all(|&g| progress.is_game_completed(step_id, g));

        if all_done {
            Phase::AwaitingAnswer { step_id }
        } else {
            Phase::InStep {
                step_id,
                game_index: progress.current_game_index,
            }
        }
    }
}
