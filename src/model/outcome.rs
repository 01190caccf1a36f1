use serde::{Deserialize, Serialize};

use crate::model::game_state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    Continue,
    Won,
    Expelled,
}

impl TurnOutcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TurnOutcome::Continue)
    }
}

/// Result of resolving one chosen option.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub state: GameState,
    pub message: String,
    pub success: bool,
    pub outcome: TurnOutcome,
    pub suspicion_delta: f64,
    pub reputation_delta: f64,
}
