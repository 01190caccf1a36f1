use crate::config::RulesConfig;
use crate::model::game_state::{clamp_suspicion, floor_reputation, GameState, EXPULSION_LOG};
use crate::model::outcome::{Resolution, TurnOutcome};
use crate::model::scenario::ScenarioOption;

pub const SUCCESS_PREFIX: &str = "SUCCESS!";
pub const FAILURE_PREFIX: &str = "FAILED!";
pub const FAILURE_SUFFIX: &str = "Pak Yono is furious!";

pub fn outcome_message(option: &ScenarioOption, success: bool) -> String {
    if success {
        format!("{} {}", SUCCESS_PREFIX, option.outcome)
    } else {
        format!("{} {} {}", FAILURE_PREFIX, option.outcome, FAILURE_SUFFIX)
    }
}

/// Resolve the player's chosen option against the active mission.
///
/// `roll` must yield a value in `[0, 1)`; it is called exactly once. Returns
/// `None` without touching anything when there is no active mission or the
/// game is already over.
pub fn resolve(
    state: &GameState,
    option: &ScenarioOption,
    rules: &RulesConfig,
    roll: impl FnOnce() -> f64,
) -> Option<Resolution> {
    if state.is_over {
        return None;
    }
    let mission = state.active_mission.as_ref()?;

    let roll = roll();
    let success = roll * 100.0 < option.success_chance;
    let aggressive = option.is_aggressive(&rules.aggression_keywords);

    let suspicion_delta = if success {
        option.risk / rules.success_risk_divisor
    } else {
        option.risk
    };
    let reputation_delta = if success {
        mission.reward
    } else {
        -rules.failure_penalty
    };

    let new_suspicion = clamp_suspicion(state.suspicion + suspicion_delta);
    let new_reputation = floor_reputation(state.reputation + reputation_delta);
    let climax = state.is_climax(rules.climax_threshold);
    let message = outcome_message(option, success);

    log::debug!(
        "roll={:.3} success={} aggressive={} climax={} suspicion {:+.1} reputation {:+.1}",
        roll,
        success,
        aggressive,
        climax,
        suspicion_delta,
        reputation_delta
    );

    let mut next = state.clone();
    next.active_mission = None;
    next.push_log(message.clone());

    let outcome = if new_suspicion >= 100.0 || (climax && !success && aggressive) {
        next.suspicion = 100.0;
        next.is_over = true;
        next.is_expelled = true;
        next.push_log(EXPULSION_LOG);
        TurnOutcome::Expelled
    } else {
        next.suspicion = new_suspicion;
        next.reputation = new_reputation;
        next.turn_count += 1;

        if new_reputation >= rules.win_threshold {
            next.is_over = true;
            next.is_won = true;
            TurnOutcome::Won
        } else {
            TurnOutcome::Continue
        }
    };

    Some(Resolution {
        state: next,
        message,
        success,
        outcome,
        suspicion_delta,
        reputation_delta,
    })
}
