use serde::{Deserialize, Serialize};

use crate::model::mission::Mission;

pub const STARTING_REPUTATION: f64 = 10.0;
pub const STARTING_SUSPICION: f64 = 0.0;
pub const STARTER_INVENTORY: [&str; 2] = ["Magic Chalk", "Rubber Bands"];

pub const OPENING_LOG: &str = "The adventure begins. Pak Yono is already getting suspicious...";
pub const RESTART_LOG: &str = "Let's try again. Pak Yono has no idea what's about to hit him...";
pub const EXPULSION_LOG: &str =
    "PAK YONO: 'I CAN'T TAKE IT ANYMORE! YOU ARE EXPELLED!' You have officially been kicked out.";

/// The single mutable aggregate for one play session.
///
/// Only the turn resolver and the session controller write to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub player_name: String,
    pub character_id: String,

    /// Never negative.
    pub reputation: f64,

    /// Always within [0, 100].
    pub suspicion: f64,

    pub turn_count: u32,
    pub inventory: Vec<String>,
    pub active_mission: Option<Mission>,

    /// Most recent entry first.
    pub log: Vec<String>,

    pub is_over: bool,
    pub is_won: bool,
    pub is_expelled: bool,
    pub has_started: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            character_id: String::new(),
            reputation: STARTING_REPUTATION,
            suspicion: STARTING_SUSPICION,
            turn_count: 0,
            inventory: STARTER_INVENTORY.iter().map(|s| s.to_string()).collect(),
            active_mission: None,
            log: vec![OPENING_LOG.to_string()],
            is_over: false,
            is_won: false,
            is_expelled: false,
            has_started: false,
        }
    }
}

impl GameState {
    /// Fresh state after a restart. Only the player name survives.
    pub fn restarted(&self) -> Self {
        Self {
            player_name: self.player_name.clone(),
            log: vec![RESTART_LOG.to_string()],
            ..Self::default()
        }
    }

    pub fn push_log(&mut self, entry: impl Into<String>) {
        self.log.insert(0, entry.into());
    }

    pub fn is_climax(&self, climax_threshold: u32) -> bool {
        self.turn_count >= climax_threshold
    }

    /// Whether a new mission may be requested right now.
    pub fn can_request_mission(&self) -> bool {
        self.has_started && !self.is_over && self.active_mission.is_none()
    }
}

pub fn clamp_suspicion(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

pub fn floor_reputation(value: f64) -> f64 {
    value.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_new_game() {
        let state = GameState::default();
        assert_eq!(state.reputation, 10.0);
        assert_eq!(state.suspicion, 0.0);
        assert_eq!(state.turn_count, 0);
        assert_eq!(state.inventory, vec!["Magic Chalk", "Rubber Bands"]);
        assert_eq!(state.log, vec![OPENING_LOG]);
        assert!(!state.has_started);
        assert!(!state.can_request_mission());
    }

    #[test]
    fn restart_keeps_only_the_name() {
        let mut state = GameState::default();
        state.player_name = "Dodi".into();
        state.character_id = "budi".into();
        state.reputation = 120.0;
        state.suspicion = 100.0;
        state.turn_count = 7;
        state.inventory.push("Stink Bomb".into());
        state.is_over = true;
        state.is_expelled = true;
        state.has_started = true;
        state.push_log("something happened");

        let fresh = state.restarted();
        assert_eq!(fresh.player_name, "Dodi");
        assert_eq!(
            fresh,
            GameState {
                player_name: "Dodi".into(),
                log: vec![RESTART_LOG.to_string()],
                ..GameState::default()
            }
        );
    }

    #[test]
    fn push_log_prepends() {
        let mut state = GameState::default();
        state.push_log("second");
        state.push_log("third");
        assert_eq!(state.log[0], "third");
        assert_eq!(state.log[2], OPENING_LOG);
    }

    #[test]
    fn clamps() {
        assert_eq!(clamp_suspicion(-3.0), 0.0);
        assert_eq!(clamp_suspicion(130.0), 100.0);
        assert_eq!(clamp_suspicion(42.5), 42.5);
        assert_eq!(floor_reputation(-20.0), 0.0);
        assert_eq!(floor_reputation(305.0), 305.0);
    }
}
