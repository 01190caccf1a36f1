use thiserror::Error;

use crate::config::RulesConfig;
use crate::engine::content::{ContentGenerator, GenerationError};
use crate::engine::resolver::resolve;
use crate::model::character::Character;
use crate::model::game_state::GameState;
use crate::model::mission::Mission;
use crate::model::outcome::TurnOutcome;
use crate::model::scenario::Scenario;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("the game has not started")]
    NotStarted,

    #[error("the game is over; restart to play again")]
    GameOver,

    #[error("a mission is already being prepared")]
    Busy,

    #[error("finish the current mission first")]
    MissionActive,

    #[error("there is no active mission")]
    NoActiveMission,

    #[error("the mission has no scenario")]
    NoScenario,

    #[error("option {0} does not exist")]
    InvalidOption(usize),

    #[error("enter a player name")]
    MissingPlayerName,

    #[error("unknown character '{0}'")]
    UnknownCharacter(String),

    #[error("could not prepare the mission: {0}")]
    Generation(#[from] GenerationError),
}

/// Read-only snapshot handed to the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub state: GameState,
    pub scenario: Option<Scenario>,
    pub last_error: Option<String>,
    pub is_climax: bool,
    pub danger_warning: bool,
}

/// Holds one player's game between turns and sequences the generator calls.
pub struct Session {
    state: GameState,
    scenario: Option<Scenario>,

    /// Held for the duration of `start_mission`. `&mut self` already rules
    /// out overlap, so this is only a guard and never shows in a snapshot.
    /// Clients see in-flight requests through `EngineResponse::Busy`.
    busy: bool,
    last_error: Option<String>,
    rules: RulesConfig,
}

impl Session {
    pub fn new(rules: RulesConfig) -> Self {
        Self {
            state: GameState::default(),
            scenario: None,
            busy: false,
            last_error: None,
            rules,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn scenario(&self) -> Option<&Scenario> {
        self.scenario.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.state.clone(),
            scenario: self.scenario().cloned(),
            last_error: self.last_error.clone(),
            is_climax: self.state.is_climax(self.rules.climax_threshold),
            danger_warning: !self.state.is_over
                && self.state.suspicion > self.rules.danger_warning_threshold,
        }
    }

    /// Pick a name and a character and enter the school.
    pub fn select(&mut self, player_name: &str, character_id: &str) -> Result<(), SessionError> {
        let name = player_name.trim();
        if name.is_empty() {
            return Err(SessionError::MissingPlayerName);
        }
        if Character::find(character_id).is_none() {
            return Err(SessionError::UnknownCharacter(character_id.to_string()));
        }

        self.state.player_name = name.to_string();
        self.state.character_id = character_id.to_string();
        self.state.has_started = true;
        self.last_error = None;
        log::info!("{} starts as {}", name, character_id);
        Ok(())
    }

    fn check_can_request(&self) -> Result<&'static Character, SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        if !self.state.has_started {
            return Err(SessionError::NotStarted);
        }
        if self.state.is_over {
            return Err(SessionError::GameOver);
        }
        if self.state.active_mission.is_some() {
            return Err(SessionError::MissionActive);
        }
        Character::find(&self.state.character_id)
            .ok_or_else(|| SessionError::UnknownCharacter(self.state.character_id.clone()))
    }

    /// Fetch a mission and then its scenario. Nothing is committed unless
    /// both calls succeed.
    pub fn start_mission(&mut self, generator: &dyn ContentGenerator) -> Result<(), SessionError> {
        let character = self.check_can_request()?;

        self.busy = true;
        self.last_error = None;
        let result = self.fetch(generator, character);
        self.busy = false;

        match result {
            Ok((mission, scenario)) => {
                log::info!("mission #{}: {}", self.state.turn_count + 1, mission.title);
                self.state
                    .push_log(format!("Mission #{}: {}", self.state.turn_count + 1, mission.title));
                self.state.active_mission = Some(mission);
                self.scenario = Some(scenario);
                Ok(())
            }
            Err(e) => {
                log::warn!("mission generation failed: {}", e);
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    fn fetch(
        &self,
        generator: &dyn ContentGenerator,
        character: &Character,
    ) -> Result<(Mission, Scenario), GenerationError> {
        let name = &self.state.player_name;
        let turn = self.state.turn_count;

        let mission = generator.generate_mission(character, name, turn)?;
        let scenario =
            generator.generate_scenario(character, name, &mission, self.state.suspicion, turn)?;
        Ok((mission, scenario))
    }

    /// Resolve the option at `index` of the current scenario.
    pub fn choose(
        &mut self,
        index: usize,
        roll: impl FnOnce() -> f64,
    ) -> Result<TurnOutcome, SessionError> {
        if self.state.is_over {
            return Err(SessionError::GameOver);
        }
        if self.state.active_mission.is_none() {
            return Err(SessionError::NoActiveMission);
        }
        let scenario = self.scenario.as_ref().ok_or(SessionError::NoScenario)?;
        let option = scenario
            .option(index)
            .ok_or(SessionError::InvalidOption(index))?;

        let resolution =
            resolve(&self.state, option, &self.rules, roll).ok_or(SessionError::NoActiveMission)?;

        log::debug!(
            "turn {} {} (suspicion {:+.1}, reputation {:+.1}): {}",
            self.state.turn_count + 1,
            if resolution.success { "succeeded" } else { "failed" },
            resolution.suspicion_delta,
            resolution.reputation_delta,
            resolution.message
        );
        if resolution.outcome.is_terminal() {
            log::info!("{}: {:?}", self.state.player_name, resolution.outcome);
        }

        self.state = resolution.state;
        self.scenario = None;
        self.last_error = None;
        Ok(resolution.outcome)
    }

    pub fn restart(&mut self) {
        self.state = self.state.restarted();
        self.scenario = None;
        self.busy = false;
        self.last_error = None;
    }
}
