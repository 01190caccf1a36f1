use thiserror::Error;

use crate::model::character::Character;
use crate::model::mission::Mission;
use crate::model::scenario::Scenario;

/// Failures of the external content generator. None of them touch game state.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Network failure or timeout.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generator answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generator returned no completion")]
    EmptyCompletion,

    /// Unparseable JSON or a schema violation.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Parsed fine but unusable (wrong option count, empty text).
    #[error("unusable content: {0}")]
    InvalidContent(String),

    /// No generator could be set up (e.g. the HTTP client failed to build).
    #[error("content generator unavailable: {0}")]
    Unavailable(String),
}

impl GenerationError {
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Http(_) | GenerationError::EmptyCompletion => true,
            GenerationError::Status { status, .. } => *status == 429 || *status >= 500,
            GenerationError::Malformed(_)
            | GenerationError::InvalidContent(_)
            | GenerationError::Unavailable(_) => false,
        }
    }
}

/// Produces missions and scenarios. Slow and non-deterministic.
pub trait ContentGenerator: Send {
    fn generate_mission(
        &self,
        character: &Character,
        player_name: &str,
        turn_count: u32,
    ) -> Result<Mission, GenerationError>;

    fn generate_scenario(
        &self,
        character: &Character,
        player_name: &str,
        mission: &Mission,
        suspicion: f64,
        turn_count: u32,
    ) -> Result<Scenario, GenerationError>;
}

/// Stands in when the real generator cannot be built, so every mission
/// request fails cleanly instead of the app refusing to start.
pub struct UnavailableGenerator(pub String);

impl ContentGenerator for UnavailableGenerator {
    fn generate_mission(&self, _: &Character, _: &str, _: u32) -> Result<Mission, GenerationError> {
        Err(GenerationError::Unavailable(self.0.clone()))
    }

    fn generate_scenario(
        &self,
        _: &Character,
        _: &str,
        _: &Mission,
        _: f64,
        _: u32,
    ) -> Result<Scenario, GenerationError> {
        Err(GenerationError::Unavailable(self.0.clone()))
    }
}
