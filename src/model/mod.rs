pub mod character;
pub mod game_state;
pub mod llm_decode;
pub mod mission;
pub mod outcome;
pub mod scenario;
