use crate::engine::session::SessionView;

pub enum EngineCommand {
    StartGame {
        player_name: String,
        character_id: String,
    },
    StartMission,
    Choose(usize),
    Restart,
    Shutdown,
}

pub enum EngineResponse {
    /// The generator is being called; block mission starts until the next snapshot.
    Busy,

    Snapshot(SessionView),

    /// A command was refused or failed. The snapshot that follows is authoritative.
    Rejected(String),
}
