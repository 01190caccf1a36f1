use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use rand::Rng;

use crate::config::RulesConfig;
use crate::engine::content::ContentGenerator;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::session::Session;

/// Owns the session on a background thread so the UI never blocks on the
/// generator. Commands are handled one at a time, which serializes mission
/// fetches.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    session: Session,
    generator: Box<dyn ContentGenerator>,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        rules: RulesConfig,
        generator: Box<dyn ContentGenerator>,
    ) -> Self {
        Self {
            rx,
            tx,
            session: Session::new(rules),
            generator,
        }
    }

    /// Spawns the engine thread. `make_generator` runs on that thread.
    pub fn spawn<F>(
        rules: RulesConfig,
        make_generator: F,
    ) -> (Sender<EngineCommand>, Receiver<EngineResponse>, JoinHandle<()>)
    where
        F: FnOnce() -> Box<dyn ContentGenerator> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx, rules, make_generator());
            engine.run();
        });

        (cmd_tx, resp_rx, handle)
    }

    fn send(&self, resp: EngineResponse) -> bool {
        self.tx.send(resp).is_ok()
    }

    fn snapshot(&self) -> bool {
        self.send(EngineResponse::Snapshot(self.session.view()))
    }

    pub fn run(&mut self) {
        // Initial snapshot so the UI has something to draw.
        if !self.snapshot() {
            return;
        }

        while let Ok(cmd) = self.rx.recv() {
            let result = match cmd {
                EngineCommand::StartGame {
                    player_name,
                    character_id,
                } => self.session.select(&player_name, &character_id),

                EngineCommand::StartMission => {
                    if self.session.state().can_request_mission() && !self.send(EngineResponse::Busy) {
                        return;
                    }
                    self.session.start_mission(self.generator.as_ref())
                }

                EngineCommand::Choose(index) => {
                    let mut rng = rand::thread_rng();
                    self.session.choose(index, || rng.gen::<f64>()).map(|_| ())
                }

                EngineCommand::Restart => {
                    self.session.restart();
                    Ok(())
                }

                EngineCommand::Shutdown => {
                    log::debug!("engine shutting down");
                    return;
                }
            };

            if let Err(e) = result {
                log::debug!("command refused: {}", e);
                if !self.send(EngineResponse::Rejected(e.to_string())) {
                    return;
                }
            }

            if !self.snapshot() {
                return;
            }
        }
    }
}
