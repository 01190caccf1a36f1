use std::sync::mpsc::{Receiver, Sender};
use std::thread::JoinHandle;

use eframe::egui;

use crate::config::RulesConfig;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::session::SessionView;
use crate::model::character::Character;
use crate::model::game_state::GameState;
use crate::model::scenario::Scenario;
use crate::ui::meter::draw_meters;

/* =========================
   Tabs
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Tab {
    #[default]
    Hallway,
    Inventory,
    Journal,
}

/* =========================
   UI State
   ========================= */

#[derive(Default)]
struct UiState {
    view: Option<SessionView>,
    name_input: String,
    selected_character: Option<&'static str>,
    tab: Tab,

    /// Set as soon as a mission is requested, cleared by the next snapshot.
    loading: bool,

    /// Same for a picked option, so a double click sends one `Choose`.
    choosing: bool,
    banner: Option<String>,
}

impl UiState {
    fn apply(&mut self, resp: EngineResponse) {
        match resp {
            EngineResponse::Busy => self.loading = true,
            EngineResponse::Rejected(reason) => self.banner = Some(reason),
            EngineResponse::Snapshot(view) => {
                self.loading = false;
                self.choosing = false;
                if let Some(err) = &view.last_error {
                    self.banner = Some(format!("Failed to load mission: {}", err));
                }
                if !view.state.has_started && self.name_input.is_empty() {
                    self.name_input = view.state.player_name.clone();
                }
                self.view = Some(view);
            }
        }
    }

    fn options_enabled(&self) -> bool {
        !self.choosing && !self.loading
    }
}

/* =========================
   App
   ========================= */

pub struct GameApp {
    ui: UiState,
    rules: RulesConfig,
    ui_scale: f32,

    cmd_tx: Sender<EngineCommand>,
    resp_rx: Receiver<EngineResponse>,
    engine: Option<JoinHandle<()>>,
}

impl GameApp {
    pub fn new(
        rules: RulesConfig,
        ui_scale: f32,
        cmd_tx: Sender<EngineCommand>,
        resp_rx: Receiver<EngineResponse>,
        engine: JoinHandle<()>,
    ) -> Self {
        Self {
            ui: UiState::default(),
            rules,
            ui_scale,
            cmd_tx,
            resp_rx,
            engine: Some(engine),
        }
    }

    fn send(&mut self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            log::error!("engine thread is gone");
            self.ui.banner = Some("The game engine stopped. Please restart the app.".into());
        }
    }

    fn drain_responses(&mut self) {
        while let Ok(resp) = self.resp_rx.try_recv() {
            self.ui.apply(resp);
        }
    }

    fn draw_start_screen(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.heading(egui::RichText::new("MURID BANDEL 2").size(40.0).strong());
            ui.label("The Final Boss: Pak Yono");
            ui.add_space(24.0);
        });

        ui.label("What's your name?");
        ui.text_edit_singleline(&mut self.ui.name_input);
        ui.add_space(12.0);

        ui.label("Pick your character");
        for character in Character::all() {
            let selected = self.ui.selected_character == Some(character.id);
            let text = format!("{} - {}", character.name, character.description);
            if ui.selectable_label(selected, text).clicked() {
                self.ui.selected_character = Some(character.id);
            }
        }

        ui.add_space(16.0);
        let ready = !self.ui.name_input.trim().is_empty() && self.ui.selected_character.is_some();
        if ui
            .add_enabled(ready, egui::Button::new("ENTER THE SCHOOL >"))
            .clicked()
        {
            if let Some(character_id) = self.ui.selected_character {
                self.ui.banner = None;
                self.send(EngineCommand::StartGame {
                    player_name: self.ui.name_input.clone(),
                    character_id: character_id.to_string(),
                });
            }
        }
    }

    fn draw_header(&self, ui: &mut egui::Ui, state: &GameState) {
        let character = Character::find(&state.character_id)
            .map(|c| c.name)
            .unwrap_or("?");
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(egui::RichText::new(format!("Character: {}", character.to_uppercase())).small());
                ui.heading(&state.player_name);
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new(format!("Level {}", state.turn_count + 1)).strong());
            });
        });
    }

    fn draw_game_over(&mut self, ui: &mut egui::Ui, state: &GameState) {
        ui.vertical_centered(|ui| {
            ui.add_space(32.0);
            if state.is_won {
                ui.heading(
                    egui::RichText::new("KING OF THE SCHOOL!")
                        .color(egui::Color32::from_rgb(40, 160, 90))
                        .size(32.0),
                );
                ui.label("Pak Yono finally gives up and takes early retirement. The school is yours!");
            } else {
                ui.heading(
                    egui::RichText::new("EXPELLED!")
                        .color(egui::Color32::from_rgb(210, 40, 60))
                        .size(32.0),
                );
                ui.label(
                    egui::RichText::new(
                        "Pak Yono's suspicions were proven right. The expulsion letter is already in your hands.",
                    )
                    .italics(),
                );
            }
            ui.add_space(16.0);
            if ui.button("PLAY AGAIN").clicked() {
                self.ui.selected_character = None;
                self.ui.tab = Tab::Hallway;
                self.send(EngineCommand::Restart);
            }
        });
    }

    fn draw_hallway(&mut self, ui: &mut egui::Ui, view: &SessionView) {
        let state = &view.state;

        let Some(mission) = &state.active_mission else {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.label(
                    egui::RichText::new(if view.is_climax {
                        "Pak Yono is off guard in the teachers' room. This is your moment!"
                    } else {
                        "The grade 10 hallway could use a little 'color'..."
                    })
                    .italics(),
                );
                ui.add_space(16.0);

                let label = if self.ui.loading {
                    "SETTING THE TRAP..."
                } else if view.is_climax {
                    "FINAL MISSION"
                } else {
                    "LOOK FOR TROUBLE"
                };
                let enabled = !self.ui.loading && state.can_request_mission();
                if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                    self.ui.loading = true;
                    self.ui.banner = None;
                    self.send(EngineCommand::StartMission);
                }
                if self.ui.loading {
                    ui.spinner();
                }
            });
            return;
        };

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.heading(
                    egui::RichText::new(mission.title.to_uppercase())
                        .color(egui::Color32::from_rgb(240, 150, 40)),
                );
                if view.is_climax {
                    ui.colored_label(egui::Color32::from_rgb(210, 40, 60), "CLIMAX");
                }
            });
            ui.label(
                egui::RichText::new(format!(
                    "{} · {} · reward {:.0}",
                    mission.category, mission.difficulty, mission.reward
                ))
                .small(),
            );
            ui.label(egui::RichText::new(format!("\"{}\"", mission.description)).italics());
        });

        ui.add_space(8.0);

        match &view.scenario {
            Some(scenario) => self.draw_scenario(ui, scenario),
            None => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Tracking Pak Yono's footsteps...");
                });
            }
        }
    }

    fn draw_scenario(&mut self, ui: &mut egui::Ui, scenario: &Scenario) {
        ui.label(
            egui::RichText::new(format!("PAK YONO: \"{}\"", scenario.narrative))
                .strong()
                .color(egui::Color32::from_rgb(170, 30, 40)),
        );
        ui.add_space(8.0);

        let enabled = self.ui.options_enabled();
        let mut chosen = None;
        for (i, option) in scenario.options.iter().enumerate() {
            let text = format!(
                "{}\nRisk: {:.0}%   Success: {:.0}%",
                option.text, option.risk, option.success_chance
            );
            if ui.add_enabled(enabled, egui::Button::new(text)).clicked() {
                chosen = Some(i);
            }
        }

        if let Some(i) = chosen {
            self.ui.choosing = true;
            self.ui.banner = None;
            self.send(EngineCommand::Choose(i));
        }
    }
}

fn draw_inventory(ui: &mut egui::Ui, state: &GameState) {
    if state.inventory.is_empty() {
        ui.label("Empty");
    }
    for item in &state.inventory {
        ui.label(format!("• {}", item));
    }
}

fn draw_journal(ui: &mut egui::Ui, state: &GameState) {
    egui::ScrollArea::vertical().show(ui, |ui| {
        for (i, entry) in state.log.iter().enumerate() {
            if i == 0 {
                ui.label(egui::RichText::new(entry).strong());
            } else {
                ui.label(entry);
            }
            ui.separator();
        }
    });
}

/* =========================
   egui App
   ========================= */

impl eframe::App for GameApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.ui_scale);
        self.drain_responses();

        let Some(view) = self.ui.view.clone() else {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.spinner();
            });
            ctx.request_repaint();
            return;
        };
        let state = &view.state;

        if !state.has_started {
            egui::CentralPanel::default().show(ctx, |ui| {
                if let Some(banner) = &self.ui.banner {
                    ui.colored_label(egui::Color32::from_rgb(210, 40, 60), banner);
                }
                self.draw_start_screen(ui);
            });
            return;
        }

        /* BOTTOM NAV */
        if !state.is_over {
            egui::TopBottomPanel::bottom("nav").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.ui.tab, Tab::Hallway, "Missions");
                    ui.selectable_value(&mut self.ui.tab, Tab::Inventory, "Items");
                    ui.selectable_value(&mut self.ui.tab, Tab::Journal, "Journal");
                });
            });
        }

        /* CENTER */
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_header(ui, state);
            ui.add_space(8.0);
            draw_meters(ui, state.suspicion, state.reputation, &self.rules);

            if view.danger_warning {
                ui.colored_label(
                    egui::Color32::from_rgb(210, 40, 60),
                    "PAK YONO IS RIGHT BEHIND YOU!",
                );
            }
            if let Some(banner) = &self.ui.banner {
                ui.colored_label(egui::Color32::from_rgb(200, 120, 30), banner);
            }
            ui.separator();

            if state.is_over {
                self.draw_game_over(ui, state);
                return;
            }

            match self.ui.tab {
                Tab::Hallway => self.draw_hallway(ui, &view),
                Tab::Inventory => draw_inventory(ui, state),
                Tab::Journal => draw_journal(ui, state),
            }
        });

        if self.ui.loading || self.ui.choosing {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

impl Drop for GameApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        // A generator call in flight may take a while; don't wait on it.
        drop(self.engine.take());
    }
}
