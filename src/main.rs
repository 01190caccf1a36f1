mod config;
mod engine;
mod model;
mod ui;

use anyhow::anyhow;
use eframe::egui;

use crate::config::AppConfig;
use crate::engine::content::{ContentGenerator, UnavailableGenerator};
use crate::engine::engine::Engine;
use crate::engine::llm_client::LlmContentGenerator;

fn init_logging() {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info);
    // RUST_LOG refines the default.
    builder.parse_default_env();
    builder.init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::load();
    log::info!("using model '{}' at {}", config.llm.model, config.llm.endpoint);

    let llm = config.llm.clone();
    let rules = config.rules.clone();
    let (cmd_tx, resp_rx, handle) = Engine::spawn(config.rules.clone(), move || {
        match LlmContentGenerator::new(llm, rules) {
            Ok(generator) => Box::new(generator) as Box<dyn ContentGenerator>,
            Err(e) => {
                log::error!("cannot build LLM client: {}", e);
                Box::new(UnavailableGenerator(format!("LLM client: {}", e)))
            }
        }
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Murid Bandel 2")
            .with_inner_size([520.0, 820.0]),
        ..Default::default()
    };

    let rules = config.rules.clone();
    let scale = config.ui.scale;
    eframe::run_native(
        "Murid Bandel 2",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(ui::app::GameApp::new(rules, scale, cmd_tx, resp_rx, handle)))
        }),
    )
    .map_err(|e| anyhow!("window error: {}", e))
}
