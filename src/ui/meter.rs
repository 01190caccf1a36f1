use egui::Color32;

use crate::config::RulesConfig;

const CALM: Color32 = Color32::from_rgb(70, 110, 220);
const ALARM: Color32 = Color32::from_rgb(220, 50, 70);
const CRED: Color32 = Color32::from_rgb(240, 150, 40);

pub fn suspicion_fraction(suspicion: f64) -> f32 {
    (suspicion / 100.0).clamp(0.0, 1.0) as f32
}

pub fn reputation_fraction(reputation: f64, win_threshold: f64) -> f32 {
    if win_threshold <= 0.0 {
        return 1.0;
    }
    (reputation / win_threshold).clamp(0.0, 1.0) as f32
}

/// Suspicion and reputation bars.
pub fn draw_meters(ui: &mut egui::Ui, suspicion: f64, reputation: f64, rules: &RulesConfig) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        let alarmed = suspicion > rules.high_suspicion_threshold;
        let color = if alarmed { ALARM } else { CALM };

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("TEACHER SUSPICION").small().strong());
            ui.colored_label(color, format!("{:.0}%", suspicion));
        });
        ui.add(
            egui::ProgressBar::new(suspicion_fraction(suspicion))
                .fill(color)
                .desired_height(10.0),
        );

        ui.add_space(6.0);

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("STREET CRED").small().strong());
            ui.colored_label(CRED, format!("{:.0} / {:.0}", reputation, rules.win_threshold));
        });
        ui.add(
            egui::ProgressBar::new(reputation_fraction(reputation, rules.win_threshold))
                .fill(CRED)
                .desired_height(10.0),
        );
    });
}
