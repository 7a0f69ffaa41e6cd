use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use crate::ui::ui_types::App;

#[derive(serde::Serialize, serde::Deserialize)]
pub struct Options {
    pub server_url: String,
    pub detections_per_page: usize,
    pub canvas_size: (f64, f64),
    pub auto_refresh: bool,
    pub auto_refresh_secs: u64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            server_url: "http://localhost:5000".to_string(),
            detections_per_page: 10,
            canvas_size: (640., 480.),
            auto_refresh: false,
            auto_refresh_secs: 30,
        }
    }
}

impl App {
    pub fn options(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self._options(ui);
        });
    }

    fn _options(&mut self, ui: &mut egui::Ui) {
        egui::widgets::global_theme_preference_buttons(ui);

        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Server URL: ");
            ui.text_edit_singleline(&mut self.options.server_url);
        });
        ui.label("URL changes apply after restart");

        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Detections per page: ");
            let resp = ui.add(
                egui::DragValue::new(&mut self.options.detections_per_page)
                    .range(5..=100)
                    .speed(0.5),
            );
            super::utils::make_scrollable(ui, resp, &mut self.options.detections_per_page, 1);
        });

        ui.separator();

        ui.horizontal(|ui| {
            ui.checkbox(&mut self.options.auto_refresh, "Auto refresh");
            let resp = ui.add(
                egui::DragValue::new(&mut self.options.auto_refresh_secs)
                    .range(5..=600)
                    .speed(0.5)
                    .suffix(" s"),
            );
            super::utils::make_scrollable(ui, resp, &mut self.options.auto_refresh_secs, 5);
        });

        ui.separator();

        if ui.button("Save Config").clicked() {
            let settings = crate::appconfig::AppSettings::from_options(&self.options);
            if let Err(e) = settings.save_to_file("config.toml") {
                error!("Failed to save config: {}", e);
                self.errors.push(format!("Failed to save config: {}", e));
            }
        }
    }
}
