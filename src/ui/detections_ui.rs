use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use egui::RichText;
use egui_extras::{Column, TableBuilder};

use crate::image_fetch::ImageCommand;
use crate::server_conn::Detection;

use super::ui_types::*;

impl App {
    pub fn detections(&mut self, ui: &mut egui::Ui) {
        self.stats_header(ui);
        ui.separator();
        self.filter_row(ui);
        ui.separator();
        self.detections_table(ui);
        ui.separator();
        self.pagination_row(ui);

        self.detail_window(ui.ctx().clone());
    }

    fn stats_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match &self.stats {
                Some(stats) => {
                    ui.label(
                        RichText::new(format!("Total: {}", stats.total_detections)).size(16.),
                    );
                    ui.separator();
                    ui.label(
                        RichText::new(format!("Last 24h: {}", stats.recent_detections)).size(16.),
                    );
                    ui.separator();
                    ui.label(
                        RichText::new(format!("Classes: {}", stats.detections_by_class.len()))
                            .size(16.),
                    );
                }
                None => {
                    ui.label(RichText::new("No stats yet").size(16.));
                }
            }

            ui.separator();

            let online = self
                .server_status_frame
                .as_ref()
                .map(|s| s.online)
                .unwrap_or(false);
            if online {
                ui.label(RichText::new("Online").color(egui::Color32::from_rgb(46, 204, 113)));
            } else {
                ui.label(RichText::new("Offline").color(egui::Color32::from_rgb(231, 76, 60)));
            }

            if ui.button("Refresh").clicked() {
                self.refresh_data();
            }
        });
    }

    fn filter_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Class: ");

            let selected = self
                .class_filter
                .clone()
                .unwrap_or_else(|| "All Classes".to_string());

            let prev = self.class_filter.clone();

            egui::ComboBox::new("class_filter", "")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.class_filter, None, "All Classes");

                    if let Some(stats) = &self.stats {
                        for (class, count) in stats.detections_by_class.iter() {
                            ui.selectable_value(
                                &mut self.class_filter,
                                Some(class.clone()),
                                format!("{} ({})", class, count),
                            );
                        }
                    }
                });

            if prev != self.class_filter {
                self.detections_page = 0;
                self.fetch_detections();

                let data = crate::saved_data::SavedData {
                    class_filter: self.class_filter.clone(),
                };
                data.save_to_file("saved_data.toml").unwrap_or_else(|e| {
                    error!("Failed to save filter: {}", e);
                });
            }
        });
    }

    fn detections_table(&mut self, ui: &mut egui::Ui) {
        let now = chrono::Local::now().naive_local();

        let detections = self.detections.clone();

        let mut clicked_detail: Option<i64> = None;
        let mut wanted_images: Vec<String> = vec![];

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(90.))
            .column(Column::auto().at_least(80.))
            .column(Column::auto().at_least(80.))
            .column(Column::auto().at_least(110.))
            .column(Column::remainder())
            .header(20., |mut header| {
                header.col(|ui| {
                    ui.strong("Time");
                });
                header.col(|ui| {
                    ui.strong("Class");
                });
                header.col(|ui| {
                    ui.strong("Confidence");
                });
                header.col(|ui| {
                    ui.strong("Image");
                });
                header.col(|ui| {
                    ui.strong("Details");
                });
            })
            .body(|mut body| {
                for det in detections.iter() {
                    body.row(64., |mut row| {
                        row.col(|ui| {
                            ui.label(super::utils::format_timestamp(&det.timestamp, now));
                        });
                        row.col(|ui| {
                            ui.label(&det.class_name);
                        });
                        row.col(|ui| {
                            ui.label(
                                RichText::new(format!("{:.0}%", det.confidence * 100.))
                                    .color(super::utils::confidence_color(det.confidence)),
                            );
                        });
                        row.col(|ui| {
                            if let Some(texture) = self.image_textures.get(&det.image_path) {
                                let size = egui::Vec2::new(80., 60.);
                                ui.add(
                                    egui::Image::from_texture((texture.id(), size))
                                        .fit_to_exact_size(size),
                                );
                            } else if self.image_failures.contains(&det.image_path) {
                                ui.label("no image");
                            } else {
                                ui.spinner();
                                wanted_images.push(det.image_path.clone());
                            }
                        });
                        row.col(|ui| {
                            if ui.button("Details").clicked() {
                                clicked_detail = Some(det.id);
                            }
                        });
                    });
                }
            });

        for filename in wanted_images {
            self.request_image(filename);
        }

        if let Some(id) = clicked_detail {
            self.fetch_detection_detail(id);
        }
    }

    fn pagination_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.detections_page > 0, egui::Button::new("Previous"))
                .clicked()
            {
                self.detections_page -= 1;
                self.fetch_detections();
            }

            ui.label(format!("Page {}", self.detections_page + 1));

            // a short page means the server ran out of rows
            let full_page = self.detections.len() >= self.options.detections_per_page;
            if ui
                .add_enabled(full_page, egui::Button::new("Next"))
                .clicked()
            {
                self.detections_page += 1;
                self.fetch_detections();
            }

            ui.separator();

            ui.label("Per page: ");
            let prev = self.options.detections_per_page;
            let resp = ui.add(
                egui::DragValue::new(&mut self.options.detections_per_page)
                    .range(5..=100)
                    .speed(0.5),
            );
            super::utils::make_scrollable(ui, resp, &mut self.options.detections_per_page, 1);
            if prev != self.options.detections_per_page {
                self.detections_page = 0;
                self.fetch_detections();
            }
        });
    }

    fn detail_window(&mut self, ctx: egui::Context) {
        let Some(det) = self.detection_detail.clone() else {
            return;
        };

        let mut open = true;

        egui::Window::new(format!("Detection {}", det.id))
            .open(&mut open)
            .resizable(false)
            .show(&ctx, |ui| {
                self.detail_contents(ui, &det);
            });

        if !open {
            self.detection_detail = None;
        }
    }

    fn detail_contents(&mut self, ui: &mut egui::Ui, det: &Detection) {
        let now = chrono::Local::now().naive_local();

        ui.label(format!(
            "Time: {}",
            super::utils::format_timestamp(&det.timestamp, now)
        ));
        ui.label(format!("Class: {}", det.class_name));
        ui.label(
            RichText::new(format!("Confidence: {:.1}%", det.confidence * 100.))
                .color(super::utils::confidence_color(det.confidence)),
        );
        ui.label(format!(
            "Box: {}x{} at ({}, {})",
            det.bbox_width, det.bbox_height, det.bbox_x, det.bbox_y
        ));

        ui.separator();

        if let Some(texture) = self.image_textures.get(&det.image_path) {
            let size = egui::Vec2::new(480., 360.);
            ui.add(egui::Image::from_texture((texture.id(), size)).fit_to_exact_size(size));
        } else if self.image_failures.contains(&det.image_path) {
            ui.label("Image unavailable");
        } else {
            ui.spinner();
            self.request_image(det.image_path.clone());
        }
    }

    /// Sends at most one fetch per filename; the pending set is shared with
    /// the fetch thread, which removes entries when a download finishes.
    pub fn request_image(&mut self, filename: String) {
        if self.image_textures.contains_key(&filename) || self.image_failures.contains(&filename) {
            return;
        }

        {
            let mut pending = self.images_pending.lock();
            if !pending.insert(filename.clone()) {
                return;
            }
        }

        let Some(tx) = self.channel_to_fetcher.as_ref() else {
            self.images_pending.lock().remove(&filename);
            return;
        };

        if let Err(e) = tx.try_send(ImageCommand::Fetch(filename.clone())) {
            error!("Failed to send image fetch command: {}", e);
            self.images_pending.lock().remove(&filename);
        }
    }
}
