use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use egui::RichText;
use egui_extras::{Column, TableBuilder};

use super::ui_types::*;

impl App {
    pub fn clients(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Refresh").clicked() {
                self.fetch_clients();
            }

            if ui.button("New Client").clicked() {
                self.client_edit = Some(ClientEdit::new_blank(self.options.canvas_size));
            }
        });

        ui.separator();

        self.clients_table(ui);

        self.edit_window(ui.ctx().clone());
    }

    fn clients_table(&mut self, ui: &mut egui::Ui) {
        let clients = self.clients.clone();

        let mut clicked_edit: Option<usize> = None;

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(120.))
            .column(Column::auto().at_least(140.))
            .column(Column::auto().at_least(100.))
            .column(Column::auto().at_least(70.))
            .column(Column::auto().at_least(120.))
            .column(Column::remainder())
            .header(20., |mut header| {
                header.col(|ui| {
                    ui.strong("Name");
                });
                header.col(|ui| {
                    ui.strong("Location");
                });
                header.col(|ui| {
                    ui.strong("IP");
                });
                header.col(|ui| {
                    ui.strong("Enabled");
                });
                header.col(|ui| {
                    ui.strong("ROI");
                });
                header.col(|ui| {
                    ui.strong("");
                });
            })
            .body(|mut body| {
                for (i, client) in clients.iter().enumerate() {
                    body.row(22., |mut row| {
                        row.col(|ui| {
                            ui.label(&client.name);
                        });
                        row.col(|ui| match (client.latitude, client.longitude) {
                            (Some(lat), Some(lon)) => {
                                ui.label(format!("{:.4}, {:.4}", lat, lon));
                            }
                            _ => {
                                ui.label("-");
                            }
                        });
                        row.col(|ui| {
                            ui.label(client.ip_address.as_deref().unwrap_or("-"));
                        });
                        row.col(|ui| {
                            ui.label(if client.is_detect_enabled { "yes" } else { "no" });
                        });
                        row.col(|ui| match client.roi() {
                            Some(r) => {
                                ui.label(format!(
                                    "({:.0}, {:.0}) {:.0}x{:.0}",
                                    r.x1,
                                    r.y1,
                                    r.width(),
                                    r.height()
                                ));
                            }
                            None => {
                                ui.label("-");
                            }
                        });
                        row.col(|ui| {
                            if ui.button("Edit").clicked() {
                                clicked_edit = Some(i);
                            }
                        });
                    });
                }
            });

        if let Some(i) = clicked_edit {
            if let Some(record) = self.clients.get(i) {
                self.client_edit = Some(ClientEdit::from_record(record, self.options.canvas_size));
            }
        }
    }

    fn edit_window(&mut self, ctx: egui::Context) {
        let Some(mut edit) = self.client_edit.take() else {
            return;
        };

        let title = match edit.id {
            Some(id) => format!("Edit Client {}", id),
            None => "New Client".to_string(),
        };

        let mut open = true;
        let mut done = false;

        egui::Window::new(title)
            .open(&mut open)
            .resizable(false)
            .show(&ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Name: ");
                    ui.text_edit_singleline(&mut edit.name);
                });
                ui.horizontal(|ui| {
                    ui.label("Latitude: ");
                    ui.add(
                        egui::TextEdit::singleline(&mut edit.latitude).desired_width(100.),
                    );
                    ui.label("Longitude: ");
                    ui.add(
                        egui::TextEdit::singleline(&mut edit.longitude).desired_width(100.),
                    );
                });
                ui.horizontal(|ui| {
                    ui.label("IP address: ");
                    ui.text_edit_singleline(&mut edit.ip_address);
                });
                ui.checkbox(&mut edit.is_detect_enabled, "Detection enabled");

                ui.separator();

                ui.label(RichText::new("Detection region").strong());
                ui.label("Drag on the canvas to select a region");

                super::roi_canvas::roi_canvas(ui, &mut edit);

                self.roi_fields(ui, &edit);

                ui.horizontal(|ui| {
                    if ui.button("Clear Region").clicked() {
                        edit.selector.clear();
                    }
                });

                ui.separator();

                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        if self.save_client(&edit) {
                            done = true;
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        done = true;
                    }
                });
            });

        if open && !done {
            self.client_edit = Some(edit);
        }
    }

    /// Read-only mirror of the selector state, live during a drag.
    fn roi_fields(&mut self, ui: &mut egui::Ui, edit: &ClientEdit) {
        let (x1, y1, x2, y2) = match edit.selector.rect() {
            Some(r) => (
                format!("{:.0}", r.x1),
                format!("{:.0}", r.y1),
                format!("{:.0}", r.x2),
                format!("{:.0}", r.y2),
            ),
            None => (String::new(), String::new(), String::new(), String::new()),
        };

        ui.horizontal(|ui| {
            for (label, mut value) in [("X1", x1), ("Y1", y1), ("X2", x2), ("Y2", y2)] {
                ui.label(label);
                ui.add(
                    egui::TextEdit::singleline(&mut value)
                        .interactive(false)
                        .desired_width(60.),
                );
            }
        });
    }
}
