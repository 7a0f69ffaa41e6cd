pub mod clients_ui;
pub mod detections_ui;
pub mod options;
pub mod roi_canvas;
pub mod server_ui;
pub mod ui_types;
pub mod utils;

use ui_types::*;

use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use crate::image_fetch::ImageMessage;
use crate::server_conn::{ServerCommand, ServerMessage};

/// New
impl App {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut out: Self = if let Some(storage) = cc.storage {
            eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default()
        } else {
            Default::default()
        };

        if let Err(e) = crate::appconfig::read_options_from_file("config.toml", &mut out.options) {
            error!("Failed to read options from file: {}", e);
        }

        if let Ok(data) = crate::saved_data::SavedData::load_from_file("saved_data.toml") {
            out.class_filter = data.class_filter;
        }

        out
    }
}

/// background threads
impl App {
    fn init_server(&mut self) {
        debug!("starting server thread");

        let url = match url::Url::parse(&self.options.server_url) {
            Ok(url) => url,
            Err(e) => {
                self.errors
                    .push(format!("Invalid server URL {:?}: {}", self.options.server_url, e));
                // don't retry a bad URL every frame
                self.server_started = true;
                return;
            }
        };

        let sender = self.inbox.sender();

        let (tx, rx) = tokio::sync::mpsc::channel(8);

        for cmd in [
            ServerCommand::FetchStats,
            ServerCommand::FetchDetections {
                class: self.class_filter.clone(),
                limit: self.options.detections_per_page,
                offset: 0,
            },
            ServerCommand::FetchClients,
        ] {
            tx.blocking_send(cmd).unwrap_or_else(|e| {
                error!("Failed to send command: {}", e);
            });
        }

        self.server_tx = Some(tx);

        let (tx2, mut rx2) = tokio::sync::oneshot::channel();

        std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(3)
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to build runtime: {}", e);
                    return;
                }
            };

            rt.block_on(async move {
                let mut conn =
                    match crate::server_conn::ServerConn::new(url, sender, rx, tx2).await {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!("Failed to start server connection: {:?}", e);
                            return;
                        }
                    };
                if let Err(e) = conn.run().await {
                    error!("Server connection stopped: {:?}", e);
                }
            });
        });

        loop {
            match rx2.try_recv() {
                Ok(status) => {
                    self.server_status = Some(status);
                    break;
                }
                Err(tokio::sync::oneshot::error::TryRecvError::Empty) => {}
                Err(tokio::sync::oneshot::error::TryRecvError::Closed) => {
                    self.errors.push("Server thread failed to start".to_string());
                    break;
                }
            }
        }

        self.server_started = true;
    }

    fn ensure_image_thread(&mut self, ctx: &egui::Context) {
        if self.channel_to_fetcher.is_some() {
            return;
        }

        let url = match url::Url::parse(&self.options.server_url) {
            Ok(url) => url,
            Err(_) => return,
        };

        let (tx_to_ui, rx_to_ui) = crossbeam_channel::bounded(32);
        self.channel_to_ui = Some(rx_to_ui);

        let (tx_to_fetcher, rx_to_fetcher) = crossbeam_channel::bounded(32);
        self.channel_to_fetcher = Some(tx_to_fetcher);

        crate::image_fetch::spawn_image_thread(
            ctx.clone(),
            url,
            self.images_pending.clone(),
            rx_to_fetcher,
            tx_to_ui,
        );
    }
}

/// message pumps
impl App {
    fn drain_server_messages(&mut self, ctx: &egui::Context) {
        self.inbox.set_ctx(ctx);
        while let Some(msg) = self.inbox.read_without_ctx().next() {
            match msg {
                ServerMessage::Detections(detections) => {
                    self.detections = detections;
                }
                ServerMessage::DetectionDetail(detection) => {
                    self.detection_detail = Some(detection);
                }
                ServerMessage::Stats(stats) => {
                    self.stats = Some(stats);
                }
                ServerMessage::Clients(clients) => {
                    self.clients = clients;
                }
                ServerMessage::ClientSaved(id) => {
                    debug!("Client saved: {:?}", id);
                    self.fetch_clients();
                }
                ServerMessage::ApiError(e) => {
                    error!("Server error: {}", e);
                    self.errors.push(e);
                }
            }
        }
    }

    fn drain_image_messages(&mut self, ctx: &egui::Context) {
        let Some(rx) = self.channel_to_ui.as_mut() else {
            return;
        };

        while let Ok(msg) = rx.try_recv() {
            match msg {
                ImageMessage::Loaded(filename, img) => {
                    let texture = ctx.load_texture(&filename, img, Default::default());
                    self.image_textures.insert(filename, texture);
                }
                ImageMessage::Failed(filename, e) => {
                    warn!("Image {} failed: {}", filename, e);
                    self.image_failures.insert(filename);
                }
            }
        }
    }

    fn snapshot_status(&mut self) {
        if let Some(status) = self.server_status.as_ref() {
            if let Ok(status) = status.try_read() {
                self.server_status_frame = Some(status.clone());
            } else {
                self.server_status_frame = None;
            }
        } else {
            self.server_status_frame = None;
        }
    }

    fn auto_refresh(&mut self, ctx: &egui::Context) {
        if !self.options.auto_refresh {
            return;
        }

        let interval = std::time::Duration::from_secs(self.options.auto_refresh_secs.max(5));

        let due = match self.last_refresh {
            Some(last) => last.elapsed() >= interval,
            None => true,
        };

        if due {
            self.last_refresh = Some(std::time::Instant::now());
            self.refresh_data();
        }

        ctx.request_repaint_after(interval);
    }

    fn errors_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("right")
            .resizable(false)
            .default_width(300.)
            .show(ctx, |ui| {
                if !self.errors.is_empty() {
                    ui.heading("Errors");
                    ui.horizontal(|ui| {
                        if ui.button("Clear All").clicked() {
                            self.errors.clear();
                        }

                        let error_count = self.errors.len();
                        ui.label(format!(
                            "({} error{})",
                            error_count,
                            if error_count == 1 { "" } else { "s" }
                        ));
                    });

                    egui::ScrollArea::vertical()
                        .max_height(200.0)
                        .show(ui, |ui| {
                            // newest first
                            for error in self.errors.iter().rev() {
                                ui.label(
                                    egui::RichText::new(error)
                                        .color(egui::Color32::from_rgb(255, 100, 100)),
                                );
                                ui.separator();
                            }
                        });

                    ui.separator();
                }

                if let Some(stats) = &self.stats {
                    ui.label("Detections by class:");
                    for (class, count) in stats.detections_by_class.iter() {
                        ui.label(format!("{}: {}", class, count));
                    }
                } else {
                    ui.label("No class counts yet");
                }
            });
    }
}

impl eframe::App for App {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        /// Init server connection
        if !self.server_started {
            self.init_server();
        }

        self.ensure_image_thread(ctx);

        self.drain_server_messages(ctx);
        self.drain_image_messages(ctx);
        self.snapshot_status();
        self.auto_refresh(ctx);

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.current_tab, Tab::Detections, "Detections");
                ui.selectable_value(&mut self.current_tab, Tab::Clients, "Clients");
                ui.selectable_value(&mut self.current_tab, Tab::Options, "Options");
            });
        });

        match self.current_tab {
            Tab::Detections => {
                self.errors_panel(ctx);

                egui::CentralPanel::default().show(ctx, |ui| {
                    self.detections(ui);
                });
            }
            Tab::Clients => {
                self.errors_panel(ctx);

                egui::CentralPanel::default().show(ctx, |ui| {
                    self.clients(ui);
                });
            }
            Tab::Options => {
                self.options(ctx);
            }
        }
    }
}
