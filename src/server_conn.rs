pub mod commands;
pub mod conn_types;
pub mod records;

use std::sync::Arc;

use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use egui_inbox::UiInboxSender;
use tokio::{sync::RwLock, time::Instant};
use url::Url;

pub use self::conn_types::*;
pub use self::records::*;

impl ServerConn {
    pub async fn new(
        url: Url,
        inbox: UiInboxSender<ServerMessage>,
        rx: tokio::sync::mpsc::Receiver<ServerCommand>,
        tx_status: tokio::sync::oneshot::Sender<Arc<RwLock<ServerStatus>>>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        let current_status = Arc::new(RwLock::new(ServerStatus::default()));

        tx_status.send(current_status.clone()).unwrap_or_else(|e| {
            error!("Failed to send status: {:?}", e);
        });

        let mut out = ServerConn {
            url,
            client,
            current_status,
            inbox,
            channel_from_ui: rx,
        };

        // a dead server at startup is an error in the panel, not a crash
        if let Err(e) = out.init().await {
            warn!("Initial fetch failed: {:?}", e);
            out.send_error(&e);
        }

        Ok(out)
    }

    async fn init(&mut self) -> Result<()> {
        self.fetch_stats()
            .await
            .map_err(|e| anyhow!("Failed to fetch stats: {:?}", e))?;

        Ok(())
    }

    pub(crate) fn send_error(&self, e: &anyhow::Error) {
        self.inbox
            .send(ServerMessage::ApiError(format!("{:#}", e)))
            .unwrap_or_else(|e| {
                error!("Failed to send error message: {:?}", e);
            });
    }

    pub(crate) async fn mark_contact(&self) {
        let mut status = self.current_status.write().await;
        status.online = true;
        status.last_contact = Instant::now();
    }

    async fn mark_offline(&self) {
        self.current_status.write().await.online = false;
    }
}

/// main loop
impl ServerConn {
    pub async fn run(&mut self) -> Result<()> {
        loop {
            tokio::select! {
                cmd = self.channel_from_ui.recv() => {
                    match cmd {
                        None => {
                            debug!("Channel closed");
                            return Ok(());
                        }
                        Some(cmd) => {
                            if let Err(e) = self.handle_command(cmd).await {
                                error!("Command failed: {:?}", e);
                                self.mark_offline().await;
                                self.send_error(&e);
                            }
                        }
                    }
                }
            };
        }
    }

    async fn handle_command(&mut self, cmd: ServerCommand) -> Result<()> {
        match cmd {
            ServerCommand::FetchDetections {
                class,
                limit,
                offset,
            } => self.fetch_detections(class, limit, offset).await,
            ServerCommand::FetchDetection(id) => self.fetch_detection(id).await,
            ServerCommand::FetchStats => self.fetch_stats().await,
            ServerCommand::FetchClients => self.fetch_clients().await,
            ServerCommand::SaveClient(record) => self.save_client(record).await,
        }
    }
}
