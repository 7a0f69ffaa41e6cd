use std::sync::Arc;

use egui_inbox::UiInboxSender;
use tokio::{sync::RwLock, time::Instant};
use url::Url;

use super::records::{ClientRecord, Detection, DetectionStats};

#[derive(Debug)]
pub enum ServerCommand {
    FetchDetections {
        class: Option<String>,
        limit: usize,
        offset: usize,
    },
    FetchDetection(i64),
    FetchStats,
    FetchClients,
    /// POST when the record has no id, PUT otherwise.
    SaveClient(ClientRecord),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum ServerMessage {
    Detections(Vec<Detection>),
    DetectionDetail(Detection),
    Stats(DetectionStats),
    Clients(Vec<ClientRecord>),
    ClientSaved(Option<i64>),
    ApiError(String),
}

pub struct ServerConn {
    pub(super) url: Url,
    pub(super) client: reqwest::Client,
    pub(super) current_status: Arc<RwLock<ServerStatus>>,
    pub(super) inbox: UiInboxSender<ServerMessage>,
    pub(super) channel_from_ui: tokio::sync::mpsc::Receiver<ServerCommand>,
}

#[derive(Clone, Debug)]
pub struct ServerStatus {
    pub last_contact: Instant,
    pub online: bool,
    pub total_detections: i64,
    pub recent_detections: i64,
}

impl Default for ServerStatus {
    fn default() -> Self {
        ServerStatus {
            last_contact: Instant::now(),
            online: false,
            total_detections: 0,
            recent_detections: 0,
        }
    }
}
