use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::image_fetch::{ImageCommand, ImageMessage};
use crate::roi::RoiSelector;
use crate::server_conn::{
    ClientRecord, Detection, DetectionStats, ServerCommand, ServerMessage, ServerStatus,
};

#[derive(serde::Serialize, serde::Deserialize, Default)]
pub struct App {
    #[serde(skip)]
    pub errors: Vec<String>,

    #[serde(skip)]
    pub server_started: bool,

    #[serde(skip)]
    pub server_tx: Option<tokio::sync::mpsc::Sender<ServerCommand>>,

    #[serde(skip)]
    pub inbox: egui_inbox::UiInbox<ServerMessage>,

    #[serde(skip)]
    pub server_status: Option<Arc<tokio::sync::RwLock<ServerStatus>>>,

    #[serde(skip)]
    pub server_status_frame: Option<ServerStatus>,

    #[serde(skip)]
    pub detections: Vec<Detection>,

    #[serde(skip)]
    pub stats: Option<DetectionStats>,

    #[serde(skip)]
    pub clients: Vec<ClientRecord>,

    #[serde(skip)]
    pub detection_detail: Option<Detection>,

    /// 0-based, shown to the user as page + 1
    #[serde(skip)]
    pub detections_page: usize,

    pub class_filter: Option<String>,

    #[serde(skip)]
    pub image_textures: HashMap<String, egui::TextureHandle>,

    #[serde(skip)]
    pub images_pending: Arc<parking_lot::Mutex<HashSet<String>>>,

    #[serde(skip)]
    pub image_failures: HashSet<String>,

    #[serde(skip)]
    pub channel_to_ui: Option<crossbeam_channel::Receiver<ImageMessage>>,

    #[serde(skip)]
    pub channel_to_fetcher: Option<crossbeam_channel::Sender<ImageCommand>>,

    #[serde(skip)]
    pub current_tab: Tab,

    #[serde(skip)]
    pub client_edit: Option<ClientEdit>,

    #[serde(skip)]
    pub last_refresh: Option<std::time::Instant>,

    pub options: crate::ui::options::Options,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum Tab {
    Detections,
    Clients,
    Options,
}

impl Default for Tab {
    fn default() -> Self {
        Tab::Detections
    }
}

/// Working copy of one client while its edit window is open. Latitude and
/// longitude stay as text until save so partial input doesn't get clobbered.
pub struct ClientEdit {
    pub id: Option<i64>,
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    pub ip_address: String,
    pub is_detect_enabled: bool,
    pub selector: RoiSelector,
    pub canvas_texture: Option<egui::TextureHandle>,
}

impl ClientEdit {
    pub fn from_record(record: &ClientRecord, canvas_size: (f64, f64)) -> Self {
        let mut selector = RoiSelector::new(canvas_size);
        selector.load_existing(record.roi());

        ClientEdit {
            id: record.id,
            name: record.name.clone(),
            latitude: record.latitude.map(|v| v.to_string()).unwrap_or_default(),
            longitude: record.longitude.map(|v| v.to_string()).unwrap_or_default(),
            ip_address: record.ip_address.clone().unwrap_or_default(),
            is_detect_enabled: record.is_detect_enabled,
            selector,
            canvas_texture: None,
        }
    }

    pub fn new_blank(canvas_size: (f64, f64)) -> Self {
        ClientEdit {
            id: None,
            name: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            ip_address: String::new(),
            is_detect_enabled: true,
            selector: RoiSelector::new(canvas_size),
            canvas_texture: None,
        }
    }
}
