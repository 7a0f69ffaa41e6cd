use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use crate::server_conn::{ClientRecord, ServerCommand};

use super::ui_types::*;

impl App {
    fn with_server<F>(&mut self, f: F)
    where
        F: FnOnce(&mut tokio::sync::mpsc::Sender<ServerCommand>),
    {
        let Some(server_tx) = &mut self.server_tx else {
            debug!("server is not connected");
            return;
        };
        f(server_tx)
    }

    fn send_server(&mut self, cmd: ServerCommand) {
        self.with_server(|tx| {
            tx.blocking_send(cmd).unwrap_or_else(|e| {
                error!("Failed to send server command: {}", e);
            });
        });
    }

    pub fn fetch_detections(&mut self) {
        let limit = self.options.detections_per_page;
        let offset = self.detections_page * limit;
        let class = self.class_filter.clone();

        self.send_server(ServerCommand::FetchDetections {
            class,
            limit,
            offset,
        });
    }

    pub fn fetch_stats(&mut self) {
        self.send_server(ServerCommand::FetchStats);
    }

    pub fn fetch_clients(&mut self) {
        self.send_server(ServerCommand::FetchClients);
    }

    pub fn fetch_detection_detail(&mut self, id: i64) {
        self.send_server(ServerCommand::FetchDetection(id));
    }

    pub fn refresh_data(&mut self) {
        self.fetch_stats();
        self.fetch_detections();
    }

    /// Builds the record from the edit form and sends it. Bad coordinate
    /// input aborts the save so the window stays open for a fix.
    pub fn save_client(&mut self, edit: &ClientEdit) -> bool {
        let latitude = match parse_coord(&edit.latitude) {
            Ok(v) => v,
            Err(e) => {
                self.errors.push(format!("Invalid latitude: {}", e));
                return false;
            }
        };
        let longitude = match parse_coord(&edit.longitude) {
            Ok(v) => v,
            Err(e) => {
                self.errors.push(format!("Invalid longitude: {}", e));
                return false;
            }
        };

        if edit.name.trim().is_empty() {
            self.errors.push("Client name is required".to_string());
            return false;
        }

        let ip_address = if edit.ip_address.trim().is_empty() {
            None
        } else {
            Some(edit.ip_address.trim().to_string())
        };

        let mut record = ClientRecord {
            id: edit.id,
            name: edit.name.trim().to_string(),
            latitude,
            longitude,
            is_detect_enabled: edit.is_detect_enabled,
            ip_address,
            ..Default::default()
        };
        record.set_roi(edit.selector.rect());

        self.send_server(ServerCommand::SaveClient(record));
        true
    }
}

fn parse_coord(s: &str) -> Result<Option<f64>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let v = s
        .parse::<f64>()
        .map_err(|_| anyhow!("not a number: {:?}", s))?;
    Ok(Some(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_coordinate_is_none() {
        assert_eq!(parse_coord("").unwrap(), None);
        assert_eq!(parse_coord("   ").unwrap(), None);
    }

    #[test]
    fn coordinate_parses_with_whitespace() {
        assert_eq!(parse_coord(" 51.5 ").unwrap(), Some(51.5));
        assert_eq!(parse_coord("-0.1278").unwrap(), Some(-0.1278));
    }

    #[test]
    fn bad_coordinate_is_an_error() {
        assert!(parse_coord("north").is_err());
    }
}
