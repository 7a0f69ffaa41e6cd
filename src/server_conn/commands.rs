use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use serde::de::DeserializeOwned;
use url::Url;

use super::records::{ClientRecord, Detection, DetectionStats};
use super::{ServerConn, ServerMessage};

impl ServerConn {
    fn api_url(&self, path: &str) -> Result<Url> {
        self.url
            .join(path)
            .with_context(|| format!("Invalid API path: {}", path))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request failed: {}", url))?;

        ensure!(
            resp.status().is_success(),
            "Server returned {} for {}",
            resp.status(),
            url
        );

        let out = resp.json::<T>().await.context("Failed to parse response")?;
        Ok(out)
    }

    fn send_message(&self, msg: ServerMessage) -> Result<()> {
        self.inbox
            .send(msg)
            .map_err(|e| anyhow!("Failed to send message to UI: {:?}", e))?;
        Ok(())
    }
}

impl ServerConn {
    pub async fn fetch_detections(
        &mut self,
        class: Option<String>,
        limit: usize,
        offset: usize,
    ) -> Result<()> {
        let mut url = self.api_url("api/detections")?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("limit", &limit.to_string());
            q.append_pair("offset", &offset.to_string());
            if let Some(class) = class.as_deref() {
                q.append_pair("class", class);
            }
        }

        let detections: Vec<Detection> = self.get_json(url).await?;
        debug!("Got {} detections", detections.len());

        self.mark_contact().await;
        self.send_message(ServerMessage::Detections(detections))
    }

    pub async fn fetch_detection(&mut self, id: i64) -> Result<()> {
        let url = self.api_url(&format!("api/detections/{}", id))?;

        let detection: Detection = self.get_json(url).await?;

        self.mark_contact().await;
        self.send_message(ServerMessage::DetectionDetail(detection))
    }

    pub async fn fetch_stats(&mut self) -> Result<()> {
        let url = self.api_url("api/detections/stats")?;

        let stats: DetectionStats = self.get_json(url).await?;

        {
            let mut status = self.current_status.write().await;
            status.total_detections = stats.total_detections;
            status.recent_detections = stats.recent_detections;
        }

        self.mark_contact().await;
        self.send_message(ServerMessage::Stats(stats))
    }

    pub async fn fetch_clients(&mut self) -> Result<()> {
        let url = self.api_url("api/clients")?;

        let clients: Vec<ClientRecord> = self.get_json(url).await?;
        debug!("Got {} clients", clients.len());

        self.mark_contact().await;
        self.send_message(ServerMessage::Clients(clients))
    }

    pub async fn save_client(&mut self, record: ClientRecord) -> Result<()> {
        let resp = match record.id {
            Some(id) => {
                let url = self.api_url(&format!("api/clients/{}", id))?;
                self.client
                    .put(url)
                    .json(&record)
                    .send()
                    .await
                    .context("Failed to update client")?
            }
            None => {
                let url = self.api_url("api/clients")?;
                self.client
                    .post(url)
                    .json(&record)
                    .send()
                    .await
                    .context("Failed to create client")?
            }
        };

        ensure!(
            resp.status().is_success(),
            "Server returned {} saving client",
            resp.status()
        );

        // create replies with the new id
        let body: serde_json::Value = resp.json().await.unwrap_or_default();
        let id = record.id.or_else(|| body.get("id").and_then(|v| v.as_i64()));

        self.mark_contact().await;
        self.send_message(ServerMessage::ClientSaved(id))
    }
}
