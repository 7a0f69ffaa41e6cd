use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use parking_lot::Mutex;

#[derive(Debug, Clone)]
pub enum ImageCommand {
    Fetch(String),
}

#[derive(Debug, Clone)]
pub enum ImageMessage {
    Loaded(String, egui::ColorImage),
    Failed(String, String),
}

/// Downloads and decodes detection images off the UI thread. The pending
/// set is shared with the UI so a filename is only ever in flight once.
pub fn spawn_image_thread(
    ctx: egui::Context,
    base_url: url::Url,
    pending: Arc<Mutex<HashSet<String>>>,
    channel_from_ui: crossbeam_channel::Receiver<ImageCommand>,
    channel_to_ui: crossbeam_channel::Sender<ImageMessage>,
) {
    std::thread::spawn(move || {
        let client = match reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")
        {
            Ok(client) => client,
            Err(e) => {
                error!("Image thread failed to start: {:?}", e);
                return;
            }
        };

        debug!("Starting image fetch loop");
        while let Ok(ImageCommand::Fetch(filename)) = channel_from_ui.recv() {
            let result = fetch_image(&client, &base_url, &filename);

            pending.lock().remove(&filename);

            match result {
                Ok(img) => {
                    if channel_to_ui
                        .send(ImageMessage::Loaded(filename, img))
                        .is_err()
                    {
                        eprintln!("Failed to send message to UI");
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch image {}: {:?}", filename, e);
                    if channel_to_ui
                        .send(ImageMessage::Failed(filename, format!("{:#}", e)))
                        .is_err()
                    {
                        eprintln!("Failed to send message to UI");
                    }
                }
            }

            ctx.request_repaint();
        }
        debug!("Image fetch channel closed");
    });
}

fn fetch_image(
    client: &reqwest::blocking::Client,
    base_url: &url::Url,
    filename: &str,
) -> Result<egui::ColorImage> {
    let url = base_url
        .join(&format!("api/images/{}", filename))
        .with_context(|| format!("Invalid image path: {}", filename))?;

    let resp = client
        .get(url.clone())
        .send()
        .with_context(|| format!("Request failed: {}", url))?;

    ensure!(
        resp.status().is_success(),
        "Server returned {} for {}",
        resp.status(),
        url
    );

    let bytes = resp.bytes().context("Failed to read image body")?;

    let img = image::load_from_memory(&bytes)
        .context("Failed to decode image")?
        .into_rgb8();

    let size = [img.width() as usize, img.height() as usize];
    Ok(egui::ColorImage::from_rgb(
        size,
        img.as_flat_samples().as_slice(),
    ))
}
