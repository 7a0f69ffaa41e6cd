use std::path::Path;

use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use serde::{Deserialize, Serialize};

use crate::ui::options::Options;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub server_url: String,
    pub detections_per_page: usize,
    pub canvas_size: (f64, f64),
    pub auto_refresh: bool,
    pub auto_refresh_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            server_url: "http://localhost:5000".to_string(),
            detections_per_page: 10,
            canvas_size: (640., 480.),
            auto_refresh: false,
            auto_refresh_secs: 30,
        }
    }
}

impl AppSettings {
    pub fn from_options(options: &Options) -> Self {
        AppSettings {
            server_url: options.server_url.clone(),
            detections_per_page: options.detections_per_page,
            canvas_size: options.canvas_size,
            auto_refresh: options.auto_refresh,
            auto_refresh_secs: options.auto_refresh_secs,
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = toml::to_string_pretty(self).context("Failed to serialize AppSettings to TOML")?;
        std::fs::write(path, s)?;
        Ok(())
    }
}

pub fn read_options_from_file<P: AsRef<Path>>(path: P, options: &mut Options) -> Result<()> {
    let appsettings: AppSettings = toml::from_str(&std::fs::read_to_string(&path)?)?;

    options.server_url = appsettings.server_url;
    options.detections_per_page = appsettings.detections_per_page;
    options.canvas_size = appsettings.canvas_size;
    options.auto_refresh = appsettings.auto_refresh;
    options.auto_refresh_secs = appsettings.auto_refresh_secs;

    Ok(())
}
