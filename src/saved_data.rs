use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

/// View state that should survive restarts but does not belong in the
/// config file the user edits.
#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct SavedData {
    pub class_filter: Option<String>,
}

impl SavedData {
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let data = toml::from_str(&s)?;
        Ok(data)
    }

    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let s = toml::to_string(&self)?;
        std::fs::write(path, s)?;
        Ok(())
    }
}
