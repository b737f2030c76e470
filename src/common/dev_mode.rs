use std::path::{Path, PathBuf};
use std::fs;
use crate::common::error::Result;

const DEV_DATA_DIR: &str = "./dev_data";

#[derive(Debug, Clone)]
pub struct DevMode {
    enabled: bool,
    base_dir: PathBuf,
}

impl DevMode {
    pub fn new(enabled: bool) -> Result<Self> {
        Self::with_base_dir(enabled, PathBuf::from(DEV_DATA_DIR))
    }

    pub fn with_base_dir(enabled: bool, base_dir: PathBuf) -> Result<Self> {
        if enabled {
            fs::create_dir_all(&base_dir)?;
            tracing::info!("Development mode enabled - data will be saved to: {}", base_dir.display());
        }

        Ok(Self { enabled, base_dir })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// In dev mode the log file name is kept but moved under the dev data dir.
    pub fn error_log_path(&self, configured: &Path) -> PathBuf {
        if !self.is_enabled() {
            return configured.to_path_buf();
        }
        match configured.file_name() {
            Some(name) => self.base_dir.join(name),
            None => self.base_dir.join("error_log.json"),
        }
    }
}
