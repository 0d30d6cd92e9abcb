//! JSON file config store for the host build.
//!
//! Implements [`ConfigPort`].  A missing file is not an error: the guard
//! starts from defaults and the file is written on the first save.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::GuardConfig;
use crate::error::{Error, Result};

pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for FileConfigStore {
    fn load(&self) -> Result<GuardConfig> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Config: {} not found, using defaults", self.path.display());
                return Ok(GuardConfig::default());
            }
            Err(e) => {
                warn!("Config: reading {} failed: {}", self.path.display(), e);
                return Err(Error::Config("config file unreadable"));
            }
        };

        let config: GuardConfig = serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Config: {} is malformed: {}", self.path.display(), e);
            Error::Config("config file malformed")
        })?;
        config.validate()?;
        info!("Config: loaded {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &GuardConfig) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_vec_pretty(config)
            .map_err(|_| Error::Config("config not serializable"))?;
        std::fs::write(&self.path, json).map_err(|e| {
            warn!("Config: writing {} failed: {}", self.path.display(), e);
            Error::Config("config file unwritable")
        })
    }
}
