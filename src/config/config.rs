use crate::config::class_labels::ClassLabels;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::error;

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ModelConfig {
    path: PathBuf,
    labels: ClassLabels,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model/model.onnx"),
            labels: ClassLabels::default(),
        }
    }
}

impl ModelConfig {
    pub fn get_path(&self) -> &Path {
        &self.path
    }

    pub fn get_labels(&self) -> &ClassLabels {
        &self.labels
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
    public_dir: PathBuf,
    upload_dir: PathBuf,
    max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public"),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn get_public_dir(&self) -> &Path {
        &self.public_dir
    }

    pub fn get_upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn get_max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Config {
    model: ModelConfig,
    server: ServerConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error reading config: {0}")]
    Confy(#[from] confy::ConfyError),
}

impl Config {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Config> {
        match Config::load_or_create(path) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                error!("Failed to load configuration: {}", e);
                None
            }
        }
    }

    fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        if path.exists() {
            let cfg: Self = confy::load_path(path)?;
            Ok(cfg)
        } else {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            let cfg = Config::default();
            confy::store_path(path, &cfg)?;
            Ok(cfg)
        }
    }

    pub fn get_model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn get_server(&self) -> &ServerConfig {
        &self.server
    }
}
