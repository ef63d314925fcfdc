pub mod batch;
pub mod config;
pub mod inspect;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use bankxl_core::models::config::BankxlConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bankxl")
        .join("config.json")
}

/// Resolve the config file: the `--config` argument, else the default path.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration. An explicit path must exist; the default path falls
/// back to built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BankxlConfig> {
    if let Some(path) = config_path {
        return BankxlConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config {}", path.display());
        Ok(BankxlConfig::from_file(&path)?)
    } else {
        Ok(BankxlConfig::default())
    }
}
