use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    error::{Context, Result},
    schema::ChronicleConfig,
};

const CONFIG_FILENAME: &str = "chronicle.toml";

/// Load config from an explicit path.
pub fn load_config(path: &Path) -> Result<ChronicleConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(toml::from_str(&raw)?)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./chronicle.toml` (project-local)
/// 2. `~/.config/chronicle/chronicle.toml` (user-global)
///
/// Returns `ChronicleConfig::default()` if no config file is found.
#[must_use]
pub fn discover_and_load() -> ChronicleConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    ChronicleConfig::default()
}

/// Find the first config file in standard locations.
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "chronicle") {
        let global = dirs.config_dir().join(CONFIG_FILENAME);
        if global.exists() {
            return Some(global);
        }
    }

    None
}
