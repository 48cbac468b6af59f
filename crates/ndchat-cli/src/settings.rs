use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use ndchat_core::Config;

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ndchat").join("config.toml"))
}

/// A missing file yields the defaults; a malformed one is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(err) => return Err(format!("failed to read {}: {err}", path.display()).into()),
    };
    let config: Config = toml::from_str(&raw)
        .map_err(|err| format!("invalid config {}: {err}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn apply_overrides(config: &mut Config, endpoint: Option<&str>, chat_id: Option<&str>) {
    if let Some(endpoint) = endpoint {
        config.endpoint.base_url = endpoint.to_string();
    }
    if let Some(chat_id) = chat_id {
        config.session.chat_id = chat_id.to_string();
    }
}
