use crate::error::{PracticeError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
const DATA_DIRNAME: &str = "data";
const CACHE_DIRNAME: &str = "cache";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:5158";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Overrides the home directory (config + data) for every binary.
pub const HOME_ENV: &str = "MEDPRACTICE_HOME";

/// Keys accepted by [`PracticeConfig::get`] and [`PracticeConfig::set`].
pub const KEYS: [&str; 3] = ["listen", "remote-url", "timeout-secs"];

/// Configuration stored in `<home>/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PracticeConfig {
    /// Address the REST server binds to
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Base URL of a server to mirror (e.g. "http://localhost:5158")
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Per-request timeout for the client proxy
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            remote_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PracticeConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(home: P) -> Result<Self> {
        let config_path = home.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(PracticeError::Io)?;
        let config: PracticeConfig =
            serde_json::from_str(&content).map_err(PracticeError::Serialization)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, home: P) -> Result<()> {
        let home = home.as_ref();
        if !home.exists() {
            fs::create_dir_all(home).map_err(PracticeError::Io)?;
        }

        let config_path = home.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(PracticeError::Serialization)?;
        fs::write(config_path, content).map_err(PracticeError::Io)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "listen" => Ok(self.listen.clone()),
            "remote-url" => Ok(self.remote_url.clone().unwrap_or_default()),
            "timeout-secs" => Ok(self.timeout_secs.to_string()),
            other => Err(unknown_key(other)),
        }
    }

    /// Set a key from its string form. An empty `remote-url` clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "listen" => self.listen = value.to_string(),
            "remote-url" => {
                self.remote_url = Some(value.trim_end_matches('/').to_string())
                    .filter(|v| !v.is_empty());
            }
            "timeout-secs" => {
                self.timeout_secs = value
                    .parse()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| {
                        PracticeError::Config(format!(
                            "timeout-secs must be a positive integer, got '{}'",
                            value
                        ))
                    })?;
            }
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> PracticeError {
    PracticeError::Config(format!(
        "unknown key '{}' (expected one of: {})",
        key,
        KEYS.join(", ")
    ))
}

/// Home directory: explicit flag, then `MEDPRACTICE_HOME`, then the platform data dir.
pub fn resolve_home(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(home) = explicit {
        return Ok(home);
    }
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "medpractice", "medpractice")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| PracticeError::Config("could not determine a home directory".to_string()))
}

/// Where the collection snapshots live under a home directory.
pub fn data_dir(home: &Path) -> PathBuf {
    home.join(DATA_DIRNAME)
}

/// Where the client proxy mirrors a remote server's state.
pub fn cache_dir(home: &Path) -> PathBuf {
    home.join(CACHE_DIRNAME)
}
