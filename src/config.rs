//! Client configuration.
//!
//! Settings resolve in layers, each overriding the one before: built-in
//! defaults, the JSON config file (`~/.smarttodo/config.json` unless `--config`
//! names another), `SMARTTODO_*` environment variables, then command-line
//! flags. The CSRF token is never built in; it only comes from the file or the
//! environment.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub page_size: usize,
    pub timeout_secs: u64,
    pub csrf_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            csrf_token: None,
        }
    }
}

/// The config file: every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    page_size: Option<usize>,
    timeout_secs: Option<u64>,
    csrf_token: Option<String>,
}

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".smarttodo").join("config.json")
}

impl Config {
    /// Defaults overlaid with the config file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        config.apply_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from a JSON file. A missing file is not an error.
    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file");
            return Ok(());
        }
        let buf = fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("reading {}: {e}", path.display())))?;
        let file: ConfigFile = serde_json::from_str(&buf)
            .map_err(|e| ApiError::Config(format!("parsing {}: {e}", path.display())))?;

        if let Some(url) = file.base_url {
            self.base_url = url;
        }
        if let Some(n) = file.page_size {
            self.page_size = n;
        }
        if let Some(t) = file.timeout_secs {
            self.timeout_secs = t;
        }
        if file.csrf_token.is_some() {
            self.csrf_token = file.csrf_token;
        }
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(())
    }

    /// Overlay `SMARTTODO_*` variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SMARTTODO_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = lookup("SMARTTODO_CSRF_TOKEN").filter(|v| !v.trim().is_empty()) {
            self.csrf_token = Some(token);
        }
        if let Some(raw) = lookup("SMARTTODO_TIMEOUT_SECS") {
            self.timeout_secs = raw
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("SMARTTODO_TIMEOUT_SECS is not a number: '{raw}'")))?;
        }
        Ok(())
    }

    /// Overlay command-line flags.
    pub fn apply_flags(&mut self, base_url: Option<String>, page_size: Option<usize>) {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(n) = page_size {
            self.page_size = n;
        }
    }
}
