use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InputConfig {
    #[serde(default)]
    pub checkins_path: String,
    #[serde(default)]
    pub baseline_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_format")]
    pub default_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_filter")]
    pub filter: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub checkins_path: Option<PathBuf>,
    pub baseline_path: Option<PathBuf>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/checkin-evolution/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.checkins_path {
            self.input.checkins_path = path.display().to_string();
        }
        if let Some(path) = overrides.baseline_path {
            self.input.baseline_path = path.display().to_string();
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    /// `None` when no check-in export has been configured.
    pub fn resolved_checkins_path(&self) -> Option<PathBuf> {
        non_empty_path(&self.input.checkins_path)
    }

    pub fn resolved_baseline_path(&self) -> Option<PathBuf> {
        non_empty_path(&self.input.baseline_path)
    }

    pub fn default_template() -> String {
        let template = r#"[input]
# JSON ({client, baseline, checkins} or a bare array) or CSV export
checkins_path = "~/.local/share/checkin-evolution/checkins.json"
# optional; overrides the baseline embedded in a JSON export
baseline_path = ""

[server]
host = "127.0.0.1"
port = 3002

[report]
default_format = "table"

[logging]
filter = "info"
"#;
        template.to_string()
    }
}

fn non_empty_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(expand_tilde(trimmed))
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_format: default_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3002
}

fn default_format() -> String {
    "table".to_string()
}

fn default_filter() -> String {
    "info".to_string()
}
