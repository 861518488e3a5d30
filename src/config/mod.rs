use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::db::{TaskStatus, DEFAULT_STORAGE_KEY};

/// Global configuration (stored in ~/.config/taskboard/)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// SQLite file holding the board. Defaults to the platform data dir.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,

    /// Key the board is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Log filter directive, overridden by TASKBOARD_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Ask before deleting a task
    #[serde(default = "default_true")]
    pub confirm_delete: bool,

    /// UI theme/colors
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            storage_key: default_storage_key(),
            log_level: default_log_level(),
            confirm_delete: true,
            theme: ThemeConfig::default(),
        }
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Theme configuration with hex colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Accent for the todo column (hex, e.g. "#dc2626")
    #[serde(default = "default_color_todo")]
    pub color_todo: String,

    /// Accent for the in-progress column
    #[serde(default = "default_color_in_progress")]
    pub color_in_progress: String,

    /// Accent for the done column
    #[serde(default = "default_color_done")]
    pub color_done: String,

    /// Border color for the selected card
    #[serde(default = "default_color_selected")]
    pub color_selected: String,

    /// Border color for unselected cards
    #[serde(default = "default_color_normal")]
    pub color_normal: String,

    /// Text color for task titles
    #[serde(default = "default_color_text")]
    pub color_text: String,

    /// Color for task descriptions
    #[serde(default = "default_color_description")]
    pub color_description: String,

    /// Footer and hint text
    #[serde(default = "default_color_dimmed")]
    pub color_dimmed: String,

    /// Border color for the modal and confirmation popups
    #[serde(default = "default_color_popup_border")]
    pub color_popup_border: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_todo: default_color_todo(),
            color_in_progress: default_color_in_progress(),
            color_done: default_color_done(),
            color_selected: default_color_selected(),
            color_normal: default_color_normal(),
            color_text: default_color_text(),
            color_description: default_color_description(),
            color_dimmed: default_color_dimmed(),
            color_popup_border: default_color_popup_border(),
        }
    }
}

fn default_color_todo() -> String {
    "#dc2626".to_string() // Red
}

fn default_color_in_progress() -> String {
    "#ca8a04".to_string() // Yellow
}

fn default_color_done() -> String {
    "#16a34a".to_string() // Green
}

fn default_color_selected() -> String {
    "#ead49a".to_string()
}

fn default_color_normal() -> String {
    "#9C9991".to_string()
}

fn default_color_text() -> String {
    "#f2ece6".to_string()
}

fn default_color_description() -> String {
    "#C4B0AC".to_string()
}

fn default_color_dimmed() -> String {
    "#9C9991".to_string()
}

fn default_color_popup_border() -> String {
    "#3b82f6".to_string() // Blue
}

impl ThemeConfig {
    /// Parse a hex color string to RGB tuple
    pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    }

    /// Accent color for a column
    pub fn column_color(&self, status: TaskStatus) -> &str {
        match status {
            TaskStatus::Todo => &self.color_todo,
            TaskStatus::InProgress => &self.color_in_progress,
            TaskStatus::Done => &self.color_done,
        }
    }
}

impl GlobalConfig {
    /// Load global config from default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from `path`, falling back to defaults when the file is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            toml::from_str(&content).context("Failed to parse config")
        } else {
            Ok(Self::default())
        }
    }

    /// Save global config to default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Get the path to the global config file
    /// Always uses ~/.config/taskboard/ on all platforms
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join("taskboard").join("config.toml"))
    }

    /// Get the path to the global data directory
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "taskboard")
            .context("Could not determine data directory")?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Where the board lives: an explicit override, then the configured
    /// path, then `board.db` in the data dir
    pub fn storage_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.storage_path {
            return Ok(path.clone());
        }
        Ok(Self::data_dir()?.join("board.db"))
    }

    /// Directory for rolling log files
    pub fn log_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("logs"))
    }
}
