// File: ./src/config.rs
// Handles configuration loading, validation, saving, and defaults.
use crate::context::AppContext;
use crate::model::{AnnotateOptions, DateFormat};
use crate::vault::Vault;
use crate::view::parse_anchor;
use anyhow::{Context, Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error as ThisError;

pub const STYLE_COUNT: u8 = 11;

const DAILY_NOTE_FORMAT_CHARS: &str = "YMDWwd.,-: []";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Month,
    Week,
    List,
}

/// One of the bundled cell styles, `style1` to `style11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style(u8);

impl Style {
    pub fn parse(s: &str) -> Option<Self> {
        let n = s.trim().strip_prefix("style")?.parse::<u8>().ok()?;
        (1..=STYLE_COUNT).contains(&n).then_some(Self(n))
    }

    pub fn number(&self) -> u8 {
        self.0
    }
}

impl Default for Style {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "style{}", self.0)
    }
}

/// Problems that stop a view from rendering at all.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ConfigError {
    #[error("No pages selector set. Use `pages = \"\"` to read the whole vault.")]
    MissingPages,
    #[error("No view set. Choose one of: month, week, list.")]
    MissingView,
    #[error("Unknown view '{0}'. Choose one of: month, week, list.")]
    UnknownView(String),
    #[error("No style set. Choose one of: style1 .. style{max}.", max = STYLE_COUNT)]
    MissingStyle,
    #[error("Unknown style '{0}'. Choose one of: style1 .. style{max}.", max = STYLE_COUNT)]
    UnknownStyle(String),
    #[error("Invalid first day of week '{0}'. Use a single digit from 0 (Sunday) to 6 (Saturday).")]
    InvalidFirstDayOfWeek(String),
    #[error("Invalid start position '{value}'. Expected {expected}.")]
    InvalidStartPosition {
        value: String,
        expected: &'static str,
    },
    #[error(
        "Invalid daily note format '{0}'. Only the letters Y, M, D, W, w, d, the separators `. , - :`, spaces and brackets are allowed."
    )]
    InvalidDailyNoteFormat(String),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Folder of the vault to read tasks from.
    #[serde(default)]
    pub vault: Option<String>,
    /// Folder inside the vault, `""` for everything.
    #[serde(default)]
    pub pages: Option<String>,
    #[serde(default)]
    pub view: Option<String>,
    /// A single digit, 0 = Sunday.
    #[serde(default)]
    pub first_day_of_week: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub daily_note_folder: Option<String>,
    #[serde(default)]
    pub daily_note_format: Option<String>,
    /// `YYYY-MM` for month and list views, `YYYY-ww` for the week view.
    #[serde(default)]
    pub start_position: Option<String>,
    #[serde(default)]
    pub global_task_filter: Option<String>,
    /// Extra class added to the rendered root element.
    #[serde(default)]
    pub css: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault: None,
            pages: Some(String::new()),
            view: Some(ViewMode::Month.to_string()),
            first_day_of_week: Some("1".to_string()),
            style: Some(Style::default().to_string()),
            daily_note_folder: None,
            daily_note_format: Some("YYYY-MM-DD".to_string()),
            start_position: None,
            global_task_filter: None,
            css: None,
        }
    }
}

/// A validated configuration. Rendering code only ever sees this.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pages: String,
    pub view: ViewMode,
    pub first_day_of_week: u8,
    pub style: Style,
    pub daily_note_folder: Option<String>,
    pub daily_note_format: Option<DateFormat>,
    pub start_position: Option<NaiveDate>,
    pub global_task_filter: Option<String>,
    pub css: Option<String>,
}

impl Settings {
    pub fn annotate_options(&self) -> AnnotateOptions {
        AnnotateOptions::new(
            self.daily_note_format.clone(),
            self.global_task_filter.clone(),
        )
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    /// Checks every setting and converts it into typed `Settings`.
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let pages = self.pages.clone().ok_or(ConfigError::MissingPages)?;

        let view_str = non_empty(&self.view).ok_or(ConfigError::MissingView)?;
        let view = view_str
            .to_lowercase()
            .parse::<ViewMode>()
            .map_err(|_| ConfigError::UnknownView(view_str.to_string()))?;

        let style_str = non_empty(&self.style).ok_or(ConfigError::MissingStyle)?;
        let style =
            Style::parse(style_str).ok_or_else(|| ConfigError::UnknownStyle(style_str.into()))?;

        let first_day_str = self.first_day_of_week.as_deref().unwrap_or_default().trim();
        let first_day_of_week = match first_day_str.as_bytes() {
            [d @ b'0'..=b'6'] => d - b'0',
            _ => {
                return Err(ConfigError::InvalidFirstDayOfWeek(
                    first_day_str.to_string(),
                ));
            }
        };

        let daily_note_format = match non_empty(&self.daily_note_format) {
            Some(format) => {
                if !format.chars().all(|c| DAILY_NOTE_FORMAT_CHARS.contains(c)) {
                    return Err(ConfigError::InvalidDailyNoteFormat(format.to_string()));
                }
                let compiled = DateFormat::new(format)
                    .map_err(|_| ConfigError::InvalidDailyNoteFormat(format.to_string()))?;
                Some(compiled)
            }
            None => None,
        };

        let start_position = match non_empty(&self.start_position) {
            Some(value) => Some(parse_anchor(view, value).ok_or_else(|| {
                ConfigError::InvalidStartPosition {
                    value: value.to_string(),
                    expected: match view {
                        ViewMode::Week => "YYYY-ww",
                        ViewMode::Month | ViewMode::List => "YYYY-MM",
                    },
                }
            })?),
            None => None,
        };

        Ok(Settings {
            pages,
            view,
            first_day_of_week,
            style,
            daily_note_folder: non_empty(&self.daily_note_folder).map(str::to_string),
            daily_note_format,
            start_position,
            global_task_filter: non_empty(&self.global_task_filter).map(str::to_string),
            css: non_empty(&self.css).map(str::to_string),
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load the configuration from disk using an explicit context.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// True when the error means the config file does not exist yet.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }
        err.chain().any(|cause| {
            cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
        })
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        Vault::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            Vault::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }
}
