use super::files::{atomic_write, read_file};
use crate::domain::Schema;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file name inside the config directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Username used until one is chosen
pub const DEFAULT_USERNAME: &str = "User";

/// User preferences stored in settings.json
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub user: UserSettings,
    #[serde(default)]
    pub view: ViewSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default = "default_username")]
    pub username: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            username: default_username(),
        }
    }
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Which task fields the front-end presents
    #[serde(default)]
    pub schema: Schema,
}

/// Settings bound to the file they were read from
#[derive(Debug)]
pub struct SettingsStore {
    /// `None` for a store that must never touch disk
    path: Option<PathBuf>,
    settings: Settings,
}

impl SettingsStore {
    /// Load settings from `<dir>/settings.json`, defaults if the file doesn't exist
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(SETTINGS_FILE);
        let settings = match read_file(&path)? {
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings file: {}", path.display()))?,
            None => Settings::default(),
        };
        Ok(Self {
            path: Some(path),
            settings,
        })
    }

    /// Default settings kept in memory only, never written
    pub fn in_memory() -> Self {
        Self {
            path: None,
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn username(&self) -> &str {
        &self.settings.user.username
    }

    /// Change the stored username. Returns false when it was already set.
    pub fn set_username(&mut self, value: &str) -> Result<bool> {
        if self.settings.user.username == value {
            return Ok(false);
        }
        self.settings.user.username = value.to_string();
        self.save()?;
        tracing::debug!(target: "settings", username = value, "username changed");
        Ok(true)
    }

    pub fn schema(&self) -> Schema {
        self.settings.view.schema
    }

    pub fn set_schema(&mut self, schema: Schema) -> Result<bool> {
        if self.settings.view.schema == schema {
            return Ok(false);
        }
        self.settings.view.schema = schema;
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.settings)?;
        atomic_write(path, &json)?;
        Ok(())
    }
}
