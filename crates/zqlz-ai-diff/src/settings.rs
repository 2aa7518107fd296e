//! Settings for inline AI diff review
//!
//! Stored as JSON next to the main ZQLZ settings file.
//!
//! # Example
//!
//! ```
//! use zqlz_ai_diff::AiDiffSettings;
//!
//! let settings = AiDiffSettings::default()
//!     .with_prompt_box_height(96)
//!     .with_show_hunk_actions(false);
//!
//! assert_eq!(settings.prompt_box_height, 96);
//! assert!(!settings.show_hunk_actions);
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiDiffSettings {
    /// Show accept/reject controls next to each hunk.
    pub show_hunk_actions: bool,
    /// Diff the current texts again right before applying a hunk action, so
    /// an action only lands on a hunk that still exists unchanged.
    pub revalidate_before_patch: bool,
    /// Height reserved for a prompt box until its content reports a size.
    pub prompt_box_height: u32,
    /// Put focus back into an overlay after its widget is rebuilt.
    pub restore_focus: bool,
}

impl Default for AiDiffSettings {
    fn default() -> Self {
        Self {
            show_hunk_actions: true,
            revalidate_before_patch: true,
            prompt_box_height: 72,
            restore_focus: true,
        }
    }
}

impl AiDiffSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_show_hunk_actions(mut self, show: bool) -> Self {
        self.show_hunk_actions = show;
        self
    }

    pub fn with_revalidate_before_patch(mut self, revalidate: bool) -> Self {
        self.revalidate_before_patch = revalidate;
        self
    }

    pub fn with_prompt_box_height(mut self, height: u32) -> Self {
        self.prompt_box_height = height;
        self
    }

    pub fn with_restore_focus(mut self, restore: bool) -> Self {
        self.restore_focus = restore;
        self
    }

    /// Loads settings from the default location, falling back to defaults if
    /// the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read AI diff settings from {:?}", path))?;
        serde_json::from_str(&content).with_context(|| "Failed to parse AI diff settings JSON")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "saved AI diff settings");
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(config_dir.join("zqlz").join("ai_diff.json"))
    }
}
