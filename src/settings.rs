use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::color::ColorType;
use crate::document;
use crate::error::{Error, Result};
use crate::paths;
use crate::platform::{Notifier, Restarter};

/// Marker for values that follow the active theme.
pub const THEME_DEFAULT: &str = "_default";

const DEFAULT_RGB_SEPARATOR: &str = ";";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Picker,
    Converter,
    Text,
    Palette,
    Settings,
}

impl Page {
    pub fn label(self) -> &'static str {
        match self {
            Self::Picker => "Picker",
            Self::Converter => "Converter",
            Self::Text => "Text",
            Self::Palette => "Palette",
            Self::Settings => "Settings",
        }
    }

    pub fn all() -> &'static [Page] {
        &[
            Self::Picker,
            Self::Converter,
            Self::Text,
            Self::Palette,
            Self::Settings,
        ]
    }

    pub fn index(self) -> usize {
        Self::all().iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Self {
        Self::all().get(index).copied().unwrap_or_default()
    }
}

/// User preferences, persisted as one document.
///
/// Optional fields absent from a document stay `None`; use the accessors to
/// read them with their documented fallback.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub is_dark_theme: bool,
    /// Language tag such as `en-US`, or `_default` to follow the system.
    pub language: Option<String>,
    #[serde(default)]
    pub check_updates_on_start: bool,
    #[serde(default)]
    pub notify_updates: bool,
    pub rgb_separator: Option<String>,
    pub hex_use_upper_case: Option<bool>,
    pub enable_keyboard_shortcuts: Option<bool>,
    pub is_theme_system: Option<bool>,
    /// Restore previously picked colors on the picker page.
    pub restore_color_history: Option<bool>,
    /// Restore previously generated palettes on the palette page.
    pub restore_palette_color_history: Option<bool>,
    pub is_first_run: Option<bool>,
    pub favorite_color_type: Option<ColorType>,
    pub copy_keyboard_shortcut: Option<String>,
    pub select_keyboard_shortcut: Option<String>,
    pub is_pinned: Option<bool>,
    pub startup_page: Option<Page>,
    pub use_compact_mode: Option<bool>,
    pub text_tool_font: Option<String>,
    pub text_tool_font_size: Option<i32>,
    pub text_tool_font_color: Option<String>,
    pub text_tool_background_color: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_dark_theme: false,
            language: Some(THEME_DEFAULT.to_string()),
            check_updates_on_start: false,
            notify_updates: true,
            rgb_separator: Some(DEFAULT_RGB_SEPARATOR.to_string()),
            hex_use_upper_case: Some(false),
            enable_keyboard_shortcuts: Some(true),
            is_theme_system: Some(true),
            restore_color_history: Some(true),
            restore_palette_color_history: Some(true),
            is_first_run: Some(true),
            favorite_color_type: Some(ColorType::Rgb),
            copy_keyboard_shortcut: Some("Shift+C".to_string()),
            select_keyboard_shortcut: Some("Shift+S".to_string()),
            is_pinned: Some(false),
            startup_page: Some(Page::Picker),
            use_compact_mode: Some(false),
            text_tool_font: Some("Arial".to_string()),
            text_tool_font_size: Some(16),
            text_tool_font_color: Some(THEME_DEFAULT.to_string()),
            text_tool_background_color: Some(THEME_DEFAULT.to_string()),
        }
    }
}

impl Settings {
    pub fn rgb_separator(&self) -> &str {
        self.rgb_separator.as_deref().unwrap_or(DEFAULT_RGB_SEPARATOR)
    }

    pub fn hex_uppercase(&self) -> bool {
        self.hex_use_upper_case.unwrap_or(false)
    }

    pub fn restores_color_history(&self) -> bool {
        self.restore_color_history.unwrap_or(true)
    }

    pub fn restores_palette_history(&self) -> bool {
        self.restore_palette_color_history.unwrap_or(true)
    }

    pub fn favorite_color_type(&self) -> ColorType {
        self.favorite_color_type.unwrap_or_default()
    }

    pub fn startup_page(&self) -> Page {
        self.startup_page.unwrap_or_default()
    }

    pub fn is_pinned(&self) -> bool {
        self.is_pinned.unwrap_or(false)
    }

    pub fn compact_mode(&self) -> bool {
        self.use_compact_mode.unwrap_or(false)
    }

    pub fn is_first_run(&self) -> bool {
        self.is_first_run.unwrap_or(true)
    }

    pub fn text_tool_font(&self) -> &str {
        self.text_tool_font.as_deref().unwrap_or("Arial")
    }

    pub fn text_tool_font_size(&self) -> i32 {
        self.text_tool_font_size.unwrap_or(16)
    }

    /// Foreground and background of the text tool, with `_default` resolved
    /// against the theme.
    pub fn text_tool_colors(&self, dark: bool) -> (String, String) {
        let (fg_default, bg_default) = if dark {
            ("#FFFFFF", "#1E1E1E")
        } else {
            ("#000000", "#FFFFFF")
        };
        let resolve = |value: &Option<String>, fallback: &str| match value.as_deref() {
            None | Some(THEME_DEFAULT) => fallback.to_string(),
            Some(color) => color.to_string(),
        };
        (
            resolve(&self.text_tool_font_color, fg_default),
            resolve(&self.text_tool_background_color, bg_default),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported,
    SourceMissing,
}

/// Owns the live settings and the document they are persisted to.
#[derive(Debug)]
pub struct SettingsManager {
    path: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Loads the settings at `path`, creating and persisting defaults when
    /// the document is absent.
    ///
    /// A malformed document is moved aside to `<path>.bak` and replaced by
    /// defaults rather than aborting startup.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match document::read::<Settings>(&path) {
            Ok(Some(settings)) => {
                info!(path = %path.display(), "settings loaded");
                Ok(Self { path, settings })
            }
            Ok(None) => {
                info!(path = %path.display(), "no settings found, writing defaults");
                let manager = Self {
                    path,
                    settings: Settings::default(),
                };
                manager.save()?;
                Ok(manager)
            }
            Err(err @ Error::Malformed { .. }) => {
                warn!("{}; falling back to defaults", err);
                document::move_aside(&path);
                let manager = Self {
                    path,
                    settings: Settings::default(),
                };
                manager.save()?;
                Ok(manager)
            }
            Err(err) => Err(err),
        }
    }

    pub fn load_default_location() -> Result<Self> {
        Self::load(paths::settings_path())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        document::write(&self.path, &self.settings)?;
        info!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Writes the current settings to `path`. The outcome is reported to the
    /// user either way; the live settings are never modified.
    pub fn export(&self, path: &Path, notifier: &dyn Notifier) -> Result<()> {
        match document::write(path, &self.settings) {
            Ok(()) => {
                info!(path = %path.display(), "settings exported");
                notifier.info("Settings exported successfully.");
                Ok(())
            }
            Err(err) => {
                warn!("settings export failed: {}", err);
                notifier.error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Replaces the live settings with the document at `path`, persists them
    /// and asks the host to restart so every view picks them up.
    ///
    /// Nothing happens when `path` does not exist. On failure the error is
    /// reported and the live settings are left as they were.
    pub fn import(
        &mut self,
        path: &Path,
        notifier: &dyn Notifier,
        restarter: &dyn Restarter,
    ) -> Result<ImportOutcome> {
        match self.replace_from(path) {
            Ok(ImportOutcome::SourceMissing) => {
                warn!(path = %path.display(), "settings import skipped, file not found");
                Ok(ImportOutcome::SourceMissing)
            }
            Ok(ImportOutcome::Imported) => {
                info!(path = %path.display(), "settings imported");
                notifier.info("Settings imported successfully. ChromaPicker will now restart.");
                if let Err(err) = restarter.request_restart() {
                    notifier.error(&err.to_string());
                    return Err(err);
                }
                Ok(ImportOutcome::Imported)
            }
            Err(err) => {
                warn!("settings import failed: {}", err);
                notifier.error(&err.to_string());
                Err(err)
            }
        }
    }

    fn replace_from(&mut self, path: &Path) -> Result<ImportOutcome> {
        let Some(imported) = document::read::<Settings>(path)? else {
            return Ok(ImportOutcome::SourceMissing);
        };
        let previous = std::mem::replace(&mut self.settings, imported);
        if let Err(err) = self.save() {
            self.settings = previous;
            return Err(err);
        }
        Ok(ImportOutcome::Imported)
    }
}
