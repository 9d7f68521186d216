use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info};

use crate::color::Rgb;
use crate::error::Result;
use crate::history::{HistoryDocument, HistoryStore};
use crate::palette_page::PalettePage;
use crate::platform::{ClipboardSink, Notifier, Restarter};
use crate::settings::{ImportOutcome, Settings, SettingsManager};

/// Application-scoped state handed to every page and event handler.
pub struct AppContext {
    pub settings: SettingsManager,
    pub history: HistoryStore,
    notifier: Rc<dyn Notifier>,
    restarter: Rc<dyn Restarter>,
    clipboard: Rc<dyn ClipboardSink>,
}

impl AppContext {
    pub fn new(
        settings: SettingsManager,
        history: HistoryStore,
        notifier: Rc<dyn Notifier>,
        restarter: Rc<dyn Restarter>,
        clipboard: Rc<dyn ClipboardSink>,
    ) -> Self {
        Self {
            settings,
            history,
            notifier,
            restarter,
            clipboard,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.settings.settings()
    }

    /// Applies `change` to the live settings and persists them.
    pub fn update_settings(&mut self, change: impl FnOnce(&mut Settings)) -> Result<()> {
        change(self.settings.settings_mut());
        self.settings.save()
    }

    pub fn export_settings(&self, path: &Path) -> Result<()> {
        self.settings.export(path, self.notifier.as_ref())
    }

    pub fn import_settings(&mut self, path: &Path) -> Result<ImportOutcome> {
        self.settings
            .import(path, self.notifier.as_ref(), self.restarter.as_ref())
    }

    /// Clears the first-run flag. Returns whether this was the first run.
    pub fn complete_first_run(&mut self) -> Result<bool> {
        if !self.settings().is_first_run() {
            return Ok(false);
        }
        info!("first run");
        self.update_settings(|s| s.is_first_run = Some(false))?;
        Ok(true)
    }

    pub fn copy_text(&self, text: &str) -> Result<()> {
        self.clipboard.set_text(text)?;
        debug!(text, "copied to clipboard");
        Ok(())
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Puts saved picker colors back when the user asked for it. Otherwise
    /// they stay on disk without being shown.
    pub fn restore_colors(&mut self, saved: &HistoryDocument) {
        if self.settings().restores_color_history() {
            self.history
                .set_colors(saved.colors.iter().copied().map(Rgb::from).collect());
        } else {
            self.history.hold_colors(&saved.colors);
        }
    }

    /// Records a color chosen on the picker page.
    pub fn accept_color(&mut self, color: Rgb) -> Result<()> {
        if !self.settings().restores_color_history() {
            return Ok(());
        }
        self.history.push_color(color);
        self.history.save()
    }

    pub fn clear_color_history(&mut self) -> Result<()> {
        self.history.clear_colors();
        self.history.save()
    }
}

/// Loads settings and history from the data directory and rebuilds the
/// palette page from the saved history.
pub fn start(
    notifier: Rc<dyn Notifier>,
    restarter: Rc<dyn Restarter>,
    clipboard: Rc<dyn ClipboardSink>,
) -> Result<(AppContext, PalettePage)> {
    let settings = SettingsManager::load_default_location()?;
    let history = HistoryStore::default_location();
    start_with(settings, history, notifier, restarter, clipboard)
}

pub fn start_with(
    settings: SettingsManager,
    history: HistoryStore,
    notifier: Rc<dyn Notifier>,
    restarter: Rc<dyn Restarter>,
    clipboard: Rc<dyn ClipboardSink>,
) -> Result<(AppContext, PalettePage)> {
    let saved = history.read_saved()?;
    let mut ctx = AppContext::new(settings, history, notifier, restarter, clipboard);
    ctx.restore_colors(&saved);
    let mut page = PalettePage::default();
    page.restore(&saved.palettes, &mut ctx);
    Ok((ctx, page))
}
