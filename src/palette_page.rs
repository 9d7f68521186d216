//! State behind the palette page: the current palette, its input box and
//! the history view with its de-duplication set.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::app::AppContext;
use crate::color::{format_rgb, generate_palette, parse_color, ColorType, Rgb, PALETTE_SIZE};
use crate::error::{Error, Result};
use crate::history::{colors_of, PaletteRecord};
use crate::palette_item::{dedup_key, HistoryPanel, ItemId, PaletteHistoryItem};

#[derive(Debug, Default)]
pub struct PalettePage {
    panel: HistoryPanel,
    saved_palettes: HashSet<String>,
    current: Option<[Rgb; PALETTE_SIZE]>,
    input_mode: ColorType,
    input: String,
    history_open: bool,
}

impl PalettePage {
    pub fn panel(&self) -> &HistoryPanel {
        &self.panel
    }

    pub fn current(&self) -> Option<&[Rgb; PALETTE_SIZE]> {
        self.current.as_ref()
    }

    pub fn is_saved(&self, key: &str) -> bool {
        self.saved_palettes.contains(key)
    }

    pub fn input_mode(&self) -> ColorType {
        self.input_mode
    }

    pub fn set_input_mode(&mut self, mode: ColorType) {
        self.input_mode = mode;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_history_open(&self) -> bool {
        self.history_open
    }

    pub fn toggle_history(&mut self) {
        self.history_open = !self.history_open;
    }

    /// Generates the palette of `base` and shows it. A palette that was not
    /// saved before is added to the history view and persisted.
    ///
    /// Returns the new history item, if one was created. If the history
    /// cannot be written the item is taken back out again.
    pub fn generate(&mut self, base: Rgb, ctx: &mut AppContext) -> Result<Option<ItemId>> {
        let colors = generate_palette(base);
        self.current = Some(colors);

        let key = dedup_key(colors[PALETTE_SIZE - 1]);
        if self.saved_palettes.contains(&key) {
            debug!(?base, "palette already in history");
            return Ok(None);
        }

        let id = PaletteHistoryItem::attach(colors, &mut self.panel, true, None, ctx);
        if let Err(err) = ctx.history.save() {
            if let Some(entry) = self.panel.detach(id).and_then(|item| item.history_entry()) {
                ctx.history.remove_palette(entry);
            }
            return Err(err);
        }
        self.saved_palettes.insert(key);
        Ok(Some(id))
    }

    /// Parses the input box according to the input mode and generates.
    pub fn generate_from_input(&mut self, ctx: &mut AppContext) -> Result<Option<ItemId>> {
        let base = parse_color(self.input_mode, &self.input, ctx.settings().rgb_separator())?;
        self.generate(base, ctx)
    }

    pub fn generate_random(&mut self, ctx: &mut AppContext) -> Result<Option<ItemId>> {
        let base = Rgb::random();
        self.input_mode = ColorType::Rgb;
        self.input = format_rgb(base, ctx.settings().rgb_separator());
        self.generate(base, ctx)
    }

    /// Re-attaches palettes read from the history document, oldest first so
    /// the newest ends up on top. Returns how many were restored.
    ///
    /// With palette restoration off the records are held in the history
    /// store unshown.
    pub fn restore(&mut self, records: &[PaletteRecord], ctx: &mut AppContext) -> usize {
        if !ctx.settings().restores_palette_history() {
            ctx.history.hold_palettes(records);
            return 0;
        }
        for record in records {
            let colors = colors_of(record);
            self.saved_palettes.insert(dedup_key(colors[PALETTE_SIZE - 1]));
            PaletteHistoryItem::attach(colors, &mut self.panel, true, Some(*record), ctx);
        }
        info!(count = records.len(), "palette history restored");
        records.len()
    }

    /// Removes an item from the history collection, the de-duplication set
    /// and the view.
    ///
    /// The history document is rewritten first; if that fails the entry is
    /// put back and nothing else changes.
    pub fn delete(&mut self, id: ItemId, ctx: &mut AppContext) -> Result<()> {
        let item = self.panel.get(id).ok_or(Error::UnknownItem(id.raw()))?;
        let key = item.dedup_key();

        let removed = item
            .history_entry()
            .and_then(|entry| ctx.history.remove_palette(entry).map(|r| (entry, r)));
        if let Err(err) = ctx.history.save() {
            if let Some((entry, (index, record))) = removed {
                ctx.history.reinsert_palette(index, entry, record);
            }
            return Err(err);
        }

        self.saved_palettes.remove(&key);
        self.panel.detach(id);
        debug!(key = %key, "palette deleted");
        Ok(())
    }

    /// Hands the item's base color back to the generator: closes the history
    /// view, switches the input to RGB and fills it with the last swatch.
    pub fn regenerate(&mut self, id: ItemId, ctx: &AppContext) -> Result<()> {
        let item = self.panel.get(id).ok_or(Error::UnknownItem(id.raw()))?;
        let text = format_rgb(item.last_color(), ctx.settings().rgb_separator());
        self.history_open = false;
        self.input_mode = ColorType::Rgb;
        self.input = text;
        Ok(())
    }
}
