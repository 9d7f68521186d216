//! A saved palette as shown in the history view.

use std::num::TryFromIntError;

use crate::app::AppContext;
use crate::color::{format_color, format_hex, format_rgb, Rgb, PALETTE_SIZE};
use crate::error::{Error, Result};
use crate::history::{record_of, EntryId, PaletteRecord};
use crate::settings::Settings;

/// Identifies an item inside its [`HistoryPanel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(u64);

impl ItemId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Ids travel through the UI as `int`.
impl TryFrom<ItemId> for i32 {
    type Error = TryFromIntError;

    fn try_from(id: ItemId) -> std::result::Result<Self, Self::Error> {
        i32::try_from(id.0)
    }
}

impl TryFrom<i32> for ItemId {
    type Error = TryFromIntError;

    fn try_from(raw: i32) -> std::result::Result<Self, Self::Error> {
        u64::try_from(raw).map(Self)
    }
}

/// Key used to avoid saving the same palette twice: the last swatch as `r;g;b`.
///
/// Always `;`-joined, whatever separator the user picked.
pub fn dedup_key(color: Rgb) -> String {
    format_rgb(color, ";")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swatch {
    pub color: Rgb,
    pub tooltip: String,
}

/// Swatches for `colors`, each with an RGB/HEX tooltip in the user's notation.
pub fn swatches_of(colors: &[Rgb], settings: &Settings) -> Vec<Swatch> {
    colors
        .iter()
        .map(|&color| Swatch {
            color,
            tooltip: format!(
                "RGB: {}\nHEX: {}",
                format_rgb(color, settings.rgb_separator()),
                format_hex(color, settings.hex_uppercase())
            ),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct PaletteHistoryItem {
    id: ItemId,
    colors: [Rgb; PALETTE_SIZE],
    entry: Option<EntryId>,
}

impl PaletteHistoryItem {
    /// Builds an item for `colors` and puts it at the top of `panel`.
    ///
    /// When palette history is restored and `add_to_history` is set, the
    /// palette is appended to the history collection, as `int_colors` if the
    /// caller already has it in that form.
    pub fn attach(
        colors: [Rgb; PALETTE_SIZE],
        panel: &mut HistoryPanel,
        add_to_history: bool,
        int_colors: Option<PaletteRecord>,
        ctx: &mut AppContext,
    ) -> ItemId {
        let entry = if add_to_history && ctx.settings().restores_palette_history() {
            let record = int_colors.unwrap_or_else(|| record_of(&colors));
            Some(ctx.history.push_palette(record))
        } else {
            None
        };

        let id = panel.allocate_id();
        panel.items.insert(0, Self { id, colors, entry });
        id
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.colors
    }

    pub fn history_entry(&self) -> Option<EntryId> {
        self.entry
    }

    pub fn last_color(&self) -> Rgb {
        self.colors[PALETTE_SIZE - 1]
    }

    pub fn dedup_key(&self) -> String {
        dedup_key(self.last_color())
    }

    pub fn swatches(&self, settings: &Settings) -> Vec<Swatch> {
        swatches_of(&self.colors, settings)
    }

    /// The swatch at `index` in the user's favorite notation.
    pub fn clipboard_text(&self, index: usize, settings: &Settings) -> Result<String> {
        let color = self.colors.get(index).ok_or(Error::SwatchIndex(index))?;
        Ok(format_color(
            *color,
            settings.favorite_color_type(),
            settings.rgb_separator(),
            settings.hex_uppercase(),
        ))
    }

    /// Copies the swatch at `index` to the clipboard and returns the copied text.
    pub fn copy_swatch(&self, index: usize, ctx: &AppContext) -> Result<String> {
        let text = self.clipboard_text(index, ctx.settings())?;
        ctx.copy_text(&text)?;
        Ok(text)
    }
}

/// Visual container of history items, newest first.
#[derive(Debug, Default)]
pub struct HistoryPanel {
    items: Vec<PaletteHistoryItem>,
    next_id: u64,
}

impl HistoryPanel {
    pub fn items(&self) -> &[PaletteHistoryItem] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&PaletteHistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn allocate_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Takes the item out of the panel. Detached items are never re-attached.
    pub(crate) fn detach(&mut self, id: ItemId) -> Option<PaletteHistoryItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_context;
    use crate::color::ColorType;

    fn eight() -> [Rgb; PALETTE_SIZE] {
        std::array::from_fn(|i| Rgb::new(i as u8, i as u8 * 2, i as u8 * 3))
    }

    #[test]
    fn not_recorded_without_add_flag() {
        let (_dir, mut ctx, _) = test_context();
        let mut panel = HistoryPanel::default();

        PaletteHistoryItem::attach(eight(), &mut panel, false, None, &mut ctx);
        assert_eq!(ctx.history.palette_count(), 0);

        ctx.settings.settings_mut().restore_palette_color_history = Some(false);
        PaletteHistoryItem::attach(eight(), &mut panel, false, None, &mut ctx);
        assert_eq!(ctx.history.palette_count(), 0);
        assert_eq!(panel.len(), 2);
    }

    #[test]
    fn not_recorded_when_restoration_disabled() {
        let (_dir, mut ctx, _) = test_context();
        ctx.settings.settings_mut().restore_palette_color_history = Some(false);
        let mut panel = HistoryPanel::default();

        let id = PaletteHistoryItem::attach(eight(), &mut panel, true, None, &mut ctx);
        assert_eq!(ctx.history.palette_count(), 0);
        assert_eq!(panel.get(id).unwrap().history_entry(), None);
    }

    #[test]
    fn records_triples_in_swatch_order() {
        let (_dir, mut ctx, _) = test_context();
        let mut panel = HistoryPanel::default();

        PaletteHistoryItem::attach(eight(), &mut panel, true, None, &mut ctx);

        let recorded: Vec<_> = ctx.history.palettes().copied().collect();
        let expected: PaletteRecord = std::array::from_fn(|i| [i as u8, i as u8 * 2, i as u8 * 3]);
        assert_eq!(recorded, vec![expected]);
    }

    #[test]
    fn reuses_precomputed_record() {
        let (_dir, mut ctx, _) = test_context();
        let mut panel = HistoryPanel::default();
        let precomputed = [[9, 9, 9]; PALETTE_SIZE];

        PaletteHistoryItem::attach(eight(), &mut panel, true, Some(precomputed), &mut ctx);
        assert_eq!(ctx.history.palettes().next(), Some(&precomputed));
    }

    #[test]
    fn newest_item_is_on_top() {
        let (_dir, mut ctx, _) = test_context();
        let mut panel = HistoryPanel::default();
        let first = PaletteHistoryItem::attach(eight(), &mut panel, false, None, &mut ctx);
        let second = PaletteHistoryItem::attach(eight(), &mut panel, false, None, &mut ctx);
        let order: Vec<_> = panel.items().iter().map(|item| item.id()).collect();
        assert_eq!(order, vec![second, first]);
    }

    #[test]
    fn tooltips_show_rgb_and_hex() {
        let (_dir, mut ctx, _) = test_context();
        ctx.settings.settings_mut().rgb_separator = Some(", ".to_string());
        ctx.settings.settings_mut().hex_use_upper_case = Some(true);
        let mut panel = HistoryPanel::default();
        let mut colors = eight();
        colors[2] = Rgb::new(255, 0, 128);
        let id = PaletteHistoryItem::attach(colors, &mut panel, false, None, &mut ctx);

        let swatches = panel.get(id).unwrap().swatches(ctx.settings());
        assert_eq!(swatches.len(), PALETTE_SIZE);
        assert_eq!(swatches[2].tooltip, "RGB: 255, 0, 128\nHEX: #FF0080");
        assert_eq!(swatches[2].color, Rgb::new(255, 0, 128));
    }

    #[test]
    fn copy_uses_favorite_type() {
        let (_dir, mut ctx, fakes) = test_context();
        let mut panel = HistoryPanel::default();
        let mut colors = eight();
        colors[0] = Rgb::new(255, 0, 128);
        colors[1] = Rgb::new(10, 20, 30);
        let id = PaletteHistoryItem::attach(colors, &mut panel, false, None, &mut ctx);

        {
            let s = ctx.settings.settings_mut();
            s.favorite_color_type = Some(ColorType::Hex);
            s.hex_use_upper_case = Some(true);
        }
        let item = panel.get(id).unwrap();
        assert_eq!(item.copy_swatch(0, &ctx).unwrap(), "#FF0080");
        assert_eq!(fakes.clipboard.contents.borrow().as_deref(), Some("#FF0080"));

        ctx.settings.settings_mut().favorite_color_type = Some(ColorType::Rgb);
        assert_eq!(item.copy_swatch(1, &ctx).unwrap(), "10;20;30");

        ctx.settings.settings_mut().favorite_color_type = None;
        assert_eq!(item.copy_swatch(1, &ctx).unwrap(), "10;20;30");

        ctx.settings.settings_mut().favorite_color_type = Some(ColorType::Hsl);
        assert_eq!(item.copy_swatch(0, &ctx).unwrap(), "hsl(330, 100%, 50%)");

        assert!(matches!(item.copy_swatch(8, &ctx), Err(Error::SwatchIndex(8))));
    }

    #[test]
    fn dedup_key_ignores_user_separator() {
        let (_dir, mut ctx, _) = test_context();
        ctx.settings.settings_mut().rgb_separator = Some(", ".to_string());
        let mut panel = HistoryPanel::default();
        let id = PaletteHistoryItem::attach(eight(), &mut panel, false, None, &mut ctx);
        assert_eq!(panel.get(id).unwrap().dedup_key(), "7;14;21");
    }

    #[test]
    fn item_ids_convert_to_ui_ints_and_back() {
        let mut panel = HistoryPanel::default();
        let id = panel.allocate_id();
        let raw = i32::try_from(id).unwrap();
        assert_eq!(ItemId::try_from(raw).unwrap(), id);

        assert!(ItemId::try_from(-1).is_err());
        assert!(i32::try_from(ItemId(u64::from(u32::MAX))).is_err());
    }
}
