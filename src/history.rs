use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::color::{Rgb, PALETTE_SIZE};
use crate::document;
use crate::error::{Error, Result};
use crate::paths;

/// Persisted form of a palette: eight integer RGB triples in swatch order.
pub type PaletteRecord = [[u8; 3]; PALETTE_SIZE];

pub fn record_of(colors: &[Rgb; PALETTE_SIZE]) -> PaletteRecord {
    colors.map(Rgb::triple)
}

pub fn colors_of(record: &PaletteRecord) -> [Rgb; PALETTE_SIZE] {
    record.map(Rgb::from)
}

/// Identifies one palette entry in memory; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

/// On-disk shape of the history document.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct HistoryDocument {
    #[serde(default)]
    pub colors: Vec<[u8; 3]>,
    #[serde(default)]
    pub palettes: Vec<PaletteRecord>,
}

/// Picked colors and generated palettes, written wholesale on every change.
///
/// Saved records the user chose not to restore are held aside and written
/// back untouched, so turning restoration off never discards them.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    colors: Vec<Rgb>,
    palettes: Vec<(EntryId, PaletteRecord)>,
    held: HistoryDocument,
    next_id: u64,
}

impl HistoryStore {
    /// An empty store persisting to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            colors: Vec::new(),
            palettes: Vec::new(),
            held: HistoryDocument::default(),
            next_id: 0,
        }
    }

    pub fn default_location() -> Self {
        Self::new(paths::history_path())
    }

    /// Reads the saved document without touching the in-memory history.
    /// Restoring re-adds the entries through the pages that own them.
    ///
    /// A malformed document is moved aside to `<path>.bak` and reads as empty.
    pub fn read_saved(&self) -> Result<HistoryDocument> {
        let saved = match document::read::<HistoryDocument>(&self.path) {
            Ok(saved) => saved.unwrap_or_default(),
            Err(err @ Error::Malformed { .. }) => {
                warn!("{}; starting with an empty history", err);
                document::move_aside(&self.path);
                HistoryDocument::default()
            }
            Err(err) => return Err(err),
        };
        info!(
            colors = saved.colors.len(),
            palettes = saved.palettes.len(),
            "history loaded"
        );
        Ok(saved)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        document::write(&self.path, &self.to_document())?;
        debug!(palettes = self.palettes.len(), "history saved");
        Ok(())
    }

    /// The document as it will be saved: live colors before held ones, held
    /// palettes before live ones, matching the order they were recorded in.
    pub fn to_document(&self) -> HistoryDocument {
        let colors = self.colors.iter().map(|c| c.triple());
        let palettes = self.palettes.iter().map(|(_, record)| *record);
        HistoryDocument {
            colors: colors.chain(self.held.colors.iter().copied()).collect(),
            palettes: self.held.palettes.iter().copied().chain(palettes).collect(),
        }
    }

    /// Keeps saved colors that are not shown on the picker.
    pub fn hold_colors(&mut self, colors: &[[u8; 3]]) {
        self.held.colors.extend_from_slice(colors);
    }

    /// Keeps saved palettes that are not shown in the history view.
    pub fn hold_palettes(&mut self, palettes: &[PaletteRecord]) {
        self.held.palettes.extend_from_slice(palettes);
    }

    pub fn palettes(&self) -> impl Iterator<Item = &PaletteRecord> {
        self.palettes.iter().map(|(_, record)| record)
    }

    pub fn palette_count(&self) -> usize {
        self.palettes.len()
    }

    pub fn push_palette(&mut self, record: PaletteRecord) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.palettes.push((id, record));
        debug!(?id, "palette recorded");
        id
    }

    /// Removes the entry and returns its former position and value.
    pub fn remove_palette(&mut self, id: EntryId) -> Option<(usize, PaletteRecord)> {
        let index = self.palettes.iter().position(|(entry, _)| *entry == id)?;
        let (_, record) = self.palettes.remove(index);
        debug!(?id, index, "palette removed");
        Some((index, record))
    }

    /// Puts back an entry taken out by [`HistoryStore::remove_palette`].
    pub fn reinsert_palette(&mut self, index: usize, id: EntryId, record: PaletteRecord) {
        let index = index.min(self.palettes.len());
        self.palettes.insert(index, (id, record));
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Adds a picked color at the front.
    pub fn push_color(&mut self, color: Rgb) {
        self.colors.insert(0, color);
    }

    pub fn set_colors(&mut self, colors: Vec<Rgb>) {
        self.colors = colors;
    }

    pub fn clear_colors(&mut self) {
        self.colors.clear();
        self.held.colors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(seed: u8) -> PaletteRecord {
        [[seed, seed, seed]; PALETTE_SIZE]
    }

    #[test]
    fn removes_only_the_targeted_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::new(dir.path().join("History.json"));
        let first = store.push_palette(record(1));
        store.push_palette(record(2));
        let third = store.push_palette(record(1));

        assert_eq!(store.remove_palette(third), Some((2, record(1))));
        let left: Vec<_> = store.palettes().copied().collect();
        assert_eq!(left, vec![record(1), record(2)]);

        assert_eq!(store.remove_palette(first), Some((0, record(1))));
        assert_eq!(store.remove_palette(first), None);
    }

    #[test]
    fn save_writes_the_whole_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("History.json");
        let mut store = HistoryStore::new(&path);
        store.push_palette(record(7));
        store.push_color(Rgb::new(1, 2, 3));
        store.push_color(Rgb::new(4, 5, 6));
        store.save().unwrap();

        let saved = HistoryStore::new(&path).read_saved().unwrap();
        assert_eq!(saved.palettes, vec![record(7)]);
        assert_eq!(saved.colors, vec![[4, 5, 6], [1, 2, 3]]);
    }

    #[test]
    fn reinsert_restores_position() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::new(dir.path().join("History.json"));
        store.push_palette(record(1));
        let middle = store.push_palette(record(2));
        store.push_palette(record(3));

        let (index, value) = store.remove_palette(middle).unwrap();
        store.reinsert_palette(index, middle, value);
        let all: Vec<_> = store.palettes().copied().collect();
        assert_eq!(all, vec![record(1), record(2), record(3)]);
    }

    #[test]
    fn missing_document_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("History.json"));
        assert_eq!(store.read_saved().unwrap(), HistoryDocument::default());
    }

    #[test]
    fn malformed_document_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("History.json");
        std::fs::write(&path, "{ not json").unwrap();

        let saved = HistoryStore::new(&path).read_saved().unwrap();

        assert_eq!(saved, HistoryDocument::default());
        assert!(!path.exists());
        assert!(dir.path().join("History.json.bak").exists());
    }

    #[test]
    fn held_records_survive_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("History.json");
        let mut store = HistoryStore::new(&path);
        store.hold_palettes(&[record(1)]);
        store.hold_colors(&[[9, 9, 9]]);
        store.push_palette(record(2));
        store.push_color(Rgb::new(3, 3, 3));
        store.save().unwrap();

        let saved = HistoryStore::new(&path).read_saved().unwrap();
        assert_eq!(saved.palettes, vec![record(1), record(2)]);
        assert_eq!(saved.colors, vec![[3, 3, 3], [9, 9, 9]]);
        assert_eq!(store.palette_count(), 1);

        store.clear_colors();
        assert!(store.to_document().colors.is_empty());
        assert_eq!(store.to_document().palettes.len(), 2);
    }
}
