use pbn_engine::paint::Color;

use crate::error::{CanvasError, Result};

/// One selectable color. `index` is the number painted into regions.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    pub index: u32,
    pub color: Color,
    pub label: String,
}

impl PaletteEntry {
    pub fn new(index: u32, color: Color, label: impl Into<String>) -> Self {
        Self { index, color, label: label.into() }
    }
}

/// Ordered palette plus the active selection.
///
/// The selection always names an existing entry. A fresh palette selects
/// its first entry; an empty palette has no selection.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    selected: Option<usize>,
}

impl Palette {
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        let selected = if entries.is_empty() { None } else { Some(0) };
        Self { entries, selected }
    }

    /// Makes `index` the active color.
    pub fn select(&mut self, index: u32) -> Result<()> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.index == index)
            .ok_or(CanvasError::UnknownColorIndex(index))?;
        self.selected = Some(pos);
        Ok(())
    }

    /// The active entry; `None` only for an empty palette.
    #[inline]
    pub fn current(&self) -> Option<&PaletteEntry> {
        self.selected.and_then(|i| self.entries.get(i))
    }

    #[inline]
    pub fn selected_index(&self) -> Option<u32> {
        self.current().map(|e| e.index)
    }

    pub fn get(&self, index: u32) -> Option<&PaletteEntry> {
        self.entries.iter().find(|e| e.index == index)
    }

    pub fn color_of(&self, index: u32) -> Option<Color> {
        self.get(index).map(|e| e.color)
    }

    #[inline]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Palette {
        Palette::new(vec![
            PaletteEntry::new(1, Color::from_hex("#FF0000").unwrap(), "Red"),
            PaletteEntry::new(2, Color::from_hex("#00FF00").unwrap(), "Green"),
        ])
    }

    #[test]
    fn defaults_to_first_entry() {
        let p = palette();
        assert_eq!(p.selected_index(), Some(1));
        assert_eq!(p.current().map(|e| e.label.as_str()), Some("Red"));
    }

    #[test]
    fn empty_palette_has_no_selection() {
        let p = Palette::new(Vec::new());
        assert!(p.current().is_none());
        assert!(p.is_empty());
    }

    #[test]
    fn select_switches_entry() {
        let mut p = palette();
        p.select(2).unwrap();
        assert_eq!(p.selected_index(), Some(2));
        assert_eq!(p.color_of(2), Some(Color::from_srgb_u8(0, 255, 0, 255)));
    }

    #[test]
    fn unknown_index_keeps_selection() {
        let mut p = palette();
        p.select(2).unwrap();
        let err = p.select(9).unwrap_err();
        assert!(matches!(err, CanvasError::UnknownColorIndex(9)));
        assert_eq!(p.selected_index(), Some(2));
    }
}
