//! Free-hand brush painting.

use pbn_engine::coords::Vec2;
use pbn_engine::paint::Color;
use pbn_engine::scene::{DrawList, ZIndex};

/// Something a free-hand brush can paint onto.
pub trait BrushSurface {
    /// Paints a filled circle.
    fn dab(&mut self, center: Vec2, radius: f32, color: Color);
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Dab {
    pub center: Vec2,
    pub radius: f32,
    pub color: Color,
}

/// Transient brush dabs drawn over the rendered painting.
///
/// Not part of the region model: dabs never count toward completion and are
/// dropped whenever the canvas redraws or loads another image.
#[derive(Debug, Clone, Default)]
pub struct StrokeLayer {
    dabs: Vec<Dab>,
}

impl StrokeLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dabs(&self) -> &[Dab] {
        &self.dabs
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dabs.is_empty()
    }

    pub fn clear(&mut self) {
        self.dabs.clear();
    }

    /// Records every dab as a circle on the stroke layer of `list`.
    pub fn draw_into(&self, list: &mut DrawList) {
        for d in &self.dabs {
            list.push_solid_circle(ZIndex::STROKES, d.center, d.radius, d.color);
        }
    }
}

impl BrushSurface for StrokeLayer {
    fn dab(&mut self, center: Vec2, radius: f32, color: Color) {
        self.dabs.push(Dab { center, radius, color });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dabs_draw_on_stroke_layer() {
        let mut layer = StrokeLayer::new();
        layer.dab(Vec2::new(1.0, 2.0), 5.0, Color::BLACK);
        layer.dab(Vec2::new(3.0, 4.0), 5.0, Color::WHITE);

        let mut list = DrawList::new();
        layer.draw_into(&mut list);
        assert_eq!(list.len(), 2);
        assert!(list.items().iter().all(|i| i.key.z == ZIndex::STROKES));
    }

    #[test]
    fn clear_drops_dabs() {
        let mut layer = StrokeLayer::new();
        layer.dab(Vec2::zero(), 1.0, Color::BLACK);
        layer.clear();
        assert!(layer.is_empty());
    }
}
