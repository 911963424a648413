use pbn_engine::coords::Vec2;

use crate::image::Region;
use crate::region::RegionModel;

/// Maps image-pixel points to regions.
///
/// Regions are tested in reverse declaration order, so where outlines
/// overlap the region declared last (drawn on top) wins. Containment is
/// even-odd over the outline's flattened contours; see
/// [`Outline::contains`](pbn_engine::geom::Outline::contains) for the
/// boundary rule.
#[derive(Debug, Copy, Clone)]
pub struct HitTester<'a> {
    regions: &'a RegionModel,
}

impl<'a> HitTester<'a> {
    pub fn new(regions: &'a RegionModel) -> Self {
        Self { regions }
    }

    /// Topmost region containing `p`, if any.
    pub fn region_at(&self, p: Vec2) -> Option<&'a Region> {
        self.regions.iter().rev().find(|r| r.outline.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use pbn_engine::geom::{Outline, DEFAULT_FLATTEN_TOLERANCE};
    use pbn_engine::paint::Color;

    use super::*;
    use crate::image::{Dimensions, PaintableImage};
    use crate::palette::PaletteEntry;

    fn image(paths: &[&str]) -> PaintableImage {
        let regions = paths
            .iter()
            .enumerate()
            .map(|(i, p)| Region::new(i as u32 + 1, 1, Outline::parse(p, DEFAULT_FLATTEN_TOLERANCE).unwrap()))
            .collect();
        PaintableImage::new(
            "",
            regions,
            vec![PaletteEntry::new(1, Color::BLACK, "Black")],
            Dimensions::new(200.0, 200.0),
        )
        .unwrap()
    }

    fn hit(img: &PaintableImage, x: f32, y: f32) -> Option<u32> {
        HitTester::new(img.regions()).region_at(Vec2::new(x, y)).map(|r| r.id)
    }

    #[test]
    fn finds_containing_region() {
        let img = image(&["M0,0 H50 V50 H0 Z", "M100,100 H150 V150 H100 Z"]);
        assert_eq!(hit(&img, 25.0, 25.0), Some(1));
        assert_eq!(hit(&img, 125.0, 125.0), Some(2));
        assert_eq!(hit(&img, 75.0, 75.0), None);
    }

    #[test]
    fn later_region_wins_overlap() {
        let img = image(&["M0,0 H100 V100 H0 Z", "M50,50 H150 V150 H50 Z"]);
        assert_eq!(hit(&img, 75.0, 75.0), Some(2));
        assert_eq!(hit(&img, 25.0, 25.0), Some(1));
    }

    #[test]
    fn hole_falls_through_to_region_below() {
        let img = image(&["M40,40 H60 V60 H40 Z", "M0,0 H100 V100 H0 Z M25,25 H75 V75 H25 Z"]);
        assert_eq!(hit(&img, 50.0, 50.0), Some(1));
        assert_eq!(hit(&img, 10.0, 10.0), Some(2));
    }

    #[test]
    fn curved_region() {
        let img = image(&["M80,80 Q130,60 180,80 Q200,130 180,180 Q130,200 80,180 Q60,130 80,80 Z"]);
        assert_eq!(hit(&img, 130.0, 130.0), Some(1));
        // Inside the bounding box but outside the bulge.
        assert_eq!(hit(&img, 71.0, 71.0), None);
    }

    #[test]
    fn repeated_queries_agree() {
        let img = image(&["M0,0 H100 V100 H0 Z", "M100,0 H200 V100 H100 Z"]);
        let first = hit(&img, 100.0, 50.0);
        for _ in 0..20 {
            assert_eq!(hit(&img, 100.0, 50.0), first);
        }
    }

    #[test]
    fn empty_model_hits_nothing() {
        let img = image(&[]);
        assert_eq!(hit(&img, 10.0, 10.0), None);
    }
}
