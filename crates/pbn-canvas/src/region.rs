use std::collections::HashMap;

use crate::image::{Region, RegionId};

/// Authoritative region list for one painting.
///
/// Declaration order is preserved; it decides hit-test precedence and draw
/// order. Holds no drawing or I/O logic.
#[derive(Debug, Clone, Default)]
pub struct RegionModel {
    regions: Vec<Region>,
    by_id: HashMap<RegionId, usize>,
}

impl RegionModel {
    /// Ids are assumed unique; `PaintableImage::new` checks that.
    pub(crate) fn new(regions: Vec<Region>) -> Self {
        let by_id = regions.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        Self { regions, by_id }
    }

    pub fn get_region(&self, id: RegionId) -> Option<&Region> {
        self.by_id.get(&id).map(|&i| &self.regions[i])
    }

    /// Marks region `id` painted.
    ///
    /// Returns `true` when this call changed its state. Repeating the call, or
    /// naming an unknown id, is a no-op that returns `false`.
    pub fn mark_painted(&mut self, id: RegionId) -> bool {
        let Some(&i) = self.by_id.get(&id) else {
            return false;
        };
        let region = &mut self.regions[i];
        let newly = !region.painted;
        region.painted = true;
        newly
    }

    /// Puts every region back to unpainted.
    pub fn reset_progress(&mut self) {
        for r in &mut self.regions {
            r.painted = false;
        }
    }

    /// Painted regions over all regions, `0.0` when there are none.
    pub fn completion_ratio(&self) -> f32 {
        if self.regions.is_empty() {
            return 0.0;
        }
        self.painted_count() as f32 / self.regions.len() as f32
    }

    /// Completion ratio restricted to regions targeting `color_index`.
    pub fn coverage(&self, color_index: u32) -> f32 {
        let (total, painted) = self
            .regions
            .iter()
            .filter(|r| r.target_color_index == color_index)
            .fold((0usize, 0usize), |(t, p), r| (t + 1, p + r.painted as usize));
        if total == 0 { 0.0 } else { painted as f32 / total as f32 }
    }

    pub fn painted_count(&self) -> usize {
        self.regions.iter().filter(|r| r.painted).count()
    }

    /// Regions in declaration order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Region> + ExactSizeIterator {
        self.regions.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
