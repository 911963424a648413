/// Z-ordering key for draw items.
///
/// Higher values appear on top of lower values. The canvas uses the named
/// layers below; anything within one layer keeps insertion order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct ZIndex(pub i32);

impl ZIndex {
    /// Processed background image.
    pub const BACKGROUND: ZIndex = ZIndex(0);
    /// Region fills and outline strokes.
    pub const REGIONS: ZIndex = ZIndex(10);
    /// Number plates and their text.
    pub const LABELS: ZIndex = ZIndex(20);
    /// Free-hand brush dabs, drawn over everything else.
    pub const STROKES: ZIndex = ZIndex(30);

    #[inline]
    pub const fn new(v: i32) -> Self {
        Self(v)
    }
}
