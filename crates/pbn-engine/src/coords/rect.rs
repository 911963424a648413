use super::Vec2;

/// Axis-aligned rectangle in image pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Tight bounds of a point set. `None` for an empty iterator.
    pub fn bounding<I: IntoIterator<Item = Vec2>>(points: I) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Rect::from_min_max(min, max))
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x * 0.5, self.origin.y + self.size.y * 0.5)
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }

    /// Closed containment: [min, max]. Used for bounding-box rejection where
    /// points on the max edge must still reach the exact test.
    #[inline]
    pub fn contains_inclusive(self, p: Vec2) -> bool {
        let r = self.normalized();
        p.x >= r.origin.x
            && p.y >= r.origin.y
            && p.x <= (r.origin.x + r.size.x)
            && p.y <= (r.origin.y + r.size.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── normalized ────────────────────────────────────────────────────────

    #[test]
    fn normalized_positive_is_identity() {
        let rect = r(1.0, 2.0, 10.0, 20.0);
        assert_eq!(rect.normalized(), rect);
    }

    #[test]
    fn normalized_negative_width() {
        let n = r(10.0, 0.0, -4.0, 5.0).normalized();
        assert_eq!(n.origin.x, 6.0);
        assert_eq!(n.size.x, 4.0);
    }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_both_edges() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains_inclusive(Vec2::new(0.0, 0.0)));
        assert!(r(0.0, 0.0, 10.0, 10.0).contains_inclusive(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn contains_negative_size() {
        assert!(r(10.0, 10.0, -10.0, -10.0).contains_inclusive(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn contains_outside() {
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains_inclusive(Vec2::new(-1.0, 5.0)));
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains_inclusive(Vec2::new(5.0, 10.5)));
    }

    // ── bounding / center ─────────────────────────────────────────────────

    #[test]
    fn bounding_of_points() {
        let b = Rect::bounding([
            Vec2::new(80.0, 80.0),
            Vec2::new(180.0, 60.0),
            Vec2::new(130.0, 200.0),
        ])
        .unwrap();
        assert_eq!(b, r(80.0, 60.0, 100.0, 140.0));
        assert_eq!(b.center(), Vec2::new(130.0, 130.0));
    }

    #[test]
    fn bounding_of_nothing() {
        assert!(Rect::bounding(std::iter::empty()).is_none());
    }
}
