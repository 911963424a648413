use pbn_path::{ParseError, PathCmd, PathData};

use crate::coords::{Rect, Vec2};

/// Maximum distance, in image pixels, between a flattened curve and the
/// true curve.
pub const DEFAULT_FLATTEN_TOLERANCE: f32 = 0.25;

/// Upper bound on segments per quadratic, regardless of tolerance.
const MAX_QUAD_SEGMENTS: u32 = 64;

/// A closed vector shape in image pixels.
///
/// Holds the source path commands plus a flattened polygon per subpath.
/// Containment uses the **even-odd** fill rule over all contours, so a
/// subpath nested inside another cuts a hole.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    path: PathData,
    contours: Vec<Vec<Vec2>>,
    bounds: Rect,
}

impl Outline {
    /// Flattens `path` with the given curve tolerance.
    pub fn new(path: PathData, tolerance: f32) -> Self {
        let contours = flatten(&path, tolerance);
        let bounds = Rect::bounding(contours.iter().flatten().copied()).unwrap_or_default();
        Self { path, contours, bounds }
    }

    /// Parses SVG path data and flattens it.
    pub fn parse(src: &str, tolerance: f32) -> Result<Self, ParseError> {
        Ok(Self::new(pbn_path::parse_str(src)?, tolerance))
    }

    #[inline]
    pub fn path(&self) -> &PathData {
        &self.path
    }

    /// Flattened polygons, one per subpath. Each is implicitly closed.
    #[inline]
    pub fn contours(&self) -> &[Vec<Vec2>] {
        &self.contours
    }

    /// Tight bounds of the flattened outline.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// True when every subpath in the source ends with a close command.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.path.is_closed()
    }

    /// Whether the contours hold at least `n` distinct vertices. Stops
    /// scanning as soon as `n` are found.
    pub fn has_distinct_vertices(&self, n: usize) -> bool {
        let mut seen: Vec<Vec2> = Vec::with_capacity(n);
        for p in self.contours.iter().flatten() {
            if seen.len() >= n {
                break;
            }
            if !seen.iter().any(|q| (q.x - p.x).abs() < 1e-4 && (q.y - p.y).abs() < 1e-4) {
                seen.push(*p);
            }
        }
        seen.len() >= n
    }

    /// Even-odd containment test.
    ///
    /// Edges use a half-open convention: an edge is crossed when exactly one
    /// endpoint lies strictly below the scanline (`y_i > y`), and only
    /// crossings strictly to the right of the point count. Points on a
    /// boundary therefore always classify the same way.
    pub fn contains(&self, p: Vec2) -> bool {
        if !p.is_finite() || !self.bounds.contains_inclusive(p) {
            return false;
        }
        let mut inside = false;
        for contour in &self.contours {
            let n = contour.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let (a, b) = (contour[i], contour[j]);
                if (a.y > p.y) != (b.y > p.y) {
                    let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                    if p.x < x_cross {
                        inside = !inside;
                    }
                }
                j = i;
            }
        }
        inside
    }
}

// ── flattening ────────────────────────────────────────────────────────────

fn flatten(path: &PathData, tolerance: f32) -> Vec<Vec<Vec2>> {
    let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
        tolerance
    } else {
        DEFAULT_FLATTEN_TOLERANCE
    };

    let mut contours = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    let mut cur = Vec2::zero();
    let mut start = Vec2::zero();

    for cmd in &path.commands {
        match *cmd {
            PathCmd::MoveTo { x, y } => {
                push_contour(&mut contours, &mut current);
                cur = Vec2::new(x, y);
                start = cur;
                current.push(cur);
            }
            PathCmd::LineTo { x, y } => {
                if current.is_empty() {
                    current.push(cur);
                }
                cur = Vec2::new(x, y);
                current.push(cur);
            }
            PathCmd::QuadTo { cx, cy, x, y } => {
                if current.is_empty() {
                    current.push(cur);
                }
                let ctrl = Vec2::new(cx, cy);
                let end = Vec2::new(x, y);
                // Uniform steps deviate at most |p0 - 2c + p1| / (4 n²).
                let dd = (cur - ctrl * 2.0 + end).length_sq().sqrt();
                let n = ((dd / (4.0 * tolerance)).sqrt().ceil() as u32).clamp(1, MAX_QUAD_SEGMENTS);
                for i in 1..=n {
                    let t = i as f32 / n as f32;
                    let inv = 1.0 - t;
                    current.push(cur * (inv * inv) + ctrl * (2.0 * inv * t) + end * (t * t));
                }
                cur = end;
            }
            PathCmd::Close => {
                push_contour(&mut contours, &mut current);
                cur = start;
            }
        }
    }
    push_contour(&mut contours, &mut current);
    contours
}

fn push_contour(contours: &mut Vec<Vec<Vec2>>, current: &mut Vec<Vec2>) {
    // Drop a closing vertex that repeats the first one; the polygon is
    // implicitly closed.
    if current.len() > 1 && current.first() == current.last() {
        current.pop();
    }
    if !current.is_empty() {
        contours.push(std::mem::take(current));
    }
}
