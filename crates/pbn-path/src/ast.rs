use std::fmt;

// ── PathCmd ───────────────────────────────────────────────────────────────

/// A single absolute drawing command.
///
/// The parser resolves relative forms (`m`, `l`, `q`, ...) and shorthands
/// (`H`, `V`, `T`) into these four variants, so consumers never track a
/// current point themselves.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathCmd {
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    /// Quadratic Bézier from the current point through control `(cx, cy)` to `(x, y)`.
    QuadTo { cx: f32, cy: f32, x: f32, y: f32 },
    /// Closes the current subpath back to its starting point.
    Close,
}

// ── PathData ──────────────────────────────────────────────────────────────

/// Parsed path data: an ordered command list in image-pixel coordinates.
///
/// ```
/// use pbn_path::parse_str;
///
/// let path = parse_str("M0,0 L100,0 L100,100 L0,100 Z").unwrap();
/// assert_eq!(path.commands.len(), 5);
/// assert!(path.is_closed());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathData {
    pub commands: Vec<PathCmd>,
}

impl PathData {
    pub fn new(commands: Vec<PathCmd>) -> Self {
        Self { commands }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns `true` when the path has at least one subpath and every
    /// subpath ends with [`PathCmd::Close`].
    pub fn is_closed(&self) -> bool {
        if self.commands.is_empty() {
            return false;
        }
        let mut open = false;
        for cmd in &self.commands {
            match cmd {
                PathCmd::MoveTo { .. } => {
                    if open {
                        return false;
                    }
                    open = true;
                }
                PathCmd::Close => open = false,
                // Drawing after a close reopens a subpath at the old start.
                _ => open = true,
            }
        }
        !open
    }

    /// Number of subpaths (one per `MoveTo`).
    pub fn subpath_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PathCmd::MoveTo { .. }))
            .count()
    }
}

/// Writes absolute SVG path data, e.g. `M0,0 L10,0 Q15,5 10,10 Z`.
impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match *cmd {
                PathCmd::MoveTo { x, y } => write!(f, "M{},{}", x, y)?,
                PathCmd::LineTo { x, y } => write!(f, "L{},{}", x, y)?,
                PathCmd::QuadTo { cx, cy, x, y } => write!(f, "Q{},{} {},{}", cx, cy, x, y)?,
                PathCmd::Close => f.write_str("Z")?,
            }
        }
        Ok(())
    }
}
