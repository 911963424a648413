use std::collections::HashMap;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use pbn_path::PathCmd;
use tiny_skia::{
    ColorU8, FillRule, Paint, Path, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8, Stroke, Transform,
};

use crate::geom::Outline;
use crate::paint::Color;
use crate::scene::shapes::{CircleCmd, ImageCmd, OutlineCmd, RectCmd, TextAlign, TextCmd};
use crate::scene::{DrawCmd, DrawList};
use crate::text::FontSystem;

/// Rasterizer configuration.
#[derive(Debug, Clone)]
pub struct RasterConfig {
    /// Color the target is cleared to before drawing.
    pub clear: Color,
    /// Filter used when scaling background images.
    pub image_filter: FilterType,
    /// Anti-alias shape edges.
    pub anti_alias: bool,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            clear: Color::WHITE,
            image_filter: FilterType::Triangle,
            anti_alias: true,
        }
    }
}

/// Draws draw lists onto RGBA pixel buffers.
///
/// Images referenced by `ImageCmd::source` must be registered up front with
/// [`register_image`](Self::register_image); unknown sources are skipped.
pub struct Rasterizer {
    config: RasterConfig,
    fonts: FontSystem,
    images: HashMap<String, RgbaImage>,
}

impl Rasterizer {
    pub fn new(config: RasterConfig, fonts: FontSystem) -> Self {
        Self { config, fonts, images: HashMap::new() }
    }

    /// Makes `image` available to image commands naming `source`.
    pub fn register_image(&mut self, source: impl Into<String>, image: RgbaImage) {
        self.images.insert(source.into(), image);
    }

    /// Renders `list` in paint order into a fresh `width × height` buffer.
    pub fn render(&self, list: &mut DrawList, width: u32, height: u32) -> RgbaImage {
        let Some(mut pixmap) = Pixmap::new(width, height) else {
            return RgbaImage::new(width, height);
        };
        pixmap.fill(skia_color(self.config.clear));

        for item in list.iter_in_paint_order() {
            match &item.cmd {
                DrawCmd::Image(cmd) => self.draw_image(&mut pixmap, cmd),
                DrawCmd::Outline(cmd) => self.draw_outline(&mut pixmap, cmd),
                DrawCmd::Rect(cmd) => self.draw_rect(&mut pixmap, cmd),
                DrawCmd::Circle(cmd) => self.draw_circle(&mut pixmap, cmd),
                DrawCmd::Text(cmd) => self.draw_text(&mut pixmap, cmd),
            }
        }
        to_rgba_image(&pixmap)
    }

    fn paint(&self, color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(skia_color(color));
        paint.anti_alias = self.config.anti_alias;
        paint
    }

    // ── images ────────────────────────────────────────────────────────────

    fn draw_image(&self, pixmap: &mut Pixmap, cmd: &ImageCmd) {
        let Some(src) = self.images.get(&cmd.source) else {
            log::debug!("image source not registered ({} bytes), skipping", cmd.source.len());
            return;
        };
        let dest = cmd.dest.normalized();
        let (w, h) = (dest.size.x.round() as u32, dest.size.y.round() as u32);
        if w == 0 || h == 0 {
            return;
        }
        let scaled;
        let src = if src.dimensions() == (w, h) {
            src
        } else {
            scaled = imageops::resize(src, w, h, self.config.image_filter);
            &scaled
        };
        let Some(layer) = to_pixmap(src) else { return };
        pixmap.draw_pixmap(
            dest.origin.x.round() as i32,
            dest.origin.y.round() as i32,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    // ── text ──────────────────────────────────────────────────────────────

    fn draw_text(&self, pixmap: &mut Pixmap, cmd: &TextCmd) {
        if !self.fonts.has_font(cmd.font) {
            log::debug!("font {:?} not loaded, skipping text {:?}", cmd.font, cmd.text);
            return;
        }
        let origin = match cmd.align {
            TextAlign::TopLeft => cmd.position,
            TextAlign::Center => {
                let size = self.fonts.measure_text(&cmd.text, cmd.font, cmd.size);
                cmd.position - size * 0.5
            }
        };
        let [r, g, b, a] = cmd.color.to_srgba_u8();
        for glyph in self.fonts.rasterize(&cmd.text, cmd.font, cmd.size) {
            let Some(mut layer) = Pixmap::new(glyph.width as u32, glyph.height as u32) else { continue };
            for (px, &c) in layer.pixels_mut().iter_mut().zip(&glyph.coverage) {
                let alpha = (a as u16 * c as u16 / 255) as u8;
                *px = ColorU8::from_rgba(r, g, b, alpha).premultiply();
            }
            pixmap.draw_pixmap(
                (origin.x + glyph.x).round() as i32,
                (origin.y + glyph.y).round() as i32,
                layer.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }

    // ── shapes ────────────────────────────────────────────────────────────

    fn draw_rect(&self, pixmap: &mut Pixmap, cmd: &RectCmd) {
        let r = cmd.rect.normalized();
        let Some(rect) = tiny_skia::Rect::from_xywh(r.origin.x, r.origin.y, r.size.x, r.size.y) else { return };
        pixmap.fill_rect(rect, &self.paint(cmd.color), Transform::identity(), None);
    }

    fn draw_circle(&self, pixmap: &mut Pixmap, cmd: &CircleCmd) {
        let Some(path) = PathBuilder::from_circle(cmd.center.x, cmd.center.y, cmd.radius) else { return };
        pixmap.fill_path(&path, &self.paint(cmd.color), FillRule::Winding, Transform::identity(), None);
    }

    fn draw_outline(&self, pixmap: &mut Pixmap, cmd: &OutlineCmd) {
        let Some(path) = outline_path(&cmd.outline) else { return };
        if let Some(fill) = cmd.fill {
            pixmap.fill_path(&path, &self.paint(fill), FillRule::EvenOdd, Transform::identity(), None);
        }
        if let Some(border) = &cmd.stroke {
            let stroke = Stroke { width: border.width.max(0.0), ..Stroke::default() };
            pixmap.stroke_path(&path, &self.paint(border.color), &stroke, Transform::identity(), None);
        }
    }
}

/// Builds a skia path from the outline's absolute path data. Curves are kept
/// as quadratics; the flattened contours are only used for hit testing.
fn outline_path(outline: &Outline) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for cmd in &outline.path().commands {
        match *cmd {
            PathCmd::MoveTo { x, y } => pb.move_to(x, y),
            PathCmd::LineTo { x, y } => pb.line_to(x, y),
            PathCmd::QuadTo { cx, cy, x, y } => pb.quad_to(cx, cy, x, y),
            PathCmd::Close => pb.close(),
        }
    }
    pb.finish()
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_srgba_u8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn to_pixmap(src: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(src.width(), src.height())?;
    for (dst, px) in pixmap.pixels_mut().iter_mut().zip(src.pixels()) {
        let [r, g, b, a] = px.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let pixels: &[PremultipliedColorU8] = pixmap.pixels();
    RgbaImage::from_fn(width, pixmap.height(), |x, y| {
        let c = pixels[(y * width + x) as usize].demultiply();
        Rgba([c.red(), c.green(), c.blue(), c.alpha()])
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::coords::{Rect, Vec2};
    use crate::geom::DEFAULT_FLATTEN_TOLERANCE;
    use crate::scene::{Border, ZIndex};

    fn rasterizer() -> Rasterizer {
        Rasterizer::new(RasterConfig::default(), FontSystem::new())
    }

    fn outline(src: &str) -> Arc<Outline> {
        Arc::new(Outline::parse(src, DEFAULT_FLATTEN_TOLERANCE).unwrap())
    }

    fn red() -> Color {
        Color::from_srgb_u8(255, 0, 0, 255)
    }

    const RED: [u8; 4] = [255, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    #[test]
    fn clears_to_config_color() {
        let img = rasterizer().render(&mut DrawList::new(), 4, 4);
        assert_eq!(img.get_pixel(2, 2).0, WHITE);
    }

    #[test]
    fn zero_sized_target_is_empty() {
        let img = rasterizer().render(&mut DrawList::new(), 0, 4);
        assert_eq!(img.dimensions(), (0, 4));
    }

    #[test]
    fn fills_square_interior_only() {
        let mut list = DrawList::new();
        list.push_outline(ZIndex::REGIONS, outline("M2,2 H8 V8 H2 Z"), Some(red()), None);
        let img = rasterizer().render(&mut list, 10, 10);
        assert_eq!(img.get_pixel(5, 5).0, RED);
        assert_eq!(img.get_pixel(3, 3).0, RED);
        assert_eq!(img.get_pixel(9, 9).0, WHITE);
        assert_eq!(img.get_pixel(0, 5).0, WHITE);
    }

    #[test]
    fn fill_leaves_even_odd_hole() {
        let mut list = DrawList::new();
        let ring = outline("M0,0 H20 V20 H0 Z M5,5 H15 V15 H5 Z");
        list.push_outline(ZIndex::REGIONS, ring, Some(red()), None);
        let img = rasterizer().render(&mut list, 20, 20);
        assert_eq!(img.get_pixel(2, 2).0, RED);
        assert_eq!(img.get_pixel(10, 10).0, WHITE);
    }

    #[test]
    fn quadratic_edges_are_filled() {
        let mut list = DrawList::new();
        list.push_outline(ZIndex::REGIONS, outline("M0,10 Q10,-10 20,10 Z"), Some(red()), None);
        let img = rasterizer().render(&mut list, 20, 20);
        assert_eq!(img.get_pixel(10, 6).0, RED);
        assert_eq!(img.get_pixel(10, 15).0, WHITE);
    }

    #[test]
    fn stroke_hugs_edges() {
        let mut list = DrawList::new();
        let border = Border::new(4.0, Color::BLACK);
        list.push_outline(ZIndex::REGIONS, outline("M4,4 H16 V16 H4 Z"), None, Some(border));
        let img = rasterizer().render(&mut list, 20, 20);
        assert_eq!(img.get_pixel(4, 10).0, BLACK);
        assert_eq!(img.get_pixel(10, 10).0, WHITE);
        assert_eq!(img.get_pixel(0, 10).0, WHITE);
    }

    #[test]
    fn circle_is_round() {
        let mut list = DrawList::new();
        list.push_solid_circle(ZIndex::STROKES, Vec2::new(10.0, 10.0), 5.0, red());
        let img = rasterizer().render(&mut list, 20, 20);
        assert_eq!(img.get_pixel(10, 10).0, RED);
        assert_eq!(img.get_pixel(13, 10).0, RED);
        assert_eq!(img.get_pixel(14, 14).0, WHITE);
    }

    #[test]
    fn later_layers_paint_over_earlier() {
        let mut list = DrawList::new();
        list.push_solid_circle(ZIndex::STROKES, Vec2::new(5.0, 5.0), 3.0, Color::BLACK);
        list.push_solid_rect(ZIndex::BACKGROUND, Rect::new(0.0, 0.0, 10.0, 10.0), red());
        let img = rasterizer().render(&mut list, 10, 10);
        assert_eq!(img.get_pixel(5, 5).0, BLACK);
        assert_eq!(img.get_pixel(0, 0).0, RED);
    }

    #[test]
    fn registered_image_is_scaled_into_dest() {
        let mut r = rasterizer();
        r.register_image("bg", RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255])));
        let mut list = DrawList::new();
        list.push_image(ZIndex::BACKGROUND, "bg", Rect::new(0.0, 0.0, 8.0, 8.0));
        let img = r.render(&mut list, 10, 10);
        assert_eq!(img.get_pixel(7, 7).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(9, 9).0, WHITE);
    }

    #[test]
    fn unknown_image_and_missing_font_are_skipped() {
        let mut list = DrawList::new();
        list.push_image(ZIndex::BACKGROUND, "nope", Rect::new(0.0, 0.0, 4.0, 4.0));
        list.push_text(
            ZIndex::LABELS,
            "1",
            crate::text::FontId::default(),
            12.0,
            Color::BLACK,
            Vec2::new(2.0, 2.0),
            TextAlign::Center,
        );
        let img = rasterizer().render(&mut list, 4, 4);
        assert!(img.pixels().all(|p| p.0 == WHITE));
    }
}
