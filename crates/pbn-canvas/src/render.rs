use pbn_engine::coords::{Rect, Vec2};
use pbn_engine::scene::shapes::TextAlign;
use pbn_engine::scene::{Border, DrawList, ZIndex};
use pbn_engine::text::FontId;

use crate::config::{CanvasConfig, LabelStyle, OutlineStyle};
use crate::image::{PaintableImage, Region};

/// Builds the visible frame for a painting.
///
/// Output is layered back to front: background image, region fills and
/// outlines in declaration order, then number plates. Rendering never
/// mutates the painting and cannot fail.
#[derive(Debug, Clone)]
pub struct Renderer {
    outline: OutlineStyle,
    label: LabelStyle,
    font: FontId,
}

impl Renderer {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            outline: config.outline.clone(),
            label: config.label.clone(),
            font: FontId::default(),
        }
    }

    pub fn render(&self, image: &PaintableImage, show_numbers: bool) -> DrawList {
        let mut list = DrawList::new();
        self.render_into(&mut list, image, show_numbers);
        list
    }

    /// Appends the frame for `image` to `list`.
    pub fn render_into(&self, list: &mut DrawList, image: &PaintableImage, show_numbers: bool) {
        let dims = image.dimensions();
        if !image.background_url().is_empty() {
            list.push_image(
                ZIndex::BACKGROUND,
                image.background_url(),
                Rect::new(0.0, 0.0, dims.width, dims.height),
            );
        }

        let border = Border::new(self.outline.width, self.outline.color);
        for region in image.regions().iter() {
            let fill = if region.is_painted() {
                image.palette_entry(region.target_color_index).map(|e| e.color)
            } else {
                None
            };
            list.push_outline(ZIndex::REGIONS, region.outline.clone(), fill, Some(border.clone()));
        }

        if show_numbers {
            for region in image.regions().iter().filter(|r| !r.is_painted()) {
                self.push_label(list, region);
            }
        }
    }

    fn push_label(&self, list: &mut DrawList, region: &Region) {
        let style = &self.label;
        let text = region.target_color_index.to_string();
        let anchor = label_anchor(region);
        let w = style.plate_width_for(text.len());
        let h = style.plate_height;

        list.push_solid_rect(
            ZIndex::LABELS,
            Rect::new(anchor.x - w * 0.5, anchor.y - h * 0.5, w, h),
            style.plate_color,
        );
        list.push_text(ZIndex::LABELS, text, self.font, style.font_size, style.text_color, anchor, TextAlign::Center);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&CanvasConfig::default())
    }
}

/// Center of the outline's bounding box. Cheap, and good enough for the
/// roughly convex shapes segmentation produces.
pub fn label_anchor(region: &Region) -> Vec2 {
    region.outline.bounds().center()
}

#[cfg(test)]
mod tests {
    use pbn_engine::geom::{Outline, DEFAULT_FLATTEN_TOLERANCE};
    use pbn_engine::paint::Color;
    use pbn_engine::scene::DrawCmd;

    use super::*;
    use crate::image::{Dimensions, Region};
    use crate::palette::PaletteEntry;

    fn image(background: &str) -> PaintableImage {
        let outline = |p: &str| Outline::parse(p, DEFAULT_FLATTEN_TOLERANCE).unwrap();
        PaintableImage::new(
            background,
            vec![
                Region::new(1, 1, outline("M0,0 H100 V100 H0 Z")),
                Region::new(2, 12, outline("M100,0 H200 V50 H100 Z")),
            ],
            vec![
                PaletteEntry::new(1, Color::from_hex("#FF0000").unwrap(), "Red"),
                PaletteEntry::new(12, Color::from_hex("#0000FF").unwrap(), "Blue"),
            ],
            Dimensions::new(200.0, 100.0),
        )
        .unwrap()
    }

    fn texts(list: &DrawList) -> Vec<(String, Vec2)> {
        list.items()
            .iter()
            .filter_map(|i| match &i.cmd {
                DrawCmd::Text(t) => Some((t.text.clone(), t.position)),
                _ => None,
            })
            .collect()
    }

    fn layers(list: &mut DrawList) -> Vec<ZIndex> {
        list.iter_in_paint_order().map(|i| i.key.z).collect()
    }

    #[test]
    fn background_then_outlines_then_labels() {
        let mut list = Renderer::default().render(&image("bg.png"), true);
        let z = layers(&mut list);
        assert_eq!(z.first(), Some(&ZIndex::BACKGROUND));
        assert!(z.windows(2).all(|w| w[0] <= w[1]));

        match &list.items()[0].cmd {
            DrawCmd::Image(img) => assert_eq!(img.dest, Rect::new(0.0, 0.0, 200.0, 100.0)),
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn empty_background_is_skipped() {
        let list = Renderer::default().render(&image(""), false);
        assert!(list.items().iter().all(|i| !matches!(i.cmd, DrawCmd::Image(_))));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn labels_sit_at_bounding_box_centers() {
        let list = Renderer::default().render(&image(""), true);
        assert_eq!(
            texts(&list),
            vec![("1".to_string(), Vec2::new(50.0, 50.0)), ("12".to_string(), Vec2::new(150.0, 25.0))]
        );
    }

    #[test]
    fn plates_widen_for_two_digits() {
        let list = Renderer::default().render(&image(""), true);
        let widths: Vec<f32> = list
            .items()
            .iter()
            .filter_map(|i| match &i.cmd {
                DrawCmd::Rect(r) => Some(r.rect.size.x),
                _ => None,
            })
            .collect();
        assert_eq!(widths, vec![24.0, 31.0]);
    }

    #[test]
    fn hidden_numbers_draw_no_labels() {
        let list = Renderer::default().render(&image(""), false);
        assert!(texts(&list).is_empty());
    }

    #[test]
    fn painted_region_is_filled_and_unlabeled() {
        let mut img = image("");
        img.regions_mut().mark_painted(1);
        let list = Renderer::default().render(&img, true);

        let fills: Vec<Option<Color>> = list
            .items()
            .iter()
            .filter_map(|i| match &i.cmd {
                DrawCmd::Outline(o) => Some(o.fill),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![Some(Color::from_hex("#FF0000").unwrap()), None]);
        assert_eq!(texts(&list).len(), 1);
        assert_eq!(texts(&list)[0].0, "12");
    }

    #[test]
    fn outlines_use_configured_stroke() {
        let list = Renderer::default().render(&image(""), false);
        for item in list.items() {
            if let DrawCmd::Outline(o) = &item.cmd {
                let stroke = o.stroke.as_ref().unwrap();
                assert_eq!(stroke.width, 2.0);
                assert_eq!(stroke.color.to_hex(), "#333333");
            }
        }
    }

    #[test]
    fn rendering_does_not_mutate() {
        let img = image("bg.png");
        let before = img.regions().painted_count();
        Renderer::default().render(&img, true);
        assert_eq!(img.regions().painted_count(), before);
    }
}
