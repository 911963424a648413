use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use pbn_canvas::Canvas;
use pbn_engine::raster::{RasterConfig, Rasterizer};
use pbn_engine::text::FontSystem;

/// Fonts tried when no `--font` is given.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
];

/// Reads `path`, or the first system font found. Empty when none exists.
pub fn load_font(path: Option<&Path>) -> Result<Vec<u8>> {
    if let Some(path) = path {
        return std::fs::read(path).with_context(|| format!("reading font {}", path.display()));
    }
    Ok(SYSTEM_FONTS.iter().find_map(|p| std::fs::read(p).ok()).unwrap_or_default())
}

/// Renders canvas frames to pixels.
pub struct Exporter {
    raster: Rasterizer,
}

impl Exporter {
    /// `font` may be empty; numbers are then left out of exported frames.
    pub fn new(font: &[u8]) -> Self {
        let mut fonts = FontSystem::new();
        if font.is_empty() {
            log::warn!("no font available; region numbers will not be drawn");
        } else if let Err(e) = fonts.load_font(font) {
            log::warn!("{}; region numbers will not be drawn", e);
        }
        Self { raster: Rasterizer::new(RasterConfig::default(), fonts) }
    }

    /// Current frame of `canvas`, background included when it can be resolved.
    pub fn render(&mut self, canvas: &Canvas) -> RgbaImage {
        let image = canvas.image();
        let url = image.background_url();
        if !url.is_empty() {
            match load_background(url) {
                Ok(Some(bg)) => self.raster.register_image(url, bg),
                Ok(None) => log::warn!("remote background not fetched; rendering without it"),
                Err(e) => log::warn!("background not loaded: {:#}", e),
            }
        }

        let dims = image.dimensions();
        let mut list = canvas.frame();
        self.raster.render(&mut list, dims.width.round() as u32, dims.height.round() as u32)
    }

    pub fn write_png(&mut self, canvas: &Canvas, path: &Path) -> Result<()> {
        let frame = self.render(canvas);
        frame
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}x{} frame to {}", frame.width(), frame.height(), path.display());
        Ok(())
    }
}

/// Decodes a `data:` URL or reads a local file. Remote URLs yield `None`.
fn load_background(url: &str) -> Result<Option<RgbaImage>> {
    let bytes = if let Some(rest) = url.strip_prefix("data:") {
        let (_, data) = rest.split_once(";base64,").context("data URL is not base64")?;
        STANDARD.decode(data).context("decoding data URL")?
    } else if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(None);
    } else {
        std::fs::read(url).with_context(|| format!("reading {}", url))?
    };
    let img = image::load_from_memory(&bytes).context("decoding background image")?;
    Ok(Some(img.to_rgba8()))
}
