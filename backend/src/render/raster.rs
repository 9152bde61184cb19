//! Paints parsed markup onto a single page-sized raster.
//!
//! All sizes below are CSS pixels; the page is painted at `SCALE` device
//! pixels per CSS pixel.

use crate::editor::attachment::decode_data_uri;
use crate::error::EngineError;
use crate::render::markup::{Align, Block, TextSegment, TextStyle};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use log::warn;

const MM_PER_INCH: f64 = 25.4;
const CSS_PX_PER_INCH: f64 = 96.0;
/// Device pixels per CSS pixel.
pub const SCALE: f64 = 2.0;

const A4_WIDTH_MM: f64 = 210.0;
const A4_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 20.0;

const BODY_FONT_PX: f32 = 14.0;
const HEADING_FONT_PX: f32 = 18.0;
const LINE_HEIGHT: f32 = 1.5;
const BULLET: &str = "\u{2022} ";
const LIST_INDENT_PX: f32 = 12.0;
const RULE_THICKNESS_PX: f32 = 1.5;
const IMAGE_MAX_WIDTH_PX: f64 = 200.0;
const IMAGE_MAX_HEIGHT_PX: f64 = 100.0;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Measures and paints text runs. Sizes are in device pixels.
pub trait TextPainter: Send + Sync {
    fn ascent(&self, style: TextStyle, size: f32) -> f32;
    fn advance(&self, text: &str, style: TextStyle, size: f32) -> f32;
    fn draw(&self, canvas: &mut RgbaImage, x: f32, baseline: f32, text: &str, style: TextStyle, size: f32);
}

/// Page size and margins in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    pub width_px: u32,
    pub height_px: u32,
    pub margin_px: u32,
}

impl PageGeometry {
    pub fn a4() -> Self {
        let mm_to_px = |mm: f64| (mm / MM_PER_INCH * CSS_PX_PER_INCH * SCALE).ceil() as u32;
        Self {
            width_px: mm_to_px(A4_WIDTH_MM),
            height_px: mm_to_px(A4_HEIGHT_MM),
            margin_px: mm_to_px(MARGIN_MM),
        }
    }

    pub fn width_mm(&self) -> f64 {
        self.width_px as f64 / (CSS_PX_PER_INCH * SCALE) * MM_PER_INCH
    }

    fn content_width(&self) -> f32 {
        self.width_px.saturating_sub(2 * self.margin_px) as f32
    }

    fn content_bottom(&self) -> f32 {
        self.height_px.saturating_sub(self.margin_px) as f32
    }
}

/// One wrapped line: runs of text with their style, and the total width.
#[derive(Debug, Default)]
struct Line {
    runs: Vec<(String, TextStyle)>,
    width: f32,
}

struct Canvas<'a> {
    image: RgbaImage,
    page: PageGeometry,
    painter: &'a dyn TextPainter,
    y: f32,
    clipped: usize,
}

/// Rasterizes `blocks` into one page. Content below the bottom margin is
/// dropped and reported once at warn level.
pub fn rasterize(
    blocks: &[Block],
    painter: &dyn TextPainter,
    page: PageGeometry,
) -> Result<RgbaImage, EngineError> {
    let mut canvas = Canvas {
        image: RgbaImage::from_pixel(page.width_px, page.height_px, BACKGROUND),
        page,
        painter,
        y: page.margin_px as f32,
        clipped: 0,
    };

    for block in blocks {
        match block {
            Block::Blank => canvas.y += line_height(BODY_FONT_PX),
            Block::Rule => canvas.rule(),
            Block::Heading { align, segments } => canvas.text(segments, *align, HEADING_FONT_PX, 0.0, None),
            Block::Paragraph { align, segments } => canvas.text(segments, *align, BODY_FONT_PX, 0.0, None),
            Block::ListItem(segments) => {
                canvas.text(segments, Align::Left, BODY_FONT_PX, LIST_INDENT_PX, Some(BULLET))
            }
            Block::Image { align, source } => canvas.picture(source, *align)?,
        }
    }

    if canvas.clipped > 0 {
        warn!(
            "Letter overflows the page; {} block(s) clipped at the bottom margin",
            canvas.clipped
        );
    }
    Ok(canvas.image)
}

fn device(css_px: f32) -> f32 {
    css_px * SCALE as f32
}

fn line_height(font_px: f32) -> f32 {
    device(font_px) * LINE_HEIGHT
}

impl Canvas<'_> {
    fn fits(&mut self, height: f32) -> bool {
        if self.y + height > self.page.content_bottom() {
            self.clipped += 1;
            return false;
        }
        true
    }

    fn rule(&mut self) {
        let height = line_height(BODY_FONT_PX);
        if self.fits(height) {
            let thickness = device(RULE_THICKNESS_PX).ceil() as u32;
            let top = (self.y + height / 2.0) as u32;
            let left = self.page.margin_px;
            let right = self.page.width_px - self.page.margin_px;
            for y in top..top + thickness {
                for x in left..right {
                    self.image.put_pixel(x, y, INK);
                }
            }
        }
        self.y += height;
    }

    fn text(
        &mut self,
        segments: &[TextSegment],
        align: Align,
        font_px: f32,
        indent_px: f32,
        bullet: Option<&str>,
    ) {
        let size = device(font_px);
        let height = line_height(font_px);
        let left = self.page.margin_px as f32 + device(indent_px);
        let bullet_width = bullet
            .map(|b| self.painter.advance(b, TextStyle::Regular, size))
            .unwrap_or(0.0);
        let max_width = self.page.content_width() - device(indent_px) - bullet_width;
        let lines = wrap(segments, self.painter, size, max_width);

        for (i, line) in lines.iter().enumerate() {
            if !self.fits(height) {
                self.y += height;
                continue;
            }
            let baseline = self.y + (height - size) / 2.0 + self.painter.ascent(TextStyle::Regular, size);
            if let (0, Some(bullet)) = (i, bullet) {
                self.painter
                    .draw(&mut self.image, left, baseline, bullet, TextStyle::Regular, size);
            }
            let text_left = left + bullet_width;
            let mut x = match align {
                Align::Left => text_left,
                Align::Center => text_left + (max_width - line.width).max(0.0) / 2.0,
                Align::Right => text_left + (max_width - line.width).max(0.0),
            };
            for (text, style) in &line.runs {
                self.painter.draw(&mut self.image, x, baseline, text, *style, size);
                x += self.painter.advance(text, *style, size);
            }
            self.y += height;
        }
    }

    fn picture(&mut self, source: &str, align: Align) -> Result<(), EngineError> {
        let bytes = decode_data_uri(source).ok_or_else(|| {
            EngineError::RasterizationFailed("image line does not hold a base64 data URI".into())
        })?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| EngineError::RasterizationFailed(format!("image decode: {}", e)))?;
        let picture = fit_image(decoded, self.page.content_width() as f64);
        let (w, h) = picture.dimensions();

        if self.fits(h as f32) {
            let left = self.page.margin_px as f32;
            let free = (self.page.content_width() - w as f32).max(0.0);
            let x = match align {
                Align::Left => left,
                Align::Center => left + free / 2.0,
                Align::Right => left + free,
            };
            imageops::overlay(&mut self.image, &picture, x as i64, self.y as i64);
        }
        self.y += h as f32;
        Ok(())
    }
}

/// Scales an image into the signature box (never up) and flattens its alpha
/// channel over white.
fn fit_image(img: DynamicImage, content_width: f64) -> RgbaImage {
    let (orig_w, orig_h) = img.dimensions();
    let (orig_w, orig_h) = (orig_w.max(1) as f64, orig_h.max(1) as f64);
    let max_w = (IMAGE_MAX_WIDTH_PX * SCALE).min(content_width);
    let max_h = IMAGE_MAX_HEIGHT_PX * SCALE;
    let scale = (max_w / orig_w).min(max_h / orig_h).min(1.0);

    let resized = if scale >= 1.0 {
        img
    } else {
        let w = (orig_w * scale).max(1.0).round() as u32;
        let h = (orig_h * scale).max(1.0).round() as u32;
        img.resize_exact(w, h, FilterType::Lanczos3)
    };

    let rgba = resized.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut flattened = RgbaImage::from_pixel(w, h, BACKGROUND);
    imageops::overlay(&mut flattened, &rgba, 0, 0);
    flattened
}

/// Greedy word wrap over styled segments. Always yields at least one line.
fn wrap(segments: &[TextSegment], painter: &dyn TextPainter, size: f32, max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::default();

    for segment in segments {
        for word in segment.text.split_inclusive(' ') {
            let word_width = painter.advance(word.trim_end(), segment.style, size);
            if !current.runs.is_empty() && current.width + word_width > max_width {
                lines.push(std::mem::take(&mut current));
            }
            current.width += painter.advance(word, segment.style, size);
            match current.runs.last_mut() {
                Some((text, style)) if *style == segment.style => text.push_str(word),
                _ => current.runs.push((word.to_string(), segment.style)),
            }
        }
    }
    lines.push(current);
    lines
}
