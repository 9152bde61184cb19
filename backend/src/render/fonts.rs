//! Font family loading shared by the rasterizer and the PDF container.
//!
//! Files are looked up as `<dir>/<family>-<Style>.ttf`, also accepting the
//! `<family>.ttf` / `-Oblique` naming DejaVu ships with. Only the regular face
//! is mandatory; missing styles reuse it.

use crate::error::EngineError;
use crate::render::markup::TextStyle;
use crate::render::raster::TextPainter;
use genpdf::fonts::{FontData, FontFamily};
use image::{Rgba, RgbaImage};
use log::{debug, warn};
use printpdf::BuiltinFont;
use rusttype::{point, Font, Scale};
use std::path::Path;

const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

const REGULAR_NAMES: [&str; 2] = ["-Regular", ""];
const BOLD_NAMES: [&str; 1] = ["-Bold"];
const ITALIC_NAMES: [&str; 2] = ["-Italic", "-Oblique"];
const BOLD_ITALIC_NAMES: [&str; 2] = ["-BoldItalic", "-BoldOblique"];

struct Face {
    bytes: Vec<u8>,
    font: Font<'static>,
}

impl Face {
    fn load(path: &Path) -> Result<Self, EngineError> {
        let bytes = std::fs::read(path).map_err(|e| {
            EngineError::RenderTargetNotReady(format!("cannot read {}: {}", path.display(), e))
        })?;
        let font = Font::try_from_vec(bytes.clone()).ok_or_else(|| {
            EngineError::RenderTargetNotReady(format!("{} is not a usable font", path.display()))
        })?;
        Ok(Self { bytes, font })
    }

    fn pdf_data(&self, builtin: BuiltinFont) -> Result<FontData, EngineError> {
        FontData::new(self.bytes.clone(), Some(builtin))
            .map_err(|e| EngineError::RasterizationFailed(format!("font embedding: {}", e)))
    }
}

/// Loads the first existing `<family><suffix>.ttf`; the error names the
/// first candidate when none exists.
fn load_first(dir: &Path, family: &str, suffixes: &[&str]) -> Result<Face, EngineError> {
    let candidates: Vec<_> = suffixes
        .iter()
        .map(|suffix| dir.join(format!("{}{}.ttf", family, suffix)))
        .collect();
    let path = candidates
        .iter()
        .find(|path| path.is_file())
        .or_else(|| candidates.first())
        .ok_or_else(|| EngineError::RenderTargetNotReady(format!("no font names for '{}'", family)))?;
    Face::load(path)
}

pub struct FontSet {
    regular: Face,
    bold: Option<Face>,
    italic: Option<Face>,
    bold_italic: Option<Face>,
}

impl FontSet {
    pub fn load(dir: &Path, family: &str) -> Result<Self, EngineError> {
        let regular = load_first(dir, family, &REGULAR_NAMES)?;
        let optional = |suffixes: &[&str], style: &str| match load_first(dir, family, suffixes) {
            Ok(face) => Some(face),
            Err(e) => {
                warn!("Using regular face for {} {}: {}", family, style, e);
                None
            }
        };
        let set = Self {
            bold: optional(&BOLD_NAMES, "Bold"),
            italic: optional(&ITALIC_NAMES, "Italic"),
            bold_italic: optional(&BOLD_ITALIC_NAMES, "BoldItalic"),
            regular,
        };
        debug!("Loaded font family '{}' from {}", family, dir.display());
        Ok(set)
    }

    fn face(&self, style: TextStyle) -> &Face {
        let chosen = match style {
            TextStyle::Regular => None,
            TextStyle::Bold => self.bold.as_ref(),
            TextStyle::Italic => self.italic.as_ref(),
            TextStyle::BoldItalic => self.bold_italic.as_ref().or(self.bold.as_ref()),
        };
        chosen.unwrap_or(&self.regular)
    }

    /// The faces as a genpdf family, for the document container. All text is
    /// already in the raster, so the document refers to the built-in
    /// Helvetica instead of embedding the faces.
    pub fn pdf_family(&self) -> Result<FontFamily<FontData>, EngineError> {
        Ok(FontFamily {
            regular: self.face(TextStyle::Regular).pdf_data(BuiltinFont::Helvetica)?,
            bold: self.face(TextStyle::Bold).pdf_data(BuiltinFont::HelveticaBold)?,
            italic: self.face(TextStyle::Italic).pdf_data(BuiltinFont::HelveticaOblique)?,
            bold_italic: self
                .face(TextStyle::BoldItalic)
                .pdf_data(BuiltinFont::HelveticaBoldOblique)?,
        })
    }
}

impl TextPainter for FontSet {
    fn ascent(&self, style: TextStyle, size: f32) -> f32 {
        self.face(style).font.v_metrics(Scale::uniform(size)).ascent
    }

    fn advance(&self, text: &str, style: TextStyle, size: f32) -> f32 {
        let scale = Scale::uniform(size);
        self.face(style)
            .font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn draw(&self, canvas: &mut RgbaImage, x: f32, baseline: f32, text: &str, style: TextStyle, size: f32) {
        let (width, height) = canvas.dimensions();
        let scale = Scale::uniform(size);
        for glyph in self.face(style).font.layout(text, scale, point(x, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                    return;
                }
                let pixel = canvas.get_pixel_mut(px as u32, py as u32);
                for channel in 0..3 {
                    let blended = TEXT_COLOR[channel] as f32 * coverage
                        + pixel[channel] as f32 * (1.0 - coverage);
                    pixel[channel] = blended.round() as u8;
                }
                pixel[3] = 255;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_regular_face_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let err = FontSet::load(dir.path(), "LiberationSans").err().unwrap();
        assert!(matches!(err, EngineError::RenderTargetNotReady(_)));
    }

    #[test]
    fn garbage_font_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Broken-Regular.ttf"), b"not a font").unwrap();
        let err = FontSet::load(dir.path(), "Broken").err().unwrap();
        assert!(matches!(err, EngineError::RenderTargetNotReady(_)));
    }

    #[test]
    fn unsuffixed_file_counts_as_regular_face() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Plain.ttf"), b"not a font either").unwrap();
        match FontSet::load(dir.path(), "Plain") {
            Err(EngineError::RenderTargetNotReady(msg)) => {
                assert!(msg.contains("Plain.ttf is not a usable font"), "{}", msg)
            }
            other => panic!("expected the unsuffixed file to be tried, got {:?}", other.err()),
        }
    }
}
