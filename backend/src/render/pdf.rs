//! Wraps a page raster into a one-page PDF.
//!
//! genpdf only embeds images from files in the version it links, so the
//! raster goes through a temporary RGB PNG. The rendered document is then
//! flate-compressed with lopdf: printpdf leaves the raw pixel stream
//! uncompressed outside release builds.

use crate::error::EngineError;
use crate::render::raster::PageGeometry;
use genpdf::elements::Image as PdfImage;
use genpdf::fonts::{FontData, FontFamily};
use genpdf::{Document, PaperSize, SimplePageDecorator};
use image::{DynamicImage, RgbaImage};
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use std::path::PathBuf;
use tempfile::NamedTempFile;

const MM_PER_INCH: f64 = 25.4;
/// Keeps the embedded raster a hair inside the page so genpdf never breaks it
/// onto a second one.
const FIT_SLACK: f64 = 1.01;

fn failed(stage: &str, e: impl std::fmt::Display) -> EngineError {
    EngineError::RasterizationFailed(format!("{}: {}", stage, e))
}

/// Writes `raster` as an 8-bit RGB PNG into a temporary file.
fn write_temp_png(raster: &RgbaImage) -> Result<NamedTempFile, EngineError> {
    let (w, h) = raster.dimensions();
    let rgb = DynamicImage::ImageRgba8(raster.clone()).to_rgb8();
    let raw = rgb.into_raw();

    let mut tmp = NamedTempFile::new().map_err(|e| failed("temp file", e))?;
    {
        let file = tmp.as_file_mut();
        let mut encoder = PngEncoder::new(file, w, h);
        encoder.set_color(PngColorType::Rgb);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header().map_err(|e| failed("png header", e))?;
        writer
            .write_image_data(&raw)
            .map_err(|e| failed("png data", e))?;
    }
    Ok(tmp)
}

pub fn encode_pdf(
    raster: &RgbaImage,
    page: PageGeometry,
    fonts: FontFamily<FontData>,
    title: &str,
) -> Result<Vec<u8>, EngineError> {
    let tmp = write_temp_png(raster)?;

    let mut doc = Document::new(fonts);
    doc.set_title(title);
    doc.set_paper_size(PaperSize::A4);
    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(0);
    doc.set_page_decorator(decorator);

    let path: PathBuf = tmp.path().to_path_buf();
    let mut img_elem = PdfImage::from_path(path).map_err(|e| failed("pdf image", e))?;
    let dpi = raster.width() as f64 / page.width_mm() * MM_PER_INCH * FIT_SLACK;
    img_elem.set_dpi(dpi);
    doc.push(img_elem);

    let mut out = Vec::new();
    doc.render(&mut out).map_err(|e| failed("pdf render", e))?;
    // temp file must outlive render
    drop(tmp);
    compress_streams(&out)
}

/// Flate-compresses every stream that has no filter yet.
fn compress_streams(pdf: &[u8]) -> Result<Vec<u8>, EngineError> {
    let mut doc = lopdf::Document::load_mem(pdf).map_err(|e| failed("pdf reload", e))?;
    doc.compress();
    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(|e| failed("pdf compress", e))?;
    Ok(out)
}
