//! # Rasterization Pipeline
//!
//! Substituted letter markup goes through two stages:
//! 1. `raster` paints it onto one A4 page at print scale;
//! 2. `pdf` wraps that raster into a single-page PDF.
//!
//! Both stages are CPU bound and run on tokio's blocking pool. The font
//! family is loaded with [`Rasterizer::prepare`]; rendering retries the load
//! while it has not succeeded.

mod fonts;
pub mod markup;
mod pdf;
pub mod raster;

use crate::config::Settings;
use crate::error::EngineError;
use fonts::FontSet;
use image::ImageFormat;
use log::{debug, info};
use once_cell::sync::OnceCell;
use raster::{PageGeometry, TextPainter};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

/// A finished letter, ready to download or submit.
///
/// Not `Clone`: an artifact is moved into a submission and handed back only
/// when the submission fails.
#[derive(Debug)]
pub struct BinaryArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub template_id: String,
    pub page_size: (u32, u32),
}

impl BinaryArtifact {
    pub fn new(bytes: Vec<u8>, template_id: &str, page_size: (u32, u32)) -> Self {
        Self {
            bytes,
            file_name: format!("surat-{}.pdf", template_id),
            template_id: template_id.to_string(),
            page_size,
        }
    }
}

pub struct Rasterizer {
    fonts_dir: PathBuf,
    family: String,
    page: PageGeometry,
    fonts: OnceCell<Arc<FontSet>>,
}

impl Rasterizer {
    pub fn new(fonts_dir: impl Into<PathBuf>, family: impl Into<String>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            family: family.into(),
            page: PageGeometry::a4(),
            fonts: OnceCell::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.fonts_dir, &settings.font_family)
    }

    /// Loads the font family. Calling it again after success is a no-op.
    pub fn prepare(&self) -> Result<(), EngineError> {
        if self.fonts.get().is_some() {
            return Ok(());
        }
        let set = FontSet::load(&self.fonts_dir, &self.family)?;
        let _ = self.fonts.set(Arc::new(set));
        info!(
            "Rasterizer ready: {} {}x{} px",
            self.family, self.page.width_px, self.page.height_px
        );
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.fonts.get().is_some()
    }

    pub fn page(&self) -> PageGeometry {
        self.page
    }

    /// The loaded family. A rasterizer that is not ready yet tries to load it
    /// again, so fonts installed after startup are picked up.
    fn fonts(&self) -> Result<Arc<FontSet>, EngineError> {
        if let Some(fonts) = self.fonts.get() {
            return Ok(fonts.clone());
        }
        debug!("Font family '{}' not loaded yet, retrying", self.family);
        self.prepare()?;
        self.fonts.get().cloned().ok_or_else(|| {
            EngineError::RenderTargetNotReady(format!(
                "font family '{}' not loaded",
                self.family
            ))
        })
    }

    /// Renders `markup` into a one-page PDF for `template_id`.
    pub async fn render(&self, markup: String, template_id: &str) -> Result<BinaryArtifact, EngineError> {
        let fonts = self.fonts()?;
        let page = self.page;
        let title = format!("surat-{}", template_id);
        let bytes = run_blocking(move || {
            let blocks = markup::parse_markup(&markup);
            let raster = raster::rasterize(&blocks, fonts.as_ref(), page)?;
            pdf::encode_pdf(&raster, page, fonts.pdf_family()?, &title)
        })
        .await?;
        debug!("Rendered '{}' into {} PDF bytes", template_id, bytes.len());
        Ok(BinaryArtifact::new(
            bytes,
            template_id,
            (page.width_px, page.height_px),
        ))
    }

    /// Renders `markup` into a PNG of the page, without the PDF container.
    pub async fn render_preview(&self, markup: String) -> Result<Vec<u8>, EngineError> {
        let fonts = self.fonts()?;
        let page = self.page;
        run_blocking(move || preview_png(&markup, fonts.as_ref(), page)).await
    }
}

pub(crate) fn preview_png(
    markup: &str,
    painter: &dyn TextPainter,
    page: PageGeometry,
) -> Result<Vec<u8>, EngineError> {
    let blocks = markup::parse_markup(markup);
    let raster = raster::rasterize(&blocks, painter, page)?;
    let mut png = Cursor::new(Vec::new());
    raster
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| EngineError::RasterizationFailed(format!("png encode: {}", e)))?;
    Ok(png.into_inner())
}

async fn run_blocking<T, F>(work: F) -> Result<T, EngineError>
where
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| EngineError::RasterizationFailed(format!("render task aborted: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster::tests::BoxPainter;

    #[tokio::test]
    async fn rendering_before_prepare_is_refused() {
        let rasterizer = Rasterizer::new("./does-not-exist", "LiberationSans");
        assert!(!rasterizer.is_ready());
        let err = rasterizer
            .render("Nomor: 1".to_string(), "surat_dinas")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::RenderTargetNotReady(_)));
        let err = rasterizer.render_preview(String::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::RenderTargetNotReady(_)));
    }

    #[test]
    fn failed_prepare_keeps_rasterizer_unready() {
        let rasterizer = Rasterizer::new("./does-not-exist", "LiberationSans");
        assert!(rasterizer.prepare().is_err());
        assert!(!rasterizer.is_ready());
    }

    #[test]
    fn preview_is_a_page_sized_png() {
        let page = PageGeometry::a4();
        let png = preview_png("= # SURAT DINAS", &BoxPainter, page).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), page.width_px);
        assert_eq!(decoded.height(), page.height_px);
    }

    #[test]
    fn artifact_file_name_follows_template() {
        let artifact = BinaryArtifact::new(vec![1, 2, 3], "surat_tugas", (1, 1));
        assert_eq!(artifact.file_name, "surat-surat_tugas.pdf");
    }
}
