//! Rasterisation tools: full pages and cropped regions.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::Engine;
use image::error::{ParameterError, ParameterErrorKind};
use image::{DynamicImage, RgbImage};
use mupdf::{Colorspace, Device, IRect, Matrix, Page, Pixmap};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::document::{load_page, open_pdf, page_bounds};
use crate::error::{PdfToolsError, Result};
use crate::geometry::Bounds;
use crate::tools::text::write_output;

fn default_scale() -> f32 {
    1.0
}

/// Check a scale factor against the configured limits.
pub fn validate_scale(config: &ServerConfig, scale: f32) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(PdfToolsError::InvalidScale {
            scale,
            reason: "scale must be a finite number greater than 0".to_string(),
        });
    }
    if scale > config.max_scale {
        return Err(PdfToolsError::InvalidScale {
            scale,
            reason: format!("scale must not exceed {}", config.max_scale),
        });
    }
    Ok(())
}

/// Metadata returned alongside image data.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ImageMetadata {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Colour mode of the pixel buffer.
    pub color_mode: String,
    /// Encoding of the image data.
    pub format: String,
    /// Scale factor used (1.0 = 72 DPI).
    pub scale: f32,
}

/// An RGB bitmap rendered from a page or page region.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    /// 8-bit RGB pixel buffer.
    pub pixels: RgbImage,
    /// Scale factor the page was rendered at.
    pub scale: f32,
}

impl RenderedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn metadata(&self) -> ImageMetadata {
        ImageMetadata {
            width: self.width(),
            height: self.height(),
            color_mode: "rgb".to_string(),
            format: "png".to_string(),
            scale: self.scale,
        }
    }

    /// Encode the bitmap as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(self.pixels.clone())
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
        Ok(png)
    }

    /// PNG bytes encoded as standard base64.
    pub fn to_base64_png(&self) -> Result<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.to_png()?))
    }
}

fn dimension_mismatch() -> PdfToolsError {
    PdfToolsError::Image(image::ImageError::Parameter(ParameterError::from_kind(
        ParameterErrorKind::DimensionMismatch,
    )))
}

/// Copy an RGB pixmap into an `RgbImage`, dropping row padding.
fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<RgbImage> {
    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let n = pixmap.n() as usize;
    let stride = pixmap.stride() as usize;
    if n < 3 {
        return Err(dimension_mismatch());
    }

    let samples = pixmap.samples();
    let mut buffer = Vec::with_capacity(width * height * 3);
    for row in 0..height {
        let start = row * stride;
        let line = samples
            .get(start..start + width * n)
            .ok_or_else(dimension_mismatch)?;
        for px in line.chunks_exact(n) {
            buffer.extend_from_slice(&px[..3]);
        }
    }

    RgbImage::from_raw(width as u32, height as u32, buffer).ok_or_else(dimension_mismatch)
}

/// Device-space pixel box `(x0, y0, x1, y1)` covering `region` at `scale`.
/// Always at least one pixel in each dimension.
fn device_bbox(region: &Bounds, scale: f32) -> (i32, i32, i32, i32) {
    let x0 = (region.left * scale).floor() as i32;
    let y0 = (region.top * scale).floor() as i32;
    let x1 = ((region.right * scale).ceil() as i32).max(x0 + 1);
    let y1 = ((region.bottom * scale).ceil() as i32).max(y0 + 1);
    (x0, y0, x1, y1)
}

/// Render the part of a page inside `region` at `scale`.
///
/// Only the pixels covering `region` are allocated and drawn, so the pixel
/// limit applies to the returned image rather than the whole page.
fn render_region(
    config: &ServerConfig,
    page: &Page,
    region: &Bounds,
    scale: f32,
) -> Result<RgbImage> {
    let (x0, y0, x1, y1) = device_bbox(region, scale);
    let pixel_area = (x1 - x0) as u64 * (y1 - y0) as u64;
    if pixel_area > config.max_pixels {
        return Err(PdfToolsError::InvalidScale {
            scale,
            reason: format!(
                "rendered area of {} pixels exceeds maximum {}",
                pixel_area, config.max_pixels
            ),
        });
    }

    let mut pixmap =
        Pixmap::new_with_rect(&Colorspace::device_rgb(), IRect::new(x0, y0, x1, y1), false)?;
    pixmap.clear_with(0xff)?;
    {
        let device = Device::from_pixmap(&pixmap)?;
        page.run(&device, &Matrix::new_scale(scale, scale))?;
    }
    tracing::debug!(width = pixmap.width(), height = pixmap.height(), scale, "rendered region");
    pixmap_to_rgb(&pixmap)
}

fn save_png(image: &RenderedImage, output_path: Option<&Path>) -> Result<()> {
    if let Some(path) = output_path {
        write_output(path, &image.to_png()?)?;
        tracing::info!(output = %path.display(), "saved PDF image");
    }
    Ok(())
}

// ============== Get PDF Image ==============

/// Parameters for rendering a page.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetPdfImageParams {
    /// Path to the PDF file.
    pub path: PathBuf,
    /// Page number (0-indexed).
    pub page: i32,
    /// Scale factor (default 1.0 = 72 DPI).
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// If set, the PNG is also written to this file.
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

/// Render a full page to an RGB image.
pub fn get_pdf_image(config: &ServerConfig, params: GetPdfImageParams) -> Result<RenderedImage> {
    tracing::info!(
        path = %params.path.display(),
        page = params.page,
        scale = params.scale,
        "rendering page"
    );
    validate_scale(config, params.scale)?;
    let doc = open_pdf(&params.path)?;
    let page = load_page(&doc, &params.path, params.page)?;
    let bounds = page_bounds(&page)?;

    let image = RenderedImage {
        pixels: render_region(config, &page, &bounds, params.scale)?,
        scale: params.scale,
    };
    save_png(&image, params.output_path.as_deref())?;
    Ok(image)
}

// ============== Get Cropped PDF Image ==============

/// Parameters for rendering a page region.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetCroppedPdfImageParams {
    /// Path to the PDF file.
    pub path: PathBuf,
    /// Page number (0-indexed).
    pub page: i32,
    /// Crop region in page coordinates (points, origin top-left).
    pub rect: Bounds,
    /// Scale factor (default 1.0 = 72 DPI).
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// If set, the PNG is also written to this file.
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

/// Render the part of a page inside `rect`.
pub fn get_cropped_pdf_image(
    config: &ServerConfig,
    params: GetCroppedPdfImageParams,
) -> Result<RenderedImage> {
    tracing::info!(
        path = %params.path.display(),
        page = params.page,
        rect = %params.rect,
        scale = params.scale,
        "rendering cropped page"
    );
    validate_scale(config, params.scale)?;
    params.rect.validate()?;
    let doc = open_pdf(&params.path)?;
    let page = load_page(&doc, &params.path, params.page)?;
    let bounds = page_bounds(&page)?;
    let clip = params.rect.clip_to_page(&bounds)?;

    tracing::debug!(clip = %clip, "clipped crop region");

    let image = RenderedImage {
        pixels: render_region(config, &page, &clip, params.scale)?,
        scale: params.scale,
    };
    save_png(&image, params.output_path.as_deref())?;
    Ok(image)
}
