pub mod pdf;

use std::io::Cursor;

use eframe::egui;
use image::{ImageFormat, RgbaImage};

use crate::error::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn filter_name(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG Image",
            ExportFormat::Pdf => "PDF Document",
        }
    }

    /// `<chartType>-chart.<ext>`
    pub fn file_name(&self, chart_key: &str) -> String {
        format!("{chart_key}-chart.{}", self.extension())
    }

    fn unsupported_for_3d(&self) -> ExportError {
        match self {
            ExportFormat::Png => ExportError::PngUnsupportedFor3D,
            ExportFormat::Pdf => ExportError::PdfUnsupportedFor3D,
        }
    }
}

/// Produces pixels for the chart currently on screen.
pub trait ChartRasterizer {
    fn rasterize(&mut self) -> Result<RgbaImage, ExportError>;
}

/// The chart being exported.
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub is_3d: bool,
    pub chart_key: &'a str,
    pub title: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Reject exports that have no raster path before any capture happens.
pub fn check_supported(format: ExportFormat, is_3d: bool) -> Result<(), ExportError> {
    if is_3d {
        Err(format.unsupported_for_3d())
    } else {
        Ok(())
    }
}

pub fn export_chart(
    format: ExportFormat,
    request: ExportRequest<'_>,
    rasterizer: &mut dyn ChartRasterizer,
) -> Result<ExportArtifact, ExportError> {
    check_supported(format, request.is_3d)?;
    let image = rasterizer.rasterize()?;

    let bytes = match format {
        ExportFormat::Png => encode_png(&image)?,
        ExportFormat::Pdf => {
            let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            pdf::compose_pdf(request.title, &image, &generated_at)?
        }
    };
    tracing::info!(
        "Exported {}x{} chart as {} ({} bytes)",
        image.width(),
        image.height(),
        format.extension(),
        bytes.len()
    );

    Ok(ExportArtifact {
        file_name: format.file_name(request.chart_key),
        bytes,
    })
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| ExportError::Png(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Rasterize for the clipboard, with the same 3D restriction as file export.
pub fn clipboard_image(
    is_3d: bool,
    rasterizer: &mut dyn ChartRasterizer,
) -> Result<RgbaImage, ExportError> {
    if is_3d {
        return Err(ExportError::ClipboardUnsupportedFor3D);
    }
    rasterizer.rasterize()
}

pub fn copy_to_clipboard(image: &RgbaImage) -> Result<(), ExportError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| ExportError::Rasterize(format!("clipboard: {e}")))?;
    clipboard
        .set_image(arboard::ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: std::borrow::Cow::Borrowed(image.as_raw()),
        })
        .map_err(|e| ExportError::Rasterize(format!("clipboard: {e}")))
}

/// Cut the chart rect out of a full-viewport screenshot.
pub fn crop_screenshot(
    screenshot: &egui::ColorImage,
    rect: egui::Rect,
    pixels_per_point: f32,
) -> Result<RgbaImage, ExportError> {
    let [full_w, full_h] = screenshot.size;
    let x0 = ((rect.left() * pixels_per_point).max(0.0) as usize).min(full_w);
    let y0 = ((rect.top() * pixels_per_point).max(0.0) as usize).min(full_h);
    let x1 = ((rect.right() * pixels_per_point).ceil().max(0.0) as usize).min(full_w);
    let y1 = ((rect.bottom() * pixels_per_point).ceil().max(0.0) as usize).min(full_h);
    let (w, h) = (x1.saturating_sub(x0), y1.saturating_sub(y0));
    if w == 0 || h == 0 {
        return Err(ExportError::NothingToExport);
    }

    let mut rgba = Vec::with_capacity(w * h * 4);
    for row in y0..y1 {
        for col in x0..x1 {
            let c = screenshot.pixels[row * full_w + col];
            rgba.extend_from_slice(&[c.r(), c.g(), c.b(), c.a()]);
        }
    }
    RgbaImage::from_raw(w as u32, h as u32, rgba)
        .ok_or_else(|| ExportError::Rasterize("cropped buffer has the wrong size".to_string()))
}

/// Rasterizer over a frame that has already been captured.
pub struct CapturedFrame {
    image: Option<RgbaImage>,
}

impl CapturedFrame {
    pub fn new(image: RgbaImage) -> Self {
        Self { image: Some(image) }
    }
}

impl ChartRasterizer for CapturedFrame {
    fn rasterize(&mut self) -> Result<RgbaImage, ExportError> {
        self.image.take().ok_or(ExportError::NothingToExport)
    }
}
