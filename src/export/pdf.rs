use image::RgbaImage;
use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument};

use crate::error::ExportError;

/// A4 landscape.
pub const PAGE_WIDTH_MM: f32 = 297.0;
pub const PAGE_HEIGHT_MM: f32 = 210.0;
pub const MARGIN_MM: f32 = 10.0;
/// Distance from the top edge to the top of the chart image.
pub const IMAGE_TOP_MM: f32 = 20.0;
/// Space kept free above the bottom edge for the timestamp line.
pub const FOOTER_BAND_MM: f32 = 20.0;

const TITLE_PT: f32 = 16.0;
const FOOTER_PT: f32 = 10.0;
const IMAGE_DPI: f32 = 300.0;
const MM_PER_INCH: f32 = 25.4;

/// Where the chart image lands on the page, in millimetres from the
/// bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fit the image to the page width minus margins, keeping its aspect ratio,
/// then shrink it if it would run into the footer band.
pub fn place_image(px_width: u32, px_height: u32) -> ImagePlacement {
    let aspect = px_height.max(1) as f32 / px_width.max(1) as f32;
    let max_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let max_height = PAGE_HEIGHT_MM - IMAGE_TOP_MM - FOOTER_BAND_MM;

    let (width, height) = if max_width * aspect > max_height {
        (max_height / aspect, max_height)
    } else {
        (max_width, max_width * aspect)
    };

    ImagePlacement {
        x: MARGIN_MM,
        y: PAGE_HEIGHT_MM - IMAGE_TOP_MM - height,
        width,
        height,
    }
}

/// Drop alpha by compositing over white; PDF images here are plain RGB.
fn flatten_on_white(image: &RgbaImage) -> Result<RgbImage, ExportError> {
    let mut rgb = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for px in image.pixels() {
        let [r, g, b, a] = px.0;
        let a = a as u16;
        for c in [r, g, b] {
            rgb.push(((c as u16 * a + 255 * (255 - a)) / 255) as u8);
        }
    }
    RgbImage::from_raw(image.width(), image.height(), rgb)
        .ok_or_else(|| ExportError::Pdf("image buffer has the wrong size".to_string()))
}

/// One landscape page: title, the chart image, and a generation timestamp.
pub fn compose_pdf(title: &str, image: &RgbaImage, generated_at: &str) -> Result<Vec<u8>, ExportError> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Chart");
    let layer = doc.get_page(page).get_layer(layer);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    layer.use_text(title, TITLE_PT, Mm(MARGIN_MM), Mm(PAGE_HEIGHT_MM - MARGIN_MM), &font);

    let placement = place_image(image.width(), image.height());
    let native_width_mm = image.width().max(1) as f32 / IMAGE_DPI * MM_PER_INCH;
    let native_height_mm = image.height().max(1) as f32 / IMAGE_DPI * MM_PER_INCH;

    let pdf_image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(flatten_on_white(image)?));
    pdf_image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(placement.x)),
            translate_y: Some(Mm(placement.y)),
            scale_x: Some(placement.width / native_width_mm),
            scale_y: Some(placement.height / native_height_mm),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );

    layer.use_text(
        format!("Generated on: {generated_at}"),
        FOOTER_PT,
        Mm(MARGIN_MM),
        Mm(MARGIN_MM),
        &font,
    );

    doc.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_image_spans_the_printable_width() {
        let p = place_image(1000, 500);
        assert_eq!(p.x, MARGIN_MM);
        assert!((p.width - 277.0).abs() < 1e-3);
        assert!((p.height - 138.5).abs() < 1e-3);
        assert!((p.y + p.height - 190.0).abs() < 1e-3);
    }

    #[test]
    fn tall_image_is_shrunk_above_the_footer() {
        let p = place_image(400, 400);
        assert!((p.height - 170.0).abs() < 1e-3);
        assert!((p.width - 170.0).abs() < 1e-3);
        assert!(p.y >= FOOTER_BAND_MM - 1e-3);
    }

    #[test]
    fn transparent_pixels_become_white() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 0]));
        assert_eq!(flatten_on_white(&img).unwrap().as_raw(), &vec![255, 255, 255]);
    }

    #[test]
    fn document_bytes_are_pdf() {
        let img = RgbaImage::from_pixel(20, 10, image::Rgba([59, 130, 246, 255]));
        let bytes = compose_pdf("Sales vs Month", &img, "2026-01-01 12:00:00").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
