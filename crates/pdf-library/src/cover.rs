//! Cover thumbnails: first page rasterised and stored as an image data URL.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
#[cfg(feature = "pdfium")]
use std::sync::Mutex;

use crate::config::LibraryConfig;
use crate::types::{LibraryError, Result};

#[cfg(feature = "pdfium")]
use pdfium_render::prelude::*;

const PLACEHOLDER_RED: Rgba<u8> = Rgba([0xdc, 0x26, 0x26, 0xff]);
const PLACEHOLDER_WHITE: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);

/// Encoded cover image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl CoverImage {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

/// Split a `data:<mime>;base64,<payload>` URL back into its parts
pub fn decode_data_url(url: &str) -> Result<CoverImage> {
    let rest = url.strip_prefix("data:").ok_or(LibraryError::InvalidDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(LibraryError::InvalidDataUrl)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(LibraryError::InvalidDataUrl)?;
    let data = STANDARD
        .decode(payload)
        .map_err(|_| LibraryError::InvalidDataUrl)?;

    Ok(CoverImage {
        mime_type: mime_type.to_string(),
        data,
    })
}

/// Scale factor that fits a page into the cover bounding box
pub fn cover_scale(width: f32, height: f32, max_width: f32, max_height: f32) -> f32 {
    (max_width / width).min(max_height / height)
}

/// Produces a cover image from PDF bytes
pub trait CoverRenderer: Send + Sync {
    fn render(&self, bytes: &[u8], name: &str) -> Result<CoverImage>;
}

/// Red card with a white page glyph, used when the first page cannot be rendered
#[derive(Debug, Clone)]
pub struct PlaceholderCoverRenderer {
    width: u32,
    height: u32,
}

impl Default for PlaceholderCoverRenderer {
    fn default() -> Self {
        Self {
            width: 200,
            height: 280,
        }
    }
}

impl PlaceholderCoverRenderer {
    pub fn new(config: &LibraryConfig) -> Self {
        Self {
            width: config.cover_max_width,
            height: config.cover_max_height,
        }
    }

    pub fn placeholder(&self) -> Result<CoverImage> {
        let mut img = RgbaImage::from_pixel(self.width, self.height, PLACEHOLDER_RED);

        // Page glyph: white sheet with red "text" lines
        let glyph_w = self.width * 2 / 5;
        let glyph_h = self.height * 2 / 5;
        let left = (self.width - glyph_w) / 2;
        let top = (self.height - glyph_h) / 2;
        for y in top..top + glyph_h {
            for x in left..left + glyph_w {
                img.put_pixel(x, y, PLACEHOLDER_WHITE);
            }
        }

        let line_gap = (glyph_h / 8).max(2);
        let mut y = top + line_gap;
        while y + line_gap < top + glyph_h {
            for x in left + glyph_w / 8..left + glyph_w * 7 / 8 {
                img.put_pixel(x, y, PLACEHOLDER_RED);
            }
            y += line_gap;
        }

        let mut data = Vec::new();
        img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)?;
        Ok(CoverImage {
            mime_type: "image/png".to_string(),
            data,
        })
    }
}

impl CoverRenderer for PlaceholderCoverRenderer {
    fn render(&self, _bytes: &[u8], _name: &str) -> Result<CoverImage> {
        self.placeholder()
    }
}

/// Initialize Pdfium, trying a vendored library first, then falling back to system
#[cfg(feature = "pdfium")]
pub fn init_pdfium() -> std::result::Result<Pdfium, PdfiumError> {
    let candidates = std::env::var_os("PDFIUM_LIB_DIR")
        .map(std::path::PathBuf::from)
        .into_iter()
        .chain(std::env::current_dir().ok().map(|p| p.join("vendor/pdfium/lib")));

    for dir in candidates {
        if !dir.exists() {
            continue;
        }
        if let Ok(binding) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
        {
            return Ok(Pdfium::new(binding));
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// pdfium is not thread-safe; all calls go through this lock
#[cfg(feature = "pdfium")]
static PDFIUM_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with a freshly bound pdfium while holding the global pdfium lock
#[cfg(feature = "pdfium")]
pub fn with_pdfium<T>(
    f: impl FnOnce(&Pdfium) -> std::result::Result<T, PdfiumError>,
) -> std::result::Result<T, PdfiumError> {
    let _guard = PDFIUM_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let pdfium = init_pdfium()?;
    f(&pdfium)
}

/// Renders the first page with pdfium and encodes it as JPEG
#[cfg(feature = "pdfium")]
#[derive(Debug, Clone)]
pub struct PdfiumCoverRenderer {
    max_width: u32,
    max_height: u32,
    jpeg_quality: u8,
}

#[cfg(feature = "pdfium")]
impl PdfiumCoverRenderer {
    pub fn new(config: &LibraryConfig) -> Self {
        Self {
            max_width: config.cover_max_width,
            max_height: config.cover_max_height,
            jpeg_quality: config.cover_jpeg_quality,
        }
    }
}

#[cfg(feature = "pdfium")]
impl CoverRenderer for PdfiumCoverRenderer {
    fn render(&self, bytes: &[u8], _name: &str) -> Result<CoverImage> {
        let (w, h, pixels) = with_pdfium(|pdfium| {
            let document = pdfium.load_pdf_from_byte_slice(bytes, None)?;
            let page = document.pages().get(0)?;

            let width = page.width().value.max(1.0);
            let height = page.height().value.max(1.0);
            let scale = cover_scale(
                width,
                height,
                self.max_width as f32,
                self.max_height as f32,
            );

            let config = PdfRenderConfig::new()
                .set_target_width(((width * scale).round() as i32).max(1))
                .set_maximum_height(((height * scale).round() as i32).max(1));
            let bitmap = page.render_with_config(&config)?;
            Ok((
                bitmap.width() as u32,
                bitmap.height() as u32,
                bitmap.as_rgba_bytes().to_vec(),
            ))
        })
        .map_err(|e| LibraryError::Render(e.to_string()))?;

        let rgba = RgbaImage::from_raw(w, h, pixels)
            .ok_or_else(|| LibraryError::Render("Bitmap size mismatch".to_string()))?;
        let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();

        let mut data = Vec::new();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut data, self.jpeg_quality);
        rgb.write_with_encoder(encoder)?;

        Ok(CoverImage {
            mime_type: "image/jpeg".to_string(),
            data,
        })
    }
}

/// The renderer used when none is supplied
pub fn default_renderer(config: &LibraryConfig) -> Arc<dyn CoverRenderer> {
    #[cfg(feature = "pdfium")]
    {
        Arc::new(PdfiumCoverRenderer::new(config))
    }

    #[cfg(not(feature = "pdfium"))]
    {
        Arc::new(PlaceholderCoverRenderer::new(config))
    }
}

/// Render a cover off the async runtime, falling back to the placeholder on failure
pub async fn generate_cover(
    renderer: Arc<dyn CoverRenderer>,
    bytes: Arc<[u8]>,
    name: &str,
    config: &LibraryConfig,
) -> Result<String> {
    let task_name = name.to_string();
    let rendered =
        tokio::task::spawn_blocking(move || renderer.render(&bytes, &task_name)).await?;

    match rendered {
        Ok(cover) => Ok(cover.to_data_url()),
        Err(e) => {
            log::error!("Error generating cover from PDF {}: {}", name, e);
            let placeholder = PlaceholderCoverRenderer::new(config).placeholder()?;
            Ok(placeholder.to_data_url())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_scale_fits_box() {
        // US Letter in points
        let scale = cover_scale(612.0, 792.0, 200.0, 280.0);
        assert!((612.0 * scale) <= 200.0 + f32::EPSILON);
        assert!((792.0 * scale) <= 280.0 + 0.001);
        assert!((scale - 200.0 / 612.0).abs() < 1e-6);

        // Landscape page is width-limited
        let scale = cover_scale(800.0, 400.0, 200.0, 280.0);
        assert!((scale - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_data_url_round_trip() {
        let cover = CoverImage {
            mime_type: "image/jpeg".into(),
            data: vec![1, 2, 3, 250],
        };
        let url = cover.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(decode_data_url(&url).unwrap(), cover);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_data_url("http://example.com/a.png").is_err());
        assert!(decode_data_url("data:image/png,plain").is_err());
        assert!(decode_data_url("data:image/png;base64,***").is_err());
    }

    #[test]
    fn test_placeholder_is_png_of_configured_size() {
        let cover = PlaceholderCoverRenderer::default().placeholder().unwrap();
        assert_eq!(cover.mime_type, "image/png");

        let img = image::load_from_memory(&cover.data).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (200, 280));
        assert_eq!(*img.get_pixel(0, 0), PLACEHOLDER_RED);
        assert_eq!(*img.get_pixel(100, 90), PLACEHOLDER_WHITE);
    }
}
