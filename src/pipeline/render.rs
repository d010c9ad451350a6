//! Page rendering and text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto the blocking
//! thread pool so Tokio worker threads never stall during rasterisation.
//!
//! ## Why recompute per access?
//!
//! Pages are derived views of the document bytes. A reading session touches
//! one page at a time and the render is fast relative to any of the API
//! calls hanging off it, so nothing is gained by holding every page bitmap
//! in memory. The byte buffer is cloned into the blocking task because the
//! closure must be `'static`.

use crate::config::CompanionConfig;
use crate::document::Document;
use crate::error::CompanionError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use tracing::{debug, info};

/// Document-level facts shown when a book is opened: page count plus
/// whatever identifying metadata the PDF carries.
#[derive(Debug, Clone)]
pub struct DocumentOverview {
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// One page of the document as the UI consumes it: a rendered image and the
/// raw extracted text (clean it with [`crate::pipeline::clean::clean_page_text`]).
pub struct PageView {
    /// 1-based page number.
    pub number: usize,
    pub image: DynamicImage,
    pub raw_text: String,
}

/// Read the page count and identifying metadata without rendering anything.
pub async fn overview(document: &Document) -> Result<DocumentOverview, CompanionError> {
    let bytes = document.bytes().to_vec();
    let origin = document.origin().to_string();

    tokio::task::spawn_blocking(move || overview_blocking(&bytes, &origin))
        .await
        .map_err(|e| CompanionError::Internal(format!("Overview task panicked: {e}")))?
}

fn overview_blocking(bytes: &[u8], origin: &str) -> Result<DocumentOverview, CompanionError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, bytes, origin)?;

    let metadata = document.metadata();
    let page_count = document.pages().len() as usize;

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    info!("PDF loaded: {} pages", page_count);

    Ok(DocumentOverview {
        page_count,
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
    })
}

/// Rasterise one page and extract its text.
///
/// `page` is 1-based, matching everything the user sees. The rendered
/// image's longest edge is capped by `config.max_rendered_pixels` so an
/// A0-sized page cannot exhaust memory.
pub async fn page_view(
    document: &Document,
    page: usize,
    config: &CompanionConfig,
) -> Result<PageView, CompanionError> {
    let bytes = document.bytes().to_vec();
    let origin = document.origin().to_string();
    let max_pixels = config.max_rendered_pixels;

    tokio::task::spawn_blocking(move || page_view_blocking(&bytes, &origin, page, max_pixels))
        .await
        .map_err(|e| CompanionError::Internal(format!("Render task panicked: {e}")))?
}

fn page_view_blocking(
    bytes: &[u8],
    origin: &str,
    page: usize,
    max_pixels: u32,
) -> Result<PageView, CompanionError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, bytes, origin)?;

    let pages = document.pages();
    let total = pages.len() as usize;
    if page < 1 || page > total {
        return Err(CompanionError::PageOutOfRange { page, total });
    }
    let index = page - 1;

    let pdf_page = pages
        .get(index as u16)
        .map_err(|e| CompanionError::RenderFailed {
            page,
            detail: format!("{e:?}"),
        })?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let bitmap = pdf_page
        .render_with_config(&render_config)
        .map_err(|e| CompanionError::RenderFailed {
            page,
            detail: format!("{e:?}"),
        })?;
    let image = bitmap.as_image();

    let raw_text = pdf_page
        .text()
        .map(|t| t.all())
        .map_err(|e| CompanionError::TextExtractFailed {
            page,
            detail: format!("{e:?}"),
        })?;

    debug!(
        "Rendered page {} → {}x{} px, {} chars of text",
        page,
        image.width(),
        image.height(),
        raw_text.len()
    );

    Ok(PageView {
        number: page,
        image,
        raw_text,
    })
}

/// PNG-encode a rendered page for export to disk or an external viewer.
pub fn png_bytes(image: &DynamicImage) -> Result<Vec<u8>, CompanionError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| CompanionError::ImageEncode(e.to_string()))?;
    Ok(buf)
}

fn load_document<'a>(
    pdfium: &'a Pdfium,
    bytes: &'a [u8],
    origin: &str,
) -> Result<PdfDocument<'a>, CompanionError> {
    pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| CompanionError::CorruptPdf {
            origin: origin.to_string(),
            detail: format!("{e:?}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn png_bytes_produces_png_magic() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255])));
        let bytes = png_bytes(&img).expect("encode should succeed");
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
