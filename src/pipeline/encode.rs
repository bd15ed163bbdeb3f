//! Image encoding: `DynamicImage` → base64 PNG text, and back.
//!
//! PNG is lossless, so a decoded page is pixel-identical to the rendered one
//! and identical pixels always produce identical text.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageError, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// MIME type of every encoded page.
pub const PAGE_MIME_TYPE: &str = "image/png";

/// A rasterised page, ready to embed in a model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPage {
    /// Zero-based page index.
    pub page_number: usize,
    pub base64_png: String,
    pub width: u32,
    pub height: u32,
}

impl EncodedPage {
    pub fn new(page_number: usize, img: &DynamicImage) -> Result<Self, ImageError> {
        Ok(Self {
            page_number,
            base64_png: encode_page(img)?,
            width: img.width(),
            height: img.height(),
        })
    }
}

/// Encode a rasterised page as base64 PNG.
pub fn encode_page(img: &DynamicImage) -> Result<String, ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes base64", b64.len());
    Ok(b64)
}

/// Decode text produced by [`encode_page`].
pub fn decode_page(b64: &str) -> Result<DynamicImage, ImageError> {
    let bytes = STANDARD.decode(b64).map_err(|e| {
        ImageError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    image::load_from_memory_with_format(&bytes, ImageFormat::Png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn gradient(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x * 7) as u8, (y * 13) as u8, ((x + y) * 3) as u8, 255])
        }))
    }

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let data = encode_page(&img).expect("encode should succeed");
        assert!(!data.is_empty());
        let decoded = STANDARD.decode(&data).expect("valid base64");
        assert_eq!(&decoded[1..4], b"PNG");
    }

    #[test]
    fn encoding_is_deterministic() {
        let img = gradient(31, 17);
        assert_eq!(encode_page(&img).unwrap(), encode_page(&img.clone()).unwrap());
    }

    #[test]
    fn decode_restores_pixels() {
        let img = gradient(40, 25);
        let back = decode_page(&encode_page(&img).unwrap()).unwrap();
        assert_eq!(back.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_page("not base64 !!").is_err());
    }

    #[test]
    fn encoded_page_records_dimensions() {
        let page = EncodedPage::new(3, &gradient(12, 8)).unwrap();
        assert_eq!(page.page_number, 3);
        assert_eq!((page.width, page.height), (12, 8));
    }
}
