//! Raster formats a slide can embed, and reading their pixel size.

use image::ImageReader;
use std::io::Cursor;

/// Raster formats a slide can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageFormat {
    fn from_raster(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            _ => None,
        }
    }

    fn raster(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Gif => image::ImageFormat::Gif,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        image::guess_format(bytes).ok().and_then(Self::from_raster)
    }

    /// Detect format from a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        let mime = if mime == "image/jpg" { "image/jpeg" } else { mime.as_str() };
        image::ImageFormat::from_mime_type(mime).and_then(Self::from_raster)
    }

    /// Detect format from a file extension such as `png` or `JPG`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        image::ImageFormat::from_extension(ext).and_then(Self::from_raster)
    }

    /// File extension used for the media part.
    pub fn extension(self) -> &'static str {
        self.raster().extensions_str().first().copied().unwrap_or("bin")
    }

    /// MIME type used in `[Content_Types].xml`.
    pub fn mime(self) -> &'static str {
        self.raster().to_mime_type()
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

/// Read pixel dimensions from the image header. Returns `None` when the
/// header cannot be decoded.
pub fn pixel_size(format: ImageFormat, bytes: &[u8]) -> Option<PixelSize> {
    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format.raster())
        .into_dimensions()
        .ok()?;
    (width > 0 && height > 0).then_some(PixelSize { width, height })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    /// An encoded `width` x `height` image.
    pub(crate) fn encoded(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format.raster()).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_from_magic() {
        assert_eq!(ImageFormat::from_magic(&encoded(ImageFormat::Png, 1, 1)), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic(b"GIF89a\x01\x00"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic(b"<html>"), None);
        assert_eq!(ImageFormat::from_magic(&[]), None);
    }

    #[test]
    fn test_from_mime_and_extension() {
        assert_eq!(ImageFormat::from_mime("image/PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_mime("image/jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime("image/svg+xml"), None);
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("gif"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_part_names() {
        assert_eq!(ImageFormat::Png.extension(), "png");
        assert_eq!(ImageFormat::Png.mime(), "image/png");
        assert_eq!(ImageFormat::Jpeg.mime(), "image/jpeg");
    }

    #[test]
    fn test_pixel_size() {
        for format in [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif, ImageFormat::Bmp] {
            let size = pixel_size(format, &encoded(format, 30, 10));
            assert_eq!(size, Some(PixelSize { width: 30, height: 10 }), "{:?}", format);
        }
    }

    #[test]
    fn test_pixel_size_of_truncated_header() {
        let png = encoded(ImageFormat::Png, 30, 10);
        assert_eq!(pixel_size(ImageFormat::Png, &png[..20]), None);
        assert_eq!(pixel_size(ImageFormat::Png, b"not an image"), None);
    }
}
