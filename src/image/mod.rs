//! Image compression.
//!
//! # Modules
//!
//! - [`raster`]: JPEG / PNG / WebP / GIF re-encoding with the `image` crate
//! - [`svg`]: SVG minification through usvg

pub mod raster;
pub mod svg;

use std::path::Path;

/// Formats the images task knows how to compress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    WebP,
    Gif,
    Svg,
}

impl ImageKind {
    /// Detect from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }
}

/// Compression settings.
#[derive(Debug, Clone, Copy)]
pub struct CompressOptions {
    pub jpeg_quality: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self { jpeg_quality: 85 }
    }
}

/// Compress `data`; the original bytes are returned when compression
/// would not make the file smaller.
pub fn compress(kind: ImageKind, data: &[u8], options: CompressOptions) -> anyhow::Result<Vec<u8>> {
    let compressed = match kind {
        ImageKind::Jpeg => raster::encode_jpeg(data, options.jpeg_quality)?,
        ImageKind::Png => raster::encode_png(data)?,
        ImageKind::WebP => raster::encode_webp(data)?,
        ImageKind::Gif => raster::encode_gif(data)?,
        ImageKind::Svg => svg::optimize_svg(data)?,
    };

    if compressed.len() < data.len() {
        Ok(compressed)
    } else {
        Ok(data.to_vec())
    }
}
