//! Raster re-encoding.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{AnimationDecoder, DynamicImage, ImageFormat};

fn decode(data: &[u8], format: ImageFormat) -> Result<DynamicImage> {
    image::load_from_memory_with_format(data, format)
        .with_context(|| format!("Failed to decode {format:?} image"))
}

/// Re-encode a JPEG at `quality`.
pub fn encode_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    // JPEG has no alpha channel
    let img = DynamicImage::ImageRgb8(decode(data, ImageFormat::Jpeg)?.to_rgb8());
    let mut buf = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
        .context("Failed to encode JPEG")?;
    Ok(buf)
}

/// Re-encode a PNG with best deflate and adaptive filtering.
pub fn encode_png(data: &[u8]) -> Result<Vec<u8>> {
    let img = decode(data, ImageFormat::Png)?;
    let mut buf = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder)
        .context("Failed to encode PNG")?;
    Ok(buf)
}

/// Re-encode a WebP losslessly.
pub fn encode_webp(data: &[u8]) -> Result<Vec<u8>> {
    let img = decode(data, ImageFormat::WebP)?;
    // The lossless encoder takes 8-bit RGB(A) only
    let img = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };
    let mut buf = Cursor::new(Vec::new());
    img.write_with_encoder(WebPEncoder::new_lossless(&mut buf))
        .context("Failed to encode WebP")?;
    Ok(buf.into_inner())
}

/// Re-encode a GIF, keeping every animation frame and its delay.
pub fn encode_gif(data: &[u8]) -> Result<Vec<u8>> {
    let frames = GifDecoder::new(Cursor::new(data))
        .context("Failed to decode Gif image")?
        .into_frames()
        .collect_frames()
        .context("Failed to decode Gif frames")?;

    let mut buf = Vec::new();
    {
        // Speed 1 is the slowest, best palette quantization
        let mut encoder = GifEncoder::new_with_speed(&mut buf, 1);
        if frames.len() > 1 {
            encoder
                .set_repeat(Repeat::Infinite)
                .context("Failed to encode GIF")?;
        }
        encoder
            .encode_frames(frames)
            .context("Failed to encode GIF")?;
    }
    Ok(buf)
}
