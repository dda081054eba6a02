//! Letterboxed 2:3 poster rendering.
//!
//! Stash screenshots are landscape; Plex poster slots are 2:3 portrait.
//! The renderer scales the screenshot to the poster width and centers
//! it vertically on an opaque black 600x900 canvas. Sources taller than
//! the canvas are pasted at the (negative) centered offset and simply
//! crop; no special handling. Decoding and encoding run on the blocking
//! pool so a large screenshot cannot stall request scheduling.

use std::sync::Arc;

use async_trait::async_trait;
use image::{Rgb, RgbImage, imageops};
use tracing::error;

use crate::stash::StashClient;

pub const POSTER_WIDTH: u32 = 600;
pub const POSTER_HEIGHT: u32 = 900;
const POSTER_JPEG_QUALITY: u8 = 85;

/// Height of the source once scaled to the poster width, preserving
/// aspect ratio.
fn scaled_height(source_width: u32, source_height: u32) -> u32 {
    let scale = POSTER_WIDTH as f64 / source_width as f64;
    (source_height as f64 * scale).round().max(1.0) as u32
}

/// Decode, scale, letterbox, and re-encode a screenshot as a poster
/// JPEG. Any failure yields `None`; the caller maps that to a gateway
/// failure.
pub fn compose_poster(source: &[u8]) -> Option<Vec<u8>> {
    let decoded = image::load_from_memory(source).ok()?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return None;
    }

    let target_height = scaled_height(decoded.width(), decoded.height());
    let scaled = decoded
        .resize_exact(POSTER_WIDTH, target_height, imageops::FilterType::Lanczos3)
        .to_rgb8();

    let mut canvas = RgbImage::from_pixel(POSTER_WIDTH, POSTER_HEIGHT, Rgb([0, 0, 0]));
    let y_offset = (POSTER_HEIGHT as i64 - target_height as i64) / 2;
    imageops::overlay(&mut canvas, &scaled, 0, y_offset);

    let mut encoded = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut encoded, POSTER_JPEG_QUALITY);
    encoder
        .encode(
            canvas.as_raw(),
            POSTER_WIDTH,
            POSTER_HEIGHT,
            image::ColorType::Rgb8.into(),
        )
        .ok()?;
    Some(encoded)
}

/// Source of rendered posters. The upload coordinator and the poster
/// endpoint both sit behind this seam so tests can supply fixed bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PosterSource: Send + Sync {
    /// Render the poster for a scene, or `None` when no poster could be
    /// produced at any stage.
    async fn render_poster(&self, scene_id: &str) -> Option<Vec<u8>>;
}

/// Production poster source: fetches the scene screenshot from Stash
/// and composes it off the async runtime.
#[derive(Debug, Clone)]
pub struct StashPosterSource {
    stash: Arc<StashClient>,
}

impl StashPosterSource {
    pub fn new(stash: Arc<StashClient>) -> Self {
        Self { stash }
    }
}

#[async_trait]
impl PosterSource for StashPosterSource {
    async fn render_poster(&self, scene_id: &str) -> Option<Vec<u8>> {
        let screenshot = match self.stash.fetch_scene_screenshot(scene_id).await {
            Ok(image) => image.bytes,
            Err(err) => {
                error!("poster fetch failed for scene {scene_id}: {err}");
                return None;
            }
        };

        let scene = scene_id.to_string();
        match tokio::task::spawn_blocking(move || compose_poster(&screenshot)).await {
            Ok(Some(poster)) => Some(poster),
            Ok(None) => {
                error!("poster generation failed for scene {scene}");
                None
            }
            Err(err) => {
                error!("poster generation task failed for scene {scene}: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encoded_white_image(width: u32, height: u32) -> Vec<u8> {
        let source = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(source)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn assert_near(pixel: &Rgb<u8>, expected: [u8; 3], tolerance: u8) {
        for channel in 0..3 {
            let delta = (pixel.0[channel] as i16 - expected[channel] as i16).unsigned_abs();
            assert!(
                delta <= tolerance as u16,
                "channel {channel}: {:?} not near {expected:?}",
                pixel.0
            );
        }
    }

    #[test]
    fn sixteen_nine_source_scales_to_338_rows() {
        assert_eq!(scaled_height(1920, 1080), 338);
        assert_eq!((POSTER_HEIGHT as i64 - 338) / 2, 281);
    }

    #[test]
    fn poster_is_letterboxed_onto_600_by_900_canvas() {
        let poster = compose_poster(&encoded_white_image(1920, 1080)).unwrap();
        let decoded = image::load_from_memory(&poster).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (POSTER_WIDTH, POSTER_HEIGHT));

        // Bars above and below the 281..619 content band are black;
        // sample well away from the JPEG block boundaries.
        assert_near(decoded.get_pixel(300, 140), [0, 0, 0], 8);
        assert_near(decoded.get_pixel(300, 760), [0, 0, 0], 8);
        assert_near(decoded.get_pixel(300, 450), [255, 255, 255], 8);
    }

    #[test]
    fn taller_than_canvas_source_is_cropped_not_rejected() {
        let poster = compose_poster(&encoded_white_image(600, 1800)).unwrap();
        let decoded = image::load_from_memory(&poster).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (POSTER_WIDTH, POSTER_HEIGHT));
        // Content fills the whole canvas when the source overflows it.
        assert_near(decoded.get_pixel(300, 10), [255, 255, 255], 8);
        assert_near(decoded.get_pixel(300, 890), [255, 255, 255], 8);
    }

    #[test]
    fn undecodable_bytes_produce_no_poster() {
        assert_eq!(compose_poster(b"not an image"), None);
    }
}
