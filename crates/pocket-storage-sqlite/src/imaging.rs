//! Photo decoding, transforms and thumbnails

use crate::Result;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

/// Display orientation reached by the rotate and flip buttons
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Unrotated
    #[default]
    Up,
    /// Rotated 90° clockwise
    Right,
    /// Rotated 180°
    Down,
    /// Rotated 270° clockwise
    Left,
    /// Mirrored, unrotated
    UpMirrored,
    /// Mirrored, rotated 90° clockwise
    RightMirrored,
    /// Mirrored, rotated 180°
    DownMirrored,
    /// Mirrored, rotated 270° clockwise
    LeftMirrored,
}

impl Orientation {
    /// Next orientation after a quarter turn clockwise
    pub fn rotated_clockwise(self) -> Self {
        use Orientation::*;
        match self {
            Left => Up,
            Up => Right,
            Right => Down,
            Down => Left,
            LeftMirrored => UpMirrored,
            UpMirrored => RightMirrored,
            RightMirrored => DownMirrored,
            DownMirrored => LeftMirrored,
        }
    }

    /// Orientation after a horizontal flip
    pub fn mirrored(self) -> Self {
        use Orientation::*;
        match self {
            Up => UpMirrored,
            Right => RightMirrored,
            Down => DownMirrored,
            Left => LeftMirrored,
            UpMirrored => Up,
            RightMirrored => Right,
            DownMirrored => Down,
            LeftMirrored => Left,
        }
    }

    /// Whether a flip is applied
    pub fn is_mirrored(self) -> bool {
        matches!(
            self,
            Orientation::UpMirrored
                | Orientation::RightMirrored
                | Orientation::DownMirrored
                | Orientation::LeftMirrored
        )
    }
}

/// Decode image bytes in any supported format
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Encode as JPEG; alpha is dropped
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)))?;
    Ok(out)
}

/// Scale to fit in a `size`×`size` square, keeping the aspect ratio
pub fn thumbnail(image: &DynamicImage, size: u32) -> DynamicImage {
    image.resize(size, size, FilterType::Lanczos3)
}

/// Mirror left to right
pub fn flip_horizontal(image: &DynamicImage) -> DynamicImage {
    image.fliph()
}

/// Quarter turn clockwise
pub fn rotate_clockwise(image: &DynamicImage) -> DynamicImage {
    image.rotate90()
}
