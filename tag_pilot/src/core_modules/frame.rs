// THEORY:
// Frame ingestion sits in front of the decision engine and is the only place
// that looks at raw bytes. Its job is to reject anything that is not an image
// with a distinct error before detection or decision ever runs, and to hand
// the rest of the pipeline exactly two things: a grayscale view for the
// detector and the frame's geometry.

use crate::core_modules::geometry::FrameGeometry;
use crate::error::FrameError;
use image::{DynamicImage, GrayImage};

/// Decodes raw image bytes in any format the `image` crate recognizes.
pub fn decode_frame(bytes: &[u8]) -> Result<DynamicImage, FrameError> {
    Ok(image::load_from_memory(bytes)?)
}

/// A decoded frame, ready for detection.
#[derive(Debug, Clone)]
pub struct Frame {
    gray: GrayImage,
    geometry: FrameGeometry,
}

impl Frame {
    pub fn from_image(image: &DynamicImage) -> Result<Self, FrameError> {
        Self::from_gray(image.to_luma8())
    }

    pub fn from_gray(gray: GrayImage) -> Result<Self, FrameError> {
        let geometry = FrameGeometry::new(gray.width(), gray.height())?;
        Ok(Self { gray, geometry })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        Self::from_image(&decode_frame(bytes)?)
    }

    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_png_with_geometry() {
        let frame = Frame::from_bytes(&png_bytes(64, 48)).unwrap();
        assert_eq!(frame.geometry(), FrameGeometry::new(64, 48).unwrap());
        assert_eq!(frame.gray().dimensions(), (64, 48));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(Frame::from_bytes(b"not an image"), Err(FrameError::Decode(_))));
        assert!(matches!(Frame::from_bytes(&[]), Err(FrameError::Decode(_))));
    }

    #[test]
    fn empty_gray_image_is_rejected() {
        assert!(matches!(
            Frame::from_gray(GrayImage::new(0, 0)),
            Err(FrameError::EmptyFrame { .. })
        ));
    }
}
