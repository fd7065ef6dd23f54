// THEORY:
// `FrameGeometry` is the only thing the decision engine needs to know about a
// frame besides the markers in it. A zero-width frame would make the normalized
// offset divide by zero, so the type simply cannot hold one: both dimensions are
// `NonZeroU32` and construction fails for anything else.

use crate::error::FrameError;
use std::num::NonZeroU32;

/// Width and height of a frame, both strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    width: NonZeroU32,
    height: NonZeroU32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Result<Self, FrameError> {
        match (NonZeroU32::new(width), NonZeroU32::new(height)) {
            (Some(width), Some(height)) => Ok(Self { width, height }),
            _ => Err(FrameError::EmptyFrame { width, height }),
        }
    }

    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }

    /// Pixel column of the frame center (floor division).
    pub fn center_x(&self) -> u32 {
        self.width() / 2
    }

    /// Half the frame width, kept fractional for odd widths.
    pub fn half_width(&self) -> f64 {
        f64::from(self.width()) / 2.0
    }

    /// Pixel half-width of the dead-zone for `tolerance`, truncated toward zero.
    pub fn dead_zone_px(&self, tolerance: f64) -> u32 {
        (tolerance * self.half_width()) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        assert!(FrameGeometry::new(0, 480).is_err());
        assert!(FrameGeometry::new(640, 0).is_err());
    }

    #[test]
    fn derived_values() {
        let geometry = FrameGeometry::new(640, 480).unwrap();
        assert_eq!(geometry.center_x(), 320);
        assert_eq!(geometry.half_width(), 320.0);
        assert_eq!(geometry.dead_zone_px(0.15), 48);
    }

    #[test]
    fn odd_width_keeps_fractional_half() {
        let geometry = FrameGeometry::new(641, 1).unwrap();
        assert_eq!(geometry.center_x(), 320);
        assert_eq!(geometry.half_width(), 320.5);
    }
}
