// THEORY:
// Marker detection is an external capability as far as the steering core is
// concerned. This module only fixes the seam: a grayscale image goes in, an
// ordered list of markers comes out. The order is whatever the backend
// produces, and the decision engine trusts it.
//
// Backends:
// - `FixedDetector` answers every frame with the same list. It lets the
//   server and the pipeline be wired and exercised without a vision library.
// - `aruco::ArucoTagDetector` (feature `opencv`) finds AprilTags with OpenCV's
//   ArUco module.

#[cfg(feature = "opencv")]
pub mod aruco;

use crate::core_modules::marker::MarkerDetection;
use crate::error::DetectorError;
use image::GrayImage;

/// Finds fiducial markers in a grayscale frame.
pub trait MarkerDetector: Send + Sync {
    fn detect(&self, image: &GrayImage) -> Result<Vec<MarkerDetection>, DetectorError>;
}

/// A detector that reports the same markers for every frame.
#[derive(Debug, Clone, Default)]
pub struct FixedDetector {
    markers: Vec<MarkerDetection>,
}

impl FixedDetector {
    pub fn new(markers: Vec<MarkerDetection>) -> Self {
        Self { markers }
    }

    /// A detector that never sees anything.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl MarkerDetector for FixedDetector {
    fn detect(&self, _image: &GrayImage) -> Result<Vec<MarkerDetection>, DetectorError> {
        Ok(self.markers.clone())
    }
}
