use serde::{Deserialize, Serialize};

/// A single fiducial marker as reported by a detector, in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetection {
    /// Tag id within its family.
    pub id: u32,
    /// Marker center `(x, y)`.
    pub center: (f64, f64),
    /// Corner points, in the order the detector reports them.
    pub corners: [(f64, f64); 4],
}

impl MarkerDetection {
    /// A detection known only by its center; corners collapse onto it.
    pub fn at(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            center: (x, y),
            corners: [(x, y); 4],
        }
    }

    /// Builds a detection from its corners, taking their mean as the center.
    pub fn from_corners(id: u32, corners: [(f64, f64); 4]) -> Self {
        let (sx, sy) = corners
            .iter()
            .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
        Self {
            id,
            center: (sx / 4.0, sy / 4.0),
            corners,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_from_square_corners() {
        let marker =
            MarkerDetection::from_corners(7, [(10.0, 10.0), (30.0, 10.0), (30.0, 30.0), (10.0, 30.0)]);
        assert_eq!(marker.center, (20.0, 20.0));
        assert_eq!(marker.id, 7);
    }
}
