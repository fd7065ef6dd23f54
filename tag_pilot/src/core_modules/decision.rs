// THEORY:
// The decision engine is the whole "brain" of the steering core, and it is
// deliberately tiny. It is a pure function of (markers, geometry, tolerance):
// no state, no I/O, no locks, so any number of callers may use it at once.
//
// Algorithm:
// 1.  **Absence**: no markers means `Searching`. Not an error, just the normal
//     "nothing in view" answer.
// 2.  **Selection**: only the first marker is consulted, in whatever order the
//     detector produced them. No ranking by size or confidence is attempted;
//     swapping detectors can therefore change the chosen marker.
// 3.  **Normalization**: the marker's x is rescaled so that -1 is the left
//     edge, 0 the center and +1 the right edge: `dx = x / (width / 2) - 1`.
// 4.  **Classification**: `dx < -tolerance` turns left, `dx > tolerance` turns
//     right, and everything else (including `dx == ±tolerance`) goes forward.
// 5.  **Garbage In**: a marker whose x is NaN or infinite has no position to
//     steer by, so it counts as no marker at all. A NaN offset would otherwise
//     fail both comparisons and read as `Forward`.

use crate::core_modules::action::Action;
use crate::core_modules::geometry::FrameGeometry;
use crate::core_modules::marker::MarkerDetection;
use crate::error::ConfigError;

/// Dead-zone half-width used when nothing else is configured.
pub const DEFAULT_TOLERANCE: f64 = 0.15;

/// Rescales a pixel x-coordinate to the `[-1, 1]` offset space of `geometry`.
pub fn normalized_offset(x: f64, geometry: FrameGeometry) -> f64 {
    x / geometry.half_width() - 1.0
}

/// Classifies a normalized offset against the dead-zone `[-tolerance, tolerance]`.
pub fn classify(dx: f64, tolerance: f64) -> Action {
    if dx < -tolerance {
        Action::TurnLeft
    } else if dx > tolerance {
        Action::TurnRight
    } else {
        Action::Forward
    }
}

/// Reduces a frame's markers to a single steering action.
pub fn decide(markers: &[MarkerDetection], geometry: FrameGeometry, tolerance: f64) -> Action {
    debug_assert!(tolerance.is_finite() && tolerance >= 0.0);
    match markers.first() {
        None => Action::Searching,
        Some(marker) if !marker.center.0.is_finite() => Action::Searching,
        Some(marker) => classify(normalized_offset(marker.center.0, geometry), tolerance),
    }
}

/// An owned decision engine carrying a validated tolerance.
///
/// It is `Copy` and holds no mutable state, so it can be handed to as many
/// threads as needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionEngine {
    tolerance: f64,
}

impl DecisionEngine {
    pub fn new(tolerance: f64) -> Result<Self, ConfigError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn decide(&self, markers: &[MarkerDetection], geometry: FrameGeometry) -> Action {
        decide(markers, geometry, self.tolerance)
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}
