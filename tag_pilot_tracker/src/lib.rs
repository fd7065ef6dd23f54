// THEORY:
// The tracker draws what the decision engine "sees" on top of the live camera
// feed. Everything that can be computed without OpenCV lives here as plain
// pixel coordinates, so the drawing code in `main.rs` only has to paint them.
//
// Guides:
// - a centerline at the frame's center column,
// - the two dead-zone boundaries at `center ± tolerance * width / 2`,
// - the first marker's corners and center, if there is one,
// - an `Action: <action>` caption.

use tag_pilot::{FrameGeometry, SteeringReport};

/// Pixel positions of the overlay for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Guides {
    pub center_x: i32,
    pub left_bound_x: i32,
    pub right_bound_x: i32,
    pub height: i32,
    pub marker_corners: Vec<(i32, i32)>,
    pub marker_center: Option<(i32, i32)>,
    pub caption: String,
}

impl Guides {
    pub fn new(geometry: FrameGeometry, tolerance: f64, report: &SteeringReport) -> Self {
        let center_x = geometry.center_x() as i32;
        let dead_zone = geometry.dead_zone_px(tolerance) as i32;
        let to_px = |(x, y): (f64, f64)| (x as i32, y as i32);

        Self {
            center_x,
            left_bound_x: center_x - dead_zone,
            right_bound_x: center_x + dead_zone,
            height: geometry.height() as i32,
            marker_corners: report
                .marker
                .map(|m| m.corners.iter().copied().map(to_px).collect())
                .unwrap_or_default(),
            marker_center: report.marker.map(|m| to_px(m.center)),
            caption: format!("Action: {}", report.action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tag_pilot::{Action, MarkerDetection};

    fn report(marker: Option<MarkerDetection>, action: Action) -> SteeringReport {
        SteeringReport {
            action,
            offset: None,
            marker,
            marker_count: usize::from(marker.is_some()),
            persisted: true,
        }
    }

    #[test]
    fn guides_for_vga_frame() {
        let geometry = FrameGeometry::new(640, 480).unwrap();
        let guides = Guides::new(geometry, 0.15, &report(None, Action::Searching));
        assert_eq!(guides.center_x, 320);
        assert_eq!(guides.left_bound_x, 272);
        assert_eq!(guides.right_bound_x, 368);
        assert_eq!(guides.height, 480);
        assert!(guides.marker_corners.is_empty());
        assert_eq!(guides.marker_center, None);
        assert_eq!(guides.caption, "Action: searching");
    }

    #[test]
    fn guides_include_marker() {
        let geometry = FrameGeometry::new(640, 480).unwrap();
        let marker =
            MarkerDetection::from_corners(1, [(90.0, 230.0), (110.0, 230.0), (110.0, 250.0), (90.0, 250.0)]);
        let guides = Guides::new(geometry, 0.15, &report(Some(marker), Action::TurnLeft));
        assert_eq!(guides.marker_center, Some((100, 240)));
        assert_eq!(guides.marker_corners.len(), 4);
        assert_eq!(guides.caption, "Action: turn_left");
    }
}
