// AprilTag detection through OpenCV's ArUco module.
//
// OpenCV ships the AprilTag families as predefined ArUco dictionaries, so the
// stock `ArucoDetector` finds them. It reports four corners per marker; the
// center is taken as their mean.

use super::MarkerDetector;
use crate::config::TagFamily;
use crate::core_modules::marker::MarkerDetection;
use crate::error::DetectorError;
use image::GrayImage;
use opencv::{
    core::{Mat, Point2f, Vector},
    objdetect::{self, ArucoDetector, DetectorParameters, PredefinedDictionaryType, RefineParameters},
    prelude::*,
};
use std::sync::Mutex;
use tracing::debug;

/// AprilTag detector backed by `cv::aruco::ArucoDetector`.
pub struct ArucoTagDetector {
    family: TagFamily,
    inner: Mutex<ArucoDetector>,
}

impl ArucoTagDetector {
    pub fn new(family: TagFamily) -> Result<Self, DetectorError> {
        let dictionary = objdetect::get_predefined_dictionary(dictionary_for(family)).map_err(backend)?;
        let parameters = DetectorParameters::default().map_err(backend)?;
        let refine = RefineParameters::new(10.0, 3.0, true).map_err(backend)?;
        let inner = ArucoDetector::new(&dictionary, &parameters, refine).map_err(backend)?;
        debug!(family = %family, "aruco apriltag detector ready");
        Ok(Self {
            family,
            inner: Mutex::new(inner),
        })
    }

    pub fn family(&self) -> TagFamily {
        self.family
    }
}

impl MarkerDetector for ArucoTagDetector {
    fn detect(&self, image: &GrayImage) -> Result<Vec<MarkerDetection>, DetectorError> {
        let (width, height) = image.dimensions();
        let mat = Mat::new_rows_cols_with_data(height as i32, width as i32, image.as_raw().as_slice())
            .map_err(backend)?;

        let mut corners: Vector<Vector<Point2f>> = Vector::new();
        let mut ids: Vector<i32> = Vector::new();
        let mut rejected: Vector<Vector<Point2f>> = Vector::new();
        {
            let detector = self.inner.lock().map_err(|_| DetectorError::Poisoned)?;
            detector
                .detect_markers(&*mat, &mut corners, &mut ids, &mut rejected)
                .map_err(backend)?;
        }

        let mut markers = Vec::with_capacity(ids.len());
        for (id, quad) in ids.iter().zip(corners.iter()) {
            if quad.len() != 4 {
                continue;
            }
            let mut points = [(0.0, 0.0); 4];
            for (slot, point) in points.iter_mut().zip(quad.iter()) {
                *slot = (f64::from(point.x), f64::from(point.y));
            }
            markers.push(MarkerDetection::from_corners(id.max(0) as u32, points));
        }
        Ok(markers)
    }
}

fn dictionary_for(family: TagFamily) -> PredefinedDictionaryType {
    match family {
        TagFamily::Tag36h11 => PredefinedDictionaryType::DICT_APRILTAG_36h11,
        TagFamily::Tag36h10 => PredefinedDictionaryType::DICT_APRILTAG_36h10,
        TagFamily::Tag25h9 => PredefinedDictionaryType::DICT_APRILTAG_25h9,
        TagFamily::Tag16h5 => PredefinedDictionaryType::DICT_APRILTAG_16h5,
    }
}

fn backend(err: opencv::Error) -> DetectorError {
    DetectorError::Backend(err.to_string())
}
