//! Eye and mouth aspect ratios
//!
//! Both functions fail closed: degenerate geometry yields the value that
//! reads as "alert" (eyes open, mouth closed) instead of an error, so a
//! landmark glitch can never raise a false drowsiness alarm.

use serde::{Deserialize, Serialize};

use crate::landmarks::{LandmarkSet, Point};

/// EAR returned for unusable eye geometry (reads as "eyes open")
pub const EAR_FAILSAFE: f64 = 1.0;

/// MAR returned for unusable mouth geometry (reads as "mouth closed")
pub const MAR_FAILSAFE: f64 = 0.0;

const EYE_POINTS: usize = 6;
const MOUTH_POINTS: usize = 20;

/// Per-frame ratios of one face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioSample {
    /// Mean eye aspect ratio of both eyes
    pub ear: f64,
    /// Mouth aspect ratio
    pub mar: f64,
}

impl RatioSample {
    pub fn new(ear: f64, mar: f64) -> Self {
        Self { ear, mar }
    }

    /// Extract both ratios from a face
    pub fn from_landmarks(landmarks: &LandmarkSet) -> Self {
        let left = calculate_ear(landmarks.left_eye());
        let right = calculate_ear(landmarks.right_eye());
        Self {
            ear: (left + right) / 2.0,
            mar: calculate_mar(landmarks.mouth()),
        }
    }
}

/// Eye aspect ratio of 6 ordered eye contour points.
///
/// `(|p1 - p5| + |p2 - p4|) / (2 * |p0 - p3|)`
pub fn calculate_ear(eye: &[Point]) -> f64 {
    if eye.len() != EYE_POINTS {
        return EAR_FAILSAFE;
    }

    let a = eye[1].distance(&eye[5]);
    let b = eye[2].distance(&eye[4]);
    let c = eye[0].distance(&eye[3]);

    // zero width or NaN coordinates end up non-finite
    let ear = (a + b) / (2.0 * c);
    if ear.is_finite() {
        ear
    } else {
        EAR_FAILSAFE
    }
}

/// Mouth aspect ratio of the 20 ordered mouth contour points (48..68).
///
/// Three vertical spans across the inner lips (13-19, 14-18, 15-17) over the
/// inner corner width (12-16): `(A + B + C) / (2 * D)`
pub fn calculate_mar(mouth: &[Point]) -> f64 {
    if mouth.len() != MOUTH_POINTS {
        return MAR_FAILSAFE;
    }

    let a = mouth[13].distance(&mouth[19]);
    let b = mouth[14].distance(&mouth[18]);
    let c = mouth[15].distance(&mouth[17]);
    let d = mouth[12].distance(&mouth[16]);

    let mar = (a + b + c) / (2.0 * d);
    if mar.is_finite() {
        mar
    } else {
        MAR_FAILSAFE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Eye `width` wide with both vertical spans `height` tall
    fn eye(width: f64, height: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(width / 3.0, -height / 2.0),
            Point::new(2.0 * width / 3.0, -height / 2.0),
            Point::new(width, 0.0),
            Point::new(2.0 * width / 3.0, height / 2.0),
            Point::new(width / 3.0, height / 2.0),
        ]
    }

    /// Mouth whose inner lips are `gap` apart and inner corners `width` apart
    fn mouth(width: f64, gap: f64) -> Vec<Point> {
        let mut points = vec![Point::default(); MOUTH_POINTS];
        points[12] = Point::new(0.0, 0.0);
        points[16] = Point::new(width, 0.0);
        for (top, bottom, x) in [(13, 19, 0.25), (14, 18, 0.5), (15, 17, 0.75)] {
            points[top] = Point::new(width * x, -gap / 2.0);
            points[bottom] = Point::new(width * x, gap / 2.0);
        }
        points
    }

    #[test]
    fn test_ear_open_and_closed() {
        assert!((calculate_ear(&eye(30.0, 9.0)) - 0.3).abs() < 1e-9);
        assert!((calculate_ear(&eye(30.0, 3.0)) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_ear_degenerate_width() {
        let collapsed = vec![Point::new(5.0, 5.0); 6];
        assert_eq!(calculate_ear(&collapsed), EAR_FAILSAFE);
    }

    #[test]
    fn test_ear_zero_width_open_lids() {
        let mut points = eye(30.0, 9.0);
        points[3] = points[0];
        assert_eq!(calculate_ear(&points), EAR_FAILSAFE);
    }

    #[test]
    fn test_ear_wrong_point_count() {
        assert_eq!(calculate_ear(&eye(30.0, 9.0)[..5]), EAR_FAILSAFE);
    }

    #[test]
    fn test_ear_nan_coordinates() {
        let mut points = eye(30.0, 9.0);
        points[3] = Point::new(f64::NAN, 0.0);
        assert_eq!(calculate_ear(&points), EAR_FAILSAFE);
    }

    #[test]
    fn test_mar_open_mouth() {
        // (3 * 20) / (2 * 40)
        assert!((calculate_mar(&mouth(40.0, 20.0)) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_mar_degenerate_width() {
        assert_eq!(calculate_mar(&mouth(0.0, 20.0)), MAR_FAILSAFE);
        assert_eq!(calculate_mar(&[]), MAR_FAILSAFE);
    }

    #[test]
    fn test_mar_nan_coordinates() {
        let mut points = mouth(40.0, 20.0);
        points[16] = Point::new(f64::NAN, 0.0);
        assert_eq!(calculate_mar(&points), MAR_FAILSAFE);
    }

    #[test]
    fn test_sample_from_landmarks_averages_eyes() {
        let mut points = vec![Point::default(); 68];
        for (i, p) in eye(30.0, 9.0).into_iter().enumerate() {
            points[36 + i] = p;
        }
        for (i, p) in eye(30.0, 3.0).into_iter().enumerate() {
            points[42 + i] = Point::new(p.x + 60.0, p.y);
        }
        for (i, p) in mouth(40.0, 20.0).into_iter().enumerate() {
            points[48 + i] = Point::new(p.x + 10.0, p.y + 50.0);
        }
        let set = LandmarkSet::new(points).unwrap();

        let sample = RatioSample::from_landmarks(&set);
        assert!((sample.ear - 0.2).abs() < 1e-9);
        assert!((sample.mar - 0.75).abs() < 1e-9);
    }

    fn coord() -> impl Strategy<Value = f64> {
        -1000.0f64..1000.0
    }

    proptest! {
        #[test]
        fn prop_ear_matches_formula(pts in prop::collection::vec((coord(), coord()), 6)) {
            let eye: Vec<Point> = pts.into_iter().map(Point::from).collect();
            let a = eye[1].distance(&eye[5]);
            let b = eye[2].distance(&eye[4]);
            let c = eye[0].distance(&eye[3]);
            prop_assume!(c > 1e-6);

            let ear = calculate_ear(&eye);
            prop_assert!((ear - (a + b) / (2.0 * c)).abs() <= 1e-9 * ear.abs().max(1.0));
        }

        #[test]
        fn prop_mar_matches_formula(pts in prop::collection::vec((coord(), coord()), 20)) {
            let mouth: Vec<Point> = pts.into_iter().map(Point::from).collect();
            let d = mouth[12].distance(&mouth[16]);
            prop_assume!(d > 1e-6);
            let expected = (mouth[13].distance(&mouth[19])
                + mouth[14].distance(&mouth[18])
                + mouth[15].distance(&mouth[17]))
                / (2.0 * d);

            let mar = calculate_mar(&mouth);
            prop_assert!((mar - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }

        #[test]
        fn prop_ear_is_never_negative_or_nan(pts in prop::collection::vec((coord(), coord()), 6)) {
            let eye: Vec<Point> = pts.into_iter().map(Point::from).collect();
            let ear = calculate_ear(&eye);
            prop_assert!(ear.is_finite() && ear >= 0.0);
        }
    }
}
