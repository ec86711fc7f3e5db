//! 68-point facial landmark layout

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::DmsError;

/// Number of points produced by the landmark predictor
pub const LANDMARK_COUNT: usize = 68;

/// Index ranges into the 68-point layout
pub mod regions {
    use std::ops::Range;

    pub const LEFT_EYE: Range<usize> = 36..42;
    pub const RIGHT_EYE: Range<usize> = 42..48;
    pub const MOUTH: Range<usize> = 48..68;
}

/// 2-D landmark in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Landmarks of one detected face, in the fixed 68-point order
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    /// Wrap predictor output, rejecting anything that isn't exactly 68 points
    pub fn new(points: Vec<Point>) -> Result<Self, DmsError> {
        if points.len() != LANDMARK_COUNT {
            return Err(DmsError::LandmarkCount {
                expected: LANDMARK_COUNT,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn left_eye(&self) -> &[Point] {
        self.region(regions::LEFT_EYE)
    }

    pub fn right_eye(&self) -> &[Point] {
        self.region(regions::RIGHT_EYE)
    }

    pub fn mouth(&self) -> &[Point] {
        self.region(regions::MOUTH)
    }

    fn region(&self, range: Range<usize>) -> &[Point] {
        &self.points[range]
    }
}

impl TryFrom<Vec<Point>> for LandmarkSet {
    type Error = DmsError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed_points() -> Vec<Point> {
        (0..LANDMARK_COUNT)
            .map(|i| Point::new(i as f64, 0.0))
            .collect()
    }

    #[test]
    fn test_rejects_wrong_count() {
        let err = LandmarkSet::new(vec![Point::default(); 5]).unwrap_err();
        assert!(matches!(
            err,
            DmsError::LandmarkCount {
                expected: 68,
                actual: 5
            }
        ));
    }

    #[test]
    fn test_regions() {
        let set = LandmarkSet::new(indexed_points()).unwrap();

        assert_eq!(set.left_eye().len(), 6);
        assert_eq!(set.left_eye()[0].x, 36.0);
        assert_eq!(set.right_eye()[0].x, 42.0);
        assert_eq!(set.mouth().len(), 20);
        assert_eq!(set.mouth()[19].x, 67.0);
    }

    #[test]
    fn test_point_distance() {
        let p = Point::from((3.0, 4.0));
        assert_eq!(p.distance(&Point::default()), 5.0);
        assert_eq!(<[f64; 2]>::from(p), [3.0, 4.0]);
    }
}
