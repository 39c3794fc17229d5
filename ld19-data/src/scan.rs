use crate::point::Point;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Struct to hold one lap of lidar scan data.
#[derive(Clone, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scan {
    /// Points in the order they were received. Angles never decrease.
    pub points: Vec<Point>,
    /// Mean rotation speed over the frames of this lap, in degrees per second.
    pub rotation_speed: f64,
    /// Sensor timestamp of the first frame, in ms. Wraps at 30000.
    pub timestamp: u16,
    /// Number of frames decoded into this lap.
    pub n_frames: usize,
    /// Number of frames dropped by validation or decoding during this lap.
    pub n_rejected_frames: usize,
}

impl Scan {
    pub fn new() -> Scan {
        Scan::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Revolutions per second derived from the rotation speed.
    pub fn scan_frequency(&self) -> f64 {
        self.rotation_speed / 360.
    }

    /// Points that carry an actual echo.
    pub fn valid_points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter().filter(|p| p.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_points() {
        let scan = Scan {
            points: vec![
                Point::new(1., 100, 20),
                Point::new(2., 0, 0),
                Point::new(3., 300, 40),
            ],
            rotation_speed: 3600.,
            ..Scan::default()
        };
        let distances: Vec<u16> = scan.valid_points().map(|p| p.distance).collect();
        assert_eq!(distances, vec![100, 300]);
        assert_eq!(scan.len(), 3);
        assert!((scan.scan_frequency() - 10.).abs() < 1e-12);
    }
}
